//! Reconciliation of a local tree with a remote folder
//!
//! A read-only, name-level comparison. Counts are compared first; only when
//! they differ is the larger side checked against the other for names it
//! lacks. Entries with the same name in different branches alias each other.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use katapult_core::domain::{InventoryEntry, RemoteId};
use serde::Serialize;
use tracing::{info, warn};

use crate::lister::RemoteLister;
use crate::walker::LocalWalker;
use crate::MirrorError;

/// Outcome of a reconciliation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub local_total: u64,
    pub remote_total: u64,
    /// Counts agree
    pub matched: bool,
    /// Local names with no remote counterpart
    pub missing_remote: BTreeSet<String>,
    /// Remote names with no local counterpart
    pub missing_local: BTreeSet<String>,
}

/// Names in `from` that do not occur in `against`
fn missing_names(from: &[InventoryEntry], against: &[InventoryEntry]) -> BTreeSet<String> {
    let present: HashSet<&str> = against.iter().map(|e| e.name.as_str()).collect();
    from.iter()
        .filter(|e| !present.contains(e.name.as_str()))
        .map(|e| e.name.clone())
        .collect()
}

/// Compare two inventories
pub fn compare(local: &[InventoryEntry], remote: &[InventoryEntry]) -> ReconcileReport {
    let mut report = ReconcileReport {
        local_total: local.len() as u64,
        remote_total: remote.len() as u64,
        ..ReconcileReport::default()
    };

    if report.local_total == report.remote_total {
        report.matched = true;
    } else if report.local_total > report.remote_total {
        report.missing_remote = missing_names(local, remote);
    } else {
        report.missing_local = missing_names(remote, local);
    }
    report
}

/// Compares local trees with remote folders
#[derive(Clone)]
pub struct Reconciler {
    lister: RemoteLister,
}

impl Reconciler {
    pub fn new(lister: RemoteLister) -> Self {
        Self { lister }
    }

    /// Compare everything below `local_root` with everything below `folder_id`
    pub async fn reconcile(
        &self,
        local_root: &Path,
        folder_id: &RemoteId,
    ) -> Result<ReconcileReport, MirrorError> {
        let local = LocalWalker::open(local_root)?.inventory()?;
        let remote = self.lister.list_tree_recursive(folder_id).await?;

        let report = compare(&local, &remote.entries);
        if report.matched {
            info!(
                total = report.local_total,
                "Local and remote file counts match"
            );
        } else {
            warn!(
                local_total = report.local_total,
                remote_total = report.remote_total,
                missing_remote = report.missing_remote.len(),
                missing_local = report.missing_local.len(),
                "Local and remote file counts differ"
            );
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;
    use std::time::Duration;

    use katapult_core::domain::NodeKind;

    use super::*;
    use crate::journal::UploadLog;
    use crate::retry::{RetryExecutor, RetryPolicy};
    use crate::testing::FakeStore;

    fn entries(names: &[&str]) -> Vec<InventoryEntry> {
        names.iter().map(|n| InventoryEntry::new(*n, "root")).collect()
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_local_larger_reports_missing_remote() {
        let report = compare(&entries(&["a", "b", "c"]), &entries(&["a", "b"]));
        assert!(!report.matched);
        assert_eq!(report.missing_remote, set(&["c"]));
        assert!(report.missing_local.is_empty());
    }

    #[test]
    fn test_remote_larger_reports_missing_local() {
        let report = compare(&entries(&["a"]), &entries(&["a", "b", "z"]));
        assert!(!report.matched);
        assert_eq!(report.missing_local, set(&["b", "z"]));
        assert!(report.missing_remote.is_empty());
    }

    #[test]
    fn test_equal_counts_match_without_diff() {
        // Only counts are compared when they agree
        let report = compare(&entries(&["a", "b"]), &entries(&["a", "x"]));
        assert!(report.matched);
        assert!(report.missing_remote.is_empty());
        assert!(report.missing_local.is_empty());
    }

    #[tokio::test]
    async fn test_reconcile_walks_both_sides() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("Archive");
        fs::create_dir_all(root.join("1999")).unwrap();
        fs::write(root.join("a.txt"), b"a").unwrap();
        fs::write(root.join(".DS_Store"), b"x").unwrap();
        fs::write(root.join("1999/b.txt"), b"b").unwrap();

        let store = Arc::new(FakeStore::new());
        let folder = store.seed("Archive", NodeKind::Folder, &RemoteId::drive_root());
        store.seed("a.txt", NodeKind::File, &folder);
        store.seed("1999", NodeKind::Folder, &folder);

        let policy = RetryPolicy {
            max_retries: 1,
            initial_delay: Duration::from_secs(1),
            backoff: 2,
        };
        let lister = RemoteLister::new(
            store,
            RetryExecutor::new(policy, UploadLog::disabled()),
            100,
        );
        let report = Reconciler::new(lister)
            .reconcile(&root, &folder)
            .await
            .unwrap();

        assert_eq!(report.local_total, 3);
        assert_eq!(report.remote_total, 2);
        assert_eq!(report.missing_remote, set(&["b.txt"]));
    }
}
