//! Year tagging from file titles
//!
//! Scans whose titles start with a two-digit year followed by `.`
//! (`45.jpg`, `07.scan.tif`) get the description `Date: 19NN`.

use std::sync::Arc;

use katapult_core::domain::{RemoteId, RemoteNode};
use katapult_core::ports::IRemoteStore;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::lister::RemoteLister;
use crate::retry::RetryExecutor;
use crate::MirrorError;

/// Two-digit year prefix of a title, if it has one
fn year_prefix(title: &str) -> Option<&str> {
    let bytes = title.as_bytes();
    if bytes.len() >= 3
        && bytes[0].is_ascii_digit()
        && bytes[1].is_ascii_digit()
        && bytes[2] == b'.'
    {
        Some(&title[..2])
    } else {
        None
    }
}

fn description_for(year: &str) -> String {
    format!("Date: 19{year}")
}

/// Titles grouped by whether their description carries the title year
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TitleAudit {
    pub verified: Vec<String>,
    pub mismatched: Vec<String>,
}

/// Applies and audits year descriptions below a remote folder
pub struct TitleMetadataTagger {
    store: Arc<dyn IRemoteStore>,
    executor: RetryExecutor,
    lister: RemoteLister,
}

impl TitleMetadataTagger {
    pub fn new(store: Arc<dyn IRemoteStore>, executor: RetryExecutor, page_size: u32) -> Self {
        let lister = RemoteLister::new(Arc::clone(&store), executor.clone(), page_size);
        Self {
            store,
            executor,
            lister,
        }
    }

    /// Patch every year-titled node below `folder_id`
    ///
    /// Returns the number of patched nodes.
    pub async fn apply(&self, folder_id: &RemoteId) -> Result<u64, MirrorError> {
        let nodes = self.lister.list_tree_nodes(folder_id).await?;
        let mut patched = 0;

        for node in &nodes {
            let Some(year) = year_prefix(&node.title) else {
                continue;
            };
            let description = description_for(year);
            self.executor
                .run("patch_description", || {
                    self.store.patch_description(&node.id, &description)
                })
                .await?;

            debug!(id = %node.id, title = %node.title, %description, "Tagged");
            self.executor
                .journal()
                .record(&format!("Updated description of {}: {description}", node.title));
            patched += 1;
        }

        info!(folder = %folder_id, patched, "Applied title metadata");
        Ok(patched)
    }

    /// Check that every year-titled file below `folder_id` carries its year
    pub async fn verify(&self, folder_id: &RemoteId) -> Result<TitleAudit, MirrorError> {
        let nodes = self.lister.list_tree_nodes(folder_id).await?;
        let mut audit = TitleAudit::default();

        for node in nodes.iter().filter(|n| !n.is_folder()) {
            let Some(year) = year_prefix(&node.title) else {
                continue;
            };
            if carries_year(node, year) {
                audit.verified.push(node.title.clone());
            } else {
                warn!(id = %node.id, title = %node.title, "Description does not match title year");
                audit.mismatched.push(node.title.clone());
            }
        }

        info!(
            folder = %folder_id,
            verified = audit.verified.len(),
            mismatched = audit.mismatched.len(),
            "Verified title metadata"
        );
        Ok(audit)
    }
}

fn carries_year(node: &RemoteNode, year: &str) -> bool {
    node.description
        .as_deref()
        .map_or(false, |d| d.ends_with(year))
}
