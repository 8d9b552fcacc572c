//! Remote tree lister
//!
//! Pages through a folder's children following continuation tokens. Each
//! page request goes through the retry executor on its own, so a failure
//! deep in a large listing only repeats that page.

use std::collections::VecDeque;
use std::sync::Arc;

use futures_util::stream::{self, Stream, TryStreamExt};
use katapult_core::domain::{InventoryEntry, NodeKind, RemoteId, RemoteNode};
use katapult_core::ports::{ChildPage, IRemoteStore, RemoteError};
use tracing::debug;

use crate::retry::RetryExecutor;

/// Result of a recursive remote walk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteTree {
    /// Every node below the starting folder, depth-first
    pub entries: Vec<InventoryEntry>,
    /// Number of entries
    pub total: u64,
}

/// Where a paginated listing stands
enum Cursor {
    Start,
    Next(String),
    Done,
}

/// Lists remote folders through the retry executor
#[derive(Clone)]
pub struct RemoteLister {
    store: Arc<dyn IRemoteStore>,
    executor: RetryExecutor,
    page_size: u32,
}

impl RemoteLister {
    pub fn new(store: Arc<dyn IRemoteStore>, executor: RetryExecutor, page_size: u32) -> Self {
        Self {
            store,
            executor,
            page_size,
        }
    }

    async fn fetch_page(
        &self,
        folder_id: &RemoteId,
        token: Option<&str>,
    ) -> Result<ChildPage, RemoteError> {
        self.executor
            .run("list_children", || {
                self.store.list_children(folder_id, token, self.page_size)
            })
            .await
    }

    /// Children of `folder_id` in server order
    ///
    /// Pages are fetched lazily as the stream is polled. Each call starts
    /// again from the first page.
    pub fn children(
        &self,
        folder_id: &RemoteId,
    ) -> impl Stream<Item = Result<RemoteNode, RemoteError>> + '_ {
        let folder_id = folder_id.clone();
        stream::try_unfold(
            (Cursor::Start, VecDeque::new()),
            move |(mut cursor, mut buffer)| {
                let folder_id = folder_id.clone();
                async move {
                    loop {
                        if let Some(node) = buffer.pop_front() {
                            return Ok(Some((node, (cursor, buffer))));
                        }
                        let token = match cursor {
                            Cursor::Start => None,
                            Cursor::Next(token) => Some(token),
                            Cursor::Done => return Ok(None),
                        };
                        let page = match self.fetch_page(&folder_id, token.as_deref()).await {
                            Ok(page) => page,
                            Err(e) => return Err(e),
                        };
                        debug!(folder = %folder_id, count = page.items.len(), "Fetched page");
                        buffer.extend(page.items);
                        cursor = page.next_page_token.map_or(Cursor::Done, Cursor::Next);
                    }
                }
            },
        )
    }

    /// Every child of `folder_id`
    pub async fn list_all(&self, folder_id: &RemoteId) -> Result<Vec<RemoteNode>, RemoteError> {
        self.children(folder_id).try_collect().await
    }

    /// First child of `folder_id` titled `title` (and of `kind`, when given)
    ///
    /// Titles are not unique; the first match in server order wins and the
    /// scan stops there.
    pub async fn find_child(
        &self,
        folder_id: &RemoteId,
        title: &str,
        kind: Option<NodeKind>,
    ) -> Result<Option<RemoteNode>, RemoteError> {
        let mut children = std::pin::pin!(self.children(folder_id));
        while let Some(node) = children.try_next().await? {
            if node.title == title && kind.map_or(true, |k| node.kind == k) {
                return Ok(Some(node));
            }
        }
        Ok(None)
    }

    /// Every node below `folder_id`, depth-first
    ///
    /// Uses an explicit worklist. Every child is descended into whatever its
    /// kind, so file nodes cost one empty listing each.
    pub async fn list_tree_nodes(
        &self,
        folder_id: &RemoteId,
    ) -> Result<Vec<RemoteNode>, RemoteError> {
        let mut nodes = Vec::new();
        let mut worklist = vec![folder_id.clone()];

        while let Some(current) = worklist.pop() {
            let children = self.list_all(&current).await?;
            // Reverse so the first child is expanded first
            worklist.extend(children.iter().rev().map(|c| c.id.clone()));
            nodes.extend(children);
        }

        debug!(root = %folder_id, total = nodes.len(), "Walked remote tree");
        Ok(nodes)
    }

    /// Name-level inventory of everything below `folder_id`
    pub async fn list_tree_recursive(&self, folder_id: &RemoteId) -> Result<RemoteTree, RemoteError> {
        let nodes = self.list_tree_nodes(folder_id).await?;
        let titles: std::collections::HashMap<&RemoteId, &str> =
            nodes.iter().map(|n| (&n.id, n.title.as_str())).collect();

        let entries: Vec<InventoryEntry> = nodes
            .iter()
            .map(|n| {
                let parent_name = n
                    .parent_id
                    .as_ref()
                    .map(|p| titles.get(p).map_or(p.as_str(), |t| *t))
                    .unwrap_or(folder_id.as_str());
                InventoryEntry {
                    name: n.title.clone(),
                    parent_name: parent_name.to_string(),
                    color_tag: n.color_tag.clone(),
                }
            })
            .collect();

        Ok(RemoteTree {
            total: entries.len() as u64,
            entries,
        })
    }
}
