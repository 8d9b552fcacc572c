//! In-memory remote store used by the engine tests

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use katapult_core::domain::{NodeKind, RemoteId, RemoteNode};
use katapult_core::ports::{ChildPage, FileUpload, IRemoteStore, NewNode, RemoteError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    List,
    Create,
    Upload,
    Patch,
}

#[derive(Default)]
struct State {
    nodes: Vec<RemoteNode>,
    next_id: u64,
    failures: HashMap<Op, VecDeque<RemoteError>>,
    calls: HashMap<Op, u32>,
    uploads: Vec<FileUpload>,
}

/// Remote store holding nodes in insertion order
#[derive(Default)]
pub struct FakeStore {
    state: Mutex<State>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node directly, bypassing call accounting
    pub fn seed(&self, title: &str, kind: NodeKind, parent: &RemoteId) -> RemoteId {
        let mut state = self.state.lock().unwrap();
        let id = Self::allocate(&mut state);
        state
            .nodes
            .push(RemoteNode::new(id.clone(), title, kind).with_parent(parent.clone()));
        id
    }

    /// Seed a file with a description
    pub fn seed_described(&self, title: &str, parent: &RemoteId, description: &str) -> RemoteId {
        let id = self.seed(title, NodeKind::File, parent);
        let mut state = self.state.lock().unwrap();
        if let Some(node) = state.nodes.iter_mut().find(|n| n.id == id) {
            node.description = Some(description.to_string());
        }
        id
    }

    /// Queue errors returned by the next calls of `op`
    pub fn fail_next(&self, op: Op, errors: impl IntoIterator<Item = RemoteError>) {
        let mut state = self.state.lock().unwrap();
        state.failures.entry(op).or_default().extend(errors);
    }

    pub fn calls(&self, op: Op) -> u32 {
        self.state
            .lock()
            .unwrap()
            .calls
            .get(&op)
            .copied()
            .unwrap_or(0)
    }

    pub fn nodes(&self) -> Vec<RemoteNode> {
        self.state.lock().unwrap().nodes.clone()
    }

    pub fn uploads(&self) -> Vec<FileUpload> {
        self.state.lock().unwrap().uploads.clone()
    }

    pub fn node(&self, id: &RemoteId) -> Option<RemoteNode> {
        self.nodes().into_iter().find(|n| &n.id == id)
    }

    /// Children of `parent` titled `title`
    pub fn children_titled(&self, parent: &RemoteId, title: &str) -> Vec<RemoteNode> {
        self.nodes()
            .into_iter()
            .filter(|n| n.parent_id.as_ref() == Some(parent) && n.title == title)
            .collect()
    }

    fn allocate(state: &mut State) -> RemoteId {
        state.next_id += 1;
        RemoteId::new(format!("node-{}", state.next_id)).unwrap()
    }

    fn enter(&self, op: Op) -> Result<std::sync::MutexGuard<'_, State>, RemoteError> {
        let mut state = self.state.lock().unwrap();
        *state.calls.entry(op).or_default() += 1;
        if let Some(err) = state.failures.get_mut(&op).and_then(VecDeque::pop_front) {
            return Err(err);
        }
        Ok(state)
    }
}

#[async_trait::async_trait]
impl IRemoteStore for FakeStore {
    async fn list_children(
        &self,
        parent_id: &RemoteId,
        page_token: Option<&str>,
        page_size: u32,
    ) -> Result<ChildPage, RemoteError> {
        let state = self.enter(Op::List)?;
        let offset: usize = page_token.map(|t| t.parse().unwrap()).unwrap_or(0);
        let children: Vec<&RemoteNode> = state
            .nodes
            .iter()
            .filter(|n| n.parent_id.as_ref() == Some(parent_id))
            .collect();
        let end = (offset + page_size as usize).min(children.len());
        let items = children[offset..end].iter().map(|n| (*n).clone()).collect();
        let next_page_token = (end < children.len()).then(|| end.to_string());
        Ok(ChildPage {
            items,
            next_page_token,
        })
    }

    async fn create_node(&self, node: &NewNode) -> Result<RemoteNode, RemoteError> {
        let mut state = self.enter(Op::Create)?;
        let id = Self::allocate(&mut state);
        let mut created =
            RemoteNode::new(id, node.title.clone(), node.kind).with_parent(node.parent_id.clone());
        created.color_tag = node.color_tag.clone();
        state.nodes.push(created.clone());
        Ok(created)
    }

    async fn upload_file(&self, upload: &FileUpload) -> Result<RemoteNode, RemoteError> {
        let mut state = self.enter(Op::Upload)?;
        let id = Self::allocate(&mut state);
        let mut node = RemoteNode::new(id, upload.title.clone(), NodeKind::File)
            .with_parent(upload.parent_id.clone());
        node.description = upload.description.clone();
        state.nodes.push(node.clone());
        state.uploads.push(upload.clone());
        Ok(node)
    }

    async fn patch_description(
        &self,
        id: &RemoteId,
        description: &str,
    ) -> Result<RemoteNode, RemoteError> {
        let mut state = self.enter(Op::Patch)?;
        let node = state
            .nodes
            .iter_mut()
            .find(|n| &n.id == id)
            .ok_or_else(|| RemoteError::Rejected {
                status: 404,
                message: format!("File not found: {id}"),
            })?;
        node.description = Some(description.to_string());
        Ok(node.clone())
    }
}

/// A transient server failure
pub fn transient() -> RemoteError {
    RemoteError::Server {
        status: 503,
        message: "backendError".into(),
    }
}
