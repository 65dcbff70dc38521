// ABOUTME: Shared tree state: node cache, cached root set and the change stream
// ABOUTME: Receives fired refreshes and invalidates before notifying observers

use parking_lot::Mutex;
use tokio::sync::broadcast;

use arbor_logging::trace;

use crate::cache::NodeCache;
use crate::node::ExplorerNode;
use crate::refresh::RefreshSink;

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Tree-data-changed notification; `element` is `None` for the whole tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeChange {
    pub element: Option<ExplorerNode>,
}

/// Root nodes computed for the current generation
#[derive(Debug, Default)]
pub(crate) struct RootSet {
    pub items: Option<Vec<ExplorerNode>>,
    /// Bumped on every whole-tree refresh
    pub generation: u64,
}

pub struct TreeState {
    pub(crate) cache: Mutex<NodeCache>,
    pub(crate) roots: Mutex<RootSet>,
    changes: broadcast::Sender<TreeChange>,
}

impl TreeState {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            cache: Mutex::new(NodeCache::new()),
            roots: Mutex::new(RootSet::default()),
            changes,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TreeChange> {
        self.changes.subscribe()
    }

    /// Current root generation
    pub(crate) fn generation(&self) -> u64 {
        self.roots.lock().generation
    }

    /// Store `items` as the root set unless a whole-tree refresh fired since `generation`
    pub(crate) fn store_roots(&self, generation: u64, items: &[ExplorerNode]) -> bool {
        let mut roots = self.roots.lock();
        if roots.generation != generation {
            return false;
        }
        roots.items = Some(items.to_vec());
        true
    }

    pub(crate) fn cached_roots(&self) -> Option<Vec<ExplorerNode>> {
        self.roots.lock().items.clone()
    }
}

impl Default for TreeState {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshSink for TreeState {
    fn fire(&self, element: Option<&ExplorerNode>) {
        if element.is_none() {
            let mut roots = self.roots.lock();
            roots.items = None;
            roots.generation += 1;
        }
        self.cache.lock().remove_node_children(element);

        // No subscribers is fine, the view pulls again when it attaches
        let receivers = self
            .changes
            .send(TreeChange {
                element: element.cloned(),
            })
            .unwrap_or(0);
        trace!(receivers, "Tree change emitted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_types::{NodeDescriptor, NodeKind};

    #[tokio::test]
    async fn test_whole_tree_fire_discards_roots() {
        let state = TreeState::new();
        let mut changes = state.subscribe();
        let project = ExplorerNode::root(
            NodeDescriptor::new(NodeKind::Project, "app").with_uri("file:///ws/app/"),
        );

        let generation = state.generation();
        assert!(state.store_roots(generation, std::slice::from_ref(&project)));
        state.cache.lock().save_nodes(std::slice::from_ref(&project));

        state.fire(None);

        assert!(state.cached_roots().is_none());
        assert!(state.cache.lock().is_empty());
        assert!(!state.store_roots(generation, &[project]));
        assert_eq!(changes.recv().await.unwrap(), TreeChange { element: None });
    }

    #[tokio::test]
    async fn test_subtree_fire_keeps_roots() {
        let state = TreeState::new();
        let mut changes = state.subscribe();
        let project = ExplorerNode::root(NodeDescriptor::new(NodeKind::Project, "app"));
        let package = ExplorerNode::child_of(
            &project,
            NodeDescriptor::new(NodeKind::Package, "com.example").with_uri("file:///pkg"),
        );
        state.store_roots(state.generation(), std::slice::from_ref(&project));
        state.cache.lock().save_children(&project, std::slice::from_ref(&package));

        state.fire(Some(&project));

        assert_eq!(state.cached_roots(), Some(vec![project.clone()]));
        assert!(state.cache.lock().get_data_node("file:///pkg").is_none());
        assert_eq!(
            changes.recv().await.unwrap().element,
            Some(project)
        );
    }
}
