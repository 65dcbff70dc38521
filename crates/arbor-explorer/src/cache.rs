// ABOUTME: Arena cache of materialized explorer nodes
// ABOUTME: Indexes nodes by identity and resource URI and evicts whole subtrees at once

use slotmap::{SecondaryMap, SlotMap, new_key_type};
use std::collections::HashMap;

use crate::node::{ExplorerNode, NodePath, NodeVariant};

new_key_type! {
    /// Arena slot of a cached node
    pub struct NodeIndex;
}

/// Cache of nodes that have been handed to the view at least once.
///
/// Every cached node's ancestors are cached as well, so evicting the
/// children of a node through the child lists always reaches every
/// descendant.
///
/// Workspace nodes are kept out of the URI index: a workspace folder that is
/// itself a project shares its URI with the project node, and lookups by URI
/// must find the project.
#[derive(Default)]
pub struct NodeCache {
    nodes: SlotMap<NodeIndex, ExplorerNode>,
    by_identity: HashMap<NodePath, NodeIndex>,
    by_uri: HashMap<String, NodeIndex>,
    /// Parent to ordered children
    children: SecondaryMap<NodeIndex, Vec<NodeIndex>>,
    /// Parents whose full child list came from a single query
    materialized: SecondaryMap<NodeIndex, ()>,
    /// Bumped by every eviction, including a full reset
    invalidations: u64,
}

impl NodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Eviction counter. Results of a query that started before the counter
    /// moved must not be saved.
    pub fn invalidation_epoch(&self) -> u64 {
        self.invalidations
    }

    /// Register a batch of freshly materialized nodes.
    ///
    /// Entries with the same identity are overwritten in iteration order.
    pub fn save_nodes(&mut self, nodes: &[ExplorerNode]) {
        for node in nodes {
            self.upsert(node);
        }
    }

    /// Register the complete, ordered child list of `parent`.
    ///
    /// Previously cached children missing from `children` are evicted
    /// together with their subtrees.
    pub fn save_children(&mut self, parent: &ExplorerNode, children: &[ExplorerNode]) {
        let parent_index = self.ensure(parent);

        let mut indices = Vec::with_capacity(children.len());
        for child in children {
            let index = self.upsert(child);
            if !indices.contains(&index) {
                indices.push(index);
            }
        }

        let stale: Vec<NodeIndex> = self
            .children
            .get(parent_index)
            .map(|list| {
                list.iter()
                    .copied()
                    .filter(|index| !indices.contains(index))
                    .collect()
            })
            .unwrap_or_default();
        for index in stale {
            self.remove_descendants(index);
            self.detach(index);
        }

        self.children.insert(parent_index, indices);
        self.materialized.insert(parent_index, ());
    }

    /// Children of `parent`, if its full child list has been materialized
    pub fn cached_children(&self, parent: &ExplorerNode) -> Option<Vec<ExplorerNode>> {
        let index = *self.by_identity.get(parent.identity())?;
        self.materialized.get(index)?;
        let list = self.children.get(index)?;
        Some(
            list.iter()
                .filter_map(|child| self.nodes.get(*child).cloned())
                .collect(),
        )
    }

    /// Cached node whose resource URI is `uri`. Never triggers a query.
    pub fn get_data_node(&self, uri: &str) -> Option<ExplorerNode> {
        let index = self.by_uri.get(uri)?;
        self.nodes.get(*index).cloned()
    }

    /// Cached node with the given identity
    pub fn get(&self, identity: &NodePath) -> Option<ExplorerNode> {
        let index = self.by_identity.get(identity)?;
        self.nodes.get(*index).cloned()
    }

    /// Evict every descendant of `node`, or the whole cache when `node` is `None`.
    ///
    /// The node itself stays cached; only its child list is dropped.
    pub fn remove_node_children(&mut self, node: Option<&ExplorerNode>) {
        self.invalidations += 1;
        let Some(node) = node else {
            *self = Self {
                invalidations: self.invalidations,
                ..Self::default()
            };
            return;
        };

        match self.by_identity.get(node.identity()).copied() {
            Some(index) => self.remove_descendants(index),
            None => self.remove_by_prefix(node.identity()),
        }
    }

    fn upsert(&mut self, node: &ExplorerNode) -> NodeIndex {
        let Some(index) = self.by_identity.get(node.identity()).copied() else {
            return self.insert_new(node);
        };

        if let Some(slot) = self.nodes.get_mut(index) {
            let previous = std::mem::replace(slot, node.clone());
            self.unindex_uri(&previous, index);
        }
        self.index_uri(node, index);
        index
    }

    /// Index of `node`, inserting it (and its ancestors) without overwriting
    fn ensure(&mut self, node: &ExplorerNode) -> NodeIndex {
        match self.by_identity.get(node.identity()) {
            Some(index) => *index,
            None => self.insert_new(node),
        }
    }

    fn insert_new(&mut self, node: &ExplorerNode) -> NodeIndex {
        let parent_index = node.parent().map(|parent| self.ensure(parent));

        let index = self.nodes.insert(node.clone());
        self.by_identity.insert(node.identity().clone(), index);
        self.index_uri(node, index);

        if let Some(parent_index) = parent_index {
            match self.children.get_mut(parent_index) {
                Some(list) => list.push(index),
                None => {
                    self.children.insert(parent_index, vec![index]);
                }
            }
        }
        index
    }

    fn remove_descendants(&mut self, index: NodeIndex) {
        self.materialized.remove(index);
        let mut stack = self.children.remove(index).unwrap_or_default();
        while let Some(child) = stack.pop() {
            if let Some(grandchildren) = self.children.remove(child) {
                stack.extend(grandchildren);
            }
            self.materialized.remove(child);
            self.detach(child);
        }
    }

    fn remove_by_prefix(&mut self, ancestor: &NodePath) {
        let doomed: Vec<NodeIndex> = self
            .nodes
            .iter()
            .filter(|(_, node)| ancestor.is_strict_ancestor_of(node.identity()))
            .map(|(index, _)| index)
            .collect();
        if doomed.is_empty() {
            return;
        }

        for index in &doomed {
            self.children.remove(*index);
            self.materialized.remove(*index);
            self.detach(*index);
        }
        for (_, list) in self.children.iter_mut() {
            list.retain(|index| !doomed.contains(index));
        }
    }

    fn detach(&mut self, index: NodeIndex) {
        if let Some(node) = self.nodes.remove(index) {
            self.by_identity.remove(node.identity());
            self.unindex_uri(&node, index);
        }
    }

    fn index_uri(&mut self, node: &ExplorerNode, index: NodeIndex) {
        if node.variant() == NodeVariant::Workspace {
            return;
        }
        if let Some(uri) = node.uri() {
            self.by_uri.insert(uri.to_string(), index);
        }
    }

    fn unindex_uri(&mut self, node: &ExplorerNode, index: NodeIndex) {
        if let Some(uri) = node.uri() {
            if self.by_uri.get(uri) == Some(&index) {
                self.by_uri.remove(uri);
            }
        }
    }
}

impl std::fmt::Debug for NodeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeCache")
            .field("nodes", &self.nodes.len())
            .field("uris", &self.by_uri.len())
            .field("materialized", &self.materialized.len())
            .finish()
    }
}
