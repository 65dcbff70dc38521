// ABOUTME: Live explorer nodes wrapping service descriptors
// ABOUTME: Identity is a path of value segments so it survives refreshes that rebuild node objects

use arbor_types::{NodeDescriptor, NodeKind};
use std::fmt;
use std::sync::Arc;

/// One step of a node identity: the kind plus the value-equal parts of a descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeSegment {
    pub kind: NodeKind,
    pub name: String,
    pub path: Option<String>,
}

impl NodeSegment {
    fn of(descriptor: &NodeDescriptor) -> Self {
        Self {
            kind: descriptor.kind,
            name: descriptor.name.clone(),
            path: descriptor.path.clone(),
        }
    }
}

impl fmt::Display for NodeSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}:{}@{}", self.kind, self.name, path),
            None => write!(f, "{}:{}", self.kind, self.name),
        }
    }
}

/// Stable identity of a node: the segments from the root down to the node itself
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodePath(Arc<[NodeSegment]>);

impl NodePath {
    fn root(descriptor: &NodeDescriptor) -> Self {
        Self(Arc::from(vec![NodeSegment::of(descriptor)]))
    }

    fn child(&self, descriptor: &NodeDescriptor) -> Self {
        let mut segments = self.0.to_vec();
        segments.push(NodeSegment::of(descriptor));
        Self(segments.into())
    }

    pub fn segments(&self) -> &[NodeSegment] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Prefix comparison on segments; needs no live parent links
    pub fn is_itself_or_ancestor_of(&self, other: &NodePath) -> bool {
        other.0.starts_with(&self.0)
    }

    pub fn is_strict_ancestor_of(&self, other: &NodePath) -> bool {
        other.depth() > self.depth() && self.is_itself_or_ancestor_of(other)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, segment) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str("/")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// Broad node families the tree distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeVariant {
    /// Top of a multi-root workspace
    Workspace,
    Project,
    /// Source roots, packages, libraries, folders
    Container,
    /// Files and types, never expanded
    Leaf,
}

impl From<NodeKind> for NodeVariant {
    fn from(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Workspace => NodeVariant::Workspace,
            NodeKind::Project => NodeVariant::Project,
            kind if kind.is_leaf() => NodeVariant::Leaf,
            _ => NodeVariant::Container,
        }
    }
}

/// A node of the explorer tree.
///
/// Cloning is cheap; clones share the same descriptor and parent chain.
/// Equality is identity equality, so a node rebuilt after a refresh compares
/// equal to the object it replaced.
#[derive(Clone)]
pub struct ExplorerNode {
    inner: Arc<NodeInner>,
}

struct NodeInner {
    descriptor: NodeDescriptor,
    identity: NodePath,
    parent: Option<ExplorerNode>,
    project_uri: Option<String>,
}

impl ExplorerNode {
    /// Create a node with no parent (a root of the tree)
    pub fn root(descriptor: NodeDescriptor) -> Self {
        let identity = NodePath::root(&descriptor);
        let project_uri = own_project_uri(&descriptor);
        Self {
            inner: Arc::new(NodeInner {
                descriptor,
                identity,
                parent: None,
                project_uri,
            }),
        }
    }

    /// Create a node below `parent`
    pub fn child_of(parent: &ExplorerNode, descriptor: NodeDescriptor) -> Self {
        let identity = parent.inner.identity.child(&descriptor);
        let project_uri =
            own_project_uri(&descriptor).or_else(|| parent.inner.project_uri.clone());
        Self {
            inner: Arc::new(NodeInner {
                descriptor,
                identity,
                parent: Some(parent.clone()),
                project_uri,
            }),
        }
    }

    pub fn descriptor(&self) -> &NodeDescriptor {
        &self.inner.descriptor
    }

    pub fn kind(&self) -> NodeKind {
        self.inner.descriptor.kind
    }

    pub fn variant(&self) -> NodeVariant {
        self.kind().into()
    }

    pub fn name(&self) -> &str {
        &self.inner.descriptor.name
    }

    pub fn path(&self) -> Option<&str> {
        self.inner.descriptor.path.as_deref()
    }

    pub fn uri(&self) -> Option<&str> {
        self.inner.descriptor.uri.as_deref()
    }

    pub fn identity(&self) -> &NodePath {
        &self.inner.identity
    }

    pub fn parent(&self) -> Option<&ExplorerNode> {
        self.inner.parent.as_ref()
    }

    /// URI of the project that owns this node, used to scope child queries
    pub fn project_uri(&self) -> Option<&str> {
        self.inner.project_uri.as_deref()
    }

    pub fn is_itself_or_ancestor_of(&self, other: &ExplorerNode) -> bool {
        self.inner.identity.is_itself_or_ancestor_of(&other.inner.identity)
    }

    /// Render data handed to the tree-view shell
    pub fn tree_item(&self) -> TreeItem {
        let collapsible = match self.variant() {
            NodeVariant::Workspace => Collapsible::Expanded,
            NodeVariant::Leaf => Collapsible::None,
            NodeVariant::Project | NodeVariant::Container => Collapsible::Collapsed,
        };
        TreeItem {
            id: self.inner.identity.to_string(),
            label: self.name().to_string(),
            resource_uri: self.uri().map(str::to_string),
            tooltip: self.path().map(str::to_string),
            collapsible,
            context_value: format!("java:{}", self.kind()),
        }
    }
}

fn own_project_uri(descriptor: &NodeDescriptor) -> Option<String> {
    match descriptor.kind {
        NodeKind::Project => descriptor.uri.clone(),
        _ => None,
    }
}

impl PartialEq for ExplorerNode {
    fn eq(&self, other: &Self) -> bool {
        self.inner.identity == other.inner.identity
    }
}

impl Eq for ExplorerNode {}

impl fmt::Debug for ExplorerNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExplorerNode")
            .field("identity", &self.inner.identity.to_string())
            .field("uri", &self.uri())
            .finish()
    }
}

/// Collapsible state of a rendered tree item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collapsible {
    None,
    Collapsed,
    Expanded,
}

/// What the tree-view shell needs to render one node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeItem {
    /// Stable id, equal across refreshes for the same logical node
    pub id: String,
    pub label: String,
    pub resource_uri: Option<String>,
    pub tooltip: Option<String>,
    pub collapsible: Collapsible,
    pub context_value: String,
}
