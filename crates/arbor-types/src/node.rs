// ABOUTME: Node descriptor types returned by the language service
// ABOUTME: Lightweight values describing one tree entity before it is wrapped into a live node

use serde::{Deserialize, Serialize};

/// Kind of entity a descriptor stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Workspace,
    Project,
    Container,
    PackageRoot,
    Package,
    PrimaryType,
    CompilationUnit,
    ClassFile,
    Folder,
    File,
}

impl NodeKind {
    /// Stable lowercase name, used in identity paths and context values
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Workspace => "workspace",
            NodeKind::Project => "project",
            NodeKind::Container => "container",
            NodeKind::PackageRoot => "packageRoot",
            NodeKind::Package => "package",
            NodeKind::PrimaryType => "type",
            NodeKind::CompilationUnit => "compilationUnit",
            NodeKind::ClassFile => "classFile",
            NodeKind::Folder => "folder",
            NodeKind::File => "file",
        }
    }

    /// Leaves never have children and are never queried for them
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            NodeKind::PrimaryType | NodeKind::CompilationUnit | NodeKind::ClassFile | NodeKind::File
        )
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptor of a single tree entity as reported by the query service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeDescriptor {
    /// Display name
    pub name: String,

    /// Entity kind
    pub kind: NodeKind,

    /// Logical path inside the project model (package name, source root path, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Resource URI, when the entity is backed by a resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

impl NodeDescriptor {
    pub fn new(kind: NodeKind, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            path: None,
            uri: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Value equality used when matching an ancestry descriptor against a live node.
    ///
    /// Only name and path take part, matching how the language service reports
    /// the same entity across separate queries.
    pub fn same_entity(&self, other: &NodeDescriptor) -> bool {
        self.name == other.name && self.path == other.path
    }
}

/// A folder opened in the editor workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceFolder {
    pub name: String,
    pub uri: String,
}

impl WorkspaceFolder {
    pub fn new(name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uri: uri.into(),
        }
    }

    /// Descriptor for the workspace node representing this folder
    pub fn descriptor(&self) -> NodeDescriptor {
        NodeDescriptor::new(NodeKind::Workspace, self.name.clone()).with_uri(self.uri.clone())
    }
}
