// ABOUTME: Query interface to the external language service
// ABOUTME: The explorer only ever asks for projects, children and ancestry chains through it

use async_trait::async_trait;

use arbor_events::ServerMode;
use arbor_types::NodeDescriptor;

use crate::error::ServiceError;

/// Children-of-node query scoped by the parent's descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildQuery {
    pub parent: NodeDescriptor,
    /// URI of the project owning `parent`
    pub project_uri: Option<String>,
    pub show_non_java_resources: bool,
}

/// Opaque, slow-to-query language service
#[async_trait]
pub trait QueryService: Send + Sync {
    /// Current operating mode, `None` if the service is not running
    fn server_mode(&self) -> Option<ServerMode>;

    /// Resolves once the service has finished starting
    async fn wait_until_ready(&self) -> Result<(), ServiceError>;

    /// `true` when project import ended in an error state
    async fn check_import_status(&self) -> Result<bool, ServiceError>;

    /// Projects of one workspace folder
    async fn get_projects(&self, workspace_uri: &str) -> Result<Vec<NodeDescriptor>, ServiceError>;

    /// Immediate children of a node
    async fn get_children(&self, query: ChildQuery) -> Result<Vec<NodeDescriptor>, ServiceError>;

    /// Root-to-leaf ancestry of `uri`; empty when the service does not know it
    async fn resolve_path(&self, uri: &str) -> Result<Vec<NodeDescriptor>, ServiceError>;
}
