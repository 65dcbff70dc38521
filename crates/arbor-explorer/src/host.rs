// ABOUTME: Editor and tree-view collaborators the explorer talks back to
// ABOUTME: Settings, workspace folders, messages, commands and view control

use async_trait::async_trait;

use arbor_types::{ExplorerSettings, WorkspaceFolder};

use crate::error::Result;
use crate::node::ExplorerNode;

/// Editor integration surface
#[async_trait]
pub trait EditorHost: Send + Sync {
    /// Workspace folders, read on demand
    fn workspace_folders(&self) -> Vec<WorkspaceFolder>;

    /// Current explorer settings, read on demand
    fn settings(&self) -> ExplorerSettings;

    /// URI of the document in the active editor
    fn active_document_uri(&self) -> Option<String>;

    fn show_warning(&self, message: &str);

    fn show_information(&self, message: &str);

    /// Run an editor command with JSON arguments
    async fn execute_command(&self, command: &str, arguments: Vec<serde_json::Value>) -> Result<()>;
}

/// How the view should present a revealed node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealOptions {
    pub select: bool,
    pub focus: bool,
    pub expand: bool,
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            select: true,
            focus: true,
            expand: true,
        }
    }
}

/// Tree-view widget rendering the explorer
#[async_trait]
pub trait TreeViewShell: Send + Sync {
    fn is_visible(&self) -> bool;

    /// Bring the view on screen
    async fn show(&self);

    async fn reveal(&self, node: &ExplorerNode, options: RevealOptions);
}
