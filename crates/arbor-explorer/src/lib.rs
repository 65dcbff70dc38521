// ABOUTME: Project explorer tree synchronization engine
// ABOUTME: Node cache, refresh coordination, lazy node model and reveal over a slow language service

pub mod cache;
pub mod commands;
pub mod debounce;
pub mod error;
pub mod explorer;
pub mod gate;
pub mod host;
pub mod node;
pub mod provider;
pub mod refresh;
pub mod service;
pub mod snapshot;
pub mod tree;

mod test_utils;

#[cfg(test)]
mod tests;

pub use cache::NodeCache;
pub use commands::ProjectCommands;
pub use error::{ExplorerError, Result, ServiceError};
pub use explorer::DependencyExplorer;
pub use gate::ServerGate;
pub use host::{EditorHost, RevealOptions, TreeViewShell};
pub use node::{Collapsible, ExplorerNode, NodePath, NodeVariant, TreeItem};
pub use provider::DependencyDataProvider;
pub use refresh::{PendingRefresh, RefreshCoordinator, RefreshSink};
pub use service::{ChildQuery, QueryService};
pub use snapshot::{Snapshot, SnapshotService};
pub use tree::{TreeChange, TreeState};
