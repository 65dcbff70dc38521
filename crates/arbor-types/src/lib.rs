// ABOUTME: Pure data types with no cross-crate dependencies
// ABOUTME: Foundation layer for all other arbor crates

pub mod node;
pub mod settings;

// Re-export commonly used types
pub use node::{NodeDescriptor, NodeKind, WorkspaceFolder};
pub use settings::ExplorerSettings;
