// ABOUTME: Event definitions shared between the language service glue and the explorer
// ABOUTME: Provides service lifecycle events and the handler trait that consumes them

pub mod handler;
pub mod service;

pub use handler::EventHandler;
pub use service::{ServerMode, ServiceEvent};
