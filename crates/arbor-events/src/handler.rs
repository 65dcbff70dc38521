// ABOUTME: Event handler trait for consuming service events
// ABOUTME: Implemented by components that react to language service lifecycle changes

use async_trait::async_trait;
use std::fmt::Debug;

/// Generic event handler trait for domain events
///
/// Handlers are shared between tasks, so they receive `&self` and keep any
/// mutable state behind their own synchronization.
#[async_trait]
pub trait EventHandler<E: Debug + Send + Sync + 'static>: Send + Sync {
    type Error: Debug + Send + Sync;

    /// Handle a domain event asynchronously
    async fn handle(&self, event: E) -> Result<(), Self::Error>;

    /// Handle multiple events in order, stopping at the first failure
    async fn handle_batch(&self, events: Vec<E>) -> Result<(), Self::Error> {
        for event in events {
            self.handle(event).await?;
        }
        Ok(())
    }
}
