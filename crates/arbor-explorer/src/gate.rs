// ABOUTME: Readiness gate in front of the query service
// ABOUTME: Latches once the service runs with a project model and has finished starting

use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use arbor_events::ServerMode;
use arbor_logging::{debug, warn};

use crate::service::QueryService;

pub struct ServerGate {
    service: Arc<dyn QueryService>,
    ready: AtomicBool,
    last_mode: Mutex<Option<ServerMode>>,
}

impl ServerGate {
    pub fn new(service: Arc<dyn QueryService>) -> Self {
        let last_mode = service.server_mode();
        Self {
            service,
            ready: AtomicBool::new(false),
            last_mode: Mutex::new(last_mode),
        }
    }

    /// Whether the project model can be queried.
    ///
    /// Returns `false` without waiting while the service is absent or in
    /// lightweight mode; otherwise waits for the service to finish starting.
    pub async fn ready(&self) -> bool {
        if self.is_ready() {
            return true;
        }

        let mode = self.service.server_mode();
        if !mode.is_some_and(|mode| mode.has_project_model()) {
            return false;
        }

        match self.service.wait_until_ready().await {
            Ok(()) => {
                if !self.ready.swap(true, Ordering::AcqRel) {
                    debug!(mode = ?mode, "Language service ready");
                }
                true
            }
            Err(e) => {
                warn!(error = %e, "Language service failed to start");
                false
            }
        }
    }

    /// [`ServerGate::ready`], giving up after `timeout`
    pub async fn ready_within(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.ready())
            .await
            .unwrap_or(false)
    }

    /// Latched readiness, without waiting
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Mode seen at construction or through the last [`ServerGate::observe_mode`]
    pub fn last_mode(&self) -> Option<ServerMode> {
        *self.last_mode.lock()
    }

    /// Record the latest server mode, returning the previous one
    pub fn observe_mode(&self, mode: Option<ServerMode>) -> Option<ServerMode> {
        std::mem::replace(&mut *self.last_mode.lock(), mode)
    }
}
