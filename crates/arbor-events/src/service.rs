// ABOUTME: Language service lifecycle events forwarded into the explorer
// ABOUTME: Immutable facts about classpath, import and server mode changes

use serde::{Deserialize, Serialize};

/// Operating mode reported by the language service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ServerMode {
    /// Syntax-only mode, no project model available
    LightWeight,
    /// Transitioning from lightweight to standard
    Hybrid,
    /// Full project model available
    Standard,
}

impl ServerMode {
    /// Whether the project model can be queried in this mode
    pub fn has_project_model(&self) -> bool {
        !matches!(self, ServerMode::LightWeight)
    }
}

/// Service events - each one is a fact about something that already happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceEvent {
    /// The classpath of a project was recomputed
    ClasspathUpdated { project_uri: Option<String> },

    /// Projects finished importing
    ProjectsImported { uris: Vec<String> },

    /// Projects were removed from the workspace
    ProjectsDeleted { uris: Vec<String> },

    /// The server switched operating mode
    ServerModeChanged { mode: ServerMode },

    /// The language service became available after the explorer started
    ServiceLoaded,
}

impl ServiceEvent {
    /// Short name used in log fields
    pub fn name(&self) -> &'static str {
        match self {
            ServiceEvent::ClasspathUpdated { .. } => "classpath_updated",
            ServiceEvent::ProjectsImported { .. } => "projects_imported",
            ServiceEvent::ProjectsDeleted { .. } => "projects_deleted",
            ServiceEvent::ServerModeChanged { .. } => "server_mode_changed",
            ServiceEvent::ServiceLoaded => "service_loaded",
        }
    }
}
