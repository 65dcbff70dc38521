// ABOUTME: Query service answering from an in-memory snapshot of the project model
// ABOUTME: Counts calls per method and can inject failures and latency

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio::sync::watch;

use arbor_events::ServerMode;
use arbor_types::{NodeDescriptor, NodeKind};

use crate::error::ServiceError;
use crate::service::{ChildQuery, QueryService};

pub const CHECK_IMPORT_STATUS: &str = "checkImportStatus";
pub const GET_PROJECTS: &str = "getProjects";
pub const GET_CHILDREN: &str = "getChildren";
pub const RESOLVE_PATH: &str = "resolvePath";
pub const WAIT_UNTIL_READY: &str = "waitUntilReady";

/// Frozen view of a project model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default = "default_server_mode")]
    pub server_mode: Option<ServerMode>,

    /// Project import ended in an error state
    #[serde(default)]
    pub import_error: bool,

    /// Workspace folder URI to its projects
    #[serde(default)]
    pub projects: HashMap<String, Vec<NodeDescriptor>>,

    /// [`Snapshot::child_key`] of a parent to its children
    #[serde(default)]
    pub children: HashMap<String, Vec<NodeDescriptor>>,

    /// Resource URI to its root-to-leaf ancestry
    #[serde(default)]
    pub paths: HashMap<String, Vec<NodeDescriptor>>,
}

fn default_server_mode() -> Option<ServerMode> {
    Some(ServerMode::Standard)
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            server_mode: default_server_mode(),
            import_error: false,
            projects: HashMap::new(),
            children: HashMap::new(),
            paths: HashMap::new(),
        }
    }
}

impl Snapshot {
    /// Key under which the children of `descriptor` are stored
    pub fn child_key(descriptor: &NodeDescriptor) -> String {
        match &descriptor.path {
            Some(path) => format!("{}:{}@{}", descriptor.kind, descriptor.name, path),
            None => format!("{}:{}", descriptor.kind, descriptor.name),
        }
    }

    pub fn with_projects(mut self, workspace_uri: &str, projects: Vec<NodeDescriptor>) -> Self {
        self.projects.insert(workspace_uri.to_string(), projects);
        self
    }

    pub fn with_children(mut self, parent: &NodeDescriptor, children: Vec<NodeDescriptor>) -> Self {
        self.children.insert(Self::child_key(parent), children);
        self
    }

    pub fn with_path(mut self, uri: &str, ancestry: Vec<NodeDescriptor>) -> Self {
        self.paths.insert(uri.to_string(), ancestry);
        self
    }
}

/// [`QueryService`] backed by a [`Snapshot`]
pub struct SnapshotService {
    snapshot: RwLock<Snapshot>,
    calls: Mutex<HashMap<&'static str, usize>>,
    failures: Mutex<HashSet<&'static str>>,
    latency: Mutex<Option<Duration>>,
    ready: watch::Sender<bool>,
}

impl SnapshotService {
    pub fn new(snapshot: Snapshot) -> Self {
        let (ready, _) = watch::channel(true);
        Self {
            snapshot: RwLock::new(snapshot),
            calls: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashSet::new()),
            latency: Mutex::new(None),
            ready,
        }
    }

    /// Load a snapshot from its JSON form
    pub fn from_json(json: &str) -> Result<Self, ServiceError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// Replace the model, as if the service re-imported the workspace
    pub fn update(&self, update: impl FnOnce(&mut Snapshot)) {
        update(&mut *self.snapshot.write());
    }

    /// Number of times `method` was called
    pub fn calls(&self, method: &str) -> usize {
        self.calls.lock().get(method).copied().unwrap_or(0)
    }

    /// Make every later call to `method` fail
    pub fn fail(&self, method: &'static str) {
        self.failures.lock().insert(method);
    }

    pub fn recover(&self, method: &str) {
        self.failures.lock().remove(method);
    }

    /// Delay every answer by `latency`. Answers reflect the model as it was
    /// when the request arrived.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock() = latency;
    }

    /// Hold or release `wait_until_ready`
    pub fn set_ready(&self, ready: bool) {
        self.ready.send_replace(ready);
    }

    /// Record the call, read the answer from the current model, then deliver it
    async fn respond<T>(
        &self,
        method: &'static str,
        answer: impl FnOnce(&Snapshot) -> T,
    ) -> Result<T, ServiceError> {
        *self.calls.lock().entry(method).or_insert(0) += 1;
        let failed = self.failures.lock().contains(method);
        let answer = answer(&self.snapshot.read());

        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        if failed {
            return Err(ServiceError::request(method, "injected failure"));
        }
        Ok(answer)
    }
}

impl Default for SnapshotService {
    fn default() -> Self {
        Self::new(Snapshot::default())
    }
}

fn is_java_resource(descriptor: &NodeDescriptor) -> bool {
    !matches!(descriptor.kind, NodeKind::Folder | NodeKind::File)
}

#[async_trait]
impl QueryService for SnapshotService {
    fn server_mode(&self) -> Option<ServerMode> {
        self.snapshot.read().server_mode
    }

    async fn wait_until_ready(&self) -> Result<(), ServiceError> {
        self.respond(WAIT_UNTIL_READY, |_| ()).await?;
        let mut ready = self.ready.subscribe();
        ready
            .wait_for(|ready| *ready)
            .await
            .map_err(|_| ServiceError::Unavailable)?;
        Ok(())
    }

    async fn check_import_status(&self) -> Result<bool, ServiceError> {
        self.respond(CHECK_IMPORT_STATUS, |snapshot| snapshot.import_error)
            .await
    }

    async fn get_projects(&self, workspace_uri: &str) -> Result<Vec<NodeDescriptor>, ServiceError> {
        self.respond(GET_PROJECTS, |snapshot| {
            snapshot
                .projects
                .get(workspace_uri)
                .cloned()
                .unwrap_or_default()
        })
        .await
    }

    async fn get_children(&self, query: ChildQuery) -> Result<Vec<NodeDescriptor>, ServiceError> {
        self.respond(GET_CHILDREN, |snapshot| {
            snapshot
                .children
                .get(&Snapshot::child_key(&query.parent))
                .map(|children| {
                    children
                        .iter()
                        .filter(|child| query.show_non_java_resources || is_java_resource(child))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        })
        .await
    }

    async fn resolve_path(&self, uri: &str) -> Result<Vec<NodeDescriptor>, ServiceError> {
        self.respond(RESOLVE_PATH, |snapshot| {
            snapshot.paths.get(uri).cloned().unwrap_or_default()
        })
        .await
    }
}
