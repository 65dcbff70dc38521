// ABOUTME: Explorer controller tying the data provider to the editor and the tree view
// ABOUTME: Serializes reveals and forwards language service events into refreshes

use async_trait::async_trait;
use std::sync::{Arc, Weak};
use tokio::sync::{Mutex as AsyncMutex, broadcast};
use tokio::task::JoinHandle;
use url::Url;

use arbor_events::{EventHandler, ServerMode, ServiceEvent};
use arbor_logging::{debug, info, instrument, trace, warn};
use arbor_types::ExplorerSettings;

use crate::error::{ExplorerError, Result};
use crate::host::{EditorHost, RevealOptions, TreeViewShell};
use crate::node::{ExplorerNode, NodeVariant};
use crate::provider::DependencyDataProvider;
use crate::service::QueryService;

pub const NO_JAVA_PROJECTS: &str = "There are no Java projects in current workspace.";

/// Explicitly constructed explorer controller; share it behind an `Arc`
pub struct DependencyExplorer {
    service: Arc<dyn QueryService>,
    host: Arc<dyn EditorHost>,
    view: Arc<dyn TreeViewShell>,
    provider: Arc<DependencyDataProvider>,
    /// Serializes reveals end to end
    reveal_lock: AsyncMutex<()>,
}

impl DependencyExplorer {
    pub fn new(
        service: Arc<dyn QueryService>,
        host: Arc<dyn EditorHost>,
        view: Arc<dyn TreeViewShell>,
    ) -> Self {
        let provider = Arc::new(DependencyDataProvider::new(service.clone(), host.clone()));
        Self {
            service,
            host,
            view,
            provider,
            reveal_lock: AsyncMutex::new(()),
        }
    }

    pub fn provider(&self) -> &Arc<DependencyDataProvider> {
        &self.provider
    }

    /// Locate the node for `uri` and ask the view to select, focus and expand it.
    ///
    /// Returns the revealed node. A uri with no matching node is not an error.
    #[instrument(skip(self), level = "debug")]
    pub async fn reveal(&self, uri: &str, check_setting: bool) -> Result<Option<ExplorerNode>> {
        let _guard = self.reveal_lock.lock().await;

        if check_setting && !self.host.settings().sync_with_active_file {
            trace!("Sync with active file disabled");
            return Ok(None);
        }
        if !self.provider.gate().ready().await {
            trace!("Language service not ready, skipping reveal");
            return Ok(None);
        }
        if !self.is_revealable(uri) {
            trace!("Resource is not revealable");
            return Ok(None);
        }

        let node = match self.provider.cached_node(uri) {
            Some(node) => Some(node),
            None => {
                let paths = self.service.resolve_path(uri).await?;
                if paths.is_empty() {
                    None
                } else {
                    self.provider.reveal_paths(paths).await?
                }
            }
        };
        let Some(node) = node else {
            debug!("No node found for resource");
            return Ok(None);
        };

        if !self.view.is_visible() {
            self.view.show().await;
        }
        self.view.reveal(&node, RevealOptions::default()).await;
        debug!(node = %node.identity(), "Revealed node");
        Ok(Some(node))
    }

    /// Whether `uri` can be located in the tree at all
    pub fn is_revealable(&self, uri: &str) -> bool {
        let resource = match Url::parse(uri) {
            Ok(resource) => resource,
            Err(e) => {
                trace!(error = %ExplorerError::invalid_uri(uri, e), "Unparseable resource");
                return false;
            }
        };

        match resource.scheme() {
            "jdt" => true,
            "file" => self
                .host
                .workspace_folders()
                .iter()
                .filter_map(|folder| Url::parse(&folder.uri).ok())
                .any(|folder| is_inside(&folder, &resource)),
            _ => false,
        }
    }

    /// Active editor switched; follow it while the view is on screen
    pub async fn on_active_editor_changed(&self, uri: Option<&str>) -> Result<Option<ExplorerNode>> {
        match uri {
            Some(uri) if self.view.is_visible() => self.reveal(uri, true).await,
            _ => Ok(None),
        }
    }

    pub async fn on_visibility_changed(&self, visible: bool) -> Result<Option<ExplorerNode>> {
        if !visible {
            return Ok(None);
        }
        self.reveal_active_document(true).await
    }

    /// Tree data changed; re-sync the selection with the active editor
    pub async fn on_tree_data_changed(&self) -> Result<Option<ExplorerNode>> {
        if !self.view.is_visible() {
            return Ok(None);
        }
        self.reveal_active_document(true).await
    }

    /// Explicit "reveal in explorer" command, ignoring the sync setting
    pub async fn reveal_active_file_command(&self) -> Result<Option<ExplorerNode>> {
        self.reveal_active_document(false).await
    }

    async fn reveal_active_document(&self, check_setting: bool) -> Result<Option<ExplorerNode>> {
        match self.host.active_document_uri() {
            Some(uri) => self.reveal(&uri, check_setting).await,
            None => Ok(None),
        }
    }

    /// Follow the tree-data-changed stream until the explorer is dropped
    pub fn spawn_change_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let mut changes = self.provider.subscribe();
        let explorer: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "Change listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
                let Some(explorer) = explorer.upgrade() else {
                    break;
                };
                if let Err(e) = explorer.on_tree_data_changed().await {
                    warn!(error = %e, "Reveal after tree change failed");
                }
            }
            trace!("Change listener stopped");
        })
    }

    /// React to a settings change
    pub fn apply_settings(&self, previous: &ExplorerSettings, current: &ExplorerSettings) {
        if previous.refresh_delay_ms != current.refresh_delay_ms {
            if let Err(reason) = current.validate() {
                warn!(reason = %reason, "Clamping refresh delay");
            }
            self.provider
                .set_refresh_delay(current.sanitized().refresh_delay());
        }
        if previous.show_non_java_resources != current.show_non_java_resources {
            self.provider.refresh(false, None);
        }
    }

    /// First project of the workspace, telling the user when there is none
    pub async fn first_root_project(&self) -> Result<Option<ExplorerNode>> {
        let project = self.provider.get_root_projects().await?.into_iter().next();
        if project.is_none() {
            self.host.show_information(NO_JAVA_PROJECTS);
        }
        Ok(project)
    }

    /// Cached project node for a classpath update, tolerating a trailing slash
    fn cached_project(&self, uri: &str) -> Option<ExplorerNode> {
        let trimmed = uri.trim_end_matches('/');
        [uri.to_string(), trimmed.to_string(), format!("{trimmed}/")]
            .iter()
            .filter_map(|candidate| self.provider.cached_node(candidate))
            .find(|node| node.variant() == NodeVariant::Project)
    }
}

fn is_inside(folder: &Url, resource: &Url) -> bool {
    if folder.scheme() != resource.scheme() || folder.host() != resource.host() {
        return false;
    }
    let base = folder.path().trim_end_matches('/');
    let path = resource.path();
    path == base || path.strip_prefix(base).is_some_and(|rest| rest.starts_with('/'))
}

#[async_trait]
impl EventHandler<ServiceEvent> for DependencyExplorer {
    type Error = ExplorerError;

    async fn handle(&self, event: ServiceEvent) -> Result<()> {
        debug!(event = event.name(), "Service event");
        match event {
            ServiceEvent::ClasspathUpdated { project_uri } => {
                let target = project_uri
                    .as_deref()
                    .and_then(|uri| self.cached_project(uri));
                self.provider.refresh(true, target);
            }
            ServiceEvent::ProjectsImported { .. } | ServiceEvent::ProjectsDeleted { .. } => {
                self.provider.refresh(true, None);
            }
            ServiceEvent::ServerModeChanged { mode } => {
                let previous = self.provider.gate().observe_mode(Some(mode));
                if previous == Some(ServerMode::LightWeight) && mode == ServerMode::Hybrid {
                    info!("Language service left lightweight mode");
                    self.provider.refresh(false, None);
                }
            }
            ServiceEvent::ServiceLoaded => self.provider.refresh(false, None),
        }
        Ok(())
    }
}
