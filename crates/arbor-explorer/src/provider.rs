// ABOUTME: Pull-model data provider for the explorer tree view
// ABOUTME: Materializes children lazily from the query service and owns refresh coordination

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex as AsyncMutex, broadcast};

use arbor_logging::{debug, trace};
use arbor_types::{NodeDescriptor, NodeKind};

use crate::error::Result;
use crate::gate::ServerGate;
use crate::host::EditorHost;
use crate::node::{ExplorerNode, NodeVariant, TreeItem};
use crate::refresh::RefreshCoordinator;
use crate::service::{ChildQuery, QueryService};
use crate::tree::{TreeChange, TreeState};

/// Data provider behind the tree view.
///
/// Owns the node cache, the root set and the refresh coordinator. The view
/// pulls through [`get_children`](Self::get_children) and listens on
/// [`subscribe`](Self::subscribe).
pub struct DependencyDataProvider {
    service: Arc<dyn QueryService>,
    host: Arc<dyn EditorHost>,
    gate: Arc<ServerGate>,
    state: Arc<TreeState>,
    /// Serializes root-set computation
    root_lock: AsyncMutex<()>,
    coordinator: RefreshCoordinator,
}

impl DependencyDataProvider {
    pub fn new(service: Arc<dyn QueryService>, host: Arc<dyn EditorHost>) -> Self {
        let gate = Arc::new(ServerGate::new(service.clone()));
        Self::with_gate(service, host, gate)
    }

    pub fn with_gate(
        service: Arc<dyn QueryService>,
        host: Arc<dyn EditorHost>,
        gate: Arc<ServerGate>,
    ) -> Self {
        let state = Arc::new(TreeState::new());
        let delay = host.settings().sanitized().refresh_delay();
        let coordinator = RefreshCoordinator::new(state.clone(), delay);
        Self {
            service,
            host,
            gate,
            state,
            root_lock: AsyncMutex::new(()),
            coordinator,
        }
    }

    pub fn gate(&self) -> &Arc<ServerGate> {
        &self.gate
    }

    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    /// Tree-data-changed stream; `None` elements mean the whole tree
    pub fn subscribe(&self) -> broadcast::Receiver<TreeChange> {
        self.state.subscribe()
    }

    /// Request a refresh of `element`, or of the whole tree
    pub fn refresh(&self, debounce: bool, element: Option<ExplorerNode>) {
        self.coordinator.refresh(debounce, element);
    }

    pub fn set_refresh_delay(&self, delay: Duration) {
        self.coordinator.set_debounce_delay(delay);
    }

    pub fn get_tree_item(&self, node: &ExplorerNode) -> TreeItem {
        node.tree_item()
    }

    pub fn get_parent(&self, node: &ExplorerNode) -> Option<ExplorerNode> {
        node.parent().cloned()
    }

    /// Cached node for a resource URI. Never queries the service.
    pub fn cached_node(&self, uri: &str) -> Option<ExplorerNode> {
        self.state.cache.lock().get_data_node(uri)
    }

    /// Children of `parent`, or the root set when `parent` is `None`.
    ///
    /// Empty while the language service is not ready.
    pub async fn get_children(&self, parent: Option<&ExplorerNode>) -> Result<Vec<ExplorerNode>> {
        if !self.gate.ready().await {
            trace!("Language service not ready, no children");
            return Ok(Vec::new());
        }

        match parent {
            None => {
                let epoch = self.state.cache.lock().invalidation_epoch();
                let roots = self.get_root_nodes().await?;
                let mut cache = self.state.cache.lock();
                if cache.invalidation_epoch() == epoch {
                    cache.save_nodes(&roots);
                }
                Ok(roots)
            }
            Some(parent) => self.materialize_children(parent).await,
        }
    }

    /// Root set for the current generation, computed at most once at a time
    pub async fn get_root_nodes(&self) -> Result<Vec<ExplorerNode>> {
        let _guard = self.root_lock.lock().await;

        if let Some(roots) = self.state.cached_roots() {
            return Ok(roots);
        }
        let generation = self.state.generation();

        if self.service.check_import_status().await? {
            debug!("Project import is in an error state, no roots");
            return Ok(Vec::new());
        }

        let folders = self.host.workspace_folders();
        let roots: Vec<ExplorerNode> = match folders.as_slice() {
            [] => Vec::new(),
            [folder] => self
                .service
                .get_projects(&folder.uri)
                .await?
                .into_iter()
                .map(ExplorerNode::root)
                .collect(),
            folders => folders
                .iter()
                .map(|folder| ExplorerNode::root(folder.descriptor()))
                .collect(),
        };

        if !folders.is_empty() && !self.state.store_roots(generation, &roots) {
            debug!("Tree refreshed during root computation, not caching roots");
        }
        debug!(count = roots.len(), folders = folders.len(), "Computed root nodes");
        Ok(roots)
    }

    /// Projects at the top of the tree, looking through workspace roots
    pub async fn get_root_projects(&self) -> Result<Vec<ExplorerNode>> {
        let mut projects = Vec::new();
        for root in self.get_root_nodes().await? {
            match root.variant() {
                NodeVariant::Project => projects.push(root),
                NodeVariant::Workspace => projects.extend(
                    self.materialize_children(&root)
                        .await?
                        .into_iter()
                        .filter(|node| node.variant() == NodeVariant::Project),
                ),
                NodeVariant::Container | NodeVariant::Leaf => {}
            }
        }
        Ok(projects)
    }

    /// Walk a root-to-leaf ancestry down the tree, materializing as needed.
    ///
    /// Descriptors are matched by value (name and path), never by object.
    pub async fn reveal_paths(&self, paths: Vec<NodeDescriptor>) -> Result<Option<ExplorerNode>> {
        let mut paths = paths.into_iter();
        let Some(project) = paths.next() else {
            return Ok(None);
        };

        let roots = self.get_root_projects().await?;
        let Some(mut current) = roots
            .into_iter()
            .find(|node| node.descriptor().same_entity(&project))
        else {
            trace!(project = %project.name, "No root project matches ancestry");
            return Ok(None);
        };

        for descriptor in paths {
            let children = self.materialize_children(&current).await?;
            match children
                .into_iter()
                .find(|child| child.descriptor().same_entity(&descriptor))
            {
                Some(child) => current = child,
                None => {
                    trace!(parent = %current.identity(), name = %descriptor.name, "Ancestry walk stopped");
                    return Ok(None);
                }
            }
        }
        Ok(Some(current))
    }

    async fn materialize_children(&self, parent: &ExplorerNode) -> Result<Vec<ExplorerNode>> {
        if parent.variant() == NodeVariant::Leaf {
            return Ok(Vec::new());
        }

        let epoch = {
            let cache = self.state.cache.lock();
            if let Some(children) = cache.cached_children(parent) {
                return Ok(children);
            }
            cache.invalidation_epoch()
        };

        let descriptors = match (parent.kind(), parent.uri()) {
            (NodeKind::Workspace, Some(uri)) => self.service.get_projects(uri).await?,
            (NodeKind::Workspace, None) => Vec::new(),
            _ => {
                let query = ChildQuery {
                    parent: parent.descriptor().clone(),
                    project_uri: parent.project_uri().map(str::to_string),
                    show_non_java_resources: self.host.settings().show_non_java_resources,
                };
                self.service.get_children(query).await?
            }
        };

        let children: Vec<ExplorerNode> = descriptors
            .into_iter()
            .map(|descriptor| ExplorerNode::child_of(parent, descriptor))
            .collect();

        // A refresh that fired while the query was in flight wins over its answer
        let mut cache = self.state.cache.lock();
        if cache.invalidation_epoch() == epoch {
            cache.save_children(parent, &children);
            trace!(parent = %parent.identity(), count = children.len(), "Materialized children");
        } else {
            debug!(parent = %parent.identity(), "Tree refreshed during child query, not caching children");
        }
        Ok(children)
    }
}
