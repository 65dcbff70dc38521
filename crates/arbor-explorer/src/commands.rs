// ABOUTME: Project commands forwarded to the language service through the editor
// ABOUTME: Reload and rebuild projects, reload build files, build and clean the workspace

use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use url::Url;

use arbor_logging::{debug, info, warn};
use arbor_types::NodeDescriptor;

use crate::error::{ExplorerError, Result};
use crate::host::EditorHost;

pub const UPDATE_PROJECT_CONFIGURATION: &str = "java.projectConfiguration.update";
pub const BUILD_PROJECT: &str = "java.project.build";
pub const COMPILE_WORKSPACE: &str = "java.workspace.compile";
pub const CLEAN_WORKSPACE: &str = "java.clean.workspace";

/// File names whose change requires reloading the project configuration
pub const BUILD_FILES: &[&str] = &[
    "pom.xml",
    "build.gradle",
    "build.gradle.kts",
    "settings.gradle",
    "settings.gradle.kts",
];

pub const MISSING_URI_RELOAD: &str = "The URI of the project is not available, you can try to trigger the command 'Java: Reload Project' from Command Palette.";
pub const MISSING_URI_REBUILD: &str = "The URI of the project is not available, you can try to trigger the command 'Java: Rebuild Projects' from Command Palette.";

pub struct ProjectCommands {
    host: Arc<dyn EditorHost>,
}

impl ProjectCommands {
    pub fn new(host: Arc<dyn EditorHost>) -> Self {
        Self { host }
    }

    /// Reload the configuration of `project` from its build file.
    ///
    /// Returns the build file used, or `None` when the project has none.
    pub async fn update_project(&self, project: &NodeDescriptor) -> Result<Option<PathBuf>> {
        let uri = self.require_uri(project, MISSING_URI_RELOAD)?;

        let dir = match Url::parse(uri) {
            Ok(url) => match url.to_file_path() {
                Ok(dir) => dir,
                Err(()) => {
                    debug!(uri = %uri, "Project is not on the file system");
                    return Ok(None);
                }
            },
            Err(e) => return Err(ExplorerError::invalid_uri(uri, e)),
        };

        let Some(build_file) = find_build_file(&dir).await? else {
            debug!(project = %project.name, "No build file in project directory");
            return Ok(None);
        };

        let build_uri = Url::from_file_path(&build_file)
            .map(String::from)
            .unwrap_or_else(|()| build_file.display().to_string());
        info!(build_file = %build_file.display(), "Updating project configuration");
        self.host
            .execute_command(UPDATE_PROJECT_CONFIGURATION, vec![json!(build_uri)])
            .await?;
        Ok(Some(build_file))
    }

    /// Rebuild `project` from scratch
    pub async fn rebuild_project(&self, project: &NodeDescriptor) -> Result<()> {
        let uri = self.require_uri(project, MISSING_URI_REBUILD)?;
        info!(project = %project.name, "Rebuilding project");
        self.host
            .execute_command(BUILD_PROJECT, vec![json!(uri), json!(true)])
            .await
    }

    /// Reload the project configuration when the active file is a build file.
    ///
    /// Returns whether a reload was requested.
    pub async fn reload_active_file(&self, uri: Option<&str>) -> Result<bool> {
        let Some(uri) = uri else {
            return Ok(false);
        };
        let url = Url::parse(uri).map_err(|e| ExplorerError::invalid_uri(uri, e))?;
        let is_build_file = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .is_some_and(|name| BUILD_FILES.contains(&name));
        if !is_build_file {
            return Ok(false);
        }

        self.host
            .execute_command(UPDATE_PROJECT_CONFIGURATION, vec![json!(uri)])
            .await?;
        Ok(true)
    }

    /// Full compile of every project in the workspace
    pub async fn build_workspace(&self) -> Result<()> {
        self.host
            .execute_command(COMPILE_WORKSPACE, vec![json!(true)])
            .await
    }

    pub async fn clean_workspace(&self) -> Result<()> {
        self.host.execute_command(CLEAN_WORKSPACE, Vec::new()).await
    }

    fn require_uri<'a>(&self, project: &'a NodeDescriptor, message: &str) -> Result<&'a str> {
        match project.uri.as_deref() {
            Some(uri) => Ok(uri),
            None => {
                warn!(project = %project.name, "Project has no URI");
                self.host.show_warning(message);
                Err(ExplorerError::missing_uri(&project.name))
            }
        }
    }
}

/// First `pom.xml` or `*.gradle` file directly inside `dir`, by name
async fn find_build_file(dir: &Path) -> Result<Option<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut candidates = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if (name == "pom.xml" || name.ends_with(".gradle")) && entry.file_type().await?.is_file() {
            candidates.push(entry.path());
        }
    }
    candidates.sort();
    Ok(candidates.into_iter().next())
}
