// ABOUTME: Scenario tests for the explorer over a snapshot of a small Maven workspace
// ABOUTME: Shared fixtures for provider, reveal and service event tests

pub mod event_tests;

use std::sync::Arc;

use arbor_types::{NodeDescriptor, NodeKind, WorkspaceFolder};

use crate::explorer::DependencyExplorer;
use crate::snapshot::{Snapshot, SnapshotService};
use crate::test_utils::test_support::{RecordingHost, RecordingView};

pub const WS: &str = "file:///ws/";
pub const APP_JAVA: &str = "file:///ws/app/src/main/java/com/example/App.java";
pub const MODEL_JAVA: &str = "file:///ws/app/src/main/java/com/example/model/Model.java";
pub const UTIL_JAVA: &str = "file:///ws/app/src/main/java/com/example/util/Util.java";
pub const LIB_JAVA: &str = "file:///ws/lib/src/main/java/org/lib/Lib.java";
pub const POM: &str = "file:///ws/app/pom.xml";

pub fn project(name: &str) -> NodeDescriptor {
    NodeDescriptor::new(NodeKind::Project, name)
        .with_path(format!("/ws/{name}"))
        .with_uri(format!("file:///ws/{name}/"))
}

pub fn source_root(project: &str) -> NodeDescriptor {
    NodeDescriptor::new(NodeKind::PackageRoot, "src/main/java")
        .with_path(format!("/ws/{project}/src/main/java"))
        .with_uri(format!("file:///ws/{project}/src/main/java/"))
}

pub fn package(name: &str) -> NodeDescriptor {
    NodeDescriptor::new(NodeKind::Package, name).with_path(name)
}

pub fn compilation_unit(uri: &str) -> NodeDescriptor {
    let name = uri.rsplit('/').next().unwrap_or(uri);
    let path = uri.trim_start_matches("file://");
    NodeDescriptor::new(NodeKind::CompilationUnit, name)
        .with_path(path)
        .with_uri(uri)
}

pub fn pom() -> NodeDescriptor {
    NodeDescriptor::new(NodeKind::File, "pom.xml").with_uri(POM)
}

/// Two projects in one workspace folder:
///
/// ```text
/// app
///   src/main/java
///     com.example        App.java
///     com.example.model  Model.java
///     com.example.util   Util.java
///   pom.xml
/// lib
///   src/main/java
///     org.lib            Lib.java
/// ```
pub fn model() -> Snapshot {
    let app_packages = [
        ("com.example", APP_JAVA),
        ("com.example.model", MODEL_JAVA),
        ("com.example.util", UTIL_JAVA),
    ];

    let mut snapshot = Snapshot::default()
        .with_projects(WS, vec![project("app"), project("lib")])
        .with_children(&project("app"), vec![source_root("app"), pom()])
        .with_children(
            &source_root("app"),
            app_packages.iter().map(|(name, _)| package(name)).collect(),
        )
        .with_children(&project("lib"), vec![source_root("lib")])
        .with_children(&source_root("lib"), vec![package("org.lib")])
        .with_children(&package("org.lib"), vec![compilation_unit(LIB_JAVA)])
        .with_path(
            LIB_JAVA,
            vec![
                project("lib"),
                source_root("lib"),
                package("org.lib"),
                compilation_unit(LIB_JAVA),
            ],
        );

    for (name, uri) in app_packages {
        snapshot = snapshot
            .with_children(&package(name), vec![compilation_unit(uri)])
            .with_path(
                uri,
                vec![
                    project("app"),
                    source_root("app"),
                    package(name),
                    compilation_unit(uri),
                ],
            );
    }
    snapshot
}

pub struct Harness {
    pub service: Arc<SnapshotService>,
    pub host: Arc<RecordingHost>,
    pub view: Arc<RecordingView>,
    pub explorer: Arc<DependencyExplorer>,
}

impl Harness {
    pub fn new(snapshot: Snapshot, folders: Vec<WorkspaceFolder>, view: RecordingView) -> Self {
        let service = Arc::new(SnapshotService::new(snapshot));
        let host = Arc::new(RecordingHost::with_folders(folders));
        let view = Arc::new(view);
        let explorer = Arc::new(DependencyExplorer::new(
            service.clone(),
            host.clone(),
            view.clone(),
        ));
        Self {
            service,
            host,
            view,
            explorer,
        }
    }

    /// Single-folder workspace over [`model`] with a visible view
    pub fn workspace() -> Self {
        Self::new(
            model(),
            vec![WorkspaceFolder::new("ws", WS)],
            RecordingView::new(true),
        )
    }
}
