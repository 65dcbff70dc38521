// ABOUTME: Tests for language service events driving refreshes and the change listener
// ABOUTME: Uses the paused clock where debounced refreshes must be observed firing

use std::time::Duration;
use tokio::sync::broadcast::error::TryRecvError;

use arbor_events::{EventHandler, ServerMode, ServiceEvent};
use arbor_types::WorkspaceFolder;

use super::*;
use crate::refresh::PendingRefresh;
use crate::tree::TreeChange;

/// Fire the initial whole-tree refresh so later requests can narrow
fn settle(h: &Harness) {
    h.explorer.provider().refresh(false, None);
}

#[tokio::test]
async fn test_classpath_update_targets_cached_project() {
    let h = Harness::workspace();
    settle(&h);
    let roots = h.explorer.provider().get_children(None).await.unwrap();

    h.explorer
        .handle(ServiceEvent::ClasspathUpdated {
            project_uri: Some("file:///ws/app".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(
        h.explorer.provider().coordinator().pending(),
        PendingRefresh::Node(roots[0].clone())
    );
    assert!(h.explorer.provider().coordinator().is_scheduled());
}

#[tokio::test]
async fn test_classpath_update_for_unknown_project_refreshes_whole_tree() {
    let h = Harness::workspace();
    settle(&h);

    h.explorer
        .handle(ServiceEvent::ClasspathUpdated {
            project_uri: Some("file:///ws/unknown/".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(
        h.explorer.provider().coordinator().pending(),
        PendingRefresh::WholeTree
    );
}

#[tokio::test]
async fn test_classpath_update_for_folder_that_is_a_project() {
    const APP: &str = "file:///ws/app/";
    let h = Harness::new(
        model().with_projects(APP, vec![project("app")]),
        vec![
            WorkspaceFolder::new("app", APP),
            WorkspaceFolder::new("other", "file:///other/"),
        ],
        RecordingView::new(true),
    );
    settle(&h);
    let provider = h.explorer.provider();

    let roots = provider.get_children(None).await.unwrap();
    let projects = provider.get_children(Some(&roots[0])).await.unwrap();
    // Roots are saved again on every request
    provider.get_children(None).await.unwrap();
    assert_eq!(provider.cached_node(APP), Some(projects[0].clone()));

    h.explorer
        .handle(ServiceEvent::ClasspathUpdated {
            project_uri: Some(APP.to_string()),
        })
        .await
        .unwrap();

    assert_eq!(
        provider.coordinator().pending(),
        PendingRefresh::Node(projects[0].clone())
    );
}

#[tokio::test(start_paused = true)]
async fn test_import_events_coalesce_into_one_refresh() {
    let h = Harness::workspace();
    settle(&h);
    let mut changes = h.explorer.provider().subscribe();

    h.explorer
        .handle_batch(vec![
            ServiceEvent::ProjectsImported {
                uris: vec!["file:///ws/app/".to_string()],
            },
            ServiceEvent::ProjectsDeleted {
                uris: vec!["file:///ws/lib/".to_string()],
            },
        ])
        .await
        .unwrap();
    assert_eq!(changes.try_recv(), Err(TryRecvError::Empty));

    tokio::time::sleep(Duration::from_millis(2001)).await;
    assert_eq!(changes.try_recv(), Ok(TreeChange { element: None }));
    assert_eq!(changes.try_recv(), Err(TryRecvError::Empty));
}

#[tokio::test]
async fn test_leaving_lightweight_mode_refreshes_immediately() {
    let h = Harness::new(
        Snapshot {
            server_mode: Some(ServerMode::LightWeight),
            ..model()
        },
        vec![WorkspaceFolder::new("ws", WS)],
        RecordingView::new(true),
    );
    settle(&h);
    let mut changes = h.explorer.provider().subscribe();

    h.explorer
        .handle(ServiceEvent::ServerModeChanged {
            mode: ServerMode::Hybrid,
        })
        .await
        .unwrap();
    assert_eq!(changes.try_recv(), Ok(TreeChange { element: None }));

    h.explorer
        .handle(ServiceEvent::ServerModeChanged {
            mode: ServerMode::Standard,
        })
        .await
        .unwrap();
    assert_eq!(changes.try_recv(), Err(TryRecvError::Empty));
    assert_eq!(
        h.explorer.provider().gate().last_mode(),
        Some(ServerMode::Standard)
    );
}

#[tokio::test]
async fn test_service_loaded_refreshes_immediately() {
    let h = Harness::workspace();
    let mut changes = h.explorer.provider().subscribe();

    h.explorer.handle(ServiceEvent::ServiceLoaded).await.unwrap();

    assert_eq!(changes.try_recv(), Ok(TreeChange { element: None }));
}

#[tokio::test]
async fn test_change_listener_follows_active_document() {
    let h = Harness::workspace();
    h.host.set_active_document(Some(APP_JAVA));
    let listener = h.explorer.spawn_change_listener();

    h.explorer.provider().refresh(false, None);

    tokio::time::timeout(Duration::from_secs(5), async {
        while h.view.revealed().is_empty() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("listener did not reveal the active document");
    assert_eq!(h.view.revealed()[0].uri(), Some(APP_JAVA));

    // Dropping the explorer closes the change stream and stops the listener
    drop(h);
    tokio::time::timeout(Duration::from_secs(5), listener)
        .await
        .expect("listener kept running")
        .unwrap();
}
