// ABOUTME: Test doubles for the editor host and the tree view
// ABOUTME: Record every message, command and reveal so tests can assert on them

#[cfg(test)]
pub mod test_support {
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use arbor_types::{ExplorerSettings, WorkspaceFolder};

    use crate::error::Result;
    use crate::host::{EditorHost, RevealOptions, TreeViewShell};
    use crate::node::ExplorerNode;

    #[derive(Default)]
    pub struct RecordingHost {
        pub folders: Mutex<Vec<WorkspaceFolder>>,
        pub settings: Mutex<ExplorerSettings>,
        pub active_document: Mutex<Option<String>>,
        warnings: Mutex<Vec<String>>,
        information: Mutex<Vec<String>>,
        commands: Mutex<Vec<(String, Vec<serde_json::Value>)>>,
    }

    impl RecordingHost {
        pub fn with_folders(folders: Vec<WorkspaceFolder>) -> Self {
            let host = Self::default();
            *host.folders.lock() = folders;
            host
        }

        pub fn set_active_document(&self, uri: Option<&str>) {
            *self.active_document.lock() = uri.map(str::to_string);
        }

        pub fn update_settings(&self, update: impl FnOnce(&mut ExplorerSettings)) {
            update(&mut *self.settings.lock());
        }

        pub fn warnings(&self) -> Vec<String> {
            self.warnings.lock().clone()
        }

        pub fn information(&self) -> Vec<String> {
            self.information.lock().clone()
        }

        pub fn commands(&self) -> Vec<(String, Vec<serde_json::Value>)> {
            self.commands.lock().clone()
        }
    }

    #[async_trait]
    impl EditorHost for RecordingHost {
        fn workspace_folders(&self) -> Vec<WorkspaceFolder> {
            self.folders.lock().clone()
        }

        fn settings(&self) -> ExplorerSettings {
            self.settings.lock().clone()
        }

        fn active_document_uri(&self) -> Option<String> {
            self.active_document.lock().clone()
        }

        fn show_warning(&self, message: &str) {
            self.warnings.lock().push(message.to_string());
        }

        fn show_information(&self, message: &str) {
            self.information.lock().push(message.to_string());
        }

        async fn execute_command(
            &self,
            command: &str,
            arguments: Vec<serde_json::Value>,
        ) -> Result<()> {
            self.commands.lock().push((command.to_string(), arguments));
            Ok(())
        }
    }

    /// Tree view that records reveals in call order
    pub struct RecordingView {
        visible: AtomicBool,
        shown: Mutex<usize>,
        revealed: Mutex<Vec<ExplorerNode>>,
        /// Start and end of every reveal, by node name
        log: Mutex<Vec<String>>,
        /// Time spent inside each reveal
        latency: Option<Duration>,
    }

    impl RecordingView {
        pub fn new(visible: bool) -> Self {
            Self {
                visible: AtomicBool::new(visible),
                shown: Mutex::new(0),
                revealed: Mutex::new(Vec::new()),
                log: Mutex::new(Vec::new()),
                latency: None,
            }
        }

        pub fn with_latency(visible: bool, latency: Duration) -> Self {
            Self {
                latency: Some(latency),
                ..Self::new(visible)
            }
        }

        pub fn set_visible(&self, visible: bool) {
            self.visible.store(visible, Ordering::SeqCst);
        }

        pub fn shown(&self) -> usize {
            *self.shown.lock()
        }

        pub fn revealed(&self) -> Vec<ExplorerNode> {
            self.revealed.lock().clone()
        }

        pub fn log(&self) -> Vec<String> {
            self.log.lock().clone()
        }
    }

    #[async_trait]
    impl TreeViewShell for RecordingView {
        fn is_visible(&self) -> bool {
            self.visible.load(Ordering::SeqCst)
        }

        async fn show(&self) {
            *self.shown.lock() += 1;
            self.visible.store(true, Ordering::SeqCst);
        }

        async fn reveal(&self, node: &ExplorerNode, options: RevealOptions) {
            assert_eq!(options, RevealOptions::default());
            self.log.lock().push(format!("start {}", node.name()));
            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }
            self.log.lock().push(format!("end {}", node.name()));
            self.revealed.lock().push(node.clone());
        }
    }
}
