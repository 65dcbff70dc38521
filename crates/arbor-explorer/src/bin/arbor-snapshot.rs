// ABOUTME: Command line driver rendering an explorer tree from a project model snapshot
// ABOUTME: Loads settings and a JSON snapshot, prints the tree and optionally reveals a file

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

use arbor_explorer::{
    DependencyExplorer, EditorHost, ExplorerNode, RevealOptions, SnapshotService, TreeViewShell,
};
use arbor_logging::{LoggingConfig, info, warn};
use arbor_types::{ExplorerSettings, WorkspaceFolder};

const USAGE: &str = "
USAGE:
    arbor-snapshot [OPTIONS] <snapshot.json> <workspace-uri>...

OPTIONS:
    -s, --settings <file>    Explorer settings (TOML)
    -r, --reveal <uri>       Reveal a resource after rendering the tree
    -h, --help               Prints help information
";

struct Args {
    snapshot: PathBuf,
    folders: Vec<String>,
    settings: Option<PathBuf>,
    reveal: Option<String>,
}

fn parse_args() -> Result<Option<Args>> {
    let mut positional = Vec::new();
    let mut settings = None;
    let mut reveal = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "-s" | "--settings" => {
                settings = Some(PathBuf::from(args.next().context("--settings needs a file")?));
            }
            "-r" | "--reveal" => {
                reveal = Some(args.next().context("--reveal needs a uri")?);
            }
            flag if flag.starts_with('-') => bail!("unknown option '{flag}'"),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let Some(snapshot) = positional.next() else {
        bail!("missing snapshot file");
    };
    let folders: Vec<String> = positional.collect();
    if folders.is_empty() {
        bail!("missing workspace folder uri");
    }

    Ok(Some(Args {
        snapshot: PathBuf::from(snapshot),
        folders,
        settings,
        reveal,
    }))
}

struct ConsoleHost {
    folders: Vec<WorkspaceFolder>,
    settings: ExplorerSettings,
    active_document: Option<String>,
}

#[async_trait]
impl EditorHost for ConsoleHost {
    fn workspace_folders(&self) -> Vec<WorkspaceFolder> {
        self.folders.clone()
    }

    fn settings(&self) -> ExplorerSettings {
        self.settings.clone()
    }

    fn active_document_uri(&self) -> Option<String> {
        self.active_document.clone()
    }

    fn show_warning(&self, message: &str) {
        warn!("{message}");
    }

    fn show_information(&self, message: &str) {
        info!("{message}");
    }

    async fn execute_command(
        &self,
        command: &str,
        arguments: Vec<serde_json::Value>,
    ) -> arbor_explorer::Result<()> {
        info!(command, arguments = ?arguments, "Command requested");
        Ok(())
    }
}

struct ConsoleView;

#[async_trait]
impl TreeViewShell for ConsoleView {
    fn is_visible(&self) -> bool {
        true
    }

    async fn show(&self) {}

    async fn reveal(&self, node: &ExplorerNode, _options: RevealOptions) {
        println!("revealed {}", node.identity());
    }
}

async fn print_tree(explorer: &DependencyExplorer) -> Result<()> {
    let provider = explorer.provider();
    let mut stack: Vec<(usize, ExplorerNode)> = provider
        .get_children(None)
        .await?
        .into_iter()
        .rev()
        .map(|node| (0, node))
        .collect();

    while let Some((depth, node)) = stack.pop() {
        let item = provider.get_tree_item(&node);
        println!("{:indent$}{} ({})", "", item.label, node.kind(), indent = depth * 2);
        let children = provider.get_children(Some(&node)).await?;
        stack.extend(children.into_iter().rev().map(|child| (depth + 1, child)));
    }
    Ok(())
}

/// Explorer settings and the optional `[logging]` table from one TOML file
fn load_settings(path: Option<&PathBuf>) -> Result<(ExplorerSettings, LoggingConfig)> {
    let Some(path) = path else {
        return Ok((ExplorerSettings::default(), LoggingConfig::default()));
    };
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("could not read settings from {}", path.display()))?;

    let explorer = ExplorerSettings::from_toml_str(&source).context("invalid explorer settings")?;
    let mut table: toml::Table = toml::from_str(&source).context("invalid settings file")?;
    let logging = match table.remove("logging") {
        Some(value) => value.try_into().context("invalid [logging] table")?,
        None => LoggingConfig::default(),
    };
    Ok((explorer, logging))
}

#[tokio::main]
async fn main() -> Result<()> {
    let Some(args) = parse_args()? else {
        print!("{USAGE}");
        return Ok(());
    };

    let (settings, mut logging) = load_settings(args.settings.as_ref())?;
    logging.apply_env(|key| std::env::var(key).ok())?;
    let _logging = arbor_logging::init_subscriber(&logging)?;

    if let Err(reason) = settings.validate() {
        warn!(reason = %reason, "Adjusting settings");
    }
    let settings = settings.sanitized();

    let json = std::fs::read_to_string(&args.snapshot)
        .with_context(|| format!("could not read snapshot {}", args.snapshot.display()))?;
    let service = Arc::new(SnapshotService::from_json(&json).context("invalid snapshot")?);

    let folders = args
        .folders
        .iter()
        .map(|uri| {
            let name = uri
                .trim_end_matches('/')
                .rsplit('/')
                .next()
                .unwrap_or(uri.as_str());
            WorkspaceFolder::new(name, uri.as_str())
        })
        .collect();
    let host = Arc::new(ConsoleHost {
        folders,
        settings,
        active_document: args.reveal.clone(),
    });
    let explorer = DependencyExplorer::new(service, host, Arc::new(ConsoleView));

    print_tree(&explorer).await?;

    if args.reveal.is_some() && explorer.reveal_active_file_command().await?.is_none() {
        println!("not found");
    }
    Ok(())
}
