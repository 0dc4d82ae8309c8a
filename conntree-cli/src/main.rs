//! `ConnTree` CLI - Command-line interface for the `ConnTree` connection tree
//!
//! Drives the tree core against a headless view: every command runs the same
//! code path a widget would and prints the view calls it produced.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::rc::Rc;

use clap::{Parser, Subcommand, ValueEnum};
use conntree_core::{
    spawn_save_worker, ConfigError, ConfigManager, ConnectionTree, ConnectionTreeModel,
    DropPosition, DropRejection, DropRequest, ModelError, ModelHandle, NodeId, PropertyUpdate,
    RecordingView, RestoreExpandedContainers, SaveRequester, SearchError, SnapshotSaver,
    SortOrder, TreeError, TreeNode, TreeSettings, TreeSnapshot, TreeView, ViewCall,
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// `ConnTree` command-line interface for editing the connection tree
#[derive(Parser)]
#[command(name = "conntree-cli")]
#[command(author, version, about = "ConnTree command-line interface")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding config.toml and connections.toml
    #[arg(short, long, global = true)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
///
/// Node arguments accept a node name or UUID.
#[derive(Subcommand)]
pub enum Commands {
    /// Print the tree
    #[command(about = "Print the connection tree")]
    Show {
        /// Print the persisted form as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a connection
    #[command(about = "Add a connection under a node")]
    AddConnection {
        /// Container to add into, or a connection to add next to
        #[arg(short, long)]
        under: String,

        /// Name for the new connection
        #[arg(short, long)]
        name: Option<String>,

        /// Host address (hostname or IP)
        #[arg(short = 'H', long)]
        host: Option<String>,
    },

    /// Add a folder
    #[command(about = "Add a folder under a node")]
    AddFolder {
        /// Container to add into, or a connection to add next to
        #[arg(short, long)]
        under: String,

        /// Name for the new folder
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Duplicate a node with its subtree
    #[command(about = "Duplicate a node right after the original")]
    Duplicate {
        /// Node name or UUID
        node: String,
    },

    /// Rename a node
    #[command(about = "Rename a node")]
    Rename {
        /// Node name or UUID
        node: String,

        /// New name
        #[arg(short, long)]
        to: String,
    },

    /// Delete a node with its subtree
    #[command(about = "Delete a node and everything below it")]
    Delete {
        /// Node name or UUID
        node: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Move a node as a drag-and-drop would
    #[command(about = "Move a node onto another node")]
    Move {
        /// Node name or UUID
        node: String,

        /// Drop target name or UUID
        #[arg(short, long)]
        onto: String,

        /// Where the node lands relative to the target
        #[arg(short, long, default_value = "into", value_enum)]
        position: PositionArg,
    },

    /// Sort the children of a container
    #[command(about = "Sort a container's children by name")]
    Sort {
        /// Node name or UUID
        node: String,

        /// Sort Z to A
        #[arg(short, long)]
        descending: bool,
    },

    /// Search nodes by name
    #[command(about = "Search nodes by name and select the first match")]
    Search {
        /// Text to look for
        query: String,

        /// Treat the query as a regular expression
        #[arg(short, long)]
        regex: bool,
    },
}

/// Drop position argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PositionArg {
    /// Into the target container
    Into,
    /// Before the target
    Before,
    /// After the target
    After,
}

impl From<PositionArg> for DropPosition {
    fn from(position: PositionArg) -> Self {
        match position {
            PositionArg::Into => Self::Into,
            PositionArg::Before => Self::Before,
            PositionArg::After => Self::After,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(exit_codes::GENERAL_ERROR);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = match cli.config_dir {
        Some(dir) => ConfigManager::with_config_dir(dir),
        None => ConfigManager::new()?,
    };
    let settings = config.load_settings()?;
    init_logging(&settings.logging.filter);

    let mut stdout = io::stdout().lock();
    execute(&config, &settings, cli.command, &mut stdout).await
}

/// Logs to stderr; `RUST_LOG` wins over the configured filter
fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Runs one command and waits until every requested save is written
async fn execute(
    config: &ConfigManager,
    settings: &TreeSettings,
    command: Commands,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let model = load_model(config, settings)?;
    let (tx, worker) = spawn_save_worker(config.clone());

    // The tree owns the last sender; the worker stops once it is dropped.
    let result = drive(model, settings, tx, command, out);

    worker.await.map_err(|e| CliError::Worker(e.to_string()))?;
    result
}

fn load_model(config: &ConfigManager, settings: &TreeSettings) -> Result<ModelHandle, CliError> {
    let model = match config.load_tree()? {
        Some(snapshot) => ConnectionTreeModel::from_snapshot(&snapshot)?,
        None => {
            debug!("No saved tree, starting empty");
            ConnectionTreeModel::with_root(TreeNode::permanent_root(&settings.tree.root_name))
        }
    };
    Ok(ModelHandle::new(model))
}

fn drive(
    model: ModelHandle,
    settings: &TreeSettings,
    tx: UnboundedSender<TreeSnapshot>,
    command: Commands,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let assume_yes = matches!(command, Commands::Delete { yes: true, .. });

    let view = Rc::new(RecordingView::new());
    let tree = ConnectionTree::new(Rc::clone(&view) as Rc<dyn TreeView>);
    let saver: Rc<dyn SaveRequester> = Rc::new(SnapshotSaver::new(tree.model_slot(), tx));
    let tree = tree
        .with_defaults(Rc::new(settings.defaults.clone()))
        .with_saver(Rc::clone(&saver))
        .with_save_on_rename_commit(settings.tree.save_on_rename_commit)
        .with_deletion_confirmer(move |node| assume_yes || confirm_on_stdin(node))
        .with_post_attach_action(RestoreExpandedContainers);

    tree.attach(model)?;
    view.take_calls();

    run_command(&tree, &view, saver.as_ref(), command, out)?;
    print_calls(out, &view.take_calls())?;
    Ok(())
}

fn run_command(
    tree: &ConnectionTree,
    view: &RecordingView,
    saver: &dyn SaveRequester,
    command: Commands,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let model = tree.model()?;

    match command {
        Commands::Show { json } => cmd_show(&model, json, out),
        Commands::AddConnection { under, name, host } => {
            let id = cmd_add(tree, view, &model, &under, false, name)?;
            if let Some(host) = host {
                let mut settings = model
                    .node(id)
                    .map(|node| node.settings)
                    .ok_or(ModelError::NodeNotFound(id))?;
                settings.host = host;
                model.update(id, PropertyUpdate::Settings(settings))?;
            }
            saver.save_async();
            writeln!(out, "Added connection {id}")?;
            Ok(())
        }
        Commands::AddFolder { under, name } => {
            let id = cmd_add(tree, view, &model, &under, true, name)?;
            saver.save_async();
            writeln!(out, "Added folder {id}")?;
            Ok(())
        }
        Commands::Duplicate { node } => {
            select(view, &model, &node)?;
            let copy = tree
                .duplicate_selected()
                .ok_or_else(|| CliError::Command(format!("'{node}' cannot be duplicated")))?;
            writeln!(out, "Duplicated as {copy}")?;
            Ok(())
        }
        Commands::Rename { node, to } => {
            let id = select(view, &model, &node)?;
            tree.rename_selected();
            tree.commit_rename(id, &to)?;
            saver.save_async();
            writeln!(out, "Renamed {id} to '{to}'")?;
            Ok(())
        }
        Commands::Delete { node, .. } => {
            let id = select(view, &model, &node)?;
            if !tree.delete_selected() {
                return Err(CliError::Command(format!("'{node}' was not deleted")));
            }
            writeln!(out, "Deleted {id}")?;
            Ok(())
        }
        Commands::Move {
            node,
            onto,
            position,
        } => {
            let request = {
                let read = model.read();
                DropRequest {
                    dragged: vec![resolve_node(&read, &node)?],
                    target: resolve_node(&read, &onto)?,
                    position: position.into(),
                }
            };
            let validated = tree.can_drop(&request)?;
            if !tree.handle_drop(validated) {
                return Err(CliError::Command(format!("'{node}' was not moved")));
            }
            writeln!(out, "Moved '{node}' {position:?} '{onto}'")?;
            Ok(())
        }
        Commands::Sort { node, descending } => {
            select(view, &model, &node)?;
            let order = if descending {
                SortOrder::Descending
            } else {
                SortOrder::Ascending
            };
            tree.sort_selected(order);
            Ok(())
        }
        Commands::Search { query, regex } => {
            let matches = if regex {
                tree.search_pattern(&query)?
            } else {
                tree.search(&query)
            };
            if matches.is_empty() {
                writeln!(out, "No matches for '{query}'")?;
            }
            let read = model.read();
            for id in matches {
                if let Some(node) = read.node(id) {
                    writeln!(out, "{id}  {}", node.name)?;
                }
            }
            Ok(())
        }
    }
}

fn cmd_add(
    tree: &ConnectionTree,
    view: &RecordingView,
    model: &ModelHandle,
    under: &str,
    folder: bool,
    name: Option<String>,
) -> Result<NodeId, CliError> {
    select(view, model, under)?;
    let id = if folder {
        tree.add_folder()
    } else {
        tree.add_connection()
    }
    .ok_or_else(|| CliError::Command(format!("Cannot add a node at '{under}'")))?;
    if let Some(name) = name {
        model.set_name(id, name)?;
    }
    Ok(id)
}

fn cmd_show(model: &ModelHandle, json: bool, out: &mut impl Write) -> Result<(), CliError> {
    let model = model.read();
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&model.snapshot())?)?;
        return Ok(());
    }
    for root in model.roots() {
        write_subtree(&model, *root, 0, out)?;
    }
    Ok(())
}

fn write_subtree(
    model: &ConnectionTreeModel,
    id: NodeId,
    depth: usize,
    out: &mut impl Write,
) -> io::Result<()> {
    let Some(node) = model.node(id) else {
        return Ok(());
    };
    let marker = if node.is_container() { '+' } else { '-' };
    write!(out, "{:indent$}{marker} {}", "", node.name, indent = depth * 2)?;
    if !node.is_container() && !node.settings.host.is_empty() {
        write!(out, " [{}://{}]", node.settings.protocol, node.settings.host)?;
    }
    writeln!(out, "  {id}")?;
    for child in model.children(id) {
        write_subtree(model, *child, depth + 1, out)?;
    }
    Ok(())
}

fn print_calls(out: &mut impl Write, calls: &[ViewCall]) -> io::Result<()> {
    if calls.is_empty() {
        return Ok(());
    }
    writeln!(out, "View calls:")?;
    for call in calls {
        writeln!(out, "  {call}")?;
    }
    Ok(())
}

/// Selects the node named by `arg`, as a click on its row would
fn select(view: &RecordingView, model: &ModelHandle, arg: &str) -> Result<NodeId, CliError> {
    let id = resolve_node(&model.read(), arg)?;
    view.set_selected(Some(id));
    Ok(id)
}

/// Resolves a node argument given as UUID or name
fn resolve_node(model: &ConnectionTreeModel, arg: &str) -> Result<NodeId, CliError> {
    if let Ok(id) = Uuid::parse_str(arg) {
        if model.contains(id) {
            return Ok(id);
        }
    }
    model
        .find_by_name(arg)
        .ok_or_else(|| CliError::NodeNotFound(arg.to_string()))
}

fn confirm_on_stdin(node: &TreeNode) -> bool {
    eprint!("Delete '{}' and everything below it? [y/N] ", node.name);
    if io::stderr().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

// ============================================================================
// Error handling
// ============================================================================

/// Exit codes returned by the CLI
pub mod exit_codes {
    /// Any failure
    pub const GENERAL_ERROR: i32 = 1;
}

/// CLI error type
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Tree binding error
    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),

    /// Model rejected an operation
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Node argument matched nothing
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// Move rejected by the drop policy
    #[error("Move rejected: {0}")]
    Drop(#[from] DropRejection),

    /// Invalid search pattern
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    /// Command had no effect
    #[error("{0}")]
    Command(String),

    /// Save worker did not finish
    #[error("Save worker failed: {0}")]
    Worker(String),

    /// JSON output failed
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
