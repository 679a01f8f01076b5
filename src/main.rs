use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use boardsync::board::ColumnId;
use boardsync::board_config::{BoardsyncConfig, CliOverrides};

mod cmd;

#[derive(Parser)]
#[command(name = "boardsync")]
#[command(version, about = "Issue board client with optimistic drag-and-drop sync")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    /// Backend base URL. Overrides boardsync.toml and BOARDSYNC_BASE_URL.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[arg(long, global = true)]
    pub project_id: Option<i64>,

    /// Workflow whose board to open
    #[arg(long, global = true)]
    pub workflow_id: Option<i64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show or edit the board
    Board {
        #[command(subcommand)]
        command: BoardCommands,
    },
    /// Manage workflow statuses (board columns)
    Status {
        #[command(subcommand)]
        command: StatusCommands,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Run the in-memory development backend
    Serve {
        /// Port to serve on
        #[arg(short, long, default_value = "3142")]
        port: u16,

        /// Bind all interfaces and allow any CORS origin
        #[arg(long)]
        dev: bool,
    },
}

#[derive(Subcommand, Clone)]
pub enum BoardCommands {
    /// Print the board
    Show {
        /// Case-insensitive match on key, summary, name or assignee
        #[arg(short, long)]
        search: Option<String>,
        /// Only cards assigned to this user (repeatable)
        #[arg(long = "assignee")]
        assignees: Vec<i64>,
        /// Only cards of this issue type (repeatable)
        #[arg(long = "issue-type")]
        issue_types: Vec<i64>,
        /// Only cards in this epic (repeatable)
        #[arg(long = "epic")]
        epics: Vec<i64>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Move the column at position FROM to position TO
    MoveColumn { from: usize, to: usize },
    /// Move a card to another column, or within its own
    MoveCard {
        card_key: String,
        column_id: ColumnId,
        /// Position in the destination column (default: first in another column, last in its own)
        #[arg(short, long)]
        index: Option<usize>,
    },
    /// Reorder a card within its column
    ReorderCard {
        column_id: ColumnId,
        from: usize,
        to: usize,
    },
}

#[derive(Subcommand, Clone)]
pub enum StatusCommands {
    /// List the workflow's statuses in board order
    List,
    /// Show one status
    Show { id: i64 },
    /// Create a status at the end of the board
    Create {
        name: String,
        /// to_do, in_progress or done
        #[arg(short, long)]
        category: String,
        /// Make this the workflow's initial status
        #[arg(long)]
        initial: bool,
    },
    /// Update a status
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        initial: Option<bool>,
    },
    /// Delete an empty status
    Delete { id: i64 },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Initialize a default boardsync.toml file
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    // A missing .env is normal.
    let _ = dotenvy::from_path(project_dir.join(".env"));

    let config = BoardsyncConfig::with_cli_args(
        project_dir,
        CliOverrides {
            base_url: cli.base_url.clone(),
            project_id: cli.project_id,
            workflow_id: cli.workflow_id,
            verbose: cli.verbose,
        },
    )?;
    boardsync::logging::init(&config.logging());

    match &cli.command {
        Commands::Board { command } => cmd::cmd_board(&config, command.clone()).await?,
        Commands::Status { command } => cmd::cmd_status(&config, command.clone()).await?,
        Commands::Config { command } => cmd::cmd_config(&config, command.clone())?,
        Commands::Serve { port, dev } => cmd::cmd_serve(*port, *dev).await?,
    }

    Ok(())
}
