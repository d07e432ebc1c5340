//! Command-line interface definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// devtrack issue tracker
///
/// Tracks issues (title, description, status, priority, assignee) in a local
/// data directory. Changes are saved to `<data-dir>/<key>.json`.
///
/// Exit Codes:
///   0  - Command succeeded
///   2  - Invalid arguments or usage error
///   3  - Issue not found
///   4  - Validation failed (e.g. empty title)
///  10  - Storage or configuration failure
#[derive(Parser, Debug)]
#[command(name = "devtrack")]
#[command(about = "Local issue tracker", long_about = None)]
pub struct Cli {
    /// Suppress non-essential output (for scripting)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging on stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Data directory (default: $DEVTRACK_DATA_DIR or .devtrack)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new issue
    Add {
        /// Issue title (required, must not be empty)
        #[arg(short, long)]
        title: String,

        /// Issue description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Priority (low, medium, high, critical)
        #[arg(short, long, default_value = "medium")]
        priority: String,

        /// Status (open, in-progress, closed)
        #[arg(short, long, default_value = "open")]
        status: String,

        /// Person responsible (default: "Current User")
        #[arg(short, long)]
        assignee: Option<String>,
    },

    /// List issues, newest first
    List {
        /// Case-insensitive text to find in title or description
        #[arg(long, default_value = "")]
        search: String,

        /// Status filter (all, open, in-progress, closed)
        #[arg(long, default_value = "all")]
        status: String,
    },

    /// Show one issue in full
    Show {
        /// Issue ID
        id: String,
    },

    /// Edit an issue; omitted fields keep their current values
    Update {
        /// Issue ID
        id: String,

        /// New title
        #[arg(short, long)]
        title: Option<String>,

        /// New description
        #[arg(short, long)]
        description: Option<String>,

        /// New priority (low, medium, high, critical)
        #[arg(short, long)]
        priority: Option<String>,

        /// New status (open, in-progress, closed)
        #[arg(short, long)]
        status: Option<String>,

        /// New assignee
        #[arg(short, long)]
        assignee: Option<String>,
    },

    /// Delete an issue permanently
    Delete {
        /// Issue ID
        id: String,
    },

    /// Show issue counts per status
    Stats,

    /// Clear saved issues so the next run starts from the example set
    Reset,
}

impl Commands {
    /// Command name used in JSON metadata.
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Add { .. } => "add",
            Commands::List { .. } => "list",
            Commands::Show { .. } => "show",
            Commands::Update { .. } => "update",
            Commands::Delete { .. } => "delete",
            Commands::Stats => "stats",
            Commands::Reset => "reset",
        }
    }
}
