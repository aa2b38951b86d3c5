use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "mediacull",
    version,
    about = "Find and cull duplicate photos and videos by filename pattern"
)]
pub struct Cli {
    /// Config file (default: the per-user mediacull/config.json, if present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Duplicate workflows
    Duplicates {
        #[command(subcommand)]
        command: Dups,
    },

    /// Work with cull history
    History {
        #[command(subcommand)]
        command: HistoryCmd,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct ScanArgs {
    /// Directory to scan
    #[arg(short, long, value_name = "DIR")]
    pub path: PathBuf,
    /// Only scan the top level of the directory
    #[arg(long)]
    pub no_recursive: bool,
    /// Skip visual similarity filtering of groups
    #[arg(long)]
    pub no_visual: bool,
}

#[derive(Subcommand, Debug)]
pub enum Dups {
    /// Find and list duplicate groups
    Scan {
        #[command(flatten)]
        scan: ScanArgs,
        /// Show per-file details and largest/newest hints
        #[arg(long)]
        detailed: bool,
        /// Only report groups whose files have identical sizes
        #[arg(long)]
        exact: bool,
        /// Print the scan summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Propose which file of each two-file group to remove
    Auto {
        #[command(flatten)]
        scan: ScanArgs,
        /// Minimum confidence for a proposal to be auto-selected
        #[arg(long, value_name = "X")]
        min_confidence: Option<f64>,
        /// Print the selection batch as JSON
        #[arg(long)]
        json: bool,
    },

    /// Move auto-selected duplicates into `<dir>/duplicates`
    Cull {
        #[command(flatten)]
        scan: ScanArgs,
        /// Only show what would be moved
        #[arg(long)]
        dry_run: bool,
        /// Directory to move duplicates into (default: `<dir>/duplicates`)
        #[arg(long, value_name = "DIR")]
        target_dir: Option<PathBuf>,
        /// Confirm every proposal, including low-confidence ones
        #[arg(short, long)]
        interactive: bool,
    },

    /// Permanently delete auto-selected duplicates
    Delete {
        #[command(flatten)]
        scan: ScanArgs,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum HistoryCmd {
    /// List all cull history records
    List {
        /// Directory containing the media
        #[arg(short, long, value_name = "DIR")]
        path: PathBuf,
    },

    /// Restore moved files from history
    Restore {
        /// Directory containing the media
        #[arg(short, long, value_name = "DIR")]
        path: PathBuf,
        /// Restore a specific record index
        #[arg(long, conflicts_with = "all")]
        record: Option<usize>,
        /// Restore all records
        #[arg(long, conflicts_with = "record")]
        all: bool,
    },
}
