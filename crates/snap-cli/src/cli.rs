use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use snap_types::RecordMode;

#[derive(Parser)]
#[command(
    name = "snap",
    about = "Snapline: record once, compare forever",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Project root holding the snapshot directory
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Configuration file (defaults to <root>/snapline.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show line differences between two text files
    Diff(DiffArgs),
    /// Verify a candidate file against its baseline
    Check(CheckArgs),
    /// Record a candidate file as the new baseline
    Record(CheckArgs),
    /// List recorded baselines
    List(ListArgs),
}

#[derive(Args)]
pub struct DiffArgs {
    pub old: PathBuf,
    pub new: PathBuf,
    /// Unchanged lines shown around each hunk
    #[arg(short = 'U', long)]
    pub context: Option<usize>,
}

#[derive(Args)]
pub struct CheckArgs {
    pub suite: String,
    pub test: String,
    pub candidate: PathBuf,
    /// Discriminator for several baselines in one test
    #[arg(long)]
    pub name: Option<String>,
    /// Diffing format: lines, json, bytes, bincode
    #[arg(long, default_value = "lines")]
    pub format: String,
    /// Record mode for this run: never, missing, failed, all
    #[arg(long)]
    pub record: Option<RecordMode>,
    #[arg(short = 'U', long)]
    pub context: Option<usize>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Only baselines of this suite
    #[arg(long)]
    pub suite: Option<String>,
}
