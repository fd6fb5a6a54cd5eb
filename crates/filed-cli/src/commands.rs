use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "filed")]
#[command(about = "Index and analyze files on your system", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Index files and directories under a path into a sqlite database
    Index(IndexArgs),
    /// Hash every indexed file in a sqlite database
    Hash(HashArgs),
    /// Calculate duplicate statistics on hashed files
    Stats(StatsArgs),
    /// Index, hash and calculate statistics in one go
    Run(IndexArgs),
    /// Print the largest duplicate groups from the last statistics runs
    Report(ReportArgs),
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Args)]
pub struct IndexArgs {
    /// Directory to start indexing from
    #[arg(short, long)]
    pub path: PathBuf,
    /// Database file; defaults to filed_<timestamp>.db in the working directory
    #[arg(short, long)]
    pub database: Option<PathBuf>,
    /// Records per insert transaction
    #[arg(long)]
    pub batch_size: Option<usize>,
    /// Skip hidden files and do not descend into hidden directories
    #[arg(long)]
    pub skip_hidden: bool,
    /// Flush batches from this many worker threads
    #[arg(long)]
    pub workers: Option<usize>,
    /// Report elapsed time
    #[arg(long)]
    pub time: bool,
}

#[derive(Debug, Args)]
pub struct HashArgs {
    #[arg(short, long)]
    pub database: Option<PathBuf>,
    #[arg(long)]
    pub batch_size: Option<usize>,
    /// Re-hash files hashed before this unix timestamp
    #[arg(long)]
    pub older_than: Option<i64>,
    #[arg(long)]
    pub time: bool,
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    #[arg(short, long)]
    pub database: Option<PathBuf>,
    #[arg(long)]
    pub batch_size: Option<usize>,
    #[arg(long)]
    pub time: bool,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    #[arg(short, long)]
    pub database: Option<PathBuf>,
    /// Number of groups to print
    #[arg(short, long, default_value_t = 20)]
    pub limit: i64,
}
