mod commands;
mod logging;
mod progress;

use std::path::PathBuf;
use std::process;
use std::time::Instant;

use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands, HashArgs, IndexArgs, ReportArgs, StatsArgs};
use dotenv::dotenv;
use filed_core::storage::Database;
use filed_core::units::humanize_size;
use filed_core::{AppConfig, Engine};
use progress::CliReporter;
use tracing::{error, info};

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match filed_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    let result = match args.command {
        Some(Commands::Index(args)) => run_index(config, &args),
        Some(Commands::Run(args)) => run_all(config, &args),
        Some(Commands::Hash(args)) => run_hash(config, &args),
        Some(Commands::Stats(args)) => run_stats(config, &args),
        Some(Commands::Report(args)) => run_report(&config, &args),
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:#?}", config);
            Ok(())
        }
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    };

    if let Err(err) = result {
        error!("Error: {}", err);
        process::exit(1);
    }
}

fn apply_index_args(config: &mut AppConfig, args: &IndexArgs) {
    if let Some(batch_size) = args.batch_size {
        config.index_batch_size = batch_size;
    }
    if let Some(workers) = args.workers {
        config.index_workers = workers;
    }
    if args.skip_hidden {
        config.skip_hidden = true;
    }
}

/// A fresh `filed_<unix-seconds>.db` in the working directory unless one was given.
fn index_database_path(config: &AppConfig, args: &IndexArgs) -> PathBuf {
    args.database
        .clone()
        .or_else(|| config.database_path.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(format!("filed_{}.db", chrono::Utc::now().timestamp())))
}

fn existing_database_path(
    config: &AppConfig,
    database: &Option<PathBuf>,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = database
        .clone()
        .or_else(|| config.database_path.as_ref().map(PathBuf::from))
        .ok_or("a database path is required (--database or database_path in Filed.toml)")?;
    if !path.exists() {
        return Err(format!("database {} does not exist", path.display()).into());
    }
    Ok(path)
}

fn report_time(enabled: bool, start: Instant) {
    if enabled {
        info!(
            "Took: {}",
            format!("{:.2}s", start.elapsed().as_secs_f64()).green()
        );
    }
}

fn run_index(mut config: AppConfig, args: &IndexArgs) -> CliResult {
    apply_index_args(&mut config, args);
    let db_path = index_database_path(&config, args);
    let db = Database::open(&db_path)?;
    info!("Indexing {} into {}", args.path.display(), db_path.display());

    let start = Instant::now();
    let stats = Engine::new(config).index(&db, &args.path, &CliReporter::new())?;
    info!(
        "Finished indexing {}: {} files/folders",
        args.path.display(),
        format!("{}", stats.entries).cyan()
    );
    report_time(args.time, start);
    Ok(())
}

fn run_all(mut config: AppConfig, args: &IndexArgs) -> CliResult {
    apply_index_args(&mut config, args);
    let db_path = index_database_path(&config, args);
    let db = Database::open(&db_path)?;

    let start = Instant::now();
    let result = Engine::new(config).run(&db, &args.path, &CliReporter::new())?;

    println!();
    info!(
        "Index: {}, Hash: {}, Stats: {}",
        format!("{:.2}s", result.index.duration.as_secs_f64()).green(),
        format!("{:.2}s", result.hash.duration.as_secs_f64()).green(),
        format!("{:.2}s", result.stats.duration.as_secs_f64()).green(),
    );
    info!(
        "{} files/folders, {} hashed, {} unreadable, {} links skipped, {} distinct hashes",
        format!("{}", result.index.entries).cyan(),
        format!("{}", result.hash.files_hashed).cyan(),
        format!("{}", result.hash.files_failed).red(),
        format!("{}", result.hash.files_skipped).yellow(),
        format!("{}", result.stats.rows_written).cyan(),
    );
    info!("Results written to {}", db_path.display());
    report_time(args.time, start);
    Ok(())
}

fn run_hash(mut config: AppConfig, args: &HashArgs) -> CliResult {
    let db_path = existing_database_path(&config, &args.database)?;
    if let Some(batch_size) = args.batch_size {
        config.hash_batch_size = batch_size;
    }
    if let Some(older_than) = args.older_than {
        config.rehash_older_than = Some(older_than);
    }
    let db = Database::open(&db_path)?;
    info!("Hashing {}", db_path.display());

    let start = Instant::now();
    let stats = Engine::new(config).hash(&db, &CliReporter::new())?;
    if stats.files_failed > 0 {
        info!(
            "{} files could not be read and were left unhashed",
            format!("{}", stats.files_failed).red()
        );
    }
    report_time(args.time, start);
    Ok(())
}

fn run_stats(mut config: AppConfig, args: &StatsArgs) -> CliResult {
    let db_path = existing_database_path(&config, &args.database)?;
    if let Some(batch_size) = args.batch_size {
        config.stats_batch_size = batch_size;
    }
    let db = Database::open(&db_path)?;
    info!("Calculating stats of {}", db_path.display());

    let start = Instant::now();
    let summary = Engine::new(config).aggregate(&db, &CliReporter::new())?;
    if summary.batches_dropped > 0 {
        info!(
            "{} statistics batches could not be written",
            format!("{}", summary.batches_dropped).red()
        );
    }
    report_time(args.time, start);
    Ok(())
}

fn run_report(config: &AppConfig, args: &ReportArgs) -> CliResult {
    let db_path = existing_database_path(config, &args.database)?;
    let db = Database::open(&db_path)?;

    let stats = db.list_duplicate_stats(0, args.limit)?;
    if stats.is_empty() {
        println!("No statistics yet; run `filed stats` first.");
        return Ok(());
    }

    for stat in stats {
        let count = format!("{:>6}", stat.file_count);
        println!(
            "{} x {:>12} = {:>12}  {}",
            if stat.file_count > 1 { count.red() } else { count.normal() },
            humanize_size(stat.file_size.max(0) as u64),
            humanize_size(stat.total_file_size.max(0) as u64).yellow(),
            stat.hash.dimmed(),
        );
    }
    Ok(())
}
