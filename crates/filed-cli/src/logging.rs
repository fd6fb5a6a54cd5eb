use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Our own crates log at info, dependencies only at warn.
const DEFAULT_DIRECTIVES: &str = "warn,filed_core=info,filed=info";
const DEFAULT_LOG_FILE: &str = "./logs/filed.log";

/// `TRACING_LEVEL` replaces the default directives entirely.
fn filter_directives(level: Option<String>) -> String {
    level
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DIRECTIVES.to_string())
}

/// Directory and file name for the appender; a bare file name logs into `./`.
fn split_log_path(path: &str) -> (PathBuf, PathBuf) {
    let path = Path::new(path);
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file = path
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("filed.log"));
    (dir, file)
}

pub fn init_logger() -> impl Drop {
    let filter_layer = EnvFilter::new(filter_directives(env::var("TRACING_LEVEL").ok()));

    let log_file_path = env::var("LOG_FILE_PATH").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    let (log_dir, log_file) = split_log_path(&log_file_path);

    let file_appender = tracing_appender::rolling::never(log_dir, log_file);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stdout)
                .compact()
                .with_target(false)
                .without_time()
                .with_ansi(true),
        )
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .with(filter_layer)
        .init();

    debug!("Logging to stdout and {}", log_file_path);

    guard
}
