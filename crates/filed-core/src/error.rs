use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Filesystem error: {0}")]
    Filesystem(#[from] walkdir::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid ignore pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Index worker failed: {0}")]
    Worker(String),
}

pub type Result<T> = std::result::Result<T, Error>;
