use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;

pub const DEFAULT_BATCH_SIZE: usize = 1000;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database_path: Option<String>,
    #[serde(default = "default_batch_size")]
    pub index_batch_size: usize,
    #[serde(default = "default_batch_size")]
    pub hash_batch_size: usize,
    #[serde(default = "default_batch_size")]
    pub stats_batch_size: usize,
    #[serde(default)]
    pub skip_hidden: bool,
    #[serde(default = "default_workers")]
    pub index_workers: usize,
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
    /// Unix seconds; files hashed before this are hashed again.
    #[serde(default)]
    pub rehash_older_than: Option<i64>,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_workers() -> usize {
    1
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            index_batch_size: DEFAULT_BATCH_SIZE,
            hash_batch_size: DEFAULT_BATCH_SIZE,
            stats_batch_size: DEFAULT_BATCH_SIZE,
            skip_hidden: false,
            index_workers: default_workers(),
            ignore_patterns: Vec::new(),
            rehash_older_than: None,
        }
    }
}

/// Load `Filed.toml` from the working directory (if present), then apply
/// `FILED_*` environment overrides.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    load_from("Filed")
}

pub fn load_from(name: &str) -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name(name).required(false))
        .add_source(Environment::with_prefix("FILED"))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}
