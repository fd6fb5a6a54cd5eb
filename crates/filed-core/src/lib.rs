pub mod analysis;
pub mod config;
pub mod engine;
pub mod error;
pub mod hasher;
pub mod platform;
pub mod progress;
pub mod scanner;
pub mod storage;
pub mod units;

pub use config::AppConfig;
pub use engine::{Engine, RunResult};
pub use error::{Error, Result};
pub use progress::{ProgressReporter, SilentReporter};
