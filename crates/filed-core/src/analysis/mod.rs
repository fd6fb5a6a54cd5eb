pub mod statistics;

pub use statistics::{StatisticsAggregator, StatsSummary};
