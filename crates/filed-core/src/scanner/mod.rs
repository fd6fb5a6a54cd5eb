mod concurrent;
pub mod walk;

pub use walk::{IndexOptions, IndexStats, Indexer};
