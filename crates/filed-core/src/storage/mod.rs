pub mod models;
pub mod paginator;
pub mod queries;
pub mod sqlite;

pub use paginator::{DuplicateGroupPaginator, FilePaginator, Paginator};
pub use sqlite::Database;
