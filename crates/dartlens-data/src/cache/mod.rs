//! Caching layer for DART data.

pub mod sqlite;

pub use sqlite::{CacheStats, SqliteCache};
