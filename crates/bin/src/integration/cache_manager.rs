//! Location of the statement cache.

use dartlens_data::cache::SqliteCache;
use dartlens_data::error::DataError;
use std::path::PathBuf;

/// Get the default cache directory path.
///
/// Uses platform-specific cache directories:
/// - Linux: `~/.cache/dartlens/`
/// - macOS: `~/Library/Caches/dartlens/`
/// - Windows: `%LOCALAPPDATA%\dartlens\`
pub(crate) fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dartlens")
}

/// Get the cache database path.
pub(crate) fn cache_path() -> PathBuf {
    default_cache_dir().join("dartlens.db")
}

/// Open the cache, creating the directory if needed.
pub(crate) fn open_cache() -> Result<SqliteCache, DataError> {
    let path = cache_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    SqliteCache::new(&path)
}

/// Print the cache location and contents.
pub(crate) fn print_cache_info() {
    println!("  Cache location: {}", cache_path().display());
    if let Ok(stats) = open_cache().and_then(|cache| cache.get_stats()) {
        println!(
            "  Cached data: {} statements for {} companies, {} corp codes",
            stats.statements, stats.companies, stats.corp_codes
        );
    }
}
