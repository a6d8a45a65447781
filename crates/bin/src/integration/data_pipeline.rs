//! Data pipeline for resolving a company and computing its ratio series.
//!
//! Statement responses are fetched concurrently and cached in SQLite, then
//! handed to the synchronous aggregator through [`PrefetchedPeriods`].

use super::cache_manager;
use dartlens_data::cache::SqliteCache;
use dartlens_data::dart::{CorpCode, DartClient};
use dartlens_data::error::DataError;
use dartlens_ratios::{
    AggregateReport, Aggregator, CandidateTable, PrefetchedPeriods, RatioError, RawPeriod,
    StatementBasis,
};
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Error type for data pipeline operations.
#[derive(Debug, thiserror::Error)]
pub(crate) enum DataPipelineError {
    /// DART or cache failure.
    #[error("Data fetch error: {0}")]
    Fetch(#[from] DataError),
    /// Invalid aggregation request.
    #[error("Ratio error: {0}")]
    Ratio(#[from] RatioError),
}

/// Configuration for data fetching.
#[derive(Debug, Clone)]
pub(crate) struct FetchConfig {
    /// Whether to use the cache.
    pub use_cache: bool,
    /// Whether to force refresh (ignore cached entries, still write new ones).
    pub force_refresh: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            use_cache: true,
            force_refresh: false,
        }
    }
}

impl FetchConfig {
    const fn reads_cache(&self) -> bool {
        self.use_cache && !self.force_refresh
    }
}

/// Default number of concurrent statement requests.
const DEFAULT_CONCURRENCY: usize = 4;

/// Days a cached "no data" answer is trusted before DART is asked again.
const NO_DATA_MAX_AGE_DAYS: i64 = 7;

type SharedCache = Arc<Mutex<Option<SqliteCache>>>;

fn open_shared_cache(config: &FetchConfig) -> SharedCache {
    let cache = if config.use_cache {
        cache_manager::open_cache()
            .inspect_err(|e| warn!(error = %e, "cache unavailable"))
            .ok()
    } else {
        None
    };
    Arc::new(Mutex::new(cache))
}

/// Resolve a company name to its DART registry entry.
///
/// The cached registry is consulted first; on a miss the full registry is
/// downloaded and stored.
pub(crate) async fn resolve_corp(
    client: &DartClient,
    company: &str,
    config: &FetchConfig,
) -> Result<CorpCode, DataPipelineError> {
    let cache = if config.use_cache {
        cache_manager::open_cache().ok()
    } else {
        None
    };

    if config.reads_cache()
        && let Some(ref cache) = cache
        && let Ok(Some(entry)) = cache.get_corp_code(company)
    {
        debug!(company, corp_code = %entry.corp_code, "corp code from cache");
        return Ok(entry);
    }

    let registry = client.fetch_corp_codes().await?;
    if let Some(ref cache) = cache
        && let Err(e) = cache.put_corp_codes(registry.entries())
    {
        warn!(error = %e, "failed to cache corp codes");
    }

    registry
        .find_exact(company)
        .cloned()
        .ok_or_else(|| DataError::CorpNotFound(company.to_string()).into())
}

/// Search the registry by substring, listed companies first.
pub(crate) async fn search_corps(
    client: &DartClient,
    query: &str,
    limit: usize,
) -> Result<Vec<CorpCode>, DataPipelineError> {
    let registry = client.fetch_corp_codes().await?;
    Ok(registry.search(query, limit).into_iter().cloned().collect())
}

/// Fetch one period, cache first.
///
/// Cached "no data" answers older than [`NO_DATA_MAX_AGE_DAYS`] are
/// re-fetched. Network failures and DART errors are logged and treated as an
/// unavailable period; they are not cached.
async fn fetch_period(
    client: &DartClient,
    cache: &SharedCache,
    corp_code: &str,
    year: i32,
    basis: StatementBasis,
    config: &FetchConfig,
) -> Option<RawPeriod> {
    if config.reads_cache() {
        let guard = cache.lock().await;
        if let Some(ref cache) = *guard
            && let Ok(Some(response)) =
                cache.get_statement_fresh(corp_code, year, basis, NO_DATA_MAX_AGE_DAYS)
        {
            debug!(corp_code, year, %basis, "statements from cache");
            return Some(response.to_raw_period());
        }
    }

    match client.financial_statements(corp_code, year, basis).await {
        Ok(response) => {
            let response = response.unwrap_or_default();
            let guard = cache.lock().await;
            if let Some(ref cache) = *guard
                && let Err(e) = cache.put_statement(corp_code, year, basis, &response)
            {
                warn!(corp_code, year, %basis, error = %e, "failed to cache statements");
            }
            Some(response.to_raw_period())
        }
        Err(e) => {
            warn!(corp_code, year, %basis, error = %e, "statement fetch failed");
            None
        }
    }
}

async fn fetch_basis(
    client: &DartClient,
    cache: &SharedCache,
    corp_code: &str,
    years: Vec<i32>,
    basis: StatementBasis,
    config: &FetchConfig,
    progress: Option<&ProgressBar>,
) -> Vec<(i32, Option<RawPeriod>)> {
    stream::iter(years)
        .map(|year| async move {
            let period = fetch_period(client, cache, corp_code, year, basis, config).await;
            if let Some(pb) = progress {
                pb.inc(1);
            }
            (year, period)
        })
        .buffer_unordered(DEFAULT_CONCURRENCY)
        .collect()
        .await
}

/// Fetch the primary basis for every year, then the secondary basis for
/// the years whose primary response was unusable.
pub(crate) async fn prefetch_periods(
    client: &DartClient,
    corp_code: &str,
    years: &[i32],
    bases: (StatementBasis, StatementBasis),
    config: &FetchConfig,
    progress: Option<&ProgressBar>,
) -> PrefetchedPeriods {
    let cache = open_shared_cache(config);
    let (primary, secondary) = bases;
    let mut periods = PrefetchedPeriods::new();

    if let Some(pb) = progress {
        pb.set_length(years.len() as u64);
        pb.set_message(format!("Fetching {primary} statements..."));
    }
    for (year, period) in fetch_basis(
        client,
        &cache,
        corp_code,
        years.to_vec(),
        primary,
        config,
        progress,
    )
    .await
    {
        if let Some(period) = period {
            periods.insert(year, primary, period);
        }
    }

    let fallback: Vec<i32> = years
        .iter()
        .copied()
        .filter(|&year| !periods.has_usable(year, primary))
        .collect();
    if !fallback.is_empty() {
        if let Some(pb) = progress {
            pb.inc_length(fallback.len() as u64);
            pb.set_message(format!("Fetching {secondary} statements..."));
        }
        for (year, period) in
            fetch_basis(client, &cache, corp_code, fallback, secondary, config, progress).await
        {
            if let Some(period) = period {
                periods.insert(year, secondary, period);
            }
        }
    }

    periods
}

/// Fetch statements and compute the ratio series for `years`.
pub(crate) async fn compute_ratio_report(
    client: &DartClient,
    corp_code: &str,
    years: &[i32],
    config: &FetchConfig,
    progress: Option<&ProgressBar>,
) -> Result<AggregateReport, DataPipelineError> {
    let aggregator = Aggregator::new(CandidateTable::default());
    aggregator.table().validate()?;
    if years.is_empty() {
        return Err(RatioError::EmptyYears.into());
    }

    let periods =
        prefetch_periods(client, corp_code, years, aggregator.bases(), config, progress).await;
    Ok(aggregator.aggregate_detailed(years, &periods)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_config_cache_reads() {
        assert!(FetchConfig::default().reads_cache());
        let refresh = FetchConfig {
            use_cache: true,
            force_refresh: true,
        };
        assert!(!refresh.reads_cache());
        let disabled = FetchConfig {
            use_cache: false,
            force_refresh: false,
        };
        assert!(!disabled.reads_cache());
    }
}
