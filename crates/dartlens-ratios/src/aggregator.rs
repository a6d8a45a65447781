//! Multi-year aggregation.
//!
//! Drives fetching, partitioning, resolution and ratio computation across a
//! set of fiscal years. Years are always processed in ascending order so the
//! prior year's sales can be threaded into the sales growth ratio, and every
//! requested year produces exactly one record.

use crate::accounts::{CanonicalAccount, CandidateTable};
use crate::calculator::{ResolvedPeriod, compute_ratios};
use crate::diagnostics::{
    DEFAULT_CUTOFF, DEFAULT_MAX_SUGGESTIONS, DiagnosticSink, NearMiss, TracingSink, suggest,
};
use crate::error::{RatioError, Result};
use crate::item::RawPeriod;
use crate::partition::partition;
use crate::resolver::resolve;
use crate::series::RatioTimeSeries;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Whether figures are consolidated or for the parent company alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatementBasis {
    /// Parent and subsidiaries (DART `CFS`)
    Consolidated,
    /// Parent only (DART `OFS`)
    Separate,
}

impl StatementBasis {
    /// DART `fs_div` code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Consolidated => "CFS",
            Self::Separate => "OFS",
        }
    }

    /// Korean display name.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Consolidated => "연결",
            Self::Separate => "별도",
        }
    }

    /// Parse a DART `fs_div` code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "CFS" => Some(Self::Consolidated),
            "OFS" => Some(Self::Separate),
            _ => None,
        }
    }
}

impl fmt::Display for StatementBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Supplies raw periods to the aggregator.
///
/// `None` means the period is unavailable for that basis, whatever the
/// underlying reason. Implementations must return in bounded time.
pub trait PeriodSource {
    /// Fetch one period.
    fn fetch(&self, year: i32, basis: StatementBasis) -> Option<RawPeriod>;
}

impl<F> PeriodSource for F
where
    F: Fn(i32, StatementBasis) -> Option<RawPeriod>,
{
    fn fetch(&self, year: i32, basis: StatementBasis) -> Option<RawPeriod> {
        self(year, basis)
    }
}

/// Periods fetched ahead of time, keyed by year and basis.
///
/// Lets an async caller do all I/O up front and then run the synchronous
/// aggregation.
#[derive(Debug, Clone, Default)]
pub struct PrefetchedPeriods {
    periods: HashMap<(i32, StatementBasis), RawPeriod>,
}

impl PrefetchedPeriods {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a period.
    pub fn insert(&mut self, year: i32, basis: StatementBasis, period: RawPeriod) {
        self.periods.insert((year, basis), period);
    }

    /// Whether a usable period is stored.
    pub fn has_usable(&self, year: i32, basis: StatementBasis) -> bool {
        self.periods
            .get(&(year, basis))
            .is_some_and(RawPeriod::is_usable)
    }

    /// Number of stored periods.
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }
}

impl PeriodSource for PrefetchedPeriods {
    fn fetch(&self, year: i32, basis: StatementBasis) -> Option<RawPeriod> {
        self.periods.get(&(year, basis)).cloned()
    }
}

/// What happened to one requested year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodOutcome {
    /// Fiscal year
    pub year: i32,
    /// Basis whose data was used, `None` if the period was unavailable
    pub basis: Option<StatementBasis>,
    /// Resolved account values
    pub resolved: ResolvedPeriod,
}

impl PeriodOutcome {
    /// Whether any data was found for the year.
    pub const fn is_available(&self) -> bool {
        self.basis.is_some()
    }
}

/// Ratio series together with per-year resolution details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateReport {
    /// Ratio records, ascending by year
    pub series: RatioTimeSeries,
    /// Per-year outcomes, ascending by year
    pub periods: Vec<PeriodOutcome>,
}

/// Drives resolution and ratio computation across years.
pub struct Aggregator {
    table: CandidateTable,
    primary: StatementBasis,
    secondary: StatementBasis,
    sink: Arc<dyn DiagnosticSink>,
}

impl Aggregator {
    /// Create an aggregator with a candidate table.
    ///
    /// Consolidated statements are preferred with separate statements as
    /// the fallback, and near misses are logged through `tracing`.
    pub fn new(table: CandidateTable) -> Self {
        Self {
            table,
            primary: StatementBasis::Consolidated,
            secondary: StatementBasis::Separate,
            sink: Arc::new(TracingSink),
        }
    }

    /// Route near-miss diagnostics to a different sink.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Override the basis order.
    pub const fn with_bases(mut self, primary: StatementBasis, secondary: StatementBasis) -> Self {
        self.primary = primary;
        self.secondary = secondary;
        self
    }

    /// The candidate table in use.
    pub const fn table(&self) -> &CandidateTable {
        &self.table
    }

    /// Basis order as (primary, secondary).
    pub const fn bases(&self) -> (StatementBasis, StatementBasis) {
        (self.primary, self.secondary)
    }

    /// Compute one ratio record per requested year.
    ///
    /// # Errors
    /// Returns an error only for contract violations: an empty or duplicated
    /// year list, or an invalid candidate table. Unavailable data never fails.
    pub fn aggregate<S>(&self, years: &[i32], source: &S) -> Result<RatioTimeSeries>
    where
        S: PeriodSource + ?Sized,
    {
        self.aggregate_detailed(years, source)
            .map(|report| report.series)
    }

    /// Like [`aggregate`](Self::aggregate) but also reports which basis was
    /// used and what was resolved for each year.
    ///
    /// # Errors
    /// Same as [`aggregate`](Self::aggregate).
    pub fn aggregate_detailed<S>(&self, years: &[i32], source: &S) -> Result<AggregateReport>
    where
        S: PeriodSource + ?Sized,
    {
        let ordered = validate_years(years)?;
        self.table.validate()?;

        let mut records = Vec::with_capacity(ordered.len());
        let mut periods = Vec::with_capacity(ordered.len());
        let mut previous: Option<(i32, Option<f64>)> = None;

        for year in ordered {
            let outcome = self.process_year(year, source);

            let prior_sales = match previous {
                Some((prior_year, sales)) if year.checked_sub(1) == Some(prior_year) => sales,
                _ => None,
            };
            records.push(compute_ratios(year, &outcome.resolved, prior_sales));
            previous = Some((year, outcome.resolved.get(CanonicalAccount::Sales)));
            periods.push(outcome);
        }

        let available = periods.iter().filter(|p| p.is_available()).count();
        info!(
            requested = periods.len(),
            available, "aggregated financial ratios"
        );

        Ok(AggregateReport {
            series: RatioTimeSeries::from_records(records),
            periods,
        })
    }

    /// Resolve every canonical account for one period.
    ///
    /// Each account is looked up first in the statement groups named for its
    /// statement kind, in alias priority order, and then across the whole
    /// period including ungrouped items.
    pub fn resolve_period(&self, year: i32, period: &RawPeriod) -> ResolvedPeriod {
        let groups = partition(&period.list);
        let mut resolved = ResolvedPeriod::new();

        for account in CanonicalAccount::ALL {
            let candidates = self.table.candidates(account);
            let scoped = self
                .table
                .statement_names(account.statement())
                .iter()
                .flat_map(|alias| groups.matching(alias))
                .find_map(|items| resolve(items.iter().copied(), candidates));

            let value = scoped.or_else(|| {
                let fallback = resolve(&period.list, candidates);
                if fallback.is_some() {
                    debug!(year, %account, "resolved outside its statement group");
                }
                fallback
            });

            if value.is_none() {
                self.report_near_miss(year, account, period);
            }
            resolved.set(account, value);
        }

        resolved
    }

    fn process_year<S>(&self, year: i32, source: &S) -> PeriodOutcome
    where
        S: PeriodSource + ?Sized,
    {
        for basis in [self.primary, self.secondary] {
            match source.fetch(year, basis) {
                Some(period) if period.is_usable() => {
                    debug!(year, %basis, items = period.len(), "using period");
                    return PeriodOutcome {
                        year,
                        basis: Some(basis),
                        resolved: self.resolve_period(year, &period),
                    };
                }
                _ => debug!(year, %basis, "period unavailable"),
            }
        }

        warn!(year, "no usable statements on any basis, recording all ratios as missing");
        PeriodOutcome {
            year,
            basis: None,
            resolved: ResolvedPeriod::new(),
        }
    }

    fn report_near_miss(&self, year: i32, account: CanonicalAccount, period: &RawPeriod) {
        let suggestions = suggest(
            period.list.iter().map(|item| item.account_name.as_str()),
            self.table.candidates(account),
            DEFAULT_CUTOFF,
            DEFAULT_MAX_SUGGESTIONS,
        );
        self.sink.near_miss(&NearMiss {
            year,
            account,
            suggestions,
        });
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(CandidateTable::default())
    }
}

impl fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aggregator")
            .field("primary", &self.primary)
            .field("secondary", &self.secondary)
            .finish_non_exhaustive()
    }
}

/// Check the requested years and return them in ascending order.
fn validate_years(years: &[i32]) -> Result<Vec<i32>> {
    if years.is_empty() {
        return Err(RatioError::EmptyYears);
    }

    let mut seen = HashSet::with_capacity(years.len());
    if let Some(duplicate) = years.iter().find(|year| !seen.insert(**year)) {
        return Err(RatioError::DuplicateYear(*duplicate));
    }

    let mut ordered = years.to_vec();
    ordered.sort_unstable();
    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;
    use crate::item::LineItem;

    fn period(items: &[(&str, &str, &str)]) -> RawPeriod {
        items
            .iter()
            .map(|(statement, account, amount)| LineItem::new(*statement, *account, *amount))
            .collect()
    }

    #[test]
    fn test_validate_years() {
        assert_eq!(validate_years(&[2023, 2021, 2022]).unwrap(), vec![2021, 2022, 2023]);
        assert_eq!(validate_years(&[]), Err(RatioError::EmptyYears));
        assert_eq!(
            validate_years(&[2021, 2022, 2021]),
            Err(RatioError::DuplicateYear(2021))
        );
    }

    #[test]
    fn test_invalid_table_rejected_before_fetch() {
        let table = CandidateTable::default()
            .with_candidates(CanonicalAccount::Sales, Vec::<String>::new());
        let fetched = std::cell::Cell::new(0);
        let source = |_: i32, _: StatementBasis| -> Option<RawPeriod> {
            fetched.set(fetched.get() + 1);
            None
        };
        let result = Aggregator::new(table).aggregate(&[2023], &source);
        assert!(matches!(result, Err(RatioError::InvalidCandidates { .. })));
        assert_eq!(fetched.get(), 0);
    }

    #[test]
    fn test_scoped_resolution_prefers_statement_group() {
        let raw = period(&[
            ("자본변동표", "자본총계", "999"),
            ("재무상태표", "자본총계", "600"),
        ]);
        let resolved = Aggregator::default().resolve_period(2023, &raw);
        assert_eq!(resolved.get(CanonicalAccount::TotalEquity), Some(600.0));
    }

    #[test]
    fn test_income_statement_priority() {
        let raw = period(&[
            ("포괄손익계산서", "당기순이익", "10"),
            ("손익계산서", "당기순이익", "20"),
        ]);
        let resolved = Aggregator::default().resolve_period(2023, &raw);
        assert_eq!(resolved.get(CanonicalAccount::NetIncome), Some(20.0));
    }

    #[test]
    fn test_falls_back_to_whole_period() {
        let raw = period(&[("", "자산총계", "1000"), ("현금흐름표", "매출액", "50")]);
        let resolved = Aggregator::default().resolve_period(2023, &raw);
        assert_eq!(resolved.get(CanonicalAccount::TotalAssets), Some(1000.0));
        assert_eq!(resolved.get(CanonicalAccount::Sales), Some(50.0));
    }

    #[test]
    fn test_near_miss_reported_without_changing_result() {
        let raw = period(&[("재무상태표", "자산총게", "1000")]);
        let sink = Arc::new(CollectingSink::new());
        let aggregator = Aggregator::default().with_sink(sink.clone());

        let resolved = aggregator.resolve_period(2023, &raw);
        assert_eq!(resolved.get(CanonicalAccount::TotalAssets), None);

        let reports = sink.take();
        let total_assets = reports
            .iter()
            .find(|r| r.account == CanonicalAccount::TotalAssets)
            .unwrap();
        assert_eq!(total_assets.suggestions[0].account_name, "자산총게");
        assert_eq!(reports.len(), CanonicalAccount::ALL.len());
    }

    #[test]
    fn test_sales_growth_at_lowest_year() {
        let source = |year: i32, _: StatementBasis| -> Option<RawPeriod> {
            let sales = if year == i32::MIN { "100" } else { "150" };
            Some(period(&[("손익계산서", "매출액", sales)]))
        };
        let years = [i32::MIN + 1, i32::MIN];
        let series = Aggregator::default().aggregate(&years, &source).unwrap();

        assert_eq!(series.years(), vec![i32::MIN, i32::MIN + 1]);
        assert_eq!(series.get(i32::MIN).unwrap().sales_growth, None);
        assert_eq!(series.get(i32::MIN + 1).unwrap().sales_growth, Some(50.0));
    }

    #[test]
    fn test_prefetched_periods() {
        let mut store = PrefetchedPeriods::new();
        store.insert(2023, StatementBasis::Consolidated, RawPeriod::default());
        store.insert(
            2023,
            StatementBasis::Separate,
            period(&[("재무상태표", "자산총계", "1")]),
        );
        assert!(!store.has_usable(2023, StatementBasis::Consolidated));
        assert!(store.has_usable(2023, StatementBasis::Separate));
        assert!(store.fetch(2024, StatementBasis::Separate).is_none());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_basis_codes() {
        assert_eq!(StatementBasis::Consolidated.code(), "CFS");
        assert_eq!(StatementBasis::from_code("OFS"), Some(StatementBasis::Separate));
        assert_eq!(StatementBasis::from_code("XYZ"), None);
    }
}
