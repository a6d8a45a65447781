//! Near-miss diagnostics for unresolved accounts.
//!
//! When an account cannot be resolved, the aggregator looks for disclosed
//! account names that are close to one of its candidates and hands them to a
//! [`DiagnosticSink`]. Suggestions are informational only and never feed back
//! into resolution, so swapping the sink for [`NullSink`] changes no output.

use crate::accounts::CanonicalAccount;
use crate::normalize::normalize;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::debug;

/// Minimum similarity for a name to be reported.
pub const DEFAULT_CUTOFF: f64 = 0.6;

/// Maximum number of suggestions per unresolved account.
pub const DEFAULT_MAX_SUGGESTIONS: usize = 3;

/// A disclosed account name that resembles a candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Account name as disclosed
    pub account_name: String,
    /// Candidate it most resembles
    pub candidate: String,
    /// Similarity in `[0, 1]` between the normalized forms
    pub similarity: f64,
}

/// Report for one account that could not be resolved in one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearMiss {
    /// Fiscal year of the period
    pub year: i32,
    /// Account that was not found
    pub account: CanonicalAccount,
    /// Closest disclosed names, best first
    pub suggestions: Vec<Suggestion>,
}

/// Receives near-miss reports.
pub trait DiagnosticSink: Send + Sync {
    /// Called once per unresolved account per period.
    fn near_miss(&self, report: &NearMiss);
}

/// Logs near misses at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn near_miss(&self, report: &NearMiss) {
        if report.suggestions.is_empty() {
            debug!(year = report.year, account = %report.account, "account not found");
            return;
        }
        let names: Vec<String> = report
            .suggestions
            .iter()
            .map(|s| format!("{} ({:.2})", s.account_name, s.similarity))
            .collect();
        debug!(
            year = report.year,
            account = %report.account,
            suggestions = %names.join(", "),
            "account not found, similar names disclosed"
        );
    }
}

/// Discards every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn near_miss(&self, _report: &NearMiss) {}
}

/// Keeps every report in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    reports: Mutex<Vec<NearMiss>>,
}

impl CollectingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the reports received so far.
    pub fn reports(&self) -> Vec<NearMiss> {
        self.reports
            .lock()
            .map(|reports| reports.clone())
            .unwrap_or_default()
    }

    /// Remove and return the reports received so far.
    pub fn take(&self) -> Vec<NearMiss> {
        self.reports
            .lock()
            .map(|mut reports| std::mem::take(&mut *reports))
            .unwrap_or_default()
    }
}

impl DiagnosticSink for CollectingSink {
    fn near_miss(&self, report: &NearMiss) {
        if let Ok(mut reports) = self.reports.lock() {
            reports.push(report.clone());
        }
    }
}

/// Find disclosed names resembling any candidate.
///
/// Each distinct name is scored against its closest candidate; names at or
/// above `cutoff` are returned best first, ties in input order, at most
/// `limit` of them.
pub fn suggest<'a, I>(
    account_names: I,
    candidates: &[String],
    cutoff: f64,
    limit: usize,
) -> Vec<Suggestion>
where
    I: IntoIterator<Item = &'a str>,
{
    let keys: Vec<(String, &String)> = candidates
        .iter()
        .map(|candidate| (normalize(candidate), candidate))
        .filter(|(key, _)| !key.is_empty())
        .collect();

    let mut seen = std::collections::HashSet::new();
    let mut scored: Vec<Suggestion> = Vec::new();

    for name in account_names {
        if !seen.insert(name) {
            continue;
        }
        let normalized = normalize(name);
        let best = keys
            .iter()
            .map(|(key, candidate)| (similarity(&normalized, key), *candidate))
            .fold(None, |best: Option<(f64, &String)>, current| match best {
                Some(b) if b.0 >= current.0 => Some(b),
                _ => Some(current),
            });

        if let Some((score, candidate)) = best
            && score >= cutoff
        {
            scored.push(Suggestion {
                account_name: name.to_string(),
                candidate: candidate.clone(),
                similarity: score,
            });
        }
    }

    scored.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    scored.truncate(limit);
    scored
}

/// Normalized Levenshtein similarity: `1 - distance / longer length`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / longest as f64
}

fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}
