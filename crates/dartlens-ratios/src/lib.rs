#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/dartlens/dartlens/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod accounts;
pub mod aggregator;
pub mod calculator;
pub mod diagnostics;
pub mod error;
pub mod item;
pub mod normalize;
pub mod partition;
pub mod resolver;
pub mod series;

pub use accounts::{CandidateTable, CanonicalAccount, StatementKind};
pub use aggregator::{
    AggregateReport, Aggregator, PeriodOutcome, PeriodSource, PrefetchedPeriods, StatementBasis,
};
pub use calculator::{Ratio, RatioRecord, ResolvedPeriod, compute_ratios};
pub use diagnostics::{CollectingSink, DiagnosticSink, NearMiss, NullSink, Suggestion, TracingSink};
pub use error::{RatioError, Result};
pub use item::{LineItem, RawPeriod, parse_amount};
pub use normalize::normalize;
pub use partition::{StatementGroups, partition};
pub use resolver::{AccountMatch, MatchTier, resolve, resolve_match};
pub use series::RatioTimeSeries;
