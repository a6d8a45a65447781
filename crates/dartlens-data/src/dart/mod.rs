//! DART (Data Analysis, Retrieval and Transfer System) Open API access.
//!
//! This module provides:
//! - Corp-code registry download and company name lookup
//! - Company overview and disclosure listings
//! - Single-company full financial statements per year and basis
//!
//! # Example
//!
//! ```no_run
//! use dartlens_data::dart::{DartClient, DartConfig};
//! use dartlens_ratios::StatementBasis;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = DartClient::new(DartConfig::new("my-dart-key"))?;
//!     let corp = client.corp_code_for("삼성전자").await?;
//!
//!     if let Some(statements) = client
//!         .financial_statements(&corp.corp_code, 2023, StatementBasis::Consolidated)
//!         .await?
//!     {
//!         println!("{} rows", statements.list.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod corp_code;
pub mod disclosures;
pub mod statements;

pub use client::{DartClient, DartConfig};
pub use corp_code::{CorpCode, CorpCodeRegistry};
pub use disclosures::{
    CompanyInfo, Disclosure, DisclosurePage, DisclosureQuery, KeyReport, RecentFilings,
    filter_disclosures, parse_company_info,
};
pub use statements::{StatementResponse, StatementRow, parse_statement_response};
