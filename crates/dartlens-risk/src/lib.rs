#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/dartlens/dartlens/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod analyst;
pub mod audit;
pub mod chunking;
pub mod error;
pub mod industry;
pub mod llm;
pub mod summarize;

// Re-export main types
pub use analyst::{AnalystConfig, RiskAnalyst, RiskInputs, RiskSummary};
pub use error::{Result, RiskError};
pub use industry::{Industry, IndustryCategory};
pub use llm::{ChatClient, LlmConfig, TextGenerator};
pub use summarize::summarize_chunks;
