//! Workflow stages behind the CLI commands.
//!
//! Configuration loading, the statement cache, ratio data fetching and the
//! risk summary stage.

pub(crate) mod cache_manager;
pub(crate) mod config;
pub(crate) mod data_pipeline;
pub(crate) mod risk_pipeline;
