#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/dartlens/dartlens/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod company;

// Re-export main types from sub-crates
pub use dartlens_data as data;
pub use dartlens_output as output;
pub use dartlens_ratios as ratios;
pub use dartlens_risk as risk;

pub use company::{CompanyName, InputError, default_years, default_years_now};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
