#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/dartlens/dartlens/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod paths;
pub mod report;
pub mod table;

pub use export::{CsvOptions, ExportError, ExportFormat, Exporter, series_to_csv};
pub use paths::{company_dir, sanitize_filename, unique_path};
pub use report::{Report, ReportBuilder, ReportError, Section};
pub use table::{render_ascii, render_markdown, to_dataframe};
