//! CSV and JSON export of ratio series.
//!
//! A CSV file has one row per year: a `year` column followed by one column
//! per ratio in presentation order. Missing ratios are written as empty
//! cells so that spreadsheet tools do not mistake them for zero.

use dartlens_ratios::{Ratio, RatioRecord, RatioTimeSeries};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// UTF-8 byte order mark, for spreadsheet tools that need it to detect
/// Korean text.
const UTF8_BOM: &str = "\u{feff}";

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// DataFrame construction error.
    #[error("DataFrame error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }

    /// Parse a format name (`csv`, `json`, `pretty-json`).
    ///
    /// # Errors
    /// Returns `ExportError::InvalidFormat` for unknown names.
    pub fn from_name(name: &str) -> Result<Self, ExportError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// CSV layout options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CsvOptions {
    /// Use Korean labels (`연도`, `유동비율(%)`, ...) instead of keys
    pub korean_labels: bool,
    /// Prefix the output with a UTF-8 byte order mark
    pub bom: bool,
    /// Decimal places; `None` writes full precision
    pub precision: Option<usize>,
}

impl CsvOptions {
    /// Options for a spreadsheet-friendly file: Korean labels, BOM, two
    /// decimals.
    pub const fn spreadsheet() -> Self {
        Self {
            korean_labels: true,
            bom: true,
            precision: Some(2),
        }
    }
}

fn format_cell(value: Option<f64>, precision: Option<usize>) -> String {
    match (value, precision) {
        (None, _) => String::new(),
        (Some(v), Some(p)) => format!("{v:.p$}"),
        (Some(v), None) => v.to_string(),
    }
}

fn header(options: &CsvOptions) -> Vec<&'static str> {
    let year = if options.korean_labels { "연도" } else { "year" };
    std::iter::once(year)
        .chain(Ratio::ALL.iter().map(|ratio| {
            if options.korean_labels {
                ratio.label()
            } else {
                ratio.key()
            }
        }))
        .collect()
}

fn row(record: &RatioRecord, options: &CsvOptions) -> Vec<String> {
    std::iter::once(record.year.to_string())
        .chain(
            record
                .values()
                .map(|(_, value)| format_cell(value, options.precision)),
        )
        .collect()
}

/// Render `series` as CSV with the given layout.
///
/// # Errors
/// Returns an error if CSV writing fails.
pub fn series_to_csv(
    series: &RatioTimeSeries,
    options: &CsvOptions,
) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(header(options))?;
    for record in series {
        wtr.write_record(row(record, options))?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    let data = String::from_utf8(bytes)
        .map_err(|e| ExportError::InvalidFormat(format!("CSV output is not UTF-8: {e}")))?;

    Ok(if options.bom {
        format!("{UTF8_BOM}{data}")
    } else {
        data
    })
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

impl Exporter for RatioTimeSeries {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => series_to_csv(self, &CsvOptions::default()),
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

impl Exporter for RatioRecord {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => series_to_csv(
                &RatioTimeSeries::from_records(vec![self.clone()]),
                &CsvOptions::default(),
            ),
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn series() -> RatioTimeSeries {
        let mut first = RatioRecord::missing(2023);
        first.current_ratio = Some(150.0);
        first.debt_ratio = Some(66.666_666);

        let mut second = RatioRecord::missing(2024);
        second.current_ratio = Some(140.5);
        second.sales_growth = Some(-12.5);

        RatioTimeSeries::from_records(vec![second, first])
    }

    #[test]
    fn test_csv_header_and_missing_cells() {
        let csv = series().export_to_string(ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "year,current_ratio,debt_ratio,roa,roe,sales_growth,operating_margin,net_margin,asset_turnover,interest_coverage"
        );
        assert_eq!(lines[1], "2023,150,66.666666,,,,,,,");
        assert_eq!(lines[2], "2024,140.5,,,,-12.5,,,,");
        assert!(!csv.contains(",0,"));
    }

    #[test]
    fn test_csv_spreadsheet_options() {
        let csv = series_to_csv(&series(), &CsvOptions::spreadsheet()).unwrap();
        assert!(csv.starts_with("\u{feff}연도,유동비율(%),부채비율(%)"));
        assert!(csv.contains("2023,150.00,66.67,,"));
    }

    #[test]
    fn test_json_nulls() {
        let json = series().export_to_string(ExportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["year"], 2023);
        assert!(value[0]["roa"].is_null());
        assert_eq!(value[1]["sales_growth"], -12.5);
    }

    #[test]
    fn test_pretty_json() {
        let json = series().export_to_string(ExportFormat::PrettyJson).unwrap();
        assert!(json.contains("\n  "));
    }

    #[test]
    fn test_single_record_csv() {
        let csv = RatioRecord::missing(2020)
            .export_to_string(ExportFormat::Csv)
            .unwrap();
        assert_eq!(csv.lines().nth(1), Some("2020,,,,,,,,,"));
    }

    #[test]
    fn test_export_to_file() {
        let path = std::env::temp_dir().join("dartlens_export_test.csv");
        series().export_to_file(&path, ExportFormat::Csv).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("2024,140.5"));
        std::fs::remove_file(path).ok();
    }

    #[rstest]
    #[case("csv", ExportFormat::Csv)]
    #[case("JSON", ExportFormat::Json)]
    #[case("pretty-json", ExportFormat::PrettyJson)]
    fn test_from_name(#[case] name: &str, #[case] expected: ExportFormat) {
        assert_eq!(ExportFormat::from_name(name).unwrap(), expected);
    }

    #[test]
    fn test_from_name_rejects_unknown() {
        assert!(matches!(
            ExportFormat::from_name("xlsx"),
            Err(ExportError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_export_format_extension() {
        assert_eq!(ExportFormat::Csv.extension(), "csv");
        assert_eq!(ExportFormat::Json.extension(), "json");
        assert_eq!(ExportFormat::PrettyJson.extension(), "json");
    }
}
