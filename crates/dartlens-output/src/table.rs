//! Table views of a ratio series.

use crate::export::ExportError;
use dartlens_ratios::{Ratio, RatioTimeSeries};
use polars::prelude::*;

/// Placeholder for a missing value.
pub const MISSING: &str = "-";

fn cell(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| format!("{v:.2}"))
}

/// Render a GitHub-flavoured Markdown table, one row per year.
pub fn render_markdown(series: &RatioTimeSeries) -> String {
    let mut output = String::new();

    output.push_str("| 연도 |");
    for ratio in Ratio::ALL {
        output.push_str(&format!(" {} |", ratio.label()));
    }
    output.push('\n');

    output.push_str("|---|");
    output.push_str(&"---:|".repeat(Ratio::ALL.len()));
    output.push('\n');

    for record in series {
        output.push_str(&format!("| {} |", record.year));
        for (_, value) in record.values() {
            output.push_str(&format!(" {} |", cell(value)));
        }
        output.push('\n');
    }

    output
}

/// Render a fixed-width text table for terminals.
pub fn render_ascii(series: &RatioTimeSeries) -> String {
    let width = 18 + 12 * series.len();
    let mut output = String::new();

    output.push_str(&format!("{:<18}", "Ratio"));
    for year in series.years() {
        output.push_str(&format!("{year:>12}"));
    }
    output.push('\n');
    output.push_str(&"-".repeat(width));
    output.push('\n');

    for ratio in Ratio::ALL {
        output.push_str(&format!("{:<18}", ratio.key()));
        for (_, value) in series.column(ratio) {
            output.push_str(&format!("{:>12}", cell(value)));
        }
        output.push('\n');
    }

    output
}

/// Convert to a DataFrame with an `year` column and one nullable `Float64`
/// column per ratio key.
///
/// # Errors
/// Returns an error if the frame cannot be assembled.
pub fn to_dataframe(series: &RatioTimeSeries) -> Result<DataFrame, ExportError> {
    let mut columns: Vec<Column> = Vec::with_capacity(Ratio::ALL.len() + 1);
    columns.push(Series::new("year".into(), series.years()).into());

    for ratio in Ratio::ALL {
        let values: Vec<Option<f64>> = series.column(ratio).into_iter().map(|(_, v)| v).collect();
        columns.push(Series::new(ratio.key().into(), values).into());
    }

    Ok(DataFrame::new(columns)?)
}
