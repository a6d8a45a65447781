//! Risk summary reports.

use crate::paths::{sanitize_filename, unique_path};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A titled block of report text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Heading shown in brackets.
    pub title: String,
    /// Section text.
    pub body: String,
}

/// A risk report for one company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Company being analyzed.
    pub company: String,

    /// Report generation timestamp.
    pub timestamp: DateTime<Utc>,

    /// Years covered by the ratio table.
    pub years: Vec<i32>,

    /// Free text placed before the sections.
    pub body: String,

    /// Additional sections in display order.
    pub sections: Vec<Section>,
}

impl Report {
    /// Create a new report stamped with the current time.
    pub fn new(company: String, body: String) -> Self {
        Self {
            company,
            timestamp: Utc::now(),
            years: Vec::new(),
            body,
            sections: Vec::new(),
        }
    }

    /// Plain-text form written to disk.
    pub fn to_text(&self) -> String {
        let mut output = format!(
            "{} 리스크 분석 보고서\n생성 시각: {}\n",
            self.company,
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        );
        if let (Some(first), Some(last)) = (self.years.first(), self.years.last()) {
            output.push_str(&format!("분석 기간: {first}~{last}\n"));
        }
        output.push_str(&"=".repeat(45));
        output.push('\n');

        let body = self.body.trim();
        if !body.is_empty() {
            output.push('\n');
            output.push_str(body);
            output.push('\n');
        }
        for section in &self.sections {
            output.push_str(&format!("\n[{}]\n{}\n", section.title, section.body.trim()));
        }

        output
    }

    /// Convert report to JSON string.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Default file stem, `<company>_risk_summary`.
    pub fn file_stem(&self) -> String {
        format!("{}_risk_summary", sanitize_filename(&self.company))
    }

    /// Write the text form into `dir` without overwriting an earlier report.
    ///
    /// Returns the path written.
    ///
    /// # Errors
    /// Returns an error if the directory or file cannot be written.
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf, ReportError> {
        fs::create_dir_all(dir)?;
        let path = unique_path(&dir.join(format!("{}.txt", self.file_stem())));
        fs::write(&path, self.to_text())?;
        Ok(path)
    }
}

/// Builder for creating reports.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    company: Option<String>,
    years: Vec<i32>,
    body: Option<String>,
    sections: Vec<Section>,
}

impl ReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the company.
    pub fn company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    /// Set the years covered.
    pub fn years(mut self, years: Vec<i32>) -> Self {
        self.years = years;
        self
    }

    /// Set the leading text.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Append a section.
    pub fn section(mut self, title: impl Into<String>, body: impl Into<String>) -> Self {
        self.sections.push(Section {
            title: title.into(),
            body: body.into(),
        });
        self
    }

    /// Build the report.
    pub fn build(self) -> Report {
        let mut report = Report::new(self.company.unwrap_or_default(), self.body.unwrap_or_default());
        report.years = self.years;
        report.sections = self.sections;
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_creation() {
        let report = Report::new("삼성전자".to_string(), "본문".to_string());
        assert_eq!(report.company, "삼성전자");
        assert!(report.sections.is_empty());
        assert_eq!(report.file_stem(), "삼성전자_risk_summary");
    }

    #[test]
    fn test_report_builder() {
        let report = ReportBuilder::new()
            .company("A/B")
            .years(vec![2020, 2021, 2022])
            .body("요약")
            .section("재무비율 해설", "안정적")
            .build();

        assert_eq!(report.company, "A/B");
        assert_eq!(report.file_stem(), "A_B_risk_summary");

        let text = report.to_text();
        assert!(text.starts_with("A/B 리스크 분석 보고서\n"));
        assert!(text.contains("분석 기간: 2020~2022\n"));
        assert!(text.contains("\n요약\n"));
        assert!(text.ends_with("\n[재무비율 해설]\n안정적\n"));
    }

    #[test]
    fn test_to_json() {
        let report = ReportBuilder::new().company("X").section("t", "b").build();
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(value["company"], "X");
        assert_eq!(value["sections"][0]["title"], "t");
    }
}
