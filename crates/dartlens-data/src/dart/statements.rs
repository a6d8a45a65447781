//! Single-company full financial statements (`fnlttSinglAcntAll.json`).

use super::client::{DartClient, StatusEnvelope};
use crate::error::{DataError, Result};
use dartlens_ratios::{LineItem, RawPeriod, StatementBasis};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Report code for annual business reports
pub const ANNUAL_REPORT_CODE: &str = "11011";

/// One statement row as returned by DART.
///
/// Only the fields the ratio engine and reports need are typed; the rest of
/// the payload is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementRow {
    /// Statement division code (BS, IS, CIS, CF, SCE)
    #[serde(default)]
    pub sj_div: String,
    /// Statement name (e.g. "재무상태표")
    #[serde(default)]
    pub sj_nm: String,
    /// Standard account id, if the filer used one
    #[serde(default)]
    pub account_id: Option<String>,
    /// Account name as disclosed
    #[serde(default)]
    pub account_nm: String,
    /// Current period amount
    #[serde(default)]
    pub thstrm_amount: Option<String>,
    /// Prior period amount
    #[serde(default)]
    pub frmtrm_amount: Option<String>,
    /// Currency
    #[serde(default)]
    pub currency: Option<String>,
}

impl From<&StatementRow> for LineItem {
    fn from(row: &StatementRow) -> Self {
        Self {
            statement_name: row.sj_nm.clone(),
            account_name: row.account_nm.clone(),
            amount: row.thstrm_amount.clone(),
        }
    }
}

/// A successful statement response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementResponse {
    /// Rows in disclosure order
    #[serde(default)]
    pub list: Vec<StatementRow>,
}

impl StatementResponse {
    /// Convert to a raw period for the ratio engine.
    pub fn to_raw_period(&self) -> RawPeriod {
        self.list.iter().map(LineItem::from).collect()
    }
}

#[derive(Debug, Deserialize)]
struct StatementEnvelope {
    #[serde(flatten)]
    status: StatusEnvelope,
    #[serde(default)]
    list: Vec<StatementRow>,
}

impl StatementEnvelope {
    fn into_response(self) -> Result<Option<StatementResponse>> {
        if !self.status.check()? {
            return Ok(None);
        }
        Ok(Some(StatementResponse { list: self.list }))
    }
}

/// Parse a statement response body.
///
/// Returns `Ok(None)` for DART's "no data" status.
///
/// # Errors
/// Returns `DataError::DartApi` for any other non-success status and
/// `DataError::Serialization` for malformed JSON.
pub fn parse_statement_response(body: &str) -> Result<Option<StatementResponse>> {
    let envelope: StatementEnvelope = serde_json::from_str(body)?;
    envelope.into_response()
}

impl DartClient {
    /// Fetch the annual full financial statements for one year and basis.
    ///
    /// # Returns
    /// `None` when DART reports no data for the combination.
    ///
    /// # Errors
    /// Returns an error for network failures and non-success DART statuses.
    pub async fn financial_statements(
        &self,
        corp_code: &str,
        year: i32,
        basis: StatementBasis,
    ) -> Result<Option<StatementResponse>> {
        if corp_code.trim().is_empty() {
            return Err(DataError::InvalidInput("Empty corp code".to_string()));
        }

        let params = [
            ("corp_code", corp_code.to_string()),
            ("bsns_year", year.to_string()),
            ("reprt_code", ANNUAL_REPORT_CODE.to_string()),
            ("fs_div", basis.code().to_string()),
        ];
        let envelope: StatementEnvelope = self.get_json("fnlttSinglAcntAll.json", &params).await?;

        let response = envelope.into_response()?;
        match &response {
            Some(response) => {
                debug!(corp_code, year, %basis, rows = response.list.len(), "fetched statements");
            }
            None => debug!(corp_code, year, %basis, "no statements on DART"),
        }
        Ok(response)
    }
}
