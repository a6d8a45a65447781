//! Raw financial statement line items.

use serde::{Deserialize, Serialize};

/// One disclosed financial statement entry for a period.
///
/// Amounts are kept as the filer formatted them and only parsed on demand,
/// so an unparsable amount stays distinguishable from a legitimate zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Statement the entry belongs to (e.g. "재무상태표"); empty when unknown
    pub statement_name: String,
    /// Account name as disclosed
    pub account_name: String,
    /// Amount text with thousands separators, if any was disclosed
    pub amount: Option<String>,
}

impl LineItem {
    /// Create a line item with an amount.
    pub fn new(
        statement_name: impl Into<String>,
        account_name: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            statement_name: statement_name.into(),
            account_name: account_name.into(),
            amount: Some(amount.into()),
        }
    }

    /// Create a line item whose amount was not disclosed.
    pub fn without_amount(
        statement_name: impl Into<String>,
        account_name: impl Into<String>,
    ) -> Self {
        Self {
            statement_name: statement_name.into(),
            account_name: account_name.into(),
            amount: None,
        }
    }

    /// Parsed amount, or `None` if it is missing or unparsable.
    pub fn amount_value(&self) -> Option<f64> {
        self.amount.as_deref().and_then(parse_amount)
    }

    /// Whether the item carries no statement name.
    pub fn is_ungrouped(&self) -> bool {
        self.statement_name.trim().is_empty()
    }
}

/// The full set of line items returned for one (year, basis) fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPeriod {
    /// Line items in disclosure order
    pub list: Vec<LineItem>,
}

impl RawPeriod {
    /// Create a period from its line items.
    pub const fn new(list: Vec<LineItem>) -> Self {
        Self { list }
    }

    /// A period with no line items is treated the same as an unavailable one.
    pub fn is_usable(&self) -> bool {
        !self.list.is_empty()
    }

    /// Number of line items.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Whether the period has no line items.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

impl From<Vec<LineItem>> for RawPeriod {
    fn from(list: Vec<LineItem>) -> Self {
        Self::new(list)
    }
}

impl FromIterator<LineItem> for RawPeriod {
    fn from_iter<I: IntoIterator<Item = LineItem>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Parse a disclosed amount.
///
/// Thousands separators are stripped. Blank text, a lone `-`, text that is
/// not a number and non-finite values all parse to `None`. An amount wrapped
/// in parentheses is read as negative.
///
/// # Example
/// ```
/// use dartlens_ratios::parse_amount;
///
/// assert_eq!(parse_amount("1,234,500"), Some(1_234_500.0));
/// assert_eq!(parse_amount("(3,000)"), Some(-3_000.0));
/// assert_eq!(parse_amount("0"), Some(0.0));
/// assert_eq!(parse_amount("-"), None);
/// ```
pub fn parse_amount(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let (negative, body) = match trimmed
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
    {
        Some(inner) => (true, inner.trim()),
        None => (false, trimmed),
    };

    let cleaned: String = body.chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }

    let value: f64 = cleaned.parse().ok()?;
    if !value.is_finite() {
        return None;
    }

    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1,234,500", Some(1_234_500.0))]
    #[case("  42 ", Some(42.0))]
    #[case("-1,000", Some(-1_000.0))]
    #[case("(1,000)", Some(-1_000.0))]
    #[case("0", Some(0.0))]
    #[case("12.5", Some(12.5))]
    #[case("", None)]
    #[case("   ", None)]
    #[case("-", None)]
    #[case("N/A", None)]
    #[case("1,2a4", None)]
    #[case("inf", None)]
    #[case("NaN", None)]
    fn test_parse_amount(#[case] input: &str, #[case] expected: Option<f64>) {
        assert_eq!(parse_amount(input), expected);
    }

    #[test]
    fn test_amount_value_missing() {
        let item = LineItem::without_amount("재무상태표", "자산총계");
        assert_eq!(item.amount_value(), None);
    }

    #[test]
    fn test_zero_amount_is_present() {
        let item = LineItem::new("손익계산서", "이자비용", "0");
        assert_eq!(item.amount_value(), Some(0.0));
    }

    #[test]
    fn test_ungrouped() {
        assert!(LineItem::new("", "자산총계", "1").is_ungrouped());
        assert!(LineItem::new("  ", "자산총계", "1").is_ungrouped());
        assert!(!LineItem::new("재무상태표", "자산총계", "1").is_ungrouped());
    }

    #[test]
    fn test_raw_period_usable() {
        assert!(!RawPeriod::default().is_usable());
        let period: RawPeriod = vec![LineItem::new("재무상태표", "자산총계", "1")]
            .into_iter()
            .collect();
        assert!(period.is_usable());
        assert_eq!(period.len(), 1);
    }
}
