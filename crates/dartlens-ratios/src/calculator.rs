//! Ratio computation with explicit absence semantics.
//!
//! A ratio is `None` whenever an operand is missing or its divisor is zero.
//! Division never produces infinities or NaN and a legitimate zero numerator
//! still yields a zero ratio.

use crate::accounts::CanonicalAccount;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

const PERCENT: f64 = 100.0;
const TIMES: f64 = 1.0;

/// Resolved account values for one period.
///
/// Every canonical account is always present as a key; absence is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPeriod {
    values: BTreeMap<CanonicalAccount, Option<f64>>,
}

impl ResolvedPeriod {
    /// A period with every account absent.
    pub fn new() -> Self {
        Self {
            values: CanonicalAccount::ALL
                .into_iter()
                .map(|account| (account, None))
                .collect(),
        }
    }

    /// Value of an account.
    pub fn get(&self, account: CanonicalAccount) -> Option<f64> {
        self.values.get(&account).copied().flatten()
    }

    /// Set the value of an account.
    pub fn set(&mut self, account: CanonicalAccount, value: Option<f64>) {
        self.values.insert(account, value);
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, account: CanonicalAccount, value: f64) -> Self {
        self.set(account, Some(value));
        self
    }

    /// All accounts and their values in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (CanonicalAccount, Option<f64>)> + '_ {
        self.values.iter().map(|(account, value)| (*account, *value))
    }

    /// Accounts that could not be resolved.
    pub fn missing(&self) -> Vec<CanonicalAccount> {
        self.iter()
            .filter_map(|(account, value)| value.is_none().then_some(account))
            .collect()
    }
}

impl Default for ResolvedPeriod {
    fn default() -> Self {
        Self::new()
    }
}

/// The nine derived ratios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ratio {
    /// Current assets / current liabilities (%)
    CurrentRatio,
    /// Total liabilities / total equity (%)
    DebtRatio,
    /// Net income / total assets (%)
    Roa,
    /// Net income / total equity (%)
    Roe,
    /// Year-over-year change in sales (%)
    SalesGrowth,
    /// Operating profit / sales (%)
    OperatingMargin,
    /// Net income / sales (%)
    NetMargin,
    /// Sales / total assets (times)
    AssetTurnover,
    /// Operating profit / interest expense (times)
    InterestCoverage,
}

impl Ratio {
    /// All ratios in presentation order.
    pub const ALL: [Self; 9] = [
        Self::CurrentRatio,
        Self::DebtRatio,
        Self::Roa,
        Self::Roe,
        Self::SalesGrowth,
        Self::OperatingMargin,
        Self::NetMargin,
        Self::AssetTurnover,
        Self::InterestCoverage,
    ];

    /// Stable snake_case key, also the serialized field name.
    pub const fn key(&self) -> &'static str {
        match self {
            Self::CurrentRatio => "current_ratio",
            Self::DebtRatio => "debt_ratio",
            Self::Roa => "roa",
            Self::Roe => "roe",
            Self::SalesGrowth => "sales_growth",
            Self::OperatingMargin => "operating_margin",
            Self::NetMargin => "net_margin",
            Self::AssetTurnover => "asset_turnover",
            Self::InterestCoverage => "interest_coverage",
        }
    }

    /// Korean column label with unit.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::CurrentRatio => "유동비율(%)",
            Self::DebtRatio => "부채비율(%)",
            Self::Roa => "ROA(%)",
            Self::Roe => "ROE(%)",
            Self::SalesGrowth => "매출액증가율(%)",
            Self::OperatingMargin => "영업이익률(%)",
            Self::NetMargin => "순이익률(%)",
            Self::AssetTurnover => "총자산회전율(회)",
            Self::InterestCoverage => "이자보상배율(배)",
        }
    }

    /// Whether the ratio is expressed in percent.
    pub const fn is_percentage(&self) -> bool {
        !matches!(self, Self::AssetTurnover | Self::InterestCoverage)
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ratios for one year. Every field is always serialized; absence is `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioRecord {
    /// Fiscal year
    pub year: i32,
    /// 유동비율(%)
    pub current_ratio: Option<f64>,
    /// 부채비율(%)
    pub debt_ratio: Option<f64>,
    /// ROA(%)
    pub roa: Option<f64>,
    /// ROE(%)
    pub roe: Option<f64>,
    /// 매출액증가율(%)
    pub sales_growth: Option<f64>,
    /// 영업이익률(%)
    pub operating_margin: Option<f64>,
    /// 순이익률(%)
    pub net_margin: Option<f64>,
    /// 총자산회전율(회)
    pub asset_turnover: Option<f64>,
    /// 이자보상배율(배)
    pub interest_coverage: Option<f64>,
}

impl RatioRecord {
    /// A record with every ratio absent.
    pub const fn missing(year: i32) -> Self {
        Self {
            year,
            current_ratio: None,
            debt_ratio: None,
            roa: None,
            roe: None,
            sales_growth: None,
            operating_margin: None,
            net_margin: None,
            asset_turnover: None,
            interest_coverage: None,
        }
    }

    /// Value of a ratio.
    pub const fn get(&self, ratio: Ratio) -> Option<f64> {
        match ratio {
            Ratio::CurrentRatio => self.current_ratio,
            Ratio::DebtRatio => self.debt_ratio,
            Ratio::Roa => self.roa,
            Ratio::Roe => self.roe,
            Ratio::SalesGrowth => self.sales_growth,
            Ratio::OperatingMargin => self.operating_margin,
            Ratio::NetMargin => self.net_margin,
            Ratio::AssetTurnover => self.asset_turnover,
            Ratio::InterestCoverage => self.interest_coverage,
        }
    }

    /// All ratios and their values in presentation order.
    pub fn values(&self) -> impl Iterator<Item = (Ratio, Option<f64>)> + '_ {
        Ratio::ALL.into_iter().map(|ratio| (ratio, self.get(ratio)))
    }

    /// Whether no ratio could be computed.
    pub fn is_all_missing(&self) -> bool {
        self.values().all(|(_, value)| value.is_none())
    }
}

/// Divide when both operands exist and the divisor is nonzero.
fn checked_ratio(numerator: Option<f64>, denominator: Option<f64>, scale: f64) -> Option<f64> {
    match (numerator, denominator) {
        (Some(n), Some(d)) if d != 0.0 => Some(n * scale / d).filter(|v| v.is_finite()),
        _ => None,
    }
}

/// Compute the nine ratios for one period.
///
/// `prior_sales` is the previous fiscal year's resolved sales, used only for
/// sales growth.
///
/// # Example
/// ```
/// use dartlens_ratios::{CanonicalAccount, ResolvedPeriod, compute_ratios};
///
/// let resolved = ResolvedPeriod::new()
///     .with(CanonicalAccount::CurrentAssets, 150.0)
///     .with(CanonicalAccount::CurrentLiabilities, 100.0);
/// let record = compute_ratios(2024, &resolved, None);
/// assert_eq!(record.current_ratio, Some(150.0));
/// assert_eq!(record.sales_growth, None);
/// ```
pub fn compute_ratios(year: i32, resolved: &ResolvedPeriod, prior_sales: Option<f64>) -> RatioRecord {
    use CanonicalAccount::*;

    let sales = resolved.get(Sales);
    let net_income = resolved.get(NetIncome);
    let operating_profit = resolved.get(OperatingProfit);
    let total_assets = resolved.get(TotalAssets);
    let total_equity = resolved.get(TotalEquity);
    let sales_change = sales.zip(prior_sales).map(|(current, prior)| current - prior);

    RatioRecord {
        year,
        current_ratio: checked_ratio(
            resolved.get(CurrentAssets),
            resolved.get(CurrentLiabilities),
            PERCENT,
        ),
        debt_ratio: checked_ratio(resolved.get(TotalLiabilities), total_equity, PERCENT),
        roa: checked_ratio(net_income, total_assets, PERCENT),
        roe: checked_ratio(net_income, total_equity, PERCENT),
        sales_growth: checked_ratio(sales_change, prior_sales, PERCENT),
        operating_margin: checked_ratio(operating_profit, sales, PERCENT),
        net_margin: checked_ratio(net_income, sales, PERCENT),
        asset_turnover: checked_ratio(sales, total_assets, TIMES),
        interest_coverage: checked_ratio(
            operating_profit,
            resolved.get(InterestExpense),
            TIMES,
        ),
    }
}
