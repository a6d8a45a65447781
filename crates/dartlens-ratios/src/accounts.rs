//! Canonical accounts and the ranked candidate table used to find them.

use crate::error::{RatioError, Result};
use crate::normalize::normalize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The statement a canonical account is reported on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    /// Statement of financial position
    BalanceSheet,

    /// Income statement or statement of comprehensive income
    IncomeStatement,
}

impl StatementKind {
    /// All statement kinds.
    pub const ALL: [Self; 2] = [Self::BalanceSheet, Self::IncomeStatement];

    /// Stable snake_case key.
    pub const fn key(&self) -> &'static str {
        match self {
            Self::BalanceSheet => "balance_sheet",
            Self::IncomeStatement => "income_statement",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The nine accounts extracted from every period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalAccount {
    /// 유동자산
    CurrentAssets,

    /// 유동부채
    CurrentLiabilities,

    /// 자산총계
    TotalAssets,

    /// 부채총계
    TotalLiabilities,

    /// 자본총계
    TotalEquity,

    /// 당기순이익
    NetIncome,

    /// 매출액
    Sales,

    /// 영업이익
    OperatingProfit,

    /// 이자비용
    InterestExpense,
}

impl CanonicalAccount {
    /// All canonical accounts in resolution order.
    pub const ALL: [Self; 9] = [
        Self::CurrentAssets,
        Self::CurrentLiabilities,
        Self::TotalAssets,
        Self::TotalLiabilities,
        Self::TotalEquity,
        Self::NetIncome,
        Self::Sales,
        Self::OperatingProfit,
        Self::InterestExpense,
    ];

    /// Stable snake_case key.
    pub const fn key(&self) -> &'static str {
        match self {
            Self::CurrentAssets => "current_assets",
            Self::CurrentLiabilities => "current_liabilities",
            Self::TotalAssets => "total_assets",
            Self::TotalLiabilities => "total_liabilities",
            Self::TotalEquity => "total_equity",
            Self::NetIncome => "net_income",
            Self::Sales => "sales",
            Self::OperatingProfit => "operating_profit",
            Self::InterestExpense => "interest_expense",
        }
    }

    /// Korean display name.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::CurrentAssets => "유동자산",
            Self::CurrentLiabilities => "유동부채",
            Self::TotalAssets => "자산총계",
            Self::TotalLiabilities => "부채총계",
            Self::TotalEquity => "자본총계",
            Self::NetIncome => "당기순이익",
            Self::Sales => "매출액",
            Self::OperatingProfit => "영업이익",
            Self::InterestExpense => "이자비용",
        }
    }

    /// Statement this account is expected on.
    pub const fn statement(&self) -> StatementKind {
        match self {
            Self::CurrentAssets
            | Self::CurrentLiabilities
            | Self::TotalAssets
            | Self::TotalLiabilities
            | Self::TotalEquity => StatementKind::BalanceSheet,
            Self::NetIncome | Self::Sales | Self::OperatingProfit | Self::InterestExpense => {
                StatementKind::IncomeStatement
            }
        }
    }

    /// Parse an account from its key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|account| account.key() == key)
    }
}

impl fmt::Display for CanonicalAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

const CURRENT_ASSETS: &[&str] = &[
    "유동자산",
    "유동 자산",
    "유동자산계",
    "유동자산총계",
    "CurrentAssets",
    "TotalCurrentAssets",
];

const CURRENT_LIABILITIES: &[&str] = &[
    "유동부채",
    "유동 부채",
    "유동부채계",
    "유동부채총계",
    "CurrentLiabilities",
    "TotalCurrentLiabilities",
];

const TOTAL_ASSETS: &[&str] = &[
    "자산총계",
    "총자산",
    "자산 총계",
    "총 자산",
    "자산총액",
    "TotalAssets",
    "AssetsTotal",
];

const TOTAL_LIABILITIES: &[&str] = &[
    "부채총계",
    "총부채",
    "부채 총계",
    "총 부채",
    "부채총액",
    "TotalLiabilities",
    "LiabilitiesTotal",
];

const TOTAL_EQUITY: &[&str] = &[
    "자본총계",
    "총자본",
    "자본 총계",
    "총 자본",
    "자본총액",
    "TotalEquity",
    "EquityTotal",
];

const NET_INCOME: &[&str] = &[
    "당기순이익",
    "순이익",
    "당기순이익(손실)",
    "당기순손실",
    "NetIncome",
    "NetProfit",
    "분기순이익",
    "반기순이익",
    "분기순손익",
    "반기순손익",
    "지배기업의 소유주에게 귀속되는 당기순이익(손실)",
    "지배기업 소유주지분",
    "지배기업의 소유주에게 귀속되는 당기순이익",
    "비지배지분에 귀속되는 당기순이익(손실)",
];

const SALES: &[&str] = &[
    "매출액",
    "매출",
    "수익",
    "영업수익",
    "영업매출",
    "매출총액",
    "Revenue",
    "Sales",
    "수익(매출액)",
];

const OPERATING_PROFIT: &[&str] = &[
    "영업이익",
    "영업손익",
    "영업이익(손실)",
    "영업손실",
    "OperatingProfit",
    "OperatingIncome",
];

const INTEREST_EXPENSE: &[&str] = &[
    "이자비용",
    "이자 비용",
    "금융비용",
    "이자",
    "InterestExpense",
    "Interest",
];

const BALANCE_SHEET_NAMES: &[&str] = &[
    "재무상태표",
    "연결재무상태표",
    "대차대조표",
    "Statement of financial position",
    "Balance sheet",
];

const INCOME_STATEMENT_NAMES: &[&str] = &[
    "손익계산서",
    "연결손익계산서",
    "포괄손익계산서",
    "연결포괄손익계산서",
    "Income statement",
    "Statement of comprehensive income",
];

/// Ranked candidate names per canonical account, plus the statement names
/// each statement kind may appear under.
///
/// Earlier entries win: the resolver tries candidates in order and the
/// aggregator tries statement names in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateTable {
    candidates: BTreeMap<CanonicalAccount, Vec<String>>,
    statements: BTreeMap<StatementKind, Vec<String>>,
}

impl CandidateTable {
    /// Create an empty table.
    ///
    /// An empty table does not validate; populate every account and
    /// statement kind before handing it to an aggregator.
    pub const fn empty() -> Self {
        Self {
            candidates: BTreeMap::new(),
            statements: BTreeMap::new(),
        }
    }

    /// Replace the candidates for an account.
    pub fn with_candidates<I, S>(mut self, account: CanonicalAccount, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.candidates
            .insert(account, names.into_iter().map(Into::into).collect());
        self
    }

    /// Replace the statement names for a statement kind.
    pub fn with_statement_names<I, S>(mut self, kind: StatementKind, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.statements
            .insert(kind, names.into_iter().map(Into::into).collect());
        self
    }

    /// Append a lowest-priority candidate to an account.
    pub fn push_candidate(&mut self, account: CanonicalAccount, name: impl Into<String>) {
        self.candidates.entry(account).or_default().push(name.into());
    }

    /// Ranked candidates for an account.
    pub fn candidates(&self, account: CanonicalAccount) -> &[String] {
        self.candidates.get(&account).map_or(&[], Vec::as_slice)
    }

    /// Ranked statement names for a statement kind.
    pub fn statement_names(&self, kind: StatementKind) -> &[String] {
        self.statements.get(&kind).map_or(&[], Vec::as_slice)
    }

    /// Check that every account and statement kind is usable.
    ///
    /// # Errors
    /// Returns `RatioError::InvalidCandidates` if an account has no
    /// candidates or a candidate normalizes to an empty string, and
    /// `RatioError::InvalidStatementNames` for the same faults in the
    /// statement name lists.
    pub fn validate(&self) -> Result<()> {
        for account in CanonicalAccount::ALL {
            let names = self.candidates(account);
            if names.is_empty() {
                return Err(RatioError::InvalidCandidates {
                    account: account.key().to_string(),
                    reason: "no candidates configured".to_string(),
                });
            }
            if let Some(bad) = names.iter().find(|name| normalize(name).is_empty()) {
                return Err(RatioError::InvalidCandidates {
                    account: account.key().to_string(),
                    reason: format!("candidate {bad:?} is empty after normalization"),
                });
            }
        }

        for kind in StatementKind::ALL {
            let names = self.statement_names(kind);
            if names.is_empty() {
                return Err(RatioError::InvalidStatementNames {
                    kind: kind.key().to_string(),
                    reason: "no statement names configured".to_string(),
                });
            }
            if let Some(bad) = names.iter().find(|name| normalize(name).is_empty()) {
                return Err(RatioError::InvalidStatementNames {
                    kind: kind.key().to_string(),
                    reason: format!("statement name {bad:?} is empty after normalization"),
                });
            }
        }

        Ok(())
    }
}

impl Default for CandidateTable {
    /// The table tuned for DART single-company full statements.
    fn default() -> Self {
        Self::empty()
            .with_candidates(CanonicalAccount::CurrentAssets, CURRENT_ASSETS.iter().copied())
            .with_candidates(
                CanonicalAccount::CurrentLiabilities,
                CURRENT_LIABILITIES.iter().copied(),
            )
            .with_candidates(CanonicalAccount::TotalAssets, TOTAL_ASSETS.iter().copied())
            .with_candidates(
                CanonicalAccount::TotalLiabilities,
                TOTAL_LIABILITIES.iter().copied(),
            )
            .with_candidates(CanonicalAccount::TotalEquity, TOTAL_EQUITY.iter().copied())
            .with_candidates(CanonicalAccount::NetIncome, NET_INCOME.iter().copied())
            .with_candidates(CanonicalAccount::Sales, SALES.iter().copied())
            .with_candidates(
                CanonicalAccount::OperatingProfit,
                OPERATING_PROFIT.iter().copied(),
            )
            .with_candidates(
                CanonicalAccount::InterestExpense,
                INTEREST_EXPENSE.iter().copied(),
            )
            .with_statement_names(StatementKind::BalanceSheet, BALANCE_SHEET_NAMES.iter().copied())
            .with_statement_names(
                StatementKind::IncomeStatement,
                INCOME_STATEMENT_NAMES.iter().copied(),
            )
    }
}
