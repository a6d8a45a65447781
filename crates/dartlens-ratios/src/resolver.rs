//! Account resolution over a set of line items.
//!
//! Resolution is layered and deterministic:
//!
//! 1. **Exact**: the normalized account name equals a normalized candidate.
//! 2. **Substring**: a normalized candidate occurs inside the normalized
//!    account name.
//!
//! Within a tier candidates are tried in priority order, and for a given
//! candidate the first matching item in input order wins. An item whose
//! amount does not parse is skipped and the search continues. The exact tier
//! is exhausted before the substring tier is consulted.

use crate::item::LineItem;
use crate::normalize::normalize;
use serde::{Deserialize, Serialize};

/// Which matching tier produced a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    /// Normalized names are equal
    Exact,
    /// Normalized candidate is contained in the normalized account name
    Substring,
}

impl MatchTier {
    fn matches(self, account_key: &str, candidate_key: &str) -> bool {
        match self {
            Self::Exact => account_key == candidate_key,
            Self::Substring => account_key.contains(candidate_key),
        }
    }
}

/// A successful resolution and where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountMatch {
    /// Parsed amount
    pub value: f64,
    /// Tier that matched
    pub tier: MatchTier,
    /// Candidate that matched, as configured
    pub candidate: String,
    /// Account name of the matched item, as disclosed
    pub account_name: String,
}

/// Resolve a value from line items using ranked candidates.
///
/// Returns `None` when no candidate matches an item with a parsable amount.
///
/// # Example
/// ```
/// use dartlens_ratios::{LineItem, resolve};
///
/// let items = vec![LineItem::new("재무상태표", "유동자산", "1,234,500")];
/// let candidates = vec!["유동자산".to_string(), "CurrentAssets".to_string()];
/// assert_eq!(resolve(&items, &candidates), Some(1_234_500.0));
/// ```
pub fn resolve<'a, I>(items: I, candidates: &[String]) -> Option<f64>
where
    I: IntoIterator<Item = &'a LineItem>,
{
    resolve_match(items, candidates).map(|found| found.value)
}

/// Like [`resolve`] but reports the tier, candidate and item that matched.
pub fn resolve_match<'a, I>(items: I, candidates: &[String]) -> Option<AccountMatch>
where
    I: IntoIterator<Item = &'a LineItem>,
{
    let items: Vec<(String, &LineItem)> = items
        .into_iter()
        .map(|item| (normalize(&item.account_name), item))
        .collect();
    if items.is_empty() {
        return None;
    }

    let keys: Vec<(String, &String)> = candidates
        .iter()
        .map(|candidate| (normalize(candidate), candidate))
        .filter(|(key, _)| !key.is_empty())
        .collect();

    search_tier(&items, &keys, MatchTier::Exact)
        .or_else(|| search_tier(&items, &keys, MatchTier::Substring))
}

fn search_tier(
    items: &[(String, &LineItem)],
    keys: &[(String, &String)],
    tier: MatchTier,
) -> Option<AccountMatch> {
    keys.iter().find_map(|(key, candidate)| {
        items
            .iter()
            .filter(|(account_key, _)| tier.matches(account_key, key))
            .find_map(|(_, item)| {
                item.amount_value().map(|value| AccountMatch {
                    value,
                    tier,
                    candidate: (*candidate).clone(),
                    account_name: item.account_name.clone(),
                })
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_exact_match_with_separators() {
        let items = vec![LineItem::new("재무상태표", "유동자산", "1,234,500")];
        let found = resolve(&items, &candidates(&["유동자산", "CurrentAssets"]));
        assert_eq!(found, Some(1_234_500.0));
    }

    #[test]
    fn test_exact_beats_higher_priority_substring() {
        let items = vec![
            LineItem::new("재무상태표", "유동자산 합계", "10"),
            LineItem::new("재무상태표", "CurrentAssets", "20"),
        ];
        let found = resolve_match(&items, &candidates(&["유동자산", "CurrentAssets"])).unwrap();
        assert_eq!(found.value, 20.0);
        assert_eq!(found.tier, MatchTier::Exact);
        assert_eq!(found.candidate, "CurrentAssets");
    }

    #[test]
    fn test_candidate_priority_beats_input_order() {
        let items = vec![
            LineItem::new("재무상태표", "총자산", "1"),
            LineItem::new("재무상태표", "자산총계", "2"),
        ];
        assert_eq!(resolve(&items, &candidates(&["자산총계", "총자산"])), Some(2.0));
    }

    #[test]
    fn test_first_item_wins_within_candidate() {
        let items = vec![
            LineItem::new("손익계산서", "영업이익", "7"),
            LineItem::new("손익계산서", "영업이익", "9"),
        ];
        assert_eq!(resolve(&items, &candidates(&["영업이익"])), Some(7.0));
    }

    #[test]
    fn test_normalization_applies_to_both_sides() {
        let items = vec![LineItem::new("손익계산서", "당기순이익(손실)", "-50")];
        assert_eq!(resolve(&items, &candidates(&["당기 순이익"])), Some(-50.0));
    }

    #[test]
    fn test_substring_tier() {
        let items = vec![LineItem::new("손익계산서", "Ⅰ. 매출액", "900")];
        let found = resolve_match(&items, &candidates(&["매출액"])).unwrap();
        assert_eq!(found.value, 900.0);
        assert_eq!(found.tier, MatchTier::Substring);
        assert_eq!(found.account_name, "Ⅰ. 매출액");
    }

    #[test]
    fn test_unparsable_item_is_skipped() {
        let items = vec![
            LineItem::new("재무상태표", "자산총계", "-"),
            LineItem::without_amount("재무상태표", "자산총계"),
            LineItem::new("재무상태표", "자산총계", "3,000"),
        ];
        assert_eq!(resolve(&items, &candidates(&["자산총계"])), Some(3_000.0));
    }

    #[test]
    fn test_unparsable_exact_falls_through_to_next_candidate() {
        let items = vec![
            LineItem::new("재무상태표", "자산총계", "N/A"),
            LineItem::new("재무상태표", "총자산", "5"),
        ];
        assert_eq!(resolve(&items, &candidates(&["자산총계", "총자산"])), Some(5.0));
    }

    #[test]
    fn test_zero_is_a_value() {
        let items = vec![LineItem::new("손익계산서", "이자비용", "0")];
        assert_eq!(resolve(&items, &candidates(&["이자비용"])), Some(0.0));
    }

    #[test]
    fn test_empty_and_non_matching() {
        let none: Vec<LineItem> = Vec::new();
        assert_eq!(resolve(&none, &candidates(&["자산총계"])), None);

        let items = vec![LineItem::new("재무상태표", "현금및현금성자산", "5")];
        assert_eq!(resolve(&items, &candidates(&["자산총계", "총자산"])), None);
        assert_eq!(resolve(&items, &[]), None);
    }

    #[test]
    fn test_blank_candidate_never_matches_everything() {
        let items = vec![LineItem::new("재무상태표", "현금", "5")];
        assert_eq!(resolve(&items, &candidates(&["  ", "(주석)"])), None);
    }
}
