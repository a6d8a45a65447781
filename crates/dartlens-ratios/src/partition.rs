//! Statement partitioning.
//!
//! Groups a period's line items by statement name so that accounts with the
//! same name on different statements never collide during resolution.

use crate::item::LineItem;
use crate::normalize::normalize;
use std::collections::HashMap;

/// Line items of one period grouped by statement name.
///
/// Groups keep first-seen order and items keep input order within a group.
/// Items without a statement name land in the ungrouped bucket.
#[derive(Debug, Clone, Default)]
pub struct StatementGroups<'a> {
    groups: Vec<(&'a str, Vec<&'a LineItem>)>,
    ungrouped: Vec<&'a LineItem>,
}

impl<'a> StatementGroups<'a> {
    /// Items for an exact statement name.
    pub fn get(&self, statement_name: &str) -> Option<&[&'a LineItem]> {
        self.groups
            .iter()
            .find(|(name, _)| *name == statement_name)
            .map(|(_, items)| items.as_slice())
    }

    /// Groups whose normalized statement name equals the normalized alias.
    pub fn matching<'s>(&'s self, alias: &str) -> impl Iterator<Item = &'s [&'a LineItem]> + 's {
        let wanted = normalize(alias);
        self.groups
            .iter()
            .filter(move |(name, _)| normalize(name) == wanted)
            .map(|(_, items)| items.as_slice())
    }

    /// Statement names in first-seen order.
    pub fn names(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.groups.iter().map(|(name, _)| *name)
    }

    /// Items that carried no statement name.
    pub fn ungrouped(&self) -> &[&'a LineItem] {
        &self.ungrouped
    }

    /// Number of named groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether there are no named groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Split line items into statement groups.
///
/// This is a pure grouping: nothing is filtered, reordered or deduplicated.
pub fn partition(items: &[LineItem]) -> StatementGroups<'_> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut result = StatementGroups::default();

    for item in items {
        if item.is_ungrouped() {
            result.ungrouped.push(item);
            continue;
        }

        let name = item.statement_name.as_str();
        let slot = *index.entry(name).or_insert_with(|| {
            result.groups.push((name, Vec::new()));
            result.groups.len() - 1
        });
        result.groups[slot].1.push(item);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<LineItem> {
        vec![
            LineItem::new("재무상태표", "자산총계", "1000"),
            LineItem::new("손익계산서", "매출액", "500"),
            LineItem::new("", "유동자산", "300"),
            LineItem::new("재무상태표", "부채총계", "400"),
            LineItem::new("자본변동표", "자본총계", "600"),
            LineItem::new("재무상태표", "자본총계", "610"),
        ]
    }

    #[test]
    fn test_groups_in_first_seen_order() {
        let items = sample();
        let groups = partition(&items);
        assert_eq!(
            groups.names().collect::<Vec<_>>(),
            vec!["재무상태표", "손익계산서", "자본변동표"]
        );
    }

    #[test]
    fn test_items_keep_input_order() {
        let items = sample();
        let groups = partition(&items);
        let bs: Vec<_> = groups
            .get("재무상태표")
            .unwrap()
            .iter()
            .map(|item| item.account_name.as_str())
            .collect();
        assert_eq!(bs, vec!["자산총계", "부채총계", "자본총계"]);
    }

    #[test]
    fn test_same_account_on_two_statements_stays_separate() {
        let items = sample();
        let groups = partition(&items);
        assert_eq!(
            groups.get("자본변동표").unwrap()[0].amount.as_deref(),
            Some("600")
        );
        assert_eq!(
            groups.get("재무상태표").unwrap()[2].amount.as_deref(),
            Some("610")
        );
    }

    #[test]
    fn test_ungrouped_bucket() {
        let items = sample();
        let groups = partition(&items);
        assert_eq!(groups.ungrouped().len(), 1);
        assert_eq!(groups.ungrouped()[0].account_name, "유동자산");
        assert_eq!(groups.len(), 3);
    }

    #[test]
    fn test_nothing_dropped() {
        let items = sample();
        let groups = partition(&items);
        let grouped: usize = groups
            .names()
            .map(|name| groups.get(name).unwrap().len())
            .sum();
        assert_eq!(grouped + groups.ungrouped().len(), items.len());
    }

    #[test]
    fn test_matching_normalizes_alias() {
        let items = vec![LineItem::new("연결 재무상태표", "자산총계", "1")];
        let groups = partition(&items);
        assert_eq!(groups.matching("연결재무상태표").count(), 1);
        assert_eq!(groups.matching("재무상태표").count(), 0);
    }

    #[test]
    fn test_empty_input() {
        let groups = partition(&[]);
        assert!(groups.is_empty());
        assert!(groups.ungrouped().is_empty());
    }
}
