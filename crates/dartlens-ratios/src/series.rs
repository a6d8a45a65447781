//! Year-ordered ratio series.

use crate::calculator::{Ratio, RatioRecord};
use serde::{Deserialize, Serialize};

/// Ratio records in ascending year order, one per requested year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RatioTimeSeries {
    records: Vec<RatioRecord>,
}

impl RatioTimeSeries {
    /// Build a series, sorting the records by year.
    pub fn from_records(mut records: Vec<RatioRecord>) -> Self {
        records.sort_by_key(|record| record.year);
        Self { records }
    }

    /// Records in ascending year order.
    pub fn records(&self) -> &[RatioRecord] {
        &self.records
    }

    /// Years covered, ascending.
    pub fn years(&self) -> Vec<i32> {
        self.records.iter().map(|record| record.year).collect()
    }

    /// Record for a year.
    pub fn get(&self, year: i32) -> Option<&RatioRecord> {
        self.records.iter().find(|record| record.year == year)
    }

    /// One ratio across all years.
    pub fn column(&self, ratio: Ratio) -> Vec<(i32, Option<f64>)> {
        self.records
            .iter()
            .map(|record| (record.year, record.get(ratio)))
            .collect()
    }

    /// Iterate over the records.
    pub fn iter(&self) -> std::slice::Iter<'_, RatioRecord> {
        self.records.iter()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the series has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a RatioTimeSeries {
    type Item = &'a RatioRecord;
    type IntoIter = std::slice::Iter<'a, RatioRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_on_construction() {
        let series = RatioTimeSeries::from_records(vec![
            RatioRecord::missing(2023),
            RatioRecord::missing(2021),
            RatioRecord::missing(2022),
        ]);
        assert_eq!(series.years(), vec![2021, 2022, 2023]);
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn test_column_keeps_gaps() {
        let mut present = RatioRecord::missing(2022);
        present.roe = Some(12.5);
        let series = RatioTimeSeries::from_records(vec![present, RatioRecord::missing(2021)]);
        assert_eq!(
            series.column(Ratio::Roe),
            vec![(2021, None), (2022, Some(12.5))]
        );
        assert_eq!(series.get(2022).and_then(|r| r.roe), Some(12.5));
        assert!(series.get(1999).is_none());
    }

    #[test]
    fn test_serializes_as_array() {
        let series = RatioTimeSeries::from_records(vec![RatioRecord::missing(2020)]);
        let json = serde_json::to_value(&series).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["year"], 2020);
    }
}
