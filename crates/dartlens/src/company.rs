//! Company name input and the default analysis window.

use chrono::{Datelike, Utc};
use std::fmt;
use thiserror::Error;

/// Shortest accepted company name, in characters.
pub const MIN_NAME_CHARS: usize = 2;

/// Number of fiscal years analyzed when none are given.
pub const DEFAULT_YEAR_COUNT: u32 = 5;

/// Rejected user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// Name shorter than [`MIN_NAME_CHARS`] after trimming
    #[error("Company name must be at least {MIN_NAME_CHARS} characters")]
    TooShort,

    /// Name containing a path separator or an executable suffix
    #[error("Company name contains a forbidden pattern: {0}")]
    ForbiddenPattern(&'static str),

    /// Zero years requested
    #[error("At least one year must be analyzed")]
    NoYears,

    /// Year window outside the representable range
    #[error("Requested years are out of range")]
    YearOutOfRange,
}

const FORBIDDEN: [&str; 3] = ["/", "\\", ".exe"];

/// A validated company name as typed by the user.
///
/// The name is trimmed and later matched exactly against the DART registry,
/// so it is otherwise kept as given.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompanyName(String);

impl CompanyName {
    /// Validate a company name.
    ///
    /// # Errors
    /// Returns [`InputError`] if the trimmed name is shorter than two
    /// characters or contains `/`, `\` or `.exe`.
    pub fn parse(input: &str) -> Result<Self, InputError> {
        let name = input.trim();
        if name.chars().count() < MIN_NAME_CHARS {
            return Err(InputError::TooShort);
        }
        let lower = name.to_lowercase();
        if let Some(pattern) = FORBIDDEN.iter().find(|p| lower.contains(**p)) {
            return Err(InputError::ForbiddenPattern(pattern));
        }
        Ok(Self(name.to_string()))
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompanyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CompanyName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The `count` fiscal years ending the year before `end_exclusive`,
/// ascending.
///
/// # Errors
/// Returns [`InputError::YearOutOfRange`] when the first year would fall
/// below `i32::MIN`.
pub fn default_years(end_exclusive: i32, count: u32) -> Result<Vec<i32>, InputError> {
    let start = i32::try_from(count)
        .ok()
        .and_then(|count| end_exclusive.checked_sub(count))
        .ok_or(InputError::YearOutOfRange)?;
    Ok((start..end_exclusive).collect())
}

/// [`default_years`] relative to the current calendar year.
///
/// # Errors
/// Returns [`InputError::NoYears`] when `count` is zero.
pub fn default_years_now(count: u32) -> Result<Vec<i32>, InputError> {
    if count == 0 {
        return Err(InputError::NoYears);
    }
    default_years(Utc::now().year(), count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("삼성전자", "삼성전자")]
    #[case("  LG화학 ", "LG화학")]
    #[case("SK", "SK")]
    fn test_accepts(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(CompanyName::parse(input).unwrap().as_str(), expected);
    }

    #[rstest]
    #[case("", InputError::TooShort)]
    #[case(" 삼 ", InputError::TooShort)]
    #[case("../etc", InputError::ForbiddenPattern("/"))]
    #[case(r"a\b", InputError::ForbiddenPattern("\\"))]
    #[case("virus.EXE", InputError::ForbiddenPattern(".exe"))]
    fn test_rejects(#[case] input: &str, #[case] expected: InputError) {
        assert_eq!(CompanyName::parse(input), Err(expected));
    }

    #[test]
    fn test_default_years() {
        assert_eq!(
            default_years(2025, 5).unwrap(),
            vec![2020, 2021, 2022, 2023, 2024]
        );
        assert!(default_years(2025, 0).unwrap().is_empty());
    }

    #[rstest]
    #[case(2026, 2_147_483_648)]
    #[case(2026, u32::MAX)]
    #[case(i32::MIN, 1)]
    fn test_default_years_out_of_range(#[case] end_exclusive: i32, #[case] count: u32) {
        assert_eq!(
            default_years(end_exclusive, count),
            Err(InputError::YearOutOfRange)
        );
    }

    #[test]
    fn test_default_years_now() {
        let years = default_years_now(DEFAULT_YEAR_COUNT).unwrap();
        assert_eq!(years.len(), 5);
        assert_eq!(years.last().copied(), Some(Utc::now().year() - 1));
        assert_eq!(default_years_now(0), Err(InputError::NoYears));
    }
}
