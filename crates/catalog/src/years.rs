use std::cmp::Ordering;

use foundation::math::{parse_finite_f64, stable_total_cmp_f64};
use serde::Serialize;

/// Distinct years of the indicator table in ascending order.
///
/// Years stay strings. Numeric years are ordered by value; a year that does
/// not parse sorts after all numeric ones. Ties on value (e.g. `"2000"` and
/// `"2000.0"`) are broken lexically, so the order is strict.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct YearCatalog {
    years: Vec<String>,
}

impl YearCatalog {
    pub fn from_years<I, S>(years: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut years: Vec<String> = years.into_iter().map(Into::into).collect();
        years.sort_by(|a, b| compare_years(a, b));
        years.dedup();
        Self { years }
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.years.get(index).map(String::as_str)
    }

    pub fn contains(&self, year: &str) -> bool {
        self.position(year).is_some()
    }

    /// Index of `year` in the catalog.
    pub fn position(&self, year: &str) -> Option<usize> {
        self.years
            .binary_search_by(|probe| compare_years(probe, year))
            .ok()
    }

    pub fn first(&self) -> Option<&str> {
        self.years.first().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.years
    }
}

/// Total order used by [`YearCatalog`].
pub fn compare_years(a: &str, b: &str) -> Ordering {
    match (parse_finite_f64(a), parse_finite_f64(b)) {
        (Some(x), Some(y)) => stable_total_cmp_f64(x, y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::YearCatalog;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn sorts_numerically_and_dedups() {
        let cat = YearCatalog::from_years(["2000", "980", "1990", "2000", "1990"]);
        assert_eq!(cat.as_slice(), &["980", "1990", "2000"]);
        assert_eq!(cat.position("1990"), Some(1));
        assert_eq!(cat.position("1991"), None);
        assert_eq!(cat.first(), Some("980"));
    }

    #[test]
    fn non_numeric_years_go_last() {
        let cat = YearCatalog::from_years(["n/a", "2001", "", "1999"]);
        assert_eq!(cat.as_slice(), &["1999", "2001", "", "n/a"]);
        assert!(cat.contains("n/a"));
    }

    proptest! {
        #[test]
        fn catalog_is_strictly_ascending(
            years in proptest::collection::vec(
                prop_oneof![
                    (1900u32..2030).prop_map(|y| y.to_string()),
                    "[a-z]{0,3}",
                ],
                0..64,
            )
        ) {
            let cat = YearCatalog::from_years(years.clone());
            for pair in cat.as_slice().windows(2) {
                prop_assert_eq!(
                    super::compare_years(&pair[0], &pair[1]),
                    std::cmp::Ordering::Less
                );
            }
            for y in &years {
                prop_assert!(cat.contains(y));
            }

            let mut reversed = years;
            reversed.reverse();
            prop_assert_eq!(YearCatalog::from_years(reversed), cat);
        }
    }
}
