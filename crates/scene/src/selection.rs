use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Regions currently checked by the user.
///
/// Ordering contract:
/// - Iteration yields region names in ascending order, independent of the
///   order they were checked in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActiveRegions {
    regions: BTreeSet<String>,
}

impl ActiveRegions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_regions<I, S>(regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            regions: regions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn clear(&mut self) {
        self.regions.clear();
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn contains(&self, region: &str) -> bool {
        self.regions.contains(region)
    }

    /// Checks `region`.
    ///
    /// Returns `true` if the set changed.
    pub fn insert(&mut self, region: impl Into<String>) -> bool {
        self.regions.insert(region.into())
    }

    /// Unchecks `region`.
    ///
    /// Returns `true` if the set changed.
    pub fn remove(&mut self, region: &str) -> bool {
        self.regions.remove(region)
    }

    /// Flips `region` and returns whether it is now checked.
    pub fn toggle(&mut self, region: &str) -> bool {
        !self.remove(region) && self.insert(region)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.regions.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.regions.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::ActiveRegions;

    #[test]
    fn insert_remove_contains_and_len() {
        let mut s = ActiveRegions::new();
        assert!(s.is_empty());
        assert!(s.insert("Europe"));
        assert!(!s.insert("Europe"));
        assert_eq!(s.len(), 1);
        assert!(s.contains("Europe"));
        assert!(s.remove("Europe"));
        assert!(!s.remove("Europe"));
        assert!(s.is_empty());
    }

    #[test]
    fn toggle_flips_membership() {
        let mut s = ActiveRegions::new();
        assert!(s.toggle("Asia"));
        assert!(s.contains("Asia"));
        assert!(!s.toggle("Asia"));
        assert!(!s.contains("Asia"));
    }

    #[test]
    fn iter_is_sorted() {
        let mut s = ActiveRegions::from_regions(["South Asia", "Europe"]);
        s.insert("East Asia");
        s.insert("Europe");
        let got: Vec<&str> = s.iter().collect();
        assert_eq!(got, vec!["East Asia", "Europe", "South Asia"]);
    }
}
