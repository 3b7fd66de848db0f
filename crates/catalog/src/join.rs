use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::records::{IndicatorRecord, RegionRecord, UNKNOWN_REGION};
use crate::years::YearCatalog;

/// Read-only country → region lookup.
///
/// Every indexed country has exactly one region, and no region is
/// [`UNKNOWN_REGION`]. Built once by [`build`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegionIndex {
    by_country: BTreeMap<String, String>,
    #[serde(skip)]
    by_region: BTreeMap<String, BTreeSet<String>>,
}

impl RegionIndex {
    pub fn len(&self) -> usize {
        self.by_country.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_country.is_empty()
    }

    pub fn region_of(&self, country: &str) -> Option<&str> {
        self.by_country.get(country).map(String::as_str)
    }

    /// Countries mapped to `region`, in name order.
    pub fn countries_in<'a>(&'a self, region: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        self.by_region
            .get(region)
            .into_iter()
            .flat_map(|countries| countries.iter().map(String::as_str))
    }

    /// Regions that have at least one country, in name order.
    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.by_region.keys().map(String::as_str)
    }

    /// `(country, region)` pairs in country order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_country
            .iter()
            .map(|(c, r)| (c.as_str(), r.as_str()))
    }

    fn insert(&mut self, country: &str, region: &str) {
        self.by_country
            .insert(country.to_string(), region.to_string());
        self.by_region
            .entry(region.to_string())
            .or_default()
            .insert(country.to_string());
    }
}

/// Joins the indicator table with the region table.
///
/// Each distinct country of `indicators` is looked up in `regions` by exact
/// name. When the region table lists a name more than once, its first row
/// decides; a first row of [`UNKNOWN_REGION`] excludes the country. Countries
/// without a usable region are left out of the index and can never be
/// selected.
///
/// The result depends only on the set of indicator countries, never on the
/// order of the indicator rows.
pub fn build(indicators: &[IndicatorRecord], regions: &[RegionRecord]) -> (RegionIndex, YearCatalog) {
    let mut lookup: HashMap<&str, &str> = HashMap::with_capacity(regions.len());
    for row in regions {
        lookup
            .entry(row.country.as_str())
            .or_insert(row.region.as_str());
    }

    let mut index = RegionIndex::default();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut unresolved = 0usize;
    for rec in indicators {
        if !seen.insert(rec.country.as_str()) {
            continue;
        }
        match lookup.get(rec.country.as_str()) {
            Some(region) if *region != UNKNOWN_REGION => index.insert(&rec.country, region),
            _ => unresolved += 1,
        }
    }

    let years = YearCatalog::from_years(indicators.iter().map(|r| r.year.as_str()));

    debug!(
        countries = seen.len(),
        indexed = index.len(),
        unresolved,
        regions = index.by_region.len(),
        years = years.len(),
        "joined indicator and region tables"
    );

    (index, years)
}
