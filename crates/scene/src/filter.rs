use std::collections::HashSet;

use catalog::{IndicatorRecord, RegionIndex};
use tracing::debug;

use crate::selection::ActiveRegions;

/// An indicator record that passed the selection, with its resolved region.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FilteredRecord<'a> {
    pub record: &'a IndicatorRecord,
    pub region: &'a str,
}

/// Why a selection produced nothing to draw.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EmptySelection {
    /// No region is checked.
    NoRegions,
    /// The checked regions contain no joinable country.
    NoCountries,
    /// No selected country has a row for the requested year.
    NoRecords,
}

impl std::fmt::Display for EmptySelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmptySelection::NoRegions => write!(f, "no region selected"),
            EmptySelection::NoCountries => write!(f, "no countries in the selected regions"),
            EmptySelection::NoRecords => write!(f, "no data for the selected year"),
        }
    }
}

impl std::error::Error for EmptySelection {}

/// Derives the working set for one frame.
///
/// Selects the records of `year` whose country belongs to one of the
/// `active` regions, in input order. Countries missing from `index` never
/// match. An empty outcome is reported as [`EmptySelection`] so callers
/// cannot hand an empty set to the layout.
pub fn filter<'a>(
    active: &ActiveRegions,
    year: &str,
    records: &'a [IndicatorRecord],
    index: &'a RegionIndex,
) -> Result<Vec<FilteredRecord<'a>>, EmptySelection> {
    if active.is_empty() {
        return Err(EmptySelection::NoRegions);
    }

    let countries: HashSet<&'a str> = active
        .iter()
        .flat_map(|region| index.countries_in(region))
        .collect();
    if countries.is_empty() {
        return Err(EmptySelection::NoCountries);
    }

    let out: Vec<FilteredRecord<'a>> = records
        .iter()
        .filter(|rec| rec.year == year && countries.contains(rec.country.as_str()))
        .filter_map(|rec| {
            index
                .region_of(&rec.country)
                .map(|region| FilteredRecord {
                    record: rec,
                    region,
                })
        })
        .collect();

    debug!(
        year,
        regions = active.len(),
        countries = countries.len(),
        records = out.len(),
        "filtered selection"
    );

    if out.is_empty() {
        return Err(EmptySelection::NoRecords);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{EmptySelection, filter};
    use crate::selection::ActiveRegions;
    use catalog::{IndicatorRecord, RegionRecord, build};
    use foundation::RecordId;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn fixture() -> (Vec<IndicatorRecord>, Vec<RegionRecord>) {
        let indicators = vec![
            IndicatorRecord::new(RecordId(0), "Norway", "2000").with_value("GDP", "50000"),
            IndicatorRecord::new(RecordId(1), "Kenya", "2000").with_value("GDP", "400"),
            IndicatorRecord::new(RecordId(2), "Norway", "2001").with_value("GDP", "51000"),
            IndicatorRecord::new(RecordId(3), "Sweden", "2000").with_value("GDP", "30000"),
            IndicatorRecord::new(RecordId(4), "Atlantis", "2000").with_value("GDP", "1"),
        ];
        let regions = vec![
            RegionRecord::new("Norway", "Europe"),
            RegionRecord::new("Sweden", "Europe"),
            RegionRecord::new("Kenya", "Africa"),
        ];
        (indicators, regions)
    }

    #[test]
    fn selects_year_and_regions_in_input_order() {
        let (indicators, regions) = fixture();
        let (index, _) = build(&indicators, &regions);
        let active = ActiveRegions::from_regions(["Europe", "Africa"]);

        let got = filter(&active, "2000", &indicators, &index).unwrap();
        let ids: Vec<RecordId> = got.iter().map(|r| r.record.id).collect();
        assert_eq!(ids, vec![RecordId(0), RecordId(1), RecordId(3)]);
        assert_eq!(got[1].region, "Africa");
    }

    #[test]
    fn single_country_scenario() {
        let indicators = vec![
            IndicatorRecord::new(RecordId(0), "Norway", "2000")
                .with_value("GDP", "50000")
                .with_value("Pop", "4000000"),
        ];
        let regions = vec![RegionRecord::new("Norway", "Europe")];
        let (index, _) = build(&indicators, &regions);

        let got = filter(&ActiveRegions::from_regions(["Europe"]), "2000", &indicators, &index)
            .unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].record.country, "Norway");
        assert_eq!(got[0].region, "Europe");
    }

    #[test]
    fn empty_conditions_are_distinguished() {
        let (indicators, regions) = fixture();
        let (index, _) = build(&indicators, &regions);

        assert_eq!(
            filter(&ActiveRegions::new(), "2000", &indicators, &index),
            Err(EmptySelection::NoRegions)
        );
        assert_eq!(
            filter(&ActiveRegions::from_regions(["Oceania"]), "2000", &indicators, &index),
            Err(EmptySelection::NoCountries)
        );
        assert_eq!(
            filter(&ActiveRegions::from_regions(["Africa"]), "2001", &indicators, &index),
            Err(EmptySelection::NoRecords)
        );
        assert_eq!(
            filter(&ActiveRegions::from_regions(["Europe"]), "1850", &indicators, &index),
            Err(EmptySelection::NoRecords)
        );
    }

    #[test]
    fn empty_region_table_is_empty_selection_not_panic() {
        let (indicators, _) = fixture();
        let (index, _) = build(&indicators, &[]);
        assert_eq!(
            filter(&ActiveRegions::from_regions(["Europe"]), "2000", &indicators, &index),
            Err(EmptySelection::NoCountries)
        );
    }

    proptest! {
        #[test]
        fn results_respect_selection_and_are_idempotent(
            rows in prop::collection::vec(
                (
                    prop::sample::select(vec!["A", "B", "C", "D"]),
                    prop::sample::select(vec!["1990", "2000"]),
                ),
                0..32,
            ),
            picked in prop::collection::btree_set(
                prop::sample::select(vec!["North", "South", "East"]),
                0..3,
            ),
            year in prop::sample::select(vec!["1990", "2000", "2010"]),
        ) {
            let indicators: Vec<IndicatorRecord> = rows
                .iter()
                .enumerate()
                .map(|(i, (c, y))| IndicatorRecord::new(RecordId(i as u32), *c, *y))
                .collect();
            let regions = vec![
                RegionRecord::new("A", "North"),
                RegionRecord::new("B", "South"),
                RegionRecord::new("C", "Unknown"),
            ];
            let (index, _) = build(&indicators, &regions);
            let active = ActiveRegions::from_regions(picked.iter().copied());

            let first = filter(&active, year, &indicators, &index);
            let second = filter(&active, year, &indicators, &index);
            prop_assert_eq!(&first, &second);

            if let Ok(records) = first {
                for r in &records {
                    prop_assert!(active.contains(r.region));
                    prop_assert_eq!(index.region_of(&r.record.country), Some(r.region));
                    prop_assert_eq!(r.record.year.as_str(), year);
                }
                for pair in records.windows(2) {
                    prop_assert!(pair[0].record.id < pair[1].record.id);
                }
            }
        }
    }
}
