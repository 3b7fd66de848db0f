use std::collections::BTreeMap;

use foundation::RecordId;
use foundation::math::parse_finite_f64;
use serde::{Deserialize, Serialize};

/// Column holding the country key in the indicator table.
pub const COUNTRY_COLUMN: &str = "Country";
/// Column holding the year in the indicator table.
pub const YEAR_COLUMN: &str = "Year";
/// Region value that marks a country as unclassified.
pub const UNKNOWN_REGION: &str = "Unknown";

/// One row of the indicator table: a country in a given year.
///
/// Attribute values are kept exactly as loaded. Parsing happens at the point
/// of use, so empty or non-numeric cells survive untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorRecord {
    pub id: RecordId,
    pub country: String,
    pub year: String,
    pub values: BTreeMap<String, String>,
}

impl IndicatorRecord {
    pub fn new(id: RecordId, country: impl Into<String>, year: impl Into<String>) -> Self {
        Self {
            id,
            country: country.into(),
            year: year.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, attribute: impl Into<String>, raw: impl Into<String>) -> Self {
        self.values.insert(attribute.into(), raw.into());
        self
    }

    /// Raw cell for `attribute`, if the column exists for this row.
    pub fn raw(&self, attribute: &str) -> Option<&str> {
        self.values.get(attribute).map(String::as_str)
    }

    /// Numeric value for `attribute`; `None` when missing or not a number.
    pub fn numeric(&self, attribute: &str) -> Option<f64> {
        self.raw(attribute).and_then(parse_finite_f64)
    }
}

/// One row of the region table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRecord {
    pub country: String,
    pub region: String,
}

impl RegionRecord {
    pub fn new(country: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            region: region.into(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.region == UNKNOWN_REGION
    }
}

/// Selectable attributes of an indicator table, in header order.
///
/// Every column except the country and year keys can be used for both the
/// position and the size of a mark.
pub fn attribute_names<S: AsRef<str>>(columns: &[S]) -> Vec<String> {
    columns
        .iter()
        .map(AsRef::as_ref)
        .filter(|c| *c != COUNTRY_COLUMN && *c != YEAR_COLUMN)
        .map(str::to_string)
        .collect()
}

/// Human-readable axis label for an attribute column.
pub fn axis_label(attribute: &str) -> String {
    attribute.replace('.', " ")
}
