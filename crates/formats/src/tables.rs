use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use catalog::{COUNTRY_COLUMN, IndicatorRecord, RegionRecord, YEAR_COLUMN, attribute_names};
use csv::{ReaderBuilder, StringRecord};
use foundation::RecordIdAllocator;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("open {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required column {0:?}")]
    MissingColumn(String),
}

/// Loaded indicator table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndicatorTable {
    /// Header in file order.
    pub columns: Vec<String>,
    /// Rows in file order; `records[i].id == RecordId(i)`.
    pub records: Vec<IndicatorRecord>,
}

impl IndicatorTable {
    /// Columns offered as position/size attributes.
    pub fn attributes(&self) -> Vec<String> {
        attribute_names(&self.columns)
    }
}

/// Names of the two columns the region table must provide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionColumns {
    pub country: String,
    pub region: String,
}

impl Default for RegionColumns {
    fn default() -> Self {
        Self {
            country: "name".to_string(),
            region: "World bank region".to_string(),
        }
    }
}

pub fn load_indicators(path: &Path) -> Result<IndicatorTable, FormatError> {
    read_indicators(open(path)?)
}

pub fn load_regions(path: &Path, columns: &RegionColumns) -> Result<Vec<RegionRecord>, FormatError> {
    read_regions(open(path)?, columns)
}

/// Reads the indicator table; ids follow row order.
pub fn read_indicators<R: Read>(reader: R) -> Result<IndicatorTable, FormatError> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let country_idx = column_index(&headers, COUNTRY_COLUMN)?;
    let year_idx = column_index(&headers, YEAR_COLUMN)?;

    let mut ids = RecordIdAllocator::new();
    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row?;
        let mut rec = IndicatorRecord::new(
            ids.next_id(),
            row.get(country_idx).unwrap_or_default(),
            row.get(year_idx).unwrap_or_default(),
        );
        for (idx, (name, value)) in headers.iter().zip(row.iter()).enumerate() {
            if idx == country_idx || idx == year_idx {
                continue;
            }
            rec.values.insert(name.to_string(), value.to_string());
        }
        records.push(rec);
    }

    let columns: Vec<String> = headers.iter().map(str::to_string).collect();
    debug!(rows = records.len(), columns = columns.len(), "loaded indicator table");
    Ok(IndicatorTable { columns, records })
}

/// Reads the region table, keeping only the country and region columns.
pub fn read_regions<R: Read>(
    reader: R,
    columns: &RegionColumns,
) -> Result<Vec<RegionRecord>, FormatError> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let country_idx = column_index(&headers, &columns.country)?;
    let region_idx = column_index(&headers, &columns.region)?;

    let mut out = Vec::new();
    for row in rdr.records() {
        let row = row?;
        out.push(RegionRecord::new(
            row.get(country_idx).unwrap_or_default(),
            row.get(region_idx).unwrap_or_default(),
        ));
    }

    debug!(rows = out.len(), "loaded region table");
    Ok(out)
}

fn open(path: &Path) -> Result<File, FormatError> {
    File::open(path).map_err(|source| FormatError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn column_index(headers: &StringRecord, name: &str) -> Result<usize, FormatError> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| FormatError::MissingColumn(name.to_string()))
}
