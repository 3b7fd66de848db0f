//! Data join layer: reconciles the indicator table with the region table.

pub mod country_codes;
pub mod join;
pub mod records;
pub mod years;

pub use country_codes::{country_code, flag_asset_path};
pub use join::{RegionIndex, build};
pub use records::*;
pub use years::YearCatalog;
