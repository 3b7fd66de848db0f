//! Loading of the indicator and region tables.

pub mod tables;

pub use tables::*;
