//! Per-frame working set: region selection, record filtering and the frame
//! handed to the renderer.

pub mod filter;
pub mod frame;
pub mod selection;

pub use filter::{EmptySelection, FilteredRecord, filter};
pub use frame::*;
pub use selection::ActiveRegions;
