pub mod beeswarm;
mod grid;

pub use beeswarm::*;
