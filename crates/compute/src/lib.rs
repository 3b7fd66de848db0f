pub mod analysis;
pub mod scale;

pub use analysis::Statistics;
pub use scale::*;
