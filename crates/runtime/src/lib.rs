pub mod budget;
pub mod event_bus;
pub mod timer;

pub use budget::*;
pub use event_bus::*;
pub use timer::*;
