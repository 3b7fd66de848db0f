//! Interaction core: control state, playback, status reporting.

pub mod playback;
pub mod session;

pub use layers::LayoutConfig;
pub use playback::*;
pub use session::*;
