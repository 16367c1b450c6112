//! Systems - logic that operates on components

mod allocation;
mod congestion;
mod journal;
mod timer;
mod transition;

pub use allocation::*;
pub use congestion::*;
pub use journal::*;
pub use timer::*;
pub use transition::*;
