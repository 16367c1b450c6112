//! Generation - port layout and ship arrivals

mod arrivals;
mod layout;

pub use arrivals::*;
pub use layout::*;
