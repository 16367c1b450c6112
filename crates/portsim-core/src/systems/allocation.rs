//! Allocation - dock lookup and queue promotion decisions

use crate::components::{CargoState, Dock, ShipId, ShipQueue};

/// First open dock, in index order, whose cargo complements `cargo`.
pub fn find_dock(docks: &[Dock], cargo: CargoState) -> Option<usize> {
    docks.iter().position(|dock| dock.accepts(cargo))
}

/// Cargo class of the ships a dock can take
pub fn served_class(dock: &Dock) -> CargoState {
    dock.cargo().complement()
}

/// The front ship of `queue` and the dock it would get, if any
pub fn promotion_candidate(queue: &ShipQueue, docks: &[Dock]) -> Option<(ShipId, usize)> {
    let ship = queue.first_ship()?;
    let dock = find_dock(docks, queue.cargo())?;
    Some((ship, dock))
}
