//! Dock component - a fixed berth where ships exchange cargo.

use super::common::{Admission, CargoState, Size, Vec2};
use serde::{Deserialize, Serialize};

/// A berth with a cargo state and an admission flag.
///
/// Docks never move and never schedule anything on their own; the controller
/// is the only writer of `admission`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dock {
    index: usize,
    position: Vec2,
    size: Size,
    cargo: CargoState,
    admission: Admission,
}

impl Dock {
    pub fn new(index: usize, position: Vec2, size: Size, cargo: CargoState) -> Self {
        Self {
            index,
            position,
            size,
            cargo,
            admission: Admission::Open,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Top-left corner
    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            self.position.x + self.size.width / 2.0,
            self.position.y + self.size.height / 2.0,
        )
    }

    /// Where a ship with `footprint` parks: its leading (left) edge on the
    /// dock center, vertically centered on the dock.
    pub fn parking_position(&self, footprint: Size) -> Vec2 {
        let center = self.center();
        Vec2::new(center.x, center.y - footprint.height / 2.0)
    }

    pub fn cargo(&self) -> CargoState {
        self.cargo
    }

    pub fn is_empty(&self) -> bool {
        self.cargo.is_empty()
    }

    /// Returns true if the state changed (needs a redraw).
    pub fn load(&mut self) -> bool {
        let changed = self.cargo != CargoState::Full;
        self.cargo = CargoState::Full;
        changed
    }

    /// Returns true if the state changed (needs a redraw).
    pub fn unload(&mut self) -> bool {
        let changed = self.cargo != CargoState::Empty;
        self.cargo = CargoState::Empty;
        changed
    }

    pub fn admission(&self) -> Admission {
        self.admission
    }

    pub fn is_open(&self) -> bool {
        self.admission.is_open()
    }

    /// Can a ship carrying `cargo` be assigned here right now?
    pub fn accepts(&self, cargo: CargoState) -> bool {
        self.is_open() && self.cargo != cargo
    }

    /// Open or close the dock. Closing a closed dock (or opening an open one)
    /// is a controller bug: it asserts in debug builds and is ignored otherwise.
    pub fn set_open(&mut self, open: bool) {
        debug_assert!(
            self.is_open() != open,
            "dock {} is already {}",
            self.index,
            if open { "open" } else { "closed" }
        );
        if self.is_open() == open {
            log::warn!("dock {} already {:?}, ignoring", self.index, self.admission);
            return;
        }
        self.admission = Admission::from_open(open);
    }

    /// Operator override used to model maintenance closures and recovery.
    /// Unlike `set_open`, repeating the current state is allowed.
    pub fn force_admission(&mut self, admission: Admission) {
        self.admission = admission;
    }
}

/// Colour for a dock holding `cargo`
pub fn dock_color(cargo: CargoState) -> u32 {
    match cargo {
        CargoState::Empty => 0xD9D9D9,
        CargoState::Full => 0xFFFF00,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dock() -> Dock {
        Dock::new(2, Vec2::new(0.0, 100.0), Size::new(60.0, 100.0), CargoState::Full)
    }

    #[test]
    fn test_parking_position() {
        let d = dock();
        let pos = d.parking_position(Size::new(90.0, 30.0));
        assert_eq!(pos, Vec2::new(30.0, 135.0));
    }

    #[test]
    fn test_accepts_complementary_cargo_only() {
        let mut d = dock();
        assert!(d.accepts(CargoState::Empty));
        assert!(!d.accepts(CargoState::Full));

        d.set_open(false);
        assert!(!d.accepts(CargoState::Empty));
    }

    #[test]
    fn test_load_unload() {
        let mut d = dock();
        assert!(!d.load());
        assert!(d.unload());
        assert!(d.is_empty());
        assert_eq!(dock_color(d.cargo()), 0xD9D9D9);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "already closed")]
    fn test_double_close_asserts() {
        let mut d = dock();
        d.set_open(false);
        d.set_open(false);
    }
}
