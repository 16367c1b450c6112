//! Ship components: Ship, ShipPhase, Voyage bookkeeping.

use super::common::{CargoState, Size};
use crate::stage::VisualHandle;
use crate::systems::{TimerId, TransitionId};
use serde::{Deserialize, Serialize};

/// Ships are ECS entities owned by the controller's world
pub type ShipId = hecs::Entity;

/// Ship component - a vessel with a binary cargo state.
///
/// Empty and full ships differ only by their cargo tag; the colour used to
/// draw them is looked up from that tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    serial: u32,
    cargo: CargoState,
}

impl Ship {
    pub const WIDTH: f32 = 90.0;
    pub const HEIGHT: f32 = 30.0;

    pub fn new(serial: u32, cargo: CargoState) -> Self {
        Self { serial, cargo }
    }

    /// Arrival order, starting at 1
    pub fn serial(&self) -> u32 {
        self.serial
    }

    pub fn cargo(&self) -> CargoState {
        self.cargo
    }

    pub fn is_empty(&self) -> bool {
        self.cargo.is_empty()
    }

    pub fn footprint() -> Size {
        Size::new(Self::WIDTH, Self::HEIGHT)
    }

    /// Fill the ship. Returns true if the state changed (needs a redraw).
    pub fn load(&mut self) -> bool {
        self.set_cargo(CargoState::Full)
    }

    /// Empty the ship. Returns true if the state changed (needs a redraw).
    pub fn unload(&mut self) -> bool {
        self.set_cargo(CargoState::Empty)
    }

    fn set_cargo(&mut self, cargo: CargoState) -> bool {
        let changed = self.cargo != cargo;
        self.cargo = cargo;
        changed
    }

    pub fn color(&self) -> u32 {
        ship_color(self.cargo)
    }
}

/// Colour for a ship carrying `cargo`
pub fn ship_color(cargo: CargoState) -> u32 {
    match cargo {
        CargoState::Empty => 0x50C878,
        CargoState::Full => 0xFF2400,
    }
}

/// Where a ship is in its visit to the port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipPhase {
    /// Spawned at the outer edge, not yet moving
    Arrived,
    /// Heading for the gate lane
    CrossingGateIn,
    /// Moving toward a waiting slot
    Queued,
    /// Popped from its queue, about to cross the gate again
    Promoted,
    /// Moving toward an assigned dock
    Parking,
    /// At the dock, dwelling
    Parked,
    /// Returning to the gate lane
    CrossingGateOut,
    /// Leaving the visible area. On arrival past the edge the entity is
    /// despawned, so there is no phase after this one.
    Exiting,
}

impl ShipPhase {
    pub fn name(&self) -> &'static str {
        match self {
            ShipPhase::Arrived => "arrived",
            ShipPhase::CrossingGateIn => "crossing gate in",
            ShipPhase::Queued => "queued",
            ShipPhase::Promoted => "promoted",
            ShipPhase::Parking => "parking",
            ShipPhase::Parked => "parked",
            ShipPhase::CrossingGateOut => "crossing gate out",
            ShipPhase::Exiting => "exiting",
        }
    }

    /// True while the ship holds (or is about to hold) a dock
    pub fn holds_dock(&self) -> bool {
        matches!(self, ShipPhase::Parking | ShipPhase::Parked)
    }
}

/// Controller bookkeeping for a ship's visit.
///
/// The `Ship` component itself never refers to its dock or queue; only the
/// controller reads this.
#[derive(Debug, Clone)]
pub struct Voyage {
    pub phase: ShipPhase,
    /// Dock held while parking/parked
    pub dock: Option<usize>,
    /// In-flight (or delayed) transition for the current leg
    pub transition: Option<TransitionId>,
    /// Exit leg chained behind the return-to-gate leg
    pub exit: Option<TransitionId>,
    /// Pending mid-dwell cargo exchange
    pub exchange_timer: Option<TimerId>,
    /// True while the ship holds the outbound lane claim on the gate
    pub holds_gate: bool,
    /// Cargo flips completed during this visit
    pub exchanges: u32,
    /// Left its queue for a dock that may be taken before it gets there
    pub promoted: bool,
}

impl Voyage {
    pub fn new() -> Self {
        Self {
            phase: ShipPhase::Arrived,
            dock: None,
            transition: None,
            exit: None,
            exchange_timer: None,
            holds_gate: false,
            exchanges: 0,
            promoted: false,
        }
    }
}

impl Default for Voyage {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle of the stage visual drawing an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visual(pub VisualHandle);
