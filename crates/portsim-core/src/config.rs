//! Port configuration - geometry, traffic rates and transition timings.
//!
//! Every field has a reference default, so a JSON file only needs the values
//! it wants to change.

use crate::components::{CargoState, Ship, Size};
use crate::error::{PortError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Durations of each leg of a ship's visit, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionTimings {
    /// Outer edge to the gate lane
    pub gate_in_ms: f64,
    /// Queue slot back to the gate lane after promotion
    pub promoted_gate_in_ms: f64,
    /// Gate lane (or a previous slot) to a queue slot
    pub queue_ms: f64,
    /// Gate lane to a dock
    pub dock_ms: f64,
    /// Dock back to the gate lane
    pub departure_ms: f64,
    /// Gate lane out of the visible area
    pub exit_ms: f64,
}

impl Default for TransitionTimings {
    fn default() -> Self {
        Self {
            gate_in_ms: 4000.0,
            promoted_gate_in_ms: 1000.0,
            queue_ms: 1000.0,
            dock_ms: 4000.0,
            departure_ms: 4000.0,
            exit_ms: 4000.0,
        }
    }
}

/// Configuration for a port
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortConfig {
    pub width: f32,
    pub height: f32,
    pub dock_count: usize,
    pub dock_size: Size,
    pub ship_arrival_period_ms: f64,
    /// Time a ship stays parked before heading back to the gate
    pub ship_dwell_ms: f64,
    /// Chance that an arriving ship is empty
    pub empty_probability: f64,
    pub timings: TransitionTimings,
    /// Initial cargo per dock. Empty means alternate, starting with full.
    pub dock_cargo: Vec<CargoState>,
    /// Seed for arrivals; `None` draws one from the OS
    pub seed: Option<u64>,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            dock_count: 4,
            dock_size: Size::new(60.0, 100.0),
            ship_arrival_period_ms: 8000.0,
            ship_dwell_ms: 5000.0,
            empty_probability: 0.495,
            timings: TransitionTimings::default(),
            dock_cargo: Vec::new(),
            seed: None,
        }
    }
}

impl PortConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Cargo state dock `index` starts with
    pub fn initial_dock_cargo(&self, index: usize) -> CargoState {
        match self.dock_cargo.get(index) {
            Some(&cargo) => cargo,
            None if index % 2 == 0 => CargoState::Full,
            None => CargoState::Empty,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(PortError::InvalidConfig(msg));

        if !(self.width > 0.0 && self.height > 0.0) {
            return invalid(format!("port size {}x{} must be positive", self.width, self.height));
        }
        if self.dock_count == 0 {
            return invalid("dock_count must be at least 1".into());
        }
        if !(self.dock_size.width > 0.0 && self.dock_size.height > 0.0) {
            return invalid("dock_size must be positive".into());
        }
        if self.dock_size.height * self.dock_count as f32 > self.height {
            return invalid(format!(
                "{} docks of height {} do not fit in a port {} high",
                self.dock_count, self.dock_size.height, self.height
            ));
        }
        if self.height / 3.0 < Ship::HEIGHT {
            return invalid(format!(
                "port height {} leaves no room for a {} high ship queue",
                self.height,
                Ship::HEIGHT
            ));
        }
        if !(self.ship_arrival_period_ms > 0.0) {
            return invalid("ship_arrival_period_ms must be positive".into());
        }
        if !(self.ship_dwell_ms >= 0.0) {
            return invalid("ship_dwell_ms must not be negative".into());
        }
        if !(0.0..=1.0).contains(&self.empty_probability) {
            return invalid(format!(
                "empty_probability {} is not in 0..=1",
                self.empty_probability
            ));
        }
        let t = &self.timings;
        let durations = [
            ("gate_in_ms", t.gate_in_ms),
            ("promoted_gate_in_ms", t.promoted_gate_in_ms),
            ("queue_ms", t.queue_ms),
            ("dock_ms", t.dock_ms),
            ("departure_ms", t.departure_ms),
            ("exit_ms", t.exit_ms),
        ];
        for (name, value) in durations {
            if !(value >= 0.0) {
                return invalid(format!("{} must not be negative", name));
            }
        }
        if !self.dock_cargo.is_empty() && self.dock_cargo.len() != self.dock_count {
            return invalid(format!(
                "dock_cargo lists {} docks but dock_count is {}",
                self.dock_cargo.len(),
                self.dock_count
            ));
        }
        Ok(())
    }
}
