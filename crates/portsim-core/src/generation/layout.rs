//! Port layout generation - places docks, the gate and the queues

use crate::components::{CargoState, Dock, Gate, Ship, ShipQueue, Vec2, QUEUE_GAP};
use crate::config::PortConfig;

/// Fixed geometry of a port, derived once from its configuration.
///
/// Ships enter from the right edge, cross the gate at a third of the width,
/// and berth at docks stacked along the left edge. Empty ships wait above the
/// lane, full ships below it. All ship positions are top-left corners.
#[derive(Debug, Clone)]
pub struct PortLayout {
    pub width: f32,
    pub height: f32,
    pub docks: Vec<Dock>,
    pub gate: Gate,
    pub empty_queue: ShipQueue,
    pub full_queue: ShipQueue,
    /// Where new ships appear
    pub spawn_point: Vec2,
    /// Ship position inside the gate lane
    pub gate_point: Vec2,
    /// Where departing ships are removed
    pub exit_point: Vec2,
}

/// Generate the layout for `config`. Assumes the config has been validated.
pub fn generate_port(config: &PortConfig) -> PortLayout {
    let gate_x = config.width / 3.0;
    let gate = Gate::for_port(gate_x, config.height);
    let lane_y = gate.lane_center().y - Ship::HEIGHT / 2.0;

    let spacing = config.height / config.dock_count as f32;
    let docks = (0..config.dock_count)
        .map(|i| {
            let y = i as f32 * spacing + (spacing - config.dock_size.height) / 2.0;
            Dock::new(
                i,
                Vec2::new(0.0, y),
                config.dock_size,
                config.initial_dock_cargo(i),
            )
        })
        .collect();

    let queue_x = gate_x + QUEUE_GAP;
    let empty_queue = ShipQueue::new(
        CargoState::Empty,
        Vec2::new(queue_x, gate.top_position().y - Ship::HEIGHT - QUEUE_GAP),
    );
    let full_queue = ShipQueue::new(
        CargoState::Full,
        Vec2::new(queue_x, gate.bottom_position().y + QUEUE_GAP),
    );

    PortLayout {
        width: config.width,
        height: config.height,
        docks,
        gate,
        empty_queue,
        full_queue,
        spawn_point: Vec2::new(config.width, lane_y),
        gate_point: Vec2::new(gate_x, lane_y),
        exit_point: Vec2::new(config.width + Ship::WIDTH, lane_y),
    }
}
