//! Ship queue - FIFO holding area next to the gate lane.

use super::common::{CargoState, Vec2};
use super::ship::{Ship, ShipId};
use std::collections::VecDeque;

/// Spacing between queued ships
pub const QUEUE_GAP: f32 = 10.0;

/// Waiting ships of one cargo class.
///
/// A ship's slot is derived from its index, so removing a ship compacts the
/// slots of everyone behind it.
#[derive(Debug, Clone)]
pub struct ShipQueue {
    cargo: CargoState,
    origin: Vec2,
    ships: VecDeque<ShipId>,
}

impl ShipQueue {
    pub fn new(cargo: CargoState, origin: Vec2) -> Self {
        Self {
            cargo,
            origin,
            ships: VecDeque::new(),
        }
    }

    /// Cargo state of every ship in this queue
    pub fn cargo(&self) -> CargoState {
        self.cargo
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Distance between consecutive slots
    pub fn slot_width() -> f32 {
        Ship::WIDTH + QUEUE_GAP
    }

    pub fn slot_position(&self, index: usize) -> Vec2 {
        Vec2::new(
            self.origin.x + index as f32 * Self::slot_width(),
            self.origin.y,
        )
    }

    /// Slot of `ship`, or `None` if it is not waiting here
    pub fn available_position(&self, ship: ShipId) -> Option<Vec2> {
        self.index_of(ship).map(|i| self.slot_position(i))
    }

    /// Slot the next added ship will get
    pub fn next_slot(&self) -> Vec2 {
        self.slot_position(self.ships.len())
    }

    pub fn index_of(&self, ship: ShipId) -> Option<usize> {
        self.ships.iter().position(|&s| s == ship)
    }

    pub fn contains(&self, ship: ShipId) -> bool {
        self.index_of(ship).is_some()
    }

    pub fn ships(&self) -> impl ExactSizeIterator<Item = ShipId> + '_ {
        self.ships.iter().copied()
    }

    pub fn add_ship(&mut self, ship: ShipId) {
        debug_assert!(!self.contains(ship), "ship {:?} queued twice", ship);
        self.ships.push_back(ship);
    }

    /// Put a ship back at the head of the line, ahead of everyone it was
    /// already waiting before
    pub fn readmit_ship(&mut self, ship: ShipId) {
        debug_assert!(!self.contains(ship), "ship {:?} queued twice", ship);
        self.ships.push_front(ship);
    }

    pub fn first_ship(&self) -> Option<ShipId> {
        self.ships.front().copied()
    }

    pub fn remove_first_ship(&mut self) -> Option<ShipId> {
        self.ships.pop_front()
    }

    /// Remove a ship from anywhere in the queue. Returns its former index.
    pub fn remove_ship(&mut self, ship: ShipId) -> Option<usize> {
        let index = self.index_of(ship)?;
        self.ships.remove(index);
        Some(index)
    }

    pub fn is_empty(&self) -> bool {
        self.ships.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ships.len()
    }

    /// Every member with the slot it should be standing in
    pub fn slots(&self) -> Vec<(ShipId, Vec2)> {
        self.ships
            .iter()
            .enumerate()
            .map(|(i, &ship)| (ship, self.slot_position(i)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hecs::World;

    fn spawn(world: &mut World, n: usize) -> Vec<ShipId> {
        (0..n).map(|_| world.spawn(())).collect()
    }

    #[test]
    fn test_fifo_order() {
        let mut world = World::new();
        let ids = spawn(&mut world, 3);
        let mut queue = ShipQueue::new(CargoState::Empty, Vec2::new(10.0, 20.0));
        assert!(queue.is_empty());
        assert_eq!(queue.first_ship(), None);

        for &id in &ids {
            queue.add_ship(id);
        }
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.first_ship(), Some(ids[0]));
        assert_eq!(queue.remove_first_ship(), Some(ids[0]));
        assert_eq!(queue.first_ship(), Some(ids[1]));
    }

    #[test]
    fn test_positions_compact_after_front_removal() {
        let mut world = World::new();
        let ids = spawn(&mut world, 3);
        let mut queue = ShipQueue::new(CargoState::Full, Vec2::new(100.0, 50.0));
        for &id in &ids {
            queue.add_ship(id);
        }

        let before: Vec<f32> = ids[1..]
            .iter()
            .map(|&id| queue.available_position(id).unwrap().x)
            .collect();
        queue.remove_first_ship();
        let after: Vec<f32> = ids[1..]
            .iter()
            .map(|&id| queue.available_position(id).unwrap().x)
            .collect();

        for (b, a) in before.iter().zip(after.iter()) {
            assert!((b - a - ShipQueue::slot_width()).abs() < 0.001);
        }
        assert_eq!(queue.available_position(ids[1]), Some(Vec2::new(100.0, 50.0)));
        assert_eq!(queue.available_position(ids[0]), None);
    }

    #[test]
    fn test_remove_from_middle() {
        let mut world = World::new();
        let ids = spawn(&mut world, 3);
        let mut queue = ShipQueue::new(CargoState::Empty, Vec2::ZERO);
        for &id in &ids {
            queue.add_ship(id);
        }
        assert_eq!(queue.remove_ship(ids[1]), Some(1));
        assert_eq!(queue.remove_ship(ids[1]), None);
        assert_eq!(queue.slots(), vec![(ids[0], Vec2::ZERO), (ids[2], queue.slot_position(1))]);
    }

    #[test]
    fn test_next_slot() {
        let mut world = World::new();
        let ids = spawn(&mut world, 1);
        let mut queue = ShipQueue::new(CargoState::Empty, Vec2::ZERO);
        assert_eq!(queue.next_slot(), Vec2::ZERO);
        queue.add_ship(ids[0]);
        assert_eq!(queue.next_slot(), Vec2::new(100.0, 0.0));
    }

    #[test]
    fn test_readmit_goes_to_front() {
        let mut world = World::new();
        let ids = spawn(&mut world, 3);
        let mut queue = ShipQueue::new(CargoState::Full, Vec2::ZERO);
        queue.add_ship(ids[1]);
        queue.add_ship(ids[2]);

        queue.readmit_ship(ids[0]);
        assert_eq!(queue.first_ship(), Some(ids[0]));
        assert_eq!(queue.available_position(ids[1]), Some(queue.slot_position(1)));
        assert_eq!(queue.available_position(ids[2]), Some(queue.slot_position(2)));
    }
}
