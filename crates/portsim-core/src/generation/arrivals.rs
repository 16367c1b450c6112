//! Ship arrivals - cargo rolls and ship spawning

use crate::components::{CargoState, Position, Ship, ShipId, Vec2, Visual, Voyage};
use crate::stage::VisualHandle;
use hecs::World;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seeded generator when `seed` is given, OS entropy otherwise
pub fn arrival_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Biased coin: empty with `empty_probability`, full otherwise
pub fn roll_cargo(rng: &mut impl Rng, empty_probability: f64) -> CargoState {
    if rng.gen_bool(empty_probability.clamp(0.0, 1.0)) {
        CargoState::Empty
    } else {
        CargoState::Full
    }
}

/// Spawn a ship entity at `at`, drawn by `visual`, ready to start its visit
pub fn spawn_ship(
    world: &mut World,
    serial: u32,
    cargo: CargoState,
    at: Vec2,
    visual: VisualHandle,
) -> ShipId {
    world.spawn((
        Ship::new(serial, cargo),
        Position(at),
        Voyage::new(),
        Visual(visual),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::ShipPhase;

    #[test]
    fn test_seeded_rolls_repeat() {
        let mut a = arrival_rng(Some(42));
        let mut b = arrival_rng(Some(42));
        let rolls_a: Vec<_> = (0..32).map(|_| roll_cargo(&mut a, 0.495)).collect();
        let rolls_b: Vec<_> = (0..32).map(|_| roll_cargo(&mut b, 0.495)).collect();
        assert_eq!(rolls_a, rolls_b);
    }

    #[test]
    fn test_degenerate_probabilities() {
        let mut rng = arrival_rng(Some(1));
        assert!((0..50).all(|_| roll_cargo(&mut rng, 1.0) == CargoState::Empty));
        assert!((0..50).all(|_| roll_cargo(&mut rng, 0.0) == CargoState::Full));
    }

    #[test]
    fn test_bias_is_roughly_even() {
        let mut rng = arrival_rng(Some(2024));
        let empty = (0..10_000)
            .filter(|_| roll_cargo(&mut rng, 0.495) == CargoState::Empty)
            .count();
        assert!((4500..5400).contains(&empty), "{} empty of 10000", empty);
    }

    #[test]
    fn test_spawn_ship() {
        let mut world = World::new();
        let id = spawn_ship(
            &mut world,
            3,
            CargoState::Full,
            Vec2::new(800.0, 285.0),
            VisualHandle(12),
        );

        let ship = world.get::<&Ship>(id).unwrap();
        assert_eq!(ship.serial(), 3);
        assert_eq!(ship.cargo(), CargoState::Full);
        assert_eq!(world.get::<&Position>(id).unwrap().0, Vec2::new(800.0, 285.0));
        assert_eq!(world.get::<&Voyage>(id).unwrap().phase, ShipPhase::Arrived);
        assert_eq!(world.get::<&Visual>(id).unwrap().0, VisualHandle(12));
    }
}
