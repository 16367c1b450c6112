//! Component definitions for the port simulation.
//!
//! Components are plain data. Ships live in the controller's ECS world;
//! docks, the gate and queues are resources owned directly by the controller.
//! Behavior lives in systems and the engine.

mod common;
mod dock;
mod gate;
mod queue;
mod ship;

pub use common::*;
pub use dock::*;
pub use gate::*;
pub use queue::*;
pub use ship::*;
