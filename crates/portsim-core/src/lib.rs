//! PortSim Core - Port Traffic Simulation Engine
//!
//! Ships arrive at the outer edge of a port, cross a single-lane gate, and
//! either berth at a dock holding the complementary cargo or wait in a queue
//! for their cargo class. Parked ships swap cargo with their dock, head back
//! through the gate and leave.
//!
//! # Architecture
//!
//! Ships are entities in a `hecs` world:
//! - **Components**: `Ship`, `Position`, `Voyage` (controller bookkeeping), `Visual`
//! - **Resources**: docks, the gate and two queues, owned by the controller
//! - **Systems**: dock lookup, gate congestion, transitions, timers, the event journal
//!
//! Rendering is delegated to a `Stage`; the controller never draws itself.
//!
//! # Example
//!
//! ```rust,no_run
//! use portsim_core::prelude::*;
//!
//! let mut port = create_port(PortConfig::default()).unwrap();
//!
//! loop {
//!     port.update(1000.0 / 60.0); // 60 FPS, in milliseconds
//! }
//! ```

pub mod components;
pub mod config;
pub mod engine;
pub mod error;
pub mod generation;
pub mod stage;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::config::{PortConfig, TransitionTimings};
    pub use crate::engine::{create_port, PortController, PortSnapshot, QueueLengths};
    pub use crate::error::{PortError, Result};
    pub use crate::stage::{NullStage, RecordingStage, Stage, VisualHandle, VisualKind};
    pub use crate::systems::{PortEvent, PortEventRecord, PortStats};
}
