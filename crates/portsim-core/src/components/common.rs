//! Common components used across multiple entity types.

use serde::{Deserialize, Serialize};

/// 2D position vector in port (screen) coordinates
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance(&self, other: &Self) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Linear interpolation, `t` clamped to 0..=1
    pub fn lerp(&self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        *self + (other - *self) * t
    }

    pub fn midpoint(&self, other: Self) -> Self {
        self.lerp(other, 0.5)
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

/// Width/height pair
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Position component - top-left corner of an entity's footprint
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Position(pub Vec2);

/// Binary cargo classification shared by ships and docks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CargoState {
    Empty,
    Full,
}

impl CargoState {
    /// The opposite state (what a cargo exchange turns this into)
    pub fn complement(self) -> Self {
        match self {
            CargoState::Empty => CargoState::Full,
            CargoState::Full => CargoState::Empty,
        }
    }

    pub fn is_empty(self) -> bool {
        self == CargoState::Empty
    }
}

/// Open/closed flag controlling new assignments (docks and the gate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Admission {
    Open,
    Closed,
}

impl Admission {
    pub fn from_open(open: bool) -> Self {
        if open {
            Admission::Open
        } else {
            Admission::Closed
        }
    }

    pub fn is_open(self) -> bool {
        self == Admission::Open
    }
}
