//! Gate component - the single lane every ship crosses twice.

use super::common::{Admission, Vec2};
use serde::{Deserialize, Serialize};

/// The port entrance: one lane shared by inbound and outbound traffic.
///
/// Outbound ships claim the lane once they are halfway through it. The gate
/// reports closed while any claim is held; inbound crossings throttle
/// themselves against that flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gate {
    top: Vec2,
    bottom: Vec2,
    admission: Admission,
    claims: u32,
}

impl Gate {
    pub fn new(top: Vec2, bottom: Vec2) -> Self {
        Self {
            top,
            bottom,
            admission: Admission::Open,
            claims: 0,
        }
    }

    /// Gate at `x` on a port `height` tall: barriers end at the upper third
    /// and start again at `height - height / 3`.
    pub fn for_port(x: f32, height: f32) -> Self {
        let third = height / 3.0;
        Self::new(Vec2::new(x, third), Vec2::new(x, height - third))
    }

    pub fn top_position(&self) -> Vec2 {
        self.top
    }

    pub fn bottom_position(&self) -> Vec2 {
        self.bottom
    }

    /// Middle of the lane
    pub fn lane_center(&self) -> Vec2 {
        self.top.midpoint(self.bottom)
    }

    pub fn x(&self) -> f32 {
        self.top.x
    }

    pub fn admission(&self) -> Admission {
        self.admission
    }

    pub fn is_open(&self) -> bool {
        self.admission.is_open()
    }

    /// Direct override of the flag. Outstanding claims are kept; the next
    /// `release` that drops them to zero reopens the gate.
    pub fn set_open(&mut self, open: bool) {
        self.admission = Admission::from_open(open);
    }

    /// Outbound ships currently holding the lane
    pub fn claims(&self) -> u32 {
        self.claims
    }

    /// Claim the lane for an outbound ship. Returns true if this closed the gate.
    pub fn claim(&mut self) -> bool {
        self.claims += 1;
        let was_open = self.is_open();
        self.admission = Admission::Closed;
        was_open
    }

    /// Drop an outbound claim. Returns true if this reopened the gate.
    pub fn release(&mut self) -> bool {
        debug_assert!(self.claims > 0, "gate released without a claim");
        if self.claims == 0 {
            log::warn!("gate released without a claim, ignoring");
            return false;
        }
        self.claims -= 1;
        if self.claims == 0 && !self.is_open() {
            self.admission = Admission::Open;
            return true;
        }
        false
    }
}
