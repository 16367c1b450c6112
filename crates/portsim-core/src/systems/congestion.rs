//! Congestion - throttles inbound gate crossings against the gate flag
//!
//! Runs once per tick, before transitions advance. An inbound crossing that
//! is past the halfway point stops while the gate is closed and picks up
//! where it left off once the gate reopens.

use super::transition::{TransitionId, Tweener};
use crate::components::Gate;

/// Progress after which an inbound crossing must yield to a closed gate
pub const INBOUND_YIELD_PROGRESS: f32 = 0.5;

/// Progress after which an outbound ship claims the lane
pub const OUTBOUND_CLAIM_PROGRESS: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateAction {
    Paused(TransitionId),
    Resumed(TransitionId),
}

/// Pause or resume each inbound crossing according to the gate flag
pub fn regulate_inbound<T: Clone>(
    gate: &Gate,
    tweener: &mut Tweener<T>,
    inbound: impl IntoIterator<Item = TransitionId>,
) -> Vec<GateAction> {
    let mut actions = Vec::new();

    for id in inbound {
        if gate.is_open() {
            if tweener.is_paused(id) && tweener.resume(id) {
                actions.push(GateAction::Resumed(id));
            }
        } else if tweener.is_running(id) && !tweener.is_paused(id) {
            let past_half = tweener
                .progress(id)
                .is_some_and(|p| p > INBOUND_YIELD_PROGRESS);
            if past_half && tweener.pause(id) {
                actions.push(GateAction::Paused(id));
            }
        }
    }

    actions
}
