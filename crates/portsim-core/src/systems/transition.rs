//! Transition scheduler - timed position interpolation with lifecycle events
//!
//! A transition moves a point from `from` to `to` over a duration, optionally
//! after a start delay. Nothing runs until `play` is called. Each `advance`
//! steps every playing transition and reports what happened as
//! `TransitionEvent`s instead of invoking callbacks, so the owner decides how
//! to react with full mutable access to its own state.

use crate::components::Vec2;
use std::collections::BTreeMap;

/// Identifies a transition. Ids grow monotonically, so ordering by id is
/// ordering by creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransitionId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlayState {
    /// Created, waiting for `play`
    Idle,
    /// Playing, start delay not yet elapsed
    Delayed,
    Running,
}

#[derive(Debug, Clone)]
struct Transition<T> {
    target: T,
    from: Vec2,
    to: Vec2,
    duration_ms: f64,
    delay_remaining_ms: f64,
    elapsed_ms: f64,
    state: PlayState,
    paused: bool,
    next: Option<TransitionId>,
}

impl<T> Transition<T> {
    fn progress(&self) -> f32 {
        if self.duration_ms <= 0.0 {
            return if self.state == PlayState::Running && self.elapsed_ms >= 0.0 {
                1.0
            } else {
                0.0
            };
        }
        (self.elapsed_ms / self.duration_ms).clamp(0.0, 1.0) as f32
    }

    fn position(&self) -> Vec2 {
        self.from.lerp(self.to, self.progress())
    }
}

/// Lifecycle notifications produced by the scheduler
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionEvent<T> {
    Started {
        id: TransitionId,
        target: T,
    },
    Updated {
        id: TransitionId,
        target: T,
        progress: f32,
        position: Vec2,
    },
    Completed {
        id: TransitionId,
        target: T,
        position: Vec2,
    },
}

impl<T> TransitionEvent<T> {
    pub fn id(&self) -> TransitionId {
        match self {
            TransitionEvent::Started { id, .. }
            | TransitionEvent::Updated { id, .. }
            | TransitionEvent::Completed { id, .. } => *id,
        }
    }

    pub fn target(&self) -> &T {
        match self {
            TransitionEvent::Started { target, .. }
            | TransitionEvent::Updated { target, .. }
            | TransitionEvent::Completed { target, .. } => target,
        }
    }
}

/// Owns every live transition. `T` tags each transition with whatever the
/// owner needs to route its events.
#[derive(Debug, Clone)]
pub struct Tweener<T> {
    transitions: BTreeMap<TransitionId, Transition<T>>,
    next_id: u64,
}

impl<T: Clone> Tweener<T> {
    pub fn new() -> Self {
        Self {
            transitions: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Schedule a transition. It does not start until `play`.
    pub fn create(
        &mut self,
        target: T,
        from: Vec2,
        to: Vec2,
        duration_ms: f64,
        delay_ms: f64,
    ) -> TransitionId {
        let id = TransitionId(self.next_id);
        self.next_id += 1;
        self.transitions.insert(
            id,
            Transition {
                target,
                from,
                to,
                duration_ms: duration_ms.max(0.0),
                delay_remaining_ms: delay_ms.max(0.0),
                elapsed_ms: 0.0,
                state: PlayState::Idle,
                paused: false,
                next: None,
            },
        );
        id
    }

    /// Start a transition. If it has no delay it starts right away and the
    /// `Started` event is returned for the caller to handle immediately;
    /// delayed starts are reported by `advance`.
    pub fn play(&mut self, id: TransitionId) -> Option<TransitionEvent<T>> {
        let transition = self.transitions.get_mut(&id)?;
        if transition.state != PlayState::Idle {
            return None;
        }
        if transition.delay_remaining_ms > 0.0 {
            transition.state = PlayState::Delayed;
            None
        } else {
            transition.state = PlayState::Running;
            Some(TransitionEvent::Started {
                id,
                target: transition.target.clone(),
            })
        }
    }

    /// Start `next` as soon as `id` completes
    pub fn chain(&mut self, id: TransitionId, next: TransitionId) -> bool {
        if !self.transitions.contains_key(&next) {
            return false;
        }
        match self.transitions.get_mut(&id) {
            Some(transition) => {
                transition.next = Some(next);
                true
            }
            None => false,
        }
    }

    pub fn pause(&mut self, id: TransitionId) -> bool {
        match self.transitions.get_mut(&id) {
            Some(t) if !t.paused => {
                t.paused = true;
                true
            }
            _ => false,
        }
    }

    /// Resume from exactly where the transition was paused
    pub fn resume(&mut self, id: TransitionId) -> bool {
        match self.transitions.get_mut(&id) {
            Some(t) if t.paused => {
                t.paused = false;
                true
            }
            _ => false,
        }
    }

    pub fn is_paused(&self, id: TransitionId) -> bool {
        self.transitions.get(&id).is_some_and(|t| t.paused)
    }

    /// Started (or waiting out its delay) and not paused
    pub fn is_playing(&self, id: TransitionId) -> bool {
        self.transitions
            .get(&id)
            .is_some_and(|t| t.state != PlayState::Idle && !t.paused)
    }

    /// True once the start delay has elapsed
    pub fn is_running(&self, id: TransitionId) -> bool {
        self.transitions
            .get(&id)
            .is_some_and(|t| t.state == PlayState::Running)
    }

    pub fn progress(&self, id: TransitionId) -> Option<f32> {
        self.transitions.get(&id).map(|t| t.progress())
    }

    pub fn position(&self, id: TransitionId) -> Option<Vec2> {
        self.transitions.get(&id).map(|t| t.position())
    }

    pub fn target(&self, id: TransitionId) -> Option<&T> {
        self.transitions.get(&id).map(|t| &t.target)
    }

    /// Drop a transition without completing it. Chained successors are not
    /// touched.
    pub fn cancel(&mut self, id: TransitionId) -> bool {
        self.transitions.remove(&id).is_some()
    }

    pub fn contains(&self, id: TransitionId) -> bool {
        self.transitions.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn clear(&mut self) {
        self.transitions.clear();
    }

    /// Step every playing transition by `delta_ms`, in creation order.
    ///
    /// Transitions started during this call (chained successors) begin
    /// moving on the next call.
    pub fn advance(&mut self, delta_ms: f64) -> Vec<TransitionEvent<T>> {
        let mut events = Vec::new();
        let active: Vec<TransitionId> = self
            .transitions
            .iter()
            .filter(|(_, t)| t.state != PlayState::Idle && !t.paused)
            .map(|(&id, _)| id)
            .collect();

        for id in active {
            let Some(transition) = self.transitions.get_mut(&id) else {
                continue;
            };

            let mut step = delta_ms;
            if transition.state == PlayState::Delayed {
                transition.delay_remaining_ms -= step;
                if transition.delay_remaining_ms > 0.0 {
                    continue;
                }
                step = -transition.delay_remaining_ms;
                transition.delay_remaining_ms = 0.0;
                transition.state = PlayState::Running;
                events.push(TransitionEvent::Started {
                    id,
                    target: transition.target.clone(),
                });
            }

            transition.elapsed_ms += step;
            let progress = transition.progress();
            let position = transition.position();
            events.push(TransitionEvent::Updated {
                id,
                target: transition.target.clone(),
                progress,
                position,
            });

            if progress >= 1.0 {
                let target = transition.target.clone();
                let next = transition.next;
                self.transitions.remove(&id);
                events.push(TransitionEvent::Completed {
                    id,
                    target,
                    position,
                });
                if let Some(next) = next {
                    if let Some(started) = self.play(next) {
                        events.push(started);
                    }
                }
            }
        }

        events
    }
}

impl<T: Clone> Default for Tweener<T> {
    fn default() -> Self {
        Self::new()
    }
}
