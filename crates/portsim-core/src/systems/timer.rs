//! Timers - one-shot tasks due at a simulation time

/// Identifies a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Timer<T> {
    id: TimerId,
    due_ms: f64,
    task: T,
}

/// Pending timers owned by the controller. Nothing here is global; dropping
/// or clearing the set cancels everything.
#[derive(Debug, Clone)]
pub struct Timers<T> {
    pending: Vec<Timer<T>>,
    next_id: u64,
}

impl<T> Timers<T> {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            next_id: 0,
        }
    }

    pub fn schedule(&mut self, due_ms: f64, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Timer { id, due_ms, task });
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let index = self.pending.iter().position(|t| t.id == id)?;
        Some(self.pending.swap_remove(index).task)
    }

    /// Remove and return the earliest timer due at or before `now_ms`.
    /// Equal due times come out in scheduling order.
    pub fn pop_due(&mut self, now_ms: f64) -> Option<(TimerId, f64, T)> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= now_ms)
            .min_by(|(_, a), (_, b)| {
                a.due_ms
                    .partial_cmp(&b.due_ms)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.id.cmp(&b.id))
            })
            .map(|(i, _)| i)?;
        let timer = self.pending.swap_remove(index);
        Some((timer.id, timer.due_ms, timer.task))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

impl<T> Default for Timers<T> {
    fn default() -> Self {
        Self::new()
    }
}
