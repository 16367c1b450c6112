//! Stage - the rendering surface the controller draws on
//!
//! The controller only creates, moves, recolours and destroys visuals. Hosts
//! plug in their renderer by implementing `Stage`.

use crate::components::Vec2;
use std::collections::HashMap;

/// Opaque handle to a visual owned by a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VisualHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualKind {
    Water,
    Dock,
    GateBarrier,
    QueueMarker,
    Ship,
}

pub trait Stage {
    fn create_visual(&mut self, kind: VisualKind, color: u32) -> VisualHandle;

    fn set_visual_position(&mut self, handle: VisualHandle, position: Vec2);

    /// Redraw with a new colour. Stages that ignore colour can skip this.
    fn set_visual_color(&mut self, _handle: VisualHandle, _color: u32) {}

    fn destroy_visual(&mut self, handle: VisualHandle);
}

/// Stage that draws nothing
#[derive(Debug, Default)]
pub struct NullStage {
    next: u64,
}

impl Stage for NullStage {
    fn create_visual(&mut self, _kind: VisualKind, _color: u32) -> VisualHandle {
        self.next += 1;
        VisualHandle(self.next)
    }

    fn set_visual_position(&mut self, _handle: VisualHandle, _position: Vec2) {}

    fn destroy_visual(&mut self, _handle: VisualHandle) {}
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedVisual {
    pub kind: VisualKind,
    pub color: u32,
    pub position: Vec2,
}

/// Stage that remembers every live visual, for headless runs and tests
#[derive(Debug, Default)]
pub struct RecordingStage {
    next: u64,
    visuals: HashMap<VisualHandle, RecordedVisual>,
    destroyed: usize,
}

impl RecordingStage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, handle: VisualHandle) -> Option<&RecordedVisual> {
        self.visuals.get(&handle)
    }

    /// Live visuals of one kind
    pub fn count(&self, kind: VisualKind) -> usize {
        self.visuals.values().filter(|v| v.kind == kind).count()
    }

    pub fn live(&self) -> usize {
        self.visuals.len()
    }

    pub fn destroyed(&self) -> usize {
        self.destroyed
    }
}

impl Stage for RecordingStage {
    fn create_visual(&mut self, kind: VisualKind, color: u32) -> VisualHandle {
        self.next += 1;
        let handle = VisualHandle(self.next);
        self.visuals.insert(
            handle,
            RecordedVisual {
                kind,
                color,
                position: Vec2::ZERO,
            },
        );
        handle
    }

    fn set_visual_position(&mut self, handle: VisualHandle, position: Vec2) {
        if let Some(visual) = self.visuals.get_mut(&handle) {
            visual.position = position;
        }
    }

    fn set_visual_color(&mut self, handle: VisualHandle, color: u32) {
        if let Some(visual) = self.visuals.get_mut(&handle) {
            visual.color = color;
        }
    }

    fn destroy_visual(&mut self, handle: VisualHandle) {
        if self.visuals.remove(&handle).is_some() {
            self.destroyed += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_stage_tracks_visuals() {
        let mut stage = RecordingStage::new();
        let ship = stage.create_visual(VisualKind::Ship, 0x50C878);
        stage.create_visual(VisualKind::Dock, 0xFFFF00);

        stage.set_visual_position(ship, Vec2::new(4.0, 2.0));
        stage.set_visual_color(ship, 0xFF2400);
        let visual = stage.get(ship).unwrap();
        assert_eq!(visual.position, Vec2::new(4.0, 2.0));
        assert_eq!(visual.color, 0xFF2400);

        stage.destroy_visual(ship);
        stage.destroy_visual(ship);
        assert_eq!(stage.count(VisualKind::Ship), 0);
        assert_eq!(stage.live(), 1);
        assert_eq!(stage.destroyed(), 1);
    }
}
