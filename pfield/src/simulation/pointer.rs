//! Pointer tracking and the per-frame input context.
//!
//! The tracker is the only writer of `PointerState`. The integrator gets a
//! copy inside `FrameInput`, so a frame never observes a half-applied event.

use super::states::NVec2;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    pub position: Option<NVec2>, // None until the first move event
    pub last_activity_ms: Option<f64>,
}

#[derive(Debug, Default)]
pub struct InputTracker {
    state: PointerState,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pointer-move event at `(x, y)` that happened at `at_ms`.
    pub fn record(&mut self, x: f64, y: f64, at_ms: f64) {
        self.state.position = Some(NVec2::new(x, y));
        self.state.last_activity_ms = Some(at_ms);
    }

    pub fn snapshot(&self) -> PointerState {
        self.state
    }
}

/// Everything a frame reads besides the field itself.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput {
    pub pointer: PointerState,
    pub now_ms: f64,
    pub bounds: NVec2, // drawable width/height
}

impl FrameInput {
    pub fn new(pointer: PointerState, now_ms: f64, width: f64, height: f64) -> Self {
        Self {
            pointer,
            now_ms,
            bounds: NVec2::new(width, height),
        }
    }
}
