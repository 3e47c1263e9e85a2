//! The document the overlay lives in.
//!
//! `Host` is everything the overlay needs from its environment: surfaces,
//! event subscriptions, frame scheduling, and two capability queries. The
//! headless host implements it in memory; the bevy viewer implements it
//! over a window.

use thiserror::Error;

use crate::render::canvas::Canvas;

/// Drawable size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Primary pointing device, as the host reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Fine,   // mouse, trackpad, pen
    Coarse, // touch
}

/// Presentation of an overlay surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceStyle {
    pub pointer_events: bool, // false: clicks and hover pass through
    pub z_index: i32,
    pub opacity: f64,
}

impl Default for SurfaceStyle {
    fn default() -> Self {
        Self {
            pointer_events: false,
            z_index: 9999,
            opacity: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurfaceId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    PointerMove,
    Resize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    PointerMove { x: f64, y: f64, at_ms: f64 },
    Resize(Viewport),
}

impl HostEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            HostEvent::PointerMove { .. } => EventKind::PointerMove,
            HostEvent::Resize(_) => EventKind::Resize,
        }
    }
}

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("host could not provide a drawing surface: {0}")]
    Unavailable(String),
    #[error("surface {0:?} is not attached")]
    Detached(SurfaceId),
}

pub trait Host {
    type Canvas: Canvas;

    fn viewport(&self) -> Viewport;
    fn pointer_kind(&self) -> PointerKind;

    fn attach_surface(&mut self, style: &SurfaceStyle, size: Viewport) -> Result<SurfaceId, SurfaceError>;
    /// Returns false if `id` was not attached.
    fn detach_surface(&mut self, id: SurfaceId) -> bool;
    fn resize_surface(&mut self, id: SurfaceId, size: Viewport) -> Result<(), SurfaceError>;
    fn canvas_mut(&mut self, id: SurfaceId) -> Option<&mut Self::Canvas>;

    fn listen(&mut self, kind: EventKind) -> ListenerId;
    /// Returns false if `id` was not registered.
    fn unlisten(&mut self, id: ListenerId) -> bool;

    /// Ask for one frame callback.
    fn request_frame(&mut self) -> FrameId;
    /// Returns false if `id` already fired or was never requested.
    fn cancel_frame(&mut self, id: FrameId) -> bool;
}
