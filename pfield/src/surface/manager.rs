//! Lifecycle of the overlay's single drawing surface.
//!
//! Owns the surface handle, the resize subscription, and the pending frame
//! request. `unmount` releases whatever of those exists, so it is safe after
//! a partial mount and on repeated calls.

use tracing::debug;

use crate::surface::host::{EventKind, FrameId, Host, ListenerId, SurfaceError, SurfaceId, SurfaceStyle, Viewport};

#[derive(Debug, Default)]
pub struct SurfaceManager {
    surface: Option<SurfaceId>,
    resize_listener: Option<ListenerId>,
    pending_frame: Option<FrameId>,
    size: Option<Viewport>,
}

impl SurfaceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a viewport-sized surface and subscribe to resizes. No-op when already mounted.
    pub fn mount<H: Host>(&mut self, host: &mut H, style: &SurfaceStyle) -> Result<SurfaceId, SurfaceError> {
        if let Some(id) = self.surface {
            return Ok(id);
        }

        let size = host.viewport();
        let id = host.attach_surface(style, size)?;
        self.surface = Some(id);
        self.size = Some(size);
        self.resize_listener = Some(host.listen(EventKind::Resize));

        debug!(surface = id.0, width = size.width, height = size.height, "surface attached");
        Ok(id)
    }

    /// Match the drawable size to `size`. Ignored while unmounted.
    pub fn resize<H: Host>(&mut self, host: &mut H, size: Viewport) -> Result<(), SurfaceError> {
        let Some(id) = self.surface else {
            return Ok(());
        };
        host.resize_surface(id, size)?;
        self.size = Some(size);
        debug!(surface = id.0, width = size.width, height = size.height, "surface resized");
        Ok(())
    }

    /// Request the next frame callback. Only one request is outstanding at a time.
    pub fn schedule_frame<H: Host>(&mut self, host: &mut H) -> Option<FrameId> {
        self.surface?;
        if let Some(stale) = self.pending_frame.take() {
            host.cancel_frame(stale);
        }
        let id = host.request_frame();
        self.pending_frame = Some(id);
        Some(id)
    }

    /// Consume `frame` if it is the outstanding request. Anything else is stale.
    pub fn accept_frame(&mut self, frame: FrameId) -> bool {
        if self.pending_frame == Some(frame) {
            self.pending_frame = None;
            true
        } else {
            false
        }
    }

    /// Cancel the pending frame, drop the resize listener, detach the surface.
    pub fn unmount<H: Host>(&mut self, host: &mut H) {
        if let Some(frame) = self.pending_frame.take() {
            host.cancel_frame(frame);
        }
        if let Some(listener) = self.resize_listener.take() {
            host.unlisten(listener);
        }
        if let Some(id) = self.surface.take() {
            host.detach_surface(id);
            debug!(surface = id.0, "surface detached");
        }
        self.size = None;
    }

    pub fn is_mounted(&self) -> bool {
        self.surface.is_some()
    }

    pub fn surface(&self) -> Option<SurfaceId> {
        self.surface
    }

    pub fn size(&self) -> Option<Viewport> {
        self.size
    }

    pub fn pending_frame(&self) -> Option<FrameId> {
        self.pending_frame
    }
}
