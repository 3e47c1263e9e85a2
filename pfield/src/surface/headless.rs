//! In-memory host: a document with no window behind it.
//!
//! Surfaces are `PixelCanvas`es, listeners and frame requests are plain
//! bookkeeping. The caller plays the event loop by draining frame requests
//! with [`HeadlessHost::take_frames`] and feeding events to the overlay.

use std::collections::{BTreeMap, BTreeSet};

use crate::render::canvas::{Canvas, PixelCanvas};
use crate::surface::host::{
    EventKind, FrameId, Host, HostEvent, ListenerId, PointerKind, SurfaceError, SurfaceId, SurfaceStyle, Viewport,
};

#[derive(Debug)]
pub struct HeadlessHost {
    viewport: Viewport,
    pointer_kind: PointerKind,
    refuse_surfaces: bool,
    surfaces: BTreeMap<SurfaceId, (SurfaceStyle, PixelCanvas)>,
    listeners: BTreeMap<ListenerId, EventKind>,
    frames: BTreeSet<FrameId>,
    next_id: u64,
}

impl HeadlessHost {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            viewport: Viewport::new(width, height),
            pointer_kind: PointerKind::Fine,
            refuse_surfaces: false,
            surfaces: BTreeMap::new(),
            listeners: BTreeMap::new(),
            frames: BTreeSet::new(),
            next_id: 1,
        }
    }

    pub fn with_pointer_kind(mut self, kind: PointerKind) -> Self {
        self.pointer_kind = kind;
        self
    }

    /// Every `attach_surface` call fails, like a browser without 2D canvas support.
    pub fn refusing_surfaces(mut self) -> Self {
        self.refuse_surfaces = true;
        self
    }

    fn next(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn live_surfaces(&self) -> usize {
        self.surfaces.len()
    }

    pub fn live_listeners(&self) -> usize {
        self.listeners.len()
    }

    pub fn listeners_for(&self, kind: EventKind) -> usize {
        self.listeners.values().filter(|k| **k == kind).count()
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn surface(&self, id: SurfaceId) -> Option<&PixelCanvas> {
        self.surfaces.get(&id).map(|(_, canvas)| canvas)
    }

    pub fn surface_style(&self, id: SurfaceId) -> Option<&SurfaceStyle> {
        self.surfaces.get(&id).map(|(style, _)| style)
    }

    /// Change the window size. Returns the event a real document would dispatch.
    pub fn set_viewport(&mut self, width: u32, height: u32) -> HostEvent {
        self.viewport = Viewport::new(width, height);
        HostEvent::Resize(self.viewport)
    }

    /// Hand out every pending frame request, oldest first. Requests are one-shot.
    pub fn take_frames(&mut self) -> Vec<FrameId> {
        std::mem::take(&mut self.frames).into_iter().collect()
    }
}

impl Host for HeadlessHost {
    type Canvas = PixelCanvas;

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn pointer_kind(&self) -> PointerKind {
        self.pointer_kind
    }

    fn attach_surface(&mut self, style: &SurfaceStyle, size: Viewport) -> Result<SurfaceId, SurfaceError> {
        if self.refuse_surfaces {
            return Err(SurfaceError::Unavailable("2d context not supported".into()));
        }
        let id = SurfaceId(self.next());
        self.surfaces.insert(id, (*style, PixelCanvas::new(size.width, size.height)));
        Ok(id)
    }

    fn detach_surface(&mut self, id: SurfaceId) -> bool {
        self.surfaces.remove(&id).is_some()
    }

    fn resize_surface(&mut self, id: SurfaceId, size: Viewport) -> Result<(), SurfaceError> {
        let (_, canvas) = self.surfaces.get_mut(&id).ok_or(SurfaceError::Detached(id))?;
        canvas.resize(size.width, size.height);
        Ok(())
    }

    fn canvas_mut(&mut self, id: SurfaceId) -> Option<&mut PixelCanvas> {
        self.surfaces.get_mut(&id).map(|(_, canvas)| canvas)
    }

    fn listen(&mut self, kind: EventKind) -> ListenerId {
        let id = ListenerId(self.next());
        self.listeners.insert(id, kind);
        id
    }

    fn unlisten(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    fn request_frame(&mut self) -> FrameId {
        let id = FrameId(self.next());
        self.frames.insert(id);
        id
    }

    fn cancel_frame(&mut self, id: FrameId) -> bool {
        self.frames.remove(&id)
    }
}
