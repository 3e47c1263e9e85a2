//! The mounted overlay: ties surface, store, integrator and renderer to a host.
//!
//! The host plays the event loop. It forwards pointer and resize events to
//! [`Overlay::handle_event`] and fires frame callbacks into
//! [`Overlay::on_frame`]; each accepted frame integrates, paints, and asks
//! for the next one. Unmounting cancels the outstanding request, so a frame
//! that still arrives afterwards finds nothing to do.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::simulation::integrator::step;
use crate::simulation::layout::initialize;
use crate::simulation::pointer::{FrameInput, InputTracker, PointerState};
use crate::simulation::scenario::Scenario;
use crate::simulation::states::{Layout, NVec2, ParticleField};
use crate::render::renderer::Renderer;
use crate::surface::host::{EventKind, FrameId, Host, HostEvent, ListenerId, PointerKind, SurfaceError, SurfaceId, Viewport};
use crate::surface::manager::SurfaceManager;

/// When mounting is skipped outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MountPolicy {
    pub mobile_max_width: Option<u32>, // viewports this narrow or narrower count as mobile
}

impl Default for MountPolicy {
    fn default() -> Self {
        Self {
            mobile_max_width: Some(768),
        }
    }
}

impl MountPolicy {
    /// Decide from the device capabilities whether the overlay should exist at all.
    pub fn check(&self, pointer: PointerKind, viewport: Viewport) -> Result<(), SkipReason> {
        if pointer == PointerKind::Coarse {
            return Err(SkipReason::CoarsePointer);
        }
        match self.mobile_max_width {
            Some(max) if viewport.width <= max => Err(SkipReason::NarrowViewport { width: viewport.width }),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    CoarsePointer,
    NarrowViewport { width: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountOutcome {
    Mounted,
    Skipped(SkipReason),
}

pub struct Overlay {
    scenario: Scenario,
    renderer: Renderer,
    surfaces: SurfaceManager,
    tracker: InputTracker,
    pointer_listener: Option<ListenerId>,
    field: Option<ParticleField>,
}

impl Overlay {
    pub fn new(scenario: Scenario) -> Self {
        let renderer = Renderer::new(scenario.render);
        Self {
            scenario,
            renderer,
            surfaces: SurfaceManager::new(),
            tracker: InputTracker::new(),
            pointer_listener: None,
            field: None,
        }
    }

    /// Mount with the scenario's seed, or fresh entropy when it has none
    pub fn mount_seeded<H: Host>(&mut self, host: &mut H) -> Result<MountOutcome, SurfaceError> {
        let mut rng = match self.scenario.engine.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        self.mount(host, &mut rng)
    }

    /// Attach the surface, build the particle store at the host's viewport,
    /// subscribe to pointer moves (except for drift) and request the first frame.
    ///
    /// Skips without touching the host on touch devices and narrow
    /// viewports. If the surface cannot be acquired everything acquired so
    /// far is released and the error returned; the overlay stays unmounted.
    pub fn mount<H: Host, R: Rng + ?Sized>(&mut self, host: &mut H, rng: &mut R) -> Result<MountOutcome, SurfaceError> {
        if self.is_mounted() {
            return Ok(MountOutcome::Mounted);
        }

        if let Err(reason) = self.scenario.policy.check(host.pointer_kind(), host.viewport()) {
            info!(?reason, "particle overlay not mounted");
            return Ok(MountOutcome::Skipped(reason));
        }

        if let Err(err) = self.surfaces.mount(host, &self.scenario.surface) {
            warn!(error = %err, "particle overlay disabled");
            self.unmount(host);
            return Err(err);
        }

        let size = self.surfaces.size().unwrap_or_else(|| host.viewport());
        let engine = &self.scenario.engine;
        let field = initialize(
            engine.count,
            engine.layout,
            NVec2::new(size.width as f64, size.height as f64),
            engine.palette,
            rng,
        );
        self.field = Some(field);
        self.tracker = InputTracker::new();
        // Drift shapes never look at the pointer
        if engine.layout != Layout::Drift {
            self.pointer_listener = Some(host.listen(EventKind::PointerMove));
        }
        self.surfaces.schedule_frame(host);

        info!(
            layout = ?engine.layout,
            count = engine.count,
            width = size.width,
            height = size.height,
            "particle overlay mounted"
        );
        Ok(MountOutcome::Mounted)
    }

    /// Route a host event. Pointer moves only update the tracker; resizes
    /// only touch the surface, never the particles.
    pub fn handle_event<H: Host>(&mut self, host: &mut H, event: HostEvent) -> Result<(), SurfaceError> {
        if !self.is_mounted() {
            return Ok(());
        }
        match event {
            HostEvent::PointerMove { x, y, at_ms } => {
                if self.pointer_listener.is_some() {
                    self.tracker.record(x, y, at_ms);
                }
                Ok(())
            }
            HostEvent::Resize(size) => self.surfaces.resize(host, size),
        }
    }

    /// Frame callback. Returns true if the frame was integrated and painted.
    /// Frames other than the outstanding request (stale, or after unmount) are ignored.
    pub fn on_frame<H: Host>(&mut self, host: &mut H, frame: FrameId, now_ms: f64) -> bool {
        if !self.surfaces.accept_frame(frame) {
            return false;
        }
        let (Some(field), Some(id), Some(size)) = (self.field.as_mut(), self.surfaces.surface(), self.surfaces.size()) else {
            return false;
        };

        let input = FrameInput::new(self.tracker.snapshot(), now_ms, size.width as f64, size.height as f64);
        step(field, &self.scenario.impulses, &input, &self.scenario.parameters);

        if let Some(canvas) = host.canvas_mut(id) {
            self.renderer.render(field, canvas);
        }

        self.surfaces.schedule_frame(host);
        true
    }

    /// Release listeners, the pending frame and the surface. Safe to repeat.
    pub fn unmount<H: Host>(&mut self, host: &mut H) {
        if let Some(listener) = self.pointer_listener.take() {
            host.unlisten(listener);
        }
        self.surfaces.unmount(host);
        if self.field.take().is_some() {
            debug!("particle overlay unmounted");
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.surfaces.is_mounted()
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn field(&self) -> Option<&ParticleField> {
        self.field.as_ref()
    }

    pub fn pointer(&self) -> PointerState {
        self.tracker.snapshot()
    }

    pub fn surface(&self) -> Option<SurfaceId> {
        self.surfaces.surface()
    }

    pub fn surface_size(&self) -> Option<Viewport> {
        self.surfaces.size()
    }
}
