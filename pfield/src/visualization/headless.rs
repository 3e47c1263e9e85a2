use tracing::info;

use crate::overlay::driver::{MountOutcome, Overlay};
use crate::simulation::scenario::Scenario;
use crate::surface::headless::HeadlessHost;
use crate::surface::host::{HostEvent, SurfaceError};

/// Frame spacing assumed by the headless run (60 Hz)
pub const FRAME_MS: f64 = 1000.0 / 60.0;

/// Summary of a headless run
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessReport {
    pub outcome: MountOutcome,
    pub frames_rendered: u64,
    pub painted_pixels: usize, // non-transparent pixels in the last frame
    pub mean_opacity: f64, // over all particles after the last frame
}

/// Drive an overlay for `frames` frames against an in-memory host.
/// The pointer circles the centre for the first half of the run and then rests,
/// so idle fade (if configured) shows up in the tail.
pub fn run_headless(scenario: Scenario, frames: u64) -> Result<HeadlessReport, SurfaceError> {
    let window = scenario.window;
    let mut host = HeadlessHost::new(window.width as u32, window.height as u32);
    let mut overlay = Overlay::new(scenario);

    let outcome = overlay.mount_seeded(&mut host)?;
    let (cx, cy) = (window.width as f64 * 0.5, window.height as f64 * 0.5);
    let radius = (window.width.min(window.height) as f64) * 0.3;
    let mut rendered = 0;

    for f in 0..frames {
        let now_ms = f as f64 * FRAME_MS;
        if f < frames / 2 {
            let a = f as f64 * 0.05;
            let event = HostEvent::PointerMove {
                x: cx + a.cos() * radius,
                y: cy + a.sin() * radius,
                at_ms: now_ms,
            };
            overlay.handle_event(&mut host, event)?;
        }
        for frame in host.take_frames() {
            if overlay.on_frame(&mut host, frame, now_ms) {
                rendered += 1;
            }
        }
    }

    let painted_pixels = overlay
        .surface()
        .and_then(|id| host.surface(id))
        .map_or(0, |canvas| canvas.painted());
    let mean_opacity = overlay.field().map_or(0.0, |field| {
        let n = field.len().max(1) as f64;
        field.particles().iter().map(|p| p.opacity).sum::<f64>() / n
    });
    overlay.unmount(&mut host);

    let report = HeadlessReport {
        outcome,
        frames_rendered: rendered,
        painted_pixels,
        mean_opacity,
    };
    info!(
        outcome = ?report.outcome,
        frames = report.frames_rendered,
        painted = report.painted_pixels,
        mean_opacity = report.mean_opacity,
        "headless run finished"
    );
    Ok(report)
}
