use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::render::canvas::PixelCanvas;
use crate::render::renderer::{Backdrop, RenderSettings, Renderer, Style};
use crate::simulation::forces::{ImpulseSet, PointerRepulsion};
use crate::simulation::integrator::step;
use crate::simulation::layout::initialize;
use crate::simulation::params::{OpacityModel, Parameters};
use crate::simulation::pointer::{FrameInput, PointerState};
use crate::simulation::states::{Layout, NVec2, Rgb};

const WIDTH: f64 = 1920.0;
const HEIGHT: f64 = 1080.0;

/// Pointer sweeping a circle around the screen centre, one position per frame
fn pointer_at(frame: usize) -> PointerState {
    let a = frame as f64 * 0.05;
    PointerState {
        position: Some(NVec2::new(WIDTH * 0.5 + a.cos() * 300.0, HEIGHT * 0.5 + a.sin() * 300.0)),
        last_activity_ms: Some(frame as f64 * 16.0),
    }
}

fn make_params(layout: Layout) -> Parameters {
    match layout {
        Layout::Grid => Parameters {
            easing: 0.08,
            friction: 0.82,
            opacity: OpacityModel::Pulse { rate: 1.2, floor: 0.4 },
            ..Parameters::default()
        },
        _ => Parameters::default(),
    }
}

fn make_impulses(layout: Layout) -> ImpulseSet {
    if layout == Layout::Grid {
        ImpulseSet::new().with(PointerRepulsion { strength: 8.0, distance: None })
    } else {
        ImpulseSet::new()
    }
}

/// Integrator cost per frame for chain and grid fields of growing size
pub fn bench_step() {
    let ns = [100, 400, 1600, 6400, 25600, 102400];
    let frames = 60;

    for layout in [Layout::Chain, Layout::Grid] {
        let params = make_params(layout);
        let impulses = make_impulses(layout);

        for n in ns {
            let mut rng = StdRng::seed_from_u64(42);
            let mut field = initialize(n, layout, NVec2::new(WIDTH, HEIGHT), Rgb::new(6, 182, 212), &mut rng);

            // Warm up
            let input = FrameInput::new(pointer_at(0), 0.0, WIDTH, HEIGHT);
            step(&mut field, &impulses, &input, &params);

            let t0 = Instant::now();
            for f in 1..=frames {
                let input = FrameInput::new(pointer_at(f), f as f64 * 16.0, WIDTH, HEIGHT);
                step(&mut field, &impulses, &input, &params);
            }
            let us = t0.elapsed().as_secs_f64() * 1e6 / frames as f64;

            info!(?layout, n, us_per_frame = us, "integrator");
        }
    }
}

/// Software render cost per frame at full HD for each particle style
pub fn bench_render() {
    let n = 100;
    let frames = 10;
    let styles = [(Style::Halo, Layout::Chain), (Style::Shine, Layout::Grid), (Style::Outline, Layout::Drift)];

    for (style, layout) in styles {
        let mut rng = StdRng::seed_from_u64(7);
        let field = initialize(n, layout, NVec2::new(WIDTH, HEIGHT), Rgb::new(6, 182, 212), &mut rng);
        let renderer = Renderer::new(RenderSettings {
            style,
            backdrop: Backdrop::Clear,
        });
        let mut canvas = PixelCanvas::new(WIDTH as u32, HEIGHT as u32);

        let t0 = Instant::now();
        for _ in 0..frames {
            renderer.render(&field, &mut canvas);
        }
        let ms = t0.elapsed().as_secs_f64() * 1000.0 / frames as f64;

        info!(?style, n, ms_per_frame = ms, "renderer");
    }
}
