//! Particle store initialization for the three layouts.
//!
//! Visual parameters are drawn from an injected `Rng`, so a seeded `StdRng`
//! reproduces a field exactly while the default entropy source gives a
//! different arrangement on every mount.

use std::f64::consts::TAU;

use rand::Rng;

use super::states::{Layout, NVec2, Particle, ParticleField, Rgb, Shape};

/// Fraction of a grid cell a particle's anchor may be jittered across.
pub const GRID_JITTER: f64 = 0.8;

/// Amplitude (px) of the grid float offsets before halving.
pub const GRID_FLOAT_AMPLITUDE: f64 = 30.0;

/// Create `count` particles for `layout` inside a `size.x` by `size.y` viewport.
pub fn initialize<R: Rng + ?Sized>(count: usize, layout: Layout, size: NVec2, palette: Rgb, rng: &mut R) -> ParticleField {
    let particles = match layout {
        Layout::Chain => chain_particles(count, size, palette, rng),
        Layout::Grid => grid_particles(count, size, palette, rng),
        Layout::Drift => drift_particles(count, size, rng),
    };
    ParticleField::from_particles(layout, particles)
}

/// Trail: everyone stacked at the centre, size and opacity tapering along the chain.
fn chain_particles<R: Rng + ?Sized>(count: usize, size: NVec2, palette: Rgb, rng: &mut R) -> Vec<Particle> {
    let centre = size * 0.5;
    (0..count)
        .map(|i| {
            let f = i as f64 / count as f64;
            let mut p = Particle::at(centre);
            p.radius = 3.0 - f * 2.5;
            p.base_opacity = 1.0 - f * 0.7;
            p.opacity = p.base_opacity;
            p.phase = rng.random::<f64>() * TAU;
            p.color = palette;
            p
        })
        .collect()
}

/// Ambient dots: one jittered anchor per cell of a `g x g` grid.
fn grid_particles<R: Rng + ?Sized>(count: usize, size: NVec2, palette: Rgb, rng: &mut R) -> Vec<Particle> {
    let g = (count as f64).sqrt().ceil().max(1.0) as usize;
    let cell = NVec2::new(size.x / g as f64, size.y / g as f64);

    (0..count)
        .map(|i| {
            let origin = NVec2::new((i % g) as f64 * cell.x, (i / g) as f64 * cell.y);
            let jitter = NVec2::new(
                rng.random::<f64>() * cell.x * GRID_JITTER,
                rng.random::<f64>() * cell.y * GRID_JITTER,
            );
            let anchor = origin + jitter;
            let i_f = i as f64;

            let mut p = Particle::at(anchor);
            p.float_offset = NVec2::new(
                (i_f * 0.5).sin() * GRID_FLOAT_AMPLITUDE,
                (i_f * 0.7).cos() * GRID_FLOAT_AMPLITUDE,
            );
            p.radius = 1.5 + rng.random::<f64>() * 2.5;
            p.base_opacity = 0.3 + rng.random::<f64>() * 0.5;
            p.opacity = p.base_opacity;
            p.phase = rng.random::<f64>() * TAU;
            p.repel_distance = Some(180.0 + rng.random::<f64>() * 80.0);
            p.color = palette;
            p
        })
        .collect()
}

/// Background shapes in a blue-violet band, drifting slowly.
fn drift_particles<R: Rng + ?Sized>(count: usize, size: NVec2, rng: &mut R) -> Vec<Particle> {
    (0..count)
        .map(|_| {
            let x = NVec2::new(rng.random::<f64>() * size.x, rng.random::<f64>() * size.y);
            let mut p = Particle::at(x);
            p.v = NVec2::new((rng.random::<f64>() - 0.5) * 0.5, (rng.random::<f64>() - 0.5) * 0.5);
            p.radius = (50.0 + rng.random::<f64>() * 150.0) / 2.0;
            p.rotation = rng.random::<f64>() * TAU;
            p.spin = (rng.random::<f64>() - 0.5) * 0.01;
            p.shape = match rng.random_range(0..3) {
                0 => Shape::Circle,
                1 => Shape::Square,
                _ => Shape::Triangle,
            };
            p.color = Rgb::from_hsl(
                220.0 + rng.random::<f64>() * 40.0,
                (60.0 + rng.random::<f64>() * 20.0) / 100.0,
                (50.0 + rng.random::<f64>() * 20.0) / 100.0,
            );
            p.phase = rng.random::<f64>() * TAU;
            p.pulse_speed = 1.0 + rng.random::<f64>();
            p
        })
        .collect()
}
