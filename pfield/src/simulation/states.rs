//! Core state types for the particle field.
//!
//! Defines the per-particle record and the field that owns them:
//! - `Particle` using `NVec2` screen-pixel vectors
//! - `ParticleField`, a fixed-size ordered store plus the animation clock `t`
//!
//! Positions and velocities are only written by the integrator.

use nalgebra::Vector2;
pub type NVec2 = Vector2<f64>;

/// Layout the field was created with. Decides how targets are picked each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Chain, // leader follows the pointer, each follower chases its predecessor
    Grid,  // ambient anchors spread across the viewport, pointer repels
    Drift, // free-floating shapes bouncing off the viewport edges
}

/// Outline drawn for drift particles. Dots always render as circles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Circle,
    Square,
    Triangle,
}

/// Straight (non-premultiplied) 8-bit colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb { r: 255, g: 255, b: 255 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert hue (degrees), saturation and lightness (both 0..=1).
    pub fn from_hsl(h: f64, s: f64, l: f64) -> Self {
        let h = h.rem_euclid(360.0) / 360.0;
        let s = s.clamp(0.0, 1.0);
        let l = l.clamp(0.0, 1.0);
        if s == 0.0 {
            let v = (l * 255.0).round() as u8;
            return Self::new(v, v, v);
        }
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        let channel = |mut t: f64| {
            if t < 0.0 { t += 1.0; }
            if t > 1.0 { t -= 1.0; }
            let v = if t < 1.0 / 6.0 {
                p + (q - p) * 6.0 * t
            } else if t < 0.5 {
                q
            } else if t < 2.0 / 3.0 {
                p + (q - p) * (2.0 / 3.0 - t) * 6.0
            } else {
                p
            };
            (v * 255.0).round() as u8
        };
        Self::new(channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0))
    }
}

#[derive(Debug, Clone)]
pub struct Particle {
    pub x: NVec2, // position
    pub v: NVec2, // velocity
    pub target: NVec2, // target used by the most recent frame
    pub anchor: NVec2, // grid base position
    pub float_offset: NVec2, // grid float amplitudes
    pub radius: f64,
    pub base_opacity: f64,
    pub phase: f64, // pulse offset
    pub pulse_speed: f64, // multiplier on the pulse clock
    pub repel_distance: Option<f64>,
    pub opacity: f64, // frame-varying opacity, written by the integrator
    pub shape: Shape,
    pub rotation: f64,
    pub spin: f64, // rotation per frame
    pub color: Rgb,
}

impl Particle {
    /// A resting particle at `x` with neutral visual parameters.
    pub fn at(x: NVec2) -> Self {
        Self {
            x,
            v: NVec2::zeros(),
            target: x,
            anchor: x,
            float_offset: NVec2::zeros(),
            radius: 2.0,
            base_opacity: 1.0,
            phase: 0.0,
            pulse_speed: 1.0,
            repel_distance: None,
            opacity: 1.0,
            shape: Shape::Circle,
            rotation: 0.0,
            spin: 0.0,
            color: Rgb::WHITE,
        }
    }

    pub fn speed(&self) -> f64 {
        self.v.norm()
    }

    /// Size multiplier in `[0.4, 1.0]` at clock `t`. Drift shapes breathe with it.
    pub fn size_pulse(&self, t: f64) -> f64 {
        (t * self.pulse_speed + self.phase).sin() * 0.3 + 0.7
    }
}

/// Fixed-size particle store. No insertion or removal after creation.
#[derive(Debug, Clone)]
pub struct ParticleField {
    layout: Layout,
    particles: Vec<Particle>,
    pub t: f64, // animation clock, advanced once per frame
    pub frame: u64, // frames integrated so far
}

impl ParticleField {
    pub fn from_particles(layout: Layout, particles: Vec<Particle>) -> Self {
        Self {
            layout,
            particles,
            t: 0.0,
            frame: 0,
        }
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Mutable view for the integrator. A slice, so the store size cannot change.
    pub(crate) fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }
}
