//! Paints a `ParticleField` onto a `Canvas`.
//!
//! Each frame starts with the backdrop (clear, or a low-alpha wash that
//! leaves trails), then particles are drawn in store order, each back to
//! front: glow layers first, core last.

use crate::render::canvas::{Canvas, ColorStop, Paint, RadialGradient};
use crate::simulation::states::{NVec2, Particle, ParticleField, Rgb, Shape};

/// Per-particle look.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// Single soft glow at 3r plus a solid core.
    Halo,
    /// Two glow layers (4r, 2.5r) plus a specular core lit from the upper left.
    Shine,
    /// Translucent shape fill with a thin outline and a soft glow, rotated.
    /// The drawn size breathes with [`Particle::size_pulse`].
    Outline,
}

/// What happens to the previous frame before drawing the next one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backdrop {
    Clear,
    Wash { color: Rgb, alpha: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    pub style: Style,
    pub backdrop: Backdrop,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            style: Style::Halo,
            backdrop: Backdrop::Clear,
        }
    }
}

const OUTLINE_WIDTH: f64 = 1.5;
const SHADOW_BLUR: f64 = 30.0;

#[derive(Debug, Clone)]
pub struct Renderer {
    settings: RenderSettings,
}

impl Renderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Draw one frame of `field`
    pub fn render<C: Canvas + ?Sized>(&self, field: &ParticleField, canvas: &mut C) {
        match self.settings.backdrop {
            Backdrop::Clear => canvas.clear(),
            Backdrop::Wash { color, alpha } => canvas.wash(color, alpha),
        }

        for p in field.particles() {
            if p.opacity <= 0.0 {
                continue;
            }
            match self.settings.style {
                Style::Halo => draw_halo(canvas, p),
                Style::Shine => draw_shine(canvas, p),
                Style::Outline => draw_outline(canvas, p, field.t),
            }
        }
    }
}

fn draw_halo<C: Canvas + ?Sized>(canvas: &mut C, p: &Particle) {
    let op = p.opacity;
    let glow = RadialGradient::centred(
        p.x,
        p.radius * 3.0,
        vec![ColorStop::new(0.0, p.color, 0.8), ColorStop::new(1.0, p.color, 0.0)],
    );
    canvas.fill_circle(p.x, p.radius * 3.0, &Paint::Radial(glow), op);
    canvas.fill_circle(p.x, p.radius, &Paint::Solid(p.color, op), op);
}

fn draw_shine<C: Canvas + ?Sized>(canvas: &mut C, p: &Particle) {
    let op = p.opacity;
    let r = p.radius;

    let outer = RadialGradient::centred(
        p.x,
        r * 4.0,
        vec![
            ColorStop::new(0.0, p.color, 0.4),
            ColorStop::new(0.5, p.color, 0.1),
            ColorStop::new(1.0, p.color, 0.0),
        ],
    );
    canvas.fill_circle(p.x, r * 4.0, &Paint::Radial(outer), op);

    let middle = RadialGradient::centred(
        p.x,
        r * 2.5,
        vec![ColorStop::new(0.0, p.color, 0.6), ColorStop::new(1.0, p.color, 0.0)],
    );
    canvas.fill_circle(p.x, r * 2.5, &Paint::Radial(middle), op);

    let core = RadialGradient {
        focus: p.x - NVec2::new(r * 0.3, r * 0.3),
        centre: p.x,
        radius: r,
        stops: vec![
            ColorStop::new(0.0, Rgb::WHITE, 0.8 * op),
            ColorStop::new(0.5, p.color, op),
            ColorStop::new(1.0, p.color, 0.3 * op),
        ],
    };
    canvas.fill_circle(p.x, r, &Paint::Radial(core), op);
}

fn draw_outline<C: Canvas + ?Sized>(canvas: &mut C, p: &Particle, t: f64) {
    let fill = 0.15 * p.opacity;
    let edge = 0.3 * p.opacity;
    let size = p.radius * p.size_pulse(t);

    // Soft ring fading out past the edge, in place of a blurred shadow
    let reach = size + SHADOW_BLUR;
    let shadow = RadialGradient::centred(
        p.x,
        reach,
        vec![
            ColorStop::new(0.0, p.color, 0.0),
            ColorStop::new(size / reach, p.color, 0.2),
            ColorStop::new(1.0, p.color, 0.0),
        ],
    );
    canvas.fill_circle(p.x, reach, &Paint::Radial(shadow), p.opacity);

    if p.shape == Shape::Circle {
        canvas.fill_circle(p.x, size, &Paint::Solid(p.color, 1.0), fill);
        canvas.stroke_circle(p.x, size, OUTLINE_WIDTH, p.color, edge);
        return;
    }

    let points = shape_points(p, size);
    canvas.fill_polygon(&points, p.color, fill);
    canvas.stroke_polygon(&points, OUTLINE_WIDTH, p.color, edge);
}

/// Corners of a square or triangle of half-size `size`, rotated about the particle.
pub fn shape_points(p: &Particle, size: f64) -> Vec<NVec2> {
    let local: &[(f64, f64)] = match p.shape {
        Shape::Square => &[(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)],
        Shape::Triangle => &[(0.0, -1.0), (1.0, 1.0), (-1.0, 1.0)],
        Shape::Circle => &[],
    };
    let (sin, cos) = p.rotation.sin_cos();
    local
        .iter()
        .map(|&(lx, ly)| {
            let (x, y) = (lx * size, ly * size);
            p.x + NVec2::new(x * cos - y * sin, x * sin + y * cos)
        })
        .collect()
}
