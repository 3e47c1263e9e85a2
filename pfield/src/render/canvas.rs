//! Drawing surface abstraction and a software RGBA implementation.
//!
//! `Canvas` is the handful of 2D operations the renderer needs. `PixelCanvas`
//! implements them on a straight-alpha RGBA8 buffer with source-over
//! compositing, sampled at pixel centres.

use crate::simulation::states::{NVec2, Rgb};

/// One gradient stop: `offset` in `[0, 1]` along the gradient, colour and alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub offset: f64,
    pub color: Rgb,
    pub alpha: f64,
}

impl ColorStop {
    pub const fn new(offset: f64, color: Rgb, alpha: f64) -> Self {
        Self { offset, color, alpha }
    }
}

/// Radial gradient from a zero-radius `focus` out to the circle (`centre`, `radius`).
/// With `focus == centre` this is a plain centred falloff.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradient {
    pub focus: NVec2,
    pub centre: NVec2,
    pub radius: f64,
    pub stops: Vec<ColorStop>,
}

impl RadialGradient {
    pub fn centred(centre: NVec2, radius: f64, stops: Vec<ColorStop>) -> Self {
        Self { focus: centre, centre, radius, stops }
    }

    /// Gradient parameter for point `p`: 0 at the focus, 1 on the outer circle.
    pub fn param_at(&self, p: NVec2) -> f64 {
        if self.radius <= 0.0 {
            return 1.0;
        }
        // p lies on the circle centred at focus + t*d with radius t*radius:
        // (d.d - r^2) t^2 - 2 (q.d) t + q.q = 0, with q = p - focus.
        let d = self.centre - self.focus;
        let q = p - self.focus;
        let a = d.dot(&d) - self.radius * self.radius;
        let b = q.dot(&d);
        let c = q.dot(&q);
        if a.abs() < f64::EPSILON {
            // Focus on the circle itself: the equation is linear.
            return if b.abs() < f64::EPSILON { 1.0 } else { c / (2.0 * b) };
        }
        let disc = (b * b - a * c).max(0.0);
        (b - disc.sqrt()) / a
    }

    /// Colour (0..=255 floats) and alpha at gradient parameter `t`, clamped to the end stops.
    pub fn sample(&self, t: f64) -> ([f64; 3], f64) {
        let Some(first) = self.stops.first() else {
            return ([0.0; 3], 0.0);
        };
        if t <= first.offset {
            return (rgb_f64(first.color), first.alpha);
        }
        for pair in self.stops.windows(2) {
            let (s0, s1) = (pair[0], pair[1]);
            if t <= s1.offset {
                let span = s1.offset - s0.offset;
                let k = if span > 0.0 { (t - s0.offset) / span } else { 1.0 };
                let c0 = rgb_f64(s0.color);
                let c1 = rgb_f64(s1.color);
                let rgb = [
                    c0[0] + (c1[0] - c0[0]) * k,
                    c0[1] + (c1[1] - c0[1]) * k,
                    c0[2] + (c1[2] - c0[2]) * k,
                ];
                return (rgb, s0.alpha + (s1.alpha - s0.alpha) * k);
            }
        }
        let last = self.stops[self.stops.len() - 1];
        (rgb_f64(last.color), last.alpha)
    }
}

/// Fill source for circles.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Rgb, f64),
    Radial(RadialGradient),
}

impl Paint {
    fn at(&self, p: NVec2) -> ([f64; 3], f64) {
        match self {
            Paint::Solid(color, alpha) => (rgb_f64(*color), *alpha),
            Paint::Radial(gradient) => gradient.sample(gradient.param_at(p)),
        }
    }
}

fn rgb_f64(c: Rgb) -> [f64; 3] {
    [c.r as f64, c.g as f64, c.b as f64]
}

/// 2D drawing operations used by the renderer. `alpha` is a global multiplier.
pub trait Canvas {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Change the drawable size. Existing content is discarded.
    fn resize(&mut self, width: u32, height: u32);
    /// Fully transparent.
    fn clear(&mut self);
    /// Composite `color` at `alpha` over everything.
    fn wash(&mut self, color: Rgb, alpha: f64);
    fn fill_circle(&mut self, centre: NVec2, radius: f64, paint: &Paint, alpha: f64);
    fn stroke_circle(&mut self, centre: NVec2, radius: f64, width: f64, color: Rgb, alpha: f64);
    /// Even-odd fill of a closed polygon.
    fn fill_polygon(&mut self, points: &[NVec2], color: Rgb, alpha: f64);
    fn stroke_polygon(&mut self, points: &[NVec2], width: f64, color: Rgb, alpha: f64);
}

/// Straight-alpha RGBA8 raster, row-major, top-left origin.
#[derive(Debug, Clone)]
pub struct PixelCanvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PixelCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]])
    }

    /// Number of pixels with non-zero alpha.
    pub fn painted(&self) -> usize {
        self.pixels.chunks_exact(4).filter(|px| px[3] > 0).count()
    }

    /// Source-over one pixel. `rgb` in 0..=255, `alpha` in 0..=1.
    fn blend(&mut self, x: u32, y: u32, rgb: [f64; 3], alpha: f64) {
        let a = alpha.clamp(0.0, 1.0);
        if a <= 0.0 {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let da = self.pixels[i + 3] as f64 / 255.0;
        let out_a = a + da * (1.0 - a);
        for c in 0..3 {
            let dc = self.pixels[i + c] as f64;
            let out = (rgb[c] * a + dc * da * (1.0 - a)) / out_a;
            self.pixels[i + c] = out.round().clamp(0.0, 255.0) as u8;
        }
        self.pixels[i + 3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }

    /// Pixel range covering `[lo, hi]` on an axis of `extent` pixels, or None if off-canvas.
    fn span(lo: f64, hi: f64, extent: u32) -> Option<(u32, u32)> {
        if extent == 0 || hi < 0.0 || lo >= extent as f64 {
            return None;
        }
        let a = lo.floor().max(0.0) as u32;
        let b = (hi.ceil().max(0.0) as u32).min(extent - 1);
        Some((a, b))
    }

    /// Visit the centres of every pixel inside the given box.
    fn for_each_in_box(&mut self, min: NVec2, max: NVec2, mut f: impl FnMut(&mut Self, u32, u32, NVec2)) {
        let (Some((x0, x1)), Some((y0, y1))) = (Self::span(min.x, max.x, self.width), Self::span(min.y, max.y, self.height)) else {
            return;
        };
        for y in y0..=y1 {
            for x in x0..=x1 {
                let c = NVec2::new(x as f64 + 0.5, y as f64 + 0.5);
                f(self, x, y, c);
            }
        }
    }
}

fn bounding_box(points: &[NVec2], pad: f64) -> (NVec2, NVec2) {
    let mut min = NVec2::new(f64::INFINITY, f64::INFINITY);
    let mut max = NVec2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points {
        min = min.inf(p);
        max = max.sup(p);
    }
    (min.add_scalar(-pad), max.add_scalar(pad))
}

fn inside_polygon(points: &[NVec2], p: NVec2) -> bool {
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (a, b) = (points[i], points[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn segment_distance(p: NVec2, a: NVec2, b: NVec2) -> f64 {
    let ab = b - a;
    let len2 = ab.dot(&ab);
    let k = if len2 > 0.0 { ((p - a).dot(&ab) / len2).clamp(0.0, 1.0) } else { 0.0 };
    (p - (a + ab * k)).norm()
}

impl Canvas for PixelCanvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels = vec![0; width as usize * height as usize * 4];
    }

    fn clear(&mut self) {
        self.pixels.fill(0);
    }

    fn wash(&mut self, color: Rgb, alpha: f64) {
        let rgb = rgb_f64(color);
        for y in 0..self.height {
            for x in 0..self.width {
                self.blend(x, y, rgb, alpha);
            }
        }
    }

    fn fill_circle(&mut self, centre: NVec2, radius: f64, paint: &Paint, alpha: f64) {
        if radius <= 0.0 || alpha <= 0.0 {
            return;
        }
        let r2 = radius * radius;
        let reach = NVec2::new(radius, radius);
        self.for_each_in_box(centre - reach, centre + reach, |canvas, x, y, c| {
            if (c - centre).norm_squared() <= r2 {
                let (rgb, a) = paint.at(c);
                canvas.blend(x, y, rgb, a * alpha);
            }
        });
    }

    fn stroke_circle(&mut self, centre: NVec2, radius: f64, width: f64, color: Rgb, alpha: f64) {
        if radius <= 0.0 || width <= 0.0 || alpha <= 0.0 {
            return;
        }
        let half = width * 0.5;
        let rgb = rgb_f64(color);
        let reach = NVec2::new(radius + half, radius + half);
        self.for_each_in_box(centre - reach, centre + reach, |canvas, x, y, c| {
            if ((c - centre).norm() - radius).abs() <= half {
                canvas.blend(x, y, rgb, alpha);
            }
        });
    }

    fn fill_polygon(&mut self, points: &[NVec2], color: Rgb, alpha: f64) {
        if points.len() < 3 || alpha <= 0.0 {
            return;
        }
        let rgb = rgb_f64(color);
        let (min, max) = bounding_box(points, 0.0);
        self.for_each_in_box(min, max, |canvas, x, y, c| {
            if inside_polygon(points, c) {
                canvas.blend(x, y, rgb, alpha);
            }
        });
    }

    fn stroke_polygon(&mut self, points: &[NVec2], width: f64, color: Rgb, alpha: f64) {
        if points.len() < 2 || width <= 0.0 || alpha <= 0.0 {
            return;
        }
        let half = width * 0.5;
        let rgb = rgb_f64(color);
        let (min, max) = bounding_box(points, half);
        let n = points.len();
        self.for_each_in_box(min, max, |canvas, x, y, c| {
            let d = (0..n)
                .map(|i| segment_distance(c, points[i], points[(i + 1) % n]))
                .fold(f64::INFINITY, f64::min);
            if d <= half {
                canvas.blend(x, y, rgb, alpha);
            }
        });
    }
}
