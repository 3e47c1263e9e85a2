//! Numerical parameters for the particle field
//!
//! `Parameters` holds the per-frame tuning:
//! - spring easing and friction,
//! - animation clock step,
//! - pointer repulsion strength and fallback radius,
//! - opacity model and optional idle fade

/// How the per-frame opacity of a particle is derived.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OpacityModel {
    /// `base * (floor + min(speed / scale, cap))`
    Speed { scale: f64, cap: f64, floor: f64 },
    /// `base * (floor + pulse * (1 - floor))` with a sinusoidal pulse in `[0, 1]`
    Pulse { rate: f64, floor: f64 },
    /// `base`
    Constant,
}

/// Fade applied once the pointer has been still for `timeout_ms`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdleFade {
    pub timeout_ms: f64,
    pub fade_ms: f64,
    pub floor: f64,
}

impl Default for IdleFade {
    fn default() -> Self {
        Self {
            timeout_ms: 1000.0,
            fade_ms: 500.0,
            floor: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Parameters {
    pub easing: f64, // fraction of the gap to the target closed per frame
    pub easing_step: f64, // extra easing per chain index
    pub friction: f64, // velocity multiplier per frame, < 1
    pub clock_step: f64, // animation clock advance per frame
    pub repel_strength: f64, // impulse at zero distance
    pub repel_distance: Option<f64>, // used when a particle has no radius of its own
    pub opacity: OpacityModel,
    pub idle: Option<IdleFade>,
}

impl Parameters {
    /// Easing for the particle at `index` in store order.
    pub fn easing_for(&self, index: usize) -> f64 {
        self.easing + self.easing_step * index as f64
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            easing: 0.25,
            easing_step: 0.0,
            friction: 0.6,
            clock_step: 0.01,
            repel_strength: 8.0,
            repel_distance: None,
            opacity: OpacityModel::Speed { scale: 5.0, cap: 0.5, floor: 0.5 },
            idle: None,
        }
    }
}
