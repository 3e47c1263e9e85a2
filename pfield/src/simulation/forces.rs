//! Velocity impulse contributors for the particle field
//!
//! Defines the `Impulse` trait, the `ImpulseSet` that sums its terms, and
//! pointer repulsion, the only term the overlay layouts use today

use crate::simulation::pointer::FrameInput;
use crate::simulation::states::{NVec2, ParticleField};

/// Collection of impulse terms (repulsion, wind, etc.)
/// Each term implements [`Impulse`] and their contributions are summed
/// into a single velocity change per particle
#[derive(Default)]
pub struct ImpulseSet {
    terms: Vec<Box<dyn Impulse + Send + Sync>>,
}

impl ImpulseSet {
    /// Create an empty impulse set
    pub fn new() -> Self {
        Self {
            terms: Vec::new()
        }
    }

    /// Add an impulse term
    pub fn with<T>(mut self, term: T) -> Self
    where
        T: Impulse + Send + Sync + 'static,
    {
        self.terms.push(Box::new(term));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Compute total impulses for all particles in `field` from the state at
    /// the start of the frame
    /// - `out[i]` will be set to the sum of contributions from all terms
    pub fn accumulate_impulses(&self, input: &FrameInput, field: &ParticleField, out: &mut [NVec2]) {
        // Zero buffer
        for dv in out.iter_mut() {
            *dv = NVec2::zeros();
        }
        // Iterate over all impulse contributors
        for term in &self.terms {
            term.impulse(input, field, out);
        }
    }
}

/// Trait for velocity impulse sources operating on a [`ParticleField`]
/// Implementations add their contribution into `out[i]` for each particle
pub trait Impulse {
    fn impulse(&self, input: &FrameInput, field: &ParticleField, out: &mut [NVec2]);
}

/// Push particles away from the pointer while it is inside their repel radius
/// Strength falls off linearly from `strength` at the pointer to 0 at the radius
pub struct PointerRepulsion {
    pub strength: f64, // impulse magnitude at zero distance
    pub distance: Option<f64>, // radius for particles without their own
}

impl PointerRepulsion {
    /// Impulse on a particle at `x` from a pointer at `pointer` for radius `reach`
    pub fn impulse_at(&self, x: NVec2, pointer: NVec2, reach: f64) -> NVec2 {
        // r points from the pointer to the particle, the direction of the push
        let r = x - pointer;
        let d = r.norm();
        if reach <= 0.0 || d >= reach {
            return NVec2::zeros();
        }

        // Linear falloff: 1 at the pointer, 0 at the edge of the radius
        let falloff = (reach - d) / reach;

        // A particle sitting exactly on the pointer has no direction; push along +x
        let dir = if d > f64::EPSILON { r / d } else { NVec2::x() };

        dir * falloff * self.strength
    }
}

impl Impulse for PointerRepulsion {
    fn impulse(&self, input: &FrameInput, field: &ParticleField, out: &mut [NVec2]) {
        // No pointer seen yet, nothing to repel from
        let Some(pointer) = input.pointer.position else {
            return;
        };

        for (dv, p) in out.iter_mut().zip(field.particles()) {
            if let Some(reach) = p.repel_distance.or(self.distance) {
                *dv += self.impulse_at(p.x, pointer, reach);
            }
        }
    }
}
