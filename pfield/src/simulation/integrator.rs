//! Per-frame integrators for the particle field
//!
//! Provides a spring/friction integrator for the pointer-driven layouts
//! (chain and grid), a bounce integrator for drifting shapes, and the
//! opacity update shared by all of them. One call advances one rendered
//! frame; there is no fixed timestep.

use super::forces::ImpulseSet;
use super::params::{IdleFade, OpacityModel, Parameters};
use super::pointer::{FrameInput, PointerState};
use super::states::{Layout, NVec2, Particle, ParticleField};

/// Advance `field` by one frame in place
/// Dispatches on the field's layout, then recomputes every particle's opacity
pub fn step(field: &mut ParticleField, impulses: &ImpulseSet, input: &FrameInput, params: &Parameters) {
    field.t += params.clock_step;
    field.frame += 1;

    match field.layout() {
        Layout::Chain => chain_integrator(field, impulses, input, params),
        Layout::Grid => grid_integrator(field, impulses, input, params),
        Layout::Drift => drift_integrator(field, input),
    }

    update_opacity(field, input, params);
}

/// Pure form of [`step`]: returns the next state and leaves `field` untouched
pub fn tick(field: &ParticleField, impulses: &ImpulseSet, input: &FrameInput, params: &Parameters) -> ParticleField {
    let mut next = field.clone();
    step(&mut next, impulses, input, params);
    next
}

/// One spring update: impulse, easing toward `target`, friction, then position
/// Friction always runs after easing and before the position update
pub fn spring(p: &mut Particle, target: NVec2, impulse: NVec2, easing: f64, friction: f64) {
    p.target = target;
    p.v += impulse;
    p.v += (target - p.x) * easing;
    p.v *= friction;
    p.x += p.v;
}

/// Leader chases the pointer, follower `i` chases particle `i - 1`
/// Followers read their predecessor after it has moved in this same frame
pub fn chain_integrator(field: &mut ParticleField, impulses: &ImpulseSet, input: &FrameInput, params: &Parameters) {
    let n = field.len();
    if n == 0 { // no particles, return
        return;
    }

    // Impulses come from the state at the start of the frame
    let mut dv = vec![NVec2::zeros(); n];
    if !impulses.is_empty() {
        impulses.accumulate_impulses(input, field, &mut dv);
    }

    let particles = field.particles_mut();
    for i in 0..n {
        let target = if i == 0 {
            // Until the pointer shows up the leader holds still
            input.pointer.position.unwrap_or(particles[0].x)
        } else {
            particles[i - 1].x
        };
        spring(&mut particles[i], target, dv[i], params.easing_for(i), params.friction);
    }
}

/// Each particle eases toward its floating anchor while the pointer pushes it away
pub fn grid_integrator(field: &mut ParticleField, impulses: &ImpulseSet, input: &FrameInput, params: &Parameters) {
    let n = field.len();
    if n == 0 { // no particles, return
        return;
    }

    let mut dv = vec![NVec2::zeros(); n];
    impulses.accumulate_impulses(input, field, &mut dv);

    let t = field.t;
    for (i, p) in field.particles_mut().iter_mut().enumerate() {
        let target = float_anchor(p, i, t);
        spring(p, target, dv[i], params.easing, params.friction);
    }
}

/// Anchor position at clock `t`: the base anchor plus a slow elliptical sway
pub fn float_anchor(p: &Particle, index: usize, t: f64) -> NVec2 {
    let i = index as f64;
    p.anchor + NVec2::new(
        (t * 0.5 + i).sin() * p.float_offset.x * 0.5,
        (t * 0.7 + i).cos() * p.float_offset.y * 0.5,
    )
}

/// Constant-velocity drift with edge bounce
/// A shape whose edge leaves the viewport is clamped back and that velocity
/// component is inverted. Bounds use the unpulsed radius
pub fn drift_integrator(field: &mut ParticleField, input: &FrameInput) {
    let bounds = input.bounds;
    for p in field.particles_mut().iter_mut() {
        p.x += p.v;
        p.rotation += p.spin;

        for axis in 0..2 {
            let lo = p.radius;
            let hi = bounds[axis] - p.radius;
            if p.x[axis] < lo || p.x[axis] > hi {
                p.v[axis] = -p.v[axis];
                // max after min: a shape wider than the viewport pins to `lo`
                p.x[axis] = p.x[axis].min(hi).max(lo);
            }
        }
        p.target = p.x;
    }
}

/// Write each particle's frame opacity, including the idle fade when configured
pub fn update_opacity(field: &mut ParticleField, input: &FrameInput, params: &Parameters) {
    let t = field.t;
    let idle = params
        .idle
        .as_ref()
        .map_or(1.0, |fade| idle_factor(&input.pointer, input.now_ms, fade));

    for p in field.particles_mut().iter_mut() {
        p.opacity = frame_opacity(p, t, &params.opacity) * idle;
    }
}

/// Opacity before idle fade for a particle at clock `t`
pub fn frame_opacity(p: &Particle, t: f64, model: &OpacityModel) -> f64 {
    match *model {
        OpacityModel::Speed { scale, cap, floor } => p.base_opacity * (floor + (p.speed() / scale).min(cap)),
        OpacityModel::Pulse { rate, floor } => {
            let pulse = (t * rate * p.pulse_speed + p.phase).sin() * 0.5 + 0.5;
            p.base_opacity * (floor + pulse * (1.0 - floor))
        }
        OpacityModel::Constant => p.base_opacity,
    }
}

/// Multiplier in `[fade.floor, 1]`
/// 1 while the pointer moved within `timeout_ms`, then linear down to the
/// floor over `fade_ms`; the floor if the pointer never moved
pub fn idle_factor(pointer: &PointerState, now_ms: f64, fade: &IdleFade) -> f64 {
    let Some(last) = pointer.last_activity_ms else {
        return fade.floor;
    };

    let quiet = now_ms - last;
    if quiet <= fade.timeout_ms {
        return 1.0;
    }

    let progress = ((quiet - fade.timeout_ms) / fade.fade_ms).min(1.0);
    1.0 - progress * (1.0 - fade.floor)
}
