use std::io::Write;
use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;

use pfield::configuration::config::ConfigError;
use pfield::simulation::integrator::{drift_integrator, float_anchor, frame_opacity, idle_factor};
use pfield::{
    initialize, run_headless, step, tick, Backdrop, Canvas, EventKind, FrameInput, HeadlessHost, HostEvent, IdleFade,
    ImpulseSet, Layout, MountOutcome, NVec2, OpacityModel, Overlay, Paint, Parameters, Particle, ParticleField,
    PixelCanvas, PointerKind, PointerRepulsion, PointerState, RadialGradient, ColorStop, RenderSettings, Renderer,
    Rgb, Scenario, ScenarioConfig, Shape, SkipReason, Style, Viewport, FrameId,
};

const CHAIN_YAML: &str = r#"
engine: { layout: chain, count: 12, seed: 7 }
parameters:
  easing: 0.25
  friction: 0.6
  opacity: { model: speed, scale: 5.0, cap: 0.5, floor: 0.5 }
render: { style: halo }
"#;

const GRID_YAML: &str = r#"
engine: { layout: grid, count: 12, seed: 3 }
parameters:
  easing: 0.08
  friction: 0.82
  opacity: { model: pulse, rate: 1.2, floor: 0.4 }
render: { style: shine }
"#;

/// Build a validated scenario from inline YAML
pub fn scenario(yaml: &str) -> Scenario {
    let cfg = ScenarioConfig::from_yaml_str(yaml).expect("test yaml parses");
    Scenario::build_scenario(cfg).expect("test scenario is valid")
}

/// Frame context with an optional pointer that last moved at t = 0
pub fn input_at(pointer: Option<(f64, f64)>, now_ms: f64) -> FrameInput {
    let state = PointerState {
        position: pointer.map(|(x, y)| NVec2::new(x, y)),
        last_activity_ms: pointer.map(|_| 0.0),
    };
    FrameInput::new(state, now_ms, 1000.0, 1000.0)
}

/// Fire every pending frame `frames` times at 60 Hz
pub fn drive(overlay: &mut Overlay, host: &mut HeadlessHost, frames: usize) {
    for f in 0..frames {
        for frame in host.take_frames() {
            overlay.on_frame(host, frame, f as f64 * 16.0);
        }
    }
}

pub fn single(layout: Layout, p: Particle) -> ParticleField {
    ParticleField::from_particles(layout, vec![p])
}

// ==================================================================================
// Integrator tests
// ==================================================================================

#[test]
fn friction_decays_velocity_without_target_motion() {
    // Chain leader with no pointer targets its own position: only friction acts
    let mut p = Particle::at(NVec2::new(100.0, 100.0));
    p.v = NVec2::new(10.0, 0.0);
    let mut field = single(Layout::Chain, p);
    let params = Parameters { friction: 0.85, ..Parameters::default() };
    let impulses = ImpulseSet::new();
    let input = input_at(None, 0.0);

    let mut last = field.particles()[0].speed();
    let mut settled_at = None;
    for frame in 1..=85 {
        step(&mut field, &impulses, &input, &params);
        let speed = field.particles()[0].speed();
        assert!(speed <= last, "speed grew at frame {frame}: {last} -> {speed}");
        last = speed;
        if speed < 0.01 && settled_at.is_none() {
            settled_at = Some(frame);
        }
    }
    assert!(settled_at.is_some(), "speed still {last} after 85 frames");
}

#[test]
fn chain_follower_targets_predecessor_from_same_frame() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut field = initialize(10, Layout::Chain, NVec2::new(1000.0, 1000.0), Rgb::WHITE, &mut rng);
    let params = Parameters::default();
    let impulses = ImpulseSet::new();

    for f in 0..30 {
        let pointer = (300.0 + f as f64 * 7.0, 200.0);
        step(&mut field, &impulses, &input_at(Some(pointer), 0.0), &params);

        let ps = field.particles();
        assert_eq!(ps[0].target, NVec2::new(pointer.0, pointer.1));
        for i in 1..ps.len() {
            assert_eq!(ps[i].target, ps[i - 1].x, "particle {i} chased a stale position");
        }
    }
}

#[test]
fn chain_easing_grows_along_the_chain() {
    let params = Parameters { easing: 0.2, easing_step: 0.01, ..Parameters::default() };
    assert!((params.easing_for(0) - 0.2).abs() < 1e-12);
    assert!((params.easing_for(5) - 0.25).abs() < 1e-12);
}

#[test]
fn chain_easing_step_tightens_followers() {
    // Leader parked on the pointer, follower 100px behind it
    let build = || {
        let leader = Particle::at(NVec2::new(0.0, 0.0));
        let follower = Particle::at(NVec2::new(100.0, 0.0));
        ParticleField::from_particles(Layout::Chain, vec![leader, follower])
    };
    let impulses = ImpulseSet::new();
    let input = input_at(Some((0.0, 0.0)), 0.0);

    let flat = Parameters { easing: 0.2, easing_step: 0.0, ..Parameters::default() };
    let steep = Parameters { easing: 0.2, easing_step: 0.1, ..Parameters::default() };

    let mut a = build();
    let mut b = build();
    step(&mut a, &impulses, &input, &flat);
    step(&mut b, &impulses, &input, &steep);

    // gap * easing * friction: 100 * 0.2 * 0.6 vs 100 * 0.3 * 0.6
    assert!((a.particles()[1].x.x - 88.0).abs() < 1e-9);
    assert!((b.particles()[1].x.x - 82.0).abs() < 1e-9);
    assert_eq!(a.particles()[0].x, b.particles()[0].x, "leader uses the base easing either way");
}

#[test]
fn repulsion_points_away_from_pointer() {
    let repel = PointerRepulsion { strength: 8.0, distance: None };
    let pointer = NVec2::new(500.0, 500.0);

    for (x, y) in [(510.0, 500.0), (400.0, 430.0), (500.0, 620.0), (599.0, 401.0)] {
        let pos = NVec2::new(x, y);
        let dv = repel.impulse_at(pos, pointer, 200.0);
        assert!(dv.dot(&(pos - pointer)) > 0.0, "impulse at {pos:?} does not point away");
    }
}

#[test]
fn repulsion_falls_off_linearly_and_stops_at_radius() {
    let repel = PointerRepulsion { strength: 8.0, distance: None };
    let pointer = NVec2::new(0.0, 0.0);

    let half = repel.impulse_at(NVec2::new(100.0, 0.0), pointer, 200.0);
    assert!((half.norm() - 4.0).abs() < 1e-9, "expected 4, got {}", half.norm());

    let outside = repel.impulse_at(NVec2::new(250.0, 0.0), pointer, 200.0);
    assert_eq!(outside, NVec2::zeros());

    // Sitting on the pointer: full strength along +x
    let on_top = repel.impulse_at(pointer, pointer, 200.0);
    assert!((on_top - NVec2::new(8.0, 0.0)).norm() < 1e-12);
}

#[test]
fn repulsion_uses_particle_radius_before_fallback() {
    let mut near = Particle::at(NVec2::new(550.0, 500.0));
    near.repel_distance = Some(40.0);
    let plain = Particle::at(NVec2::new(450.0, 500.0));
    let field = ParticleField::from_particles(Layout::Grid, vec![near, plain]);

    let set = ImpulseSet::new().with(PointerRepulsion { strength: 8.0, distance: Some(100.0) });
    let mut out = vec![NVec2::zeros(); 2];
    set.accumulate_impulses(&input_at(Some((500.0, 500.0)), 0.0), &field, &mut out);

    assert_eq!(out[0], NVec2::zeros(), "own 40px radius should win over the 100px fallback");
    assert!(out[1].x < 0.0, "fallback radius should push the left particle further left");
}

#[test]
fn idle_fade_decreases_strictly_then_rests_at_floor() {
    let fade = IdleFade::default();
    let pointer = PointerState {
        position: Some(NVec2::new(1.0, 1.0)),
        last_activity_ms: Some(0.0),
    };

    assert_eq!(idle_factor(&pointer, 999.0, &fade), 1.0);
    assert_eq!(idle_factor(&pointer, 1000.0, &fade), 1.0);

    let mut last = 1.0;
    for k in 1..=50 {
        let now = 1000.0 + k as f64 * 10.0;
        let f = idle_factor(&pointer, now, &fade);
        assert!(f < last, "not strictly decreasing at {now} ms");
        last = f;
    }
    assert!(last.abs() < 1e-12, "should reach the floor at 1500 ms, got {last}");
    assert_eq!(idle_factor(&pointer, 5000.0, &fade), 0.0);

    let never = PointerState::default();
    let floored = IdleFade { floor: 0.2, ..IdleFade::default() };
    assert_eq!(idle_factor(&never, 0.0, &floored), 0.2);
}

#[test]
fn idle_fade_applies_to_frame_opacity() {
    let mut p = Particle::at(NVec2::new(10.0, 10.0));
    p.base_opacity = 0.8;
    let mut field = single(Layout::Chain, p);
    let params = Parameters {
        opacity: OpacityModel::Constant,
        idle: Some(IdleFade::default()),
        ..Parameters::default()
    };
    let impulses = ImpulseSet::new();

    let mut last = f64::INFINITY;
    for k in 0..=10 {
        let now = 1000.0 + k as f64 * 50.0;
        step(&mut field, &impulses, &input_at(Some((10.0, 10.0)), now), &params);
        let op = field.particles()[0].opacity;
        if k > 0 {
            assert!(op < last, "opacity did not drop at {now} ms");
        }
        last = op;
    }
    assert!(last.abs() < 1e-12);
}

#[test]
fn speed_opacity_saturates_at_cap() {
    let model = OpacityModel::Speed { scale: 5.0, cap: 0.5, floor: 0.5 };
    let mut p = Particle::at(NVec2::zeros());
    p.base_opacity = 0.8;

    p.v = NVec2::new(1.0, 0.0);
    assert!((frame_opacity(&p, 0.0, &model) - 0.56).abs() < 1e-12);

    p.v = NVec2::new(30.0, 40.0);
    assert!((frame_opacity(&p, 0.0, &model) - 0.8).abs() < 1e-12);
}

#[test]
fn pulse_opacity_stays_between_floor_and_base() {
    let model = OpacityModel::Pulse { rate: 1.2, floor: 0.4 };
    let mut p = Particle::at(NVec2::zeros());
    p.base_opacity = 0.5;
    p.phase = 1.3;

    for k in 0..500 {
        let op = frame_opacity(&p, k as f64 * 0.01, &model);
        assert!((0.2 - 1e-12..=0.5 + 1e-12).contains(&op), "opacity {op} out of range");
    }
}

#[test]
fn tick_leaves_input_state_untouched() {
    let mut rng = StdRng::seed_from_u64(9);
    let field = initialize(6, Layout::Chain, NVec2::new(800.0, 600.0), Rgb::WHITE, &mut rng);
    let before: Vec<NVec2> = field.particles().iter().map(|p| p.x).collect();
    let params = Parameters::default();
    let impulses = ImpulseSet::new();
    let input = input_at(Some((100.0, 100.0)), 0.0);

    let next = tick(&field, &impulses, &input, &params);

    let after: Vec<NVec2> = field.particles().iter().map(|p| p.x).collect();
    assert_eq!(before, after);
    assert_eq!(field.frame, 0);
    assert_eq!(next.frame, 1);

    let mut stepped = field.clone();
    step(&mut stepped, &impulses, &input, &params);
    for (a, b) in next.particles().iter().zip(stepped.particles()) {
        assert_eq!(a.x, b.x);
        assert_eq!(a.v, b.v);
    }
}

#[test]
fn drift_bounces_off_edges() {
    let mut p = Particle::at(NVec2::new(12.0, 50.0));
    p.radius = 10.0;
    p.v = NVec2::new(-3.0, 0.5);
    let mut field = single(Layout::Drift, p);
    let input = FrameInput::new(PointerState::default(), 0.0, 100.0, 100.0);

    drift_integrator(&mut field, &input);

    let p = &field.particles()[0];
    assert_eq!(p.x.x, 10.0, "should be clamped to the left edge");
    assert_eq!(p.v.x, 3.0, "x velocity should flip");
    assert_eq!(p.v.y, 0.5, "y velocity untouched");
    assert_eq!(p.target, p.x, "recorded target should be the clamped position");
}

#[test]
fn drift_shapes_stay_inside_viewport() {
    let mut rng = StdRng::seed_from_u64(5);
    let size = NVec2::new(1280.0, 720.0);
    let mut field = initialize(8, Layout::Drift, size, Rgb::WHITE, &mut rng);
    let params = Parameters { opacity: OpacityModel::Pulse { rate: 1.0, floor: 0.4 }, ..Parameters::default() };
    let impulses = ImpulseSet::new();
    let input = FrameInput::new(PointerState::default(), 0.0, size.x, size.y);

    for _ in 0..2000 {
        step(&mut field, &impulses, &input, &params);
        for p in field.particles() {
            for axis in 0..2 {
                assert!(p.x[axis] >= p.radius - 1e-9 && p.x[axis] <= size[axis] - p.radius + 1e-9);
            }
        }
    }
}

// ==================================================================================
// Particle store tests
// ==================================================================================

#[test]
fn chain_layout_starts_centred_and_tapers() {
    let mut rng = StdRng::seed_from_u64(2);
    let field = initialize(20, Layout::Chain, NVec2::new(1280.0, 720.0), Rgb::new(6, 182, 212), &mut rng);
    let ps = field.particles();

    assert_eq!(ps.len(), 20);
    assert!(ps.iter().all(|p| p.x == NVec2::new(640.0, 360.0)));
    assert_eq!(ps[0].radius, 3.0);
    assert_eq!(ps[0].base_opacity, 1.0);
    for w in ps.windows(2) {
        assert!(w[1].radius < w[0].radius);
        assert!(w[1].base_opacity < w[0].base_opacity);
    }
}

#[test]
fn grid_layout_spreads_across_viewport() {
    let mut rng = StdRng::seed_from_u64(4);
    let (w, h) = (1000.0, 800.0);
    let field = initialize(100, Layout::Grid, NVec2::new(w, h), Rgb::WHITE, &mut rng);

    assert_eq!(field.len(), 100);
    for p in field.particles() {
        assert!(p.anchor.x >= 0.0 && p.anchor.x < w);
        assert!(p.anchor.y >= 0.0 && p.anchor.y < h);
        assert!((1.5..4.0).contains(&p.radius));
        assert!((0.3..0.8).contains(&p.base_opacity));
        let reach = p.repel_distance.expect("grid particles repel");
        assert!((180.0..260.0).contains(&reach));
    }

    // One particle per cell: the 10 cells of the first row each hold one anchor
    let first_row = field.particles().iter().filter(|p| p.anchor.y < 80.0).count();
    assert_eq!(first_row, 10);
}

#[test]
fn seeded_layouts_are_reproducible() {
    let size = NVec2::new(1200.0, 900.0);
    let a = initialize(30, Layout::Grid, size, Rgb::WHITE, &mut StdRng::seed_from_u64(11));
    let b = initialize(30, Layout::Grid, size, Rgb::WHITE, &mut StdRng::seed_from_u64(11));
    let c = initialize(30, Layout::Grid, size, Rgb::WHITE, &mut StdRng::seed_from_u64(12));

    let xs = |f: &ParticleField| f.particles().iter().map(|p| p.x).collect::<Vec<_>>();
    assert_eq!(xs(&a), xs(&b));
    assert_ne!(xs(&a), xs(&c));
}

#[test]
fn drift_colours_stay_in_blue_band() {
    let mut rng = StdRng::seed_from_u64(6);
    let field = initialize(50, Layout::Drift, NVec2::new(1280.0, 720.0), Rgb::WHITE, &mut rng);
    for p in field.particles() {
        assert!(p.color.b > p.color.r, "{:?} is not blue-ish", p.color);
        assert!((25.0..100.0).contains(&p.radius));
        assert!((1.0..2.0).contains(&p.pulse_speed));
    }
}

// ==================================================================================
// Surface lifecycle tests
// ==================================================================================

#[test]
fn mount_unmount_cycles_do_not_leak() {
    let mut host = HeadlessHost::new(1280, 720);
    let mut overlay = Overlay::new(scenario(CHAIN_YAML));

    for _ in 0..5 {
        assert_eq!(overlay.mount_seeded(&mut host).unwrap(), MountOutcome::Mounted);
        // a second mount while mounted must not add a surface
        overlay.mount_seeded(&mut host).unwrap();
        assert_eq!(host.live_surfaces(), 1);
        assert_eq!(host.live_listeners(), 2);
        assert_eq!(host.pending_frames(), 1);

        drive(&mut overlay, &mut host, 3);
        assert_eq!(host.live_surfaces(), 1);

        overlay.unmount(&mut host);
        overlay.unmount(&mut host);
        assert_eq!(host.live_surfaces(), 0);
        assert_eq!(host.live_listeners(), 0);
        assert_eq!(host.pending_frames(), 0);
        assert!(!overlay.is_mounted());
    }
}

#[test]
fn surface_does_not_take_pointer_events() {
    let mut host = HeadlessHost::new(1280, 720);
    let mut overlay = Overlay::new(scenario(CHAIN_YAML));
    overlay.mount_seeded(&mut host).unwrap();

    let id = overlay.surface().expect("mounted");
    let style = host.surface_style(id).expect("attached");
    assert!(!style.pointer_events);
    assert_eq!(style.z_index, 9999);
    let canvas = host.surface(id).expect("attached");
    assert_eq!((canvas.width(), canvas.height()), (1280, 720));
}

#[test]
fn touch_devices_and_narrow_viewports_skip_mount() {
    let mut touch = HeadlessHost::new(1280, 720).with_pointer_kind(PointerKind::Coarse);
    let mut overlay = Overlay::new(scenario(CHAIN_YAML));
    assert_eq!(
        overlay.mount_seeded(&mut touch).unwrap(),
        MountOutcome::Skipped(SkipReason::CoarsePointer)
    );
    assert_eq!(touch.live_surfaces(), 0);

    let mut phone = HeadlessHost::new(700, 1400);
    assert_eq!(
        overlay.mount_seeded(&mut phone).unwrap(),
        MountOutcome::Skipped(SkipReason::NarrowViewport { width: 700 })
    );
    assert_eq!(phone.live_surfaces(), 0);
    assert_eq!(phone.live_listeners(), 0);
    assert!(!overlay.is_mounted());
}

#[test]
fn surface_failure_leaves_host_clean() {
    let mut host = HeadlessHost::new(1280, 720).refusing_surfaces();
    let mut overlay = Overlay::new(scenario(CHAIN_YAML));

    assert!(overlay.mount_seeded(&mut host).is_err());
    assert!(!overlay.is_mounted());
    assert_eq!(host.live_surfaces(), 0);
    assert_eq!(host.live_listeners(), 0);
    assert_eq!(host.pending_frames(), 0);

    // and unmounting afterwards is harmless
    overlay.unmount(&mut host);
}

#[test]
fn frame_after_unmount_is_a_no_op() {
    let mut host = HeadlessHost::new(1280, 720);
    let mut overlay = Overlay::new(scenario(CHAIN_YAML));
    overlay.mount_seeded(&mut host).unwrap();

    // The host already handed the callback out when unmount happens
    let in_flight = host.take_frames();
    assert_eq!(in_flight.len(), 1);
    overlay.unmount(&mut host);

    assert!(!overlay.on_frame(&mut host, in_flight[0], 16.0));
    assert_eq!(host.pending_frames(), 0, "no frame may be rescheduled after unmount");
    assert!(overlay.field().is_none());
}

#[test]
fn unknown_frames_are_ignored_and_each_frame_schedules_one_more() {
    let mut host = HeadlessHost::new(1280, 720);
    let mut overlay = Overlay::new(scenario(CHAIN_YAML));
    overlay.mount_seeded(&mut host).unwrap();

    let frames = host.take_frames();
    assert!(!overlay.on_frame(&mut host, FrameId(u64::MAX), 0.0));
    assert!(overlay.on_frame(&mut host, frames[0], 0.0));
    assert_eq!(host.pending_frames(), 1);
    // the same id cannot fire twice
    assert!(!overlay.on_frame(&mut host, frames[0], 16.0));
    assert_eq!(overlay.field().unwrap().frame, 1);
}

#[test]
fn resize_changes_surface_but_not_particles() {
    let mut host = HeadlessHost::new(1280, 720);
    let mut overlay = Overlay::new(scenario(GRID_YAML));
    overlay.mount_seeded(&mut host).unwrap();
    drive(&mut overlay, &mut host, 10);

    let before: Vec<NVec2> = overlay.field().unwrap().particles().iter().map(|p| p.x).collect();

    let event = host.set_viewport(1600, 900);
    overlay.handle_event(&mut host, event).unwrap();

    let id = overlay.surface().unwrap();
    let canvas = host.surface(id).unwrap();
    assert_eq!((canvas.width(), canvas.height()), (1600, 900));
    assert_eq!(overlay.surface_size(), Some(Viewport::new(1600, 900)));

    let after: Vec<NVec2> = overlay.field().unwrap().particles().iter().map(|p| p.x).collect();
    assert_eq!(before, after);
}

#[test]
fn drift_overlay_does_not_listen_to_the_pointer() {
    let yaml = r#"
engine: { layout: drift, count: 4, seed: 2 }
parameters:
  easing: 0.1
  friction: 0.9
  opacity: { model: pulse, rate: 1.0, floor: 0.4 }
render: { style: outline }
"#;
    let mut host = HeadlessHost::new(1280, 720);
    let mut overlay = Overlay::new(scenario(yaml));
    overlay.mount_seeded(&mut host).unwrap();

    assert_eq!(host.listeners_for(EventKind::PointerMove), 0);
    assert_eq!(host.listeners_for(EventKind::Resize), 1);

    overlay.handle_event(&mut host, HostEvent::PointerMove { x: 5.0, y: 5.0, at_ms: 0.0 }).unwrap();
    assert!(overlay.pointer().position.is_none());

    overlay.unmount(&mut host);
    assert_eq!(host.live_listeners(), 0);
}

#[test]
fn overlays_on_one_host_are_independent() {
    let mut host = HeadlessHost::new(1280, 720);
    let mut trail = Overlay::new(scenario(CHAIN_YAML));
    let mut dots = Overlay::new(scenario(GRID_YAML));
    trail.mount_seeded(&mut host).unwrap();
    dots.mount_seeded(&mut host).unwrap();
    assert_eq!(host.live_surfaces(), 2);

    trail.handle_event(&mut host, HostEvent::PointerMove { x: 10.0, y: 20.0, at_ms: 0.0 }).unwrap();
    assert!(trail.pointer().position.is_some());
    assert!(dots.pointer().position.is_none());

    trail.unmount(&mut host);
    assert_eq!(host.live_surfaces(), 1);
    assert!(dots.is_mounted());
}

// ==================================================================================
// Convergence scenarios
// ==================================================================================

#[test]
fn chain_collapses_onto_stationary_pointer() {
    let mut host = HeadlessHost::new(1280, 720);
    let mut overlay = Overlay::new(scenario(CHAIN_YAML));
    overlay.mount_seeded(&mut host).unwrap();
    overlay
        .handle_event(&mut host, HostEvent::PointerMove { x: 500.0, y: 500.0, at_ms: 0.0 })
        .unwrap();

    drive(&mut overlay, &mut host, 200);

    let field = overlay.field().unwrap();
    assert_eq!(field.len(), 12);
    assert_eq!(field.frame, 200);
    for (i, p) in field.particles().iter().enumerate() {
        let d = (p.x - NVec2::new(500.0, 500.0)).norm();
        assert!(d < 1.0, "particle {i} is {d}px from the pointer");
    }
}

#[test]
fn grid_particles_away_from_pointer_track_their_anchors() {
    let mut host = HeadlessHost::new(2000, 2000);
    let mut overlay = Overlay::new(scenario(GRID_YAML));
    overlay.mount_seeded(&mut host).unwrap();
    let pointer = NVec2::new(500.0, 500.0);
    overlay
        .handle_event(&mut host, HostEvent::PointerMove { x: pointer.x, y: pointer.y, at_ms: 0.0 })
        .unwrap();

    drive(&mut overlay, &mut host, 200);

    let field = overlay.field().unwrap();
    let mut checked = 0;
    for (i, p) in field.particles().iter().enumerate() {
        let reach = p.repel_distance.unwrap();
        if (p.anchor - pointer).norm() <= reach + 40.0 {
            continue;
        }
        let anchor = float_anchor(p, i, field.t);
        assert_eq!(p.target, anchor);
        let d = (p.x - anchor).norm();
        assert!(d < 1.0, "particle {i} is {d}px from its anchor");
        checked += 1;
    }
    assert!(checked > 0, "no particle was far enough from the pointer");
}

#[test]
fn grid_pushes_nearby_particles_out() {
    let mut p = Particle::at(NVec2::new(520.0, 500.0));
    p.repel_distance = Some(200.0);
    let mut field = single(Layout::Grid, p);
    let params = Parameters { easing: 0.08, friction: 0.82, ..Parameters::default() };
    let impulses = ImpulseSet::new().with(PointerRepulsion { strength: 8.0, distance: None });

    for _ in 0..50 {
        step(&mut field, &impulses, &input_at(Some((500.0, 500.0)), 0.0), &params);
    }
    assert!(field.particles()[0].x.x > 530.0, "particle was not pushed away");
}

// ==================================================================================
// Renderer and canvas tests
// ==================================================================================

fn dot(x: f64, y: f64, radius: f64) -> Particle {
    let mut p = Particle::at(NVec2::new(x, y));
    p.radius = radius;
    p.color = Rgb::new(6, 182, 212);
    p
}

#[test]
fn halo_is_brightest_at_the_core() {
    let field = single(Layout::Chain, dot(50.0, 50.0, 3.0));
    let mut canvas = PixelCanvas::new(100, 100);
    Renderer::new(RenderSettings::default()).render(&field, &mut canvas);

    let core = canvas.pixel(50, 50).unwrap();
    let edge = canvas.pixel(57, 50).unwrap();
    assert_eq!(core[3], 255);
    assert!(edge[3] > 0 && edge[3] < core[3]);
    assert_eq!(canvas.pixel(70, 50).unwrap()[3], 0, "nothing past 3r");
    assert_eq!(&core[..3], &[6, 182, 212]);
}

#[test]
fn clear_backdrop_erases_previous_frame() {
    let renderer = Renderer::new(RenderSettings { style: Style::Halo, backdrop: Backdrop::Clear });
    let mut canvas = PixelCanvas::new(100, 100);

    renderer.render(&single(Layout::Chain, dot(20.0, 20.0, 3.0)), &mut canvas);
    assert!(canvas.pixel(20, 20).unwrap()[3] > 0);

    renderer.render(&single(Layout::Chain, dot(80.0, 80.0, 3.0)), &mut canvas);
    assert_eq!(canvas.pixel(20, 20).unwrap()[3], 0);
}

#[test]
fn wash_backdrop_leaves_a_trail() {
    let renderer = Renderer::new(RenderSettings {
        style: Style::Halo,
        backdrop: Backdrop::Wash { color: Rgb::WHITE, alpha: 0.02 },
    });
    let mut canvas = PixelCanvas::new(100, 100);

    renderer.render(&single(Layout::Chain, dot(20.0, 20.0, 3.0)), &mut canvas);
    renderer.render(&single(Layout::Chain, dot(80.0, 80.0, 3.0)), &mut canvas);
    assert!(canvas.pixel(20, 20).unwrap()[3] > 0, "old position faded out immediately");
}

#[test]
fn invisible_particles_are_not_drawn() {
    let mut p = dot(50.0, 50.0, 3.0);
    p.opacity = 0.0;
    let mut canvas = PixelCanvas::new(100, 100);
    Renderer::new(RenderSettings { style: Style::Shine, backdrop: Backdrop::Clear })
        .render(&single(Layout::Grid, p), &mut canvas);
    assert_eq!(canvas.painted(), 0);
}

#[test]
fn shine_draws_glow_wider_than_core() {
    let field = single(Layout::Grid, dot(50.0, 50.0, 4.0));
    let mut canvas = PixelCanvas::new(100, 100);
    Renderer::new(RenderSettings { style: Style::Shine, backdrop: Backdrop::Clear }).render(&field, &mut canvas);

    // inside 4r but outside 2.5r: only the outer glow reaches here
    assert!(canvas.pixel(62, 50).unwrap()[3] > 0);
    assert_eq!(canvas.pixel(70, 50).unwrap()[3], 0);
}

#[test]
fn outline_square_is_translucent_inside() {
    let mut p = dot(100.0, 100.0, 20.0);
    p.shape = Shape::Square;
    let field = single(Layout::Drift, p);
    let mut canvas = PixelCanvas::new(200, 200);
    Renderer::new(RenderSettings { style: Style::Outline, backdrop: Backdrop::Clear }).render(&field, &mut canvas);

    // clock 0, phase 0: drawn at 0.7 of its radius, so the edge sits at x = 86
    let inside = canvas.pixel(100, 100).unwrap();
    assert!((36..=42).contains(&inside[3]), "fill alpha {}", inside[3]);
    assert_eq!(&inside[..3], &[6, 182, 212]);
    assert!(canvas.pixel(86, 100).unwrap()[3] > inside[3], "edge should be stronger than fill");
    assert!(canvas.pixel(75, 100).unwrap()[3] > 0, "glow should spill past the edge");
    assert_eq!(canvas.pixel(150, 150).unwrap()[3], 0);
}

#[test]
fn drift_shapes_breathe_with_the_clock() {
    let mut p = dot(100.0, 100.0, 20.0);
    p.shape = Shape::Square;
    let mut field = single(Layout::Drift, p);
    let renderer = Renderer::new(RenderSettings { style: Style::Outline, backdrop: Backdrop::Clear });

    let mut canvas = PixelCanvas::new(200, 200);
    renderer.render(&field, &mut canvas);
    let small = canvas.painted();
    // x = 116 only catches the glow of the shrunken square
    let glow_only = canvas.pixel(116, 100).unwrap()[3];

    field.t = std::f64::consts::FRAC_PI_2;
    renderer.render(&field, &mut canvas);
    let large = canvas.painted();
    let filled = canvas.pixel(116, 100).unwrap()[3];
    assert!(filled > glow_only, "x = 116 should be filled once the square is full size");

    assert!(large > small, "footprint {small} -> {large} did not grow");
    assert_eq!(field.particles()[0].radius, 20.0, "the pulse never touches the stored radius");
}

#[test]
fn radial_gradient_runs_from_focus_to_rim() {
    let g = RadialGradient::centred(
        NVec2::new(10.0, 10.0),
        5.0,
        vec![ColorStop::new(0.0, Rgb::WHITE, 1.0), ColorStop::new(1.0, Rgb::WHITE, 0.0)],
    );
    assert!(g.param_at(NVec2::new(10.0, 10.0)).abs() < 1e-12);
    assert!((g.param_at(NVec2::new(15.0, 10.0)) - 1.0).abs() < 1e-12);
    assert!((g.sample(0.5).1 - 0.5).abs() < 1e-12);

    let focal = RadialGradient { focus: NVec2::new(9.0, 9.0), ..g.clone() };
    assert!(focal.param_at(NVec2::new(9.0, 9.0)).abs() < 1e-12);
    assert!((focal.param_at(NVec2::new(15.0, 10.0)) - 1.0).abs() < 1e-9);
}

#[test]
fn source_over_accumulates_alpha() {
    let mut canvas = PixelCanvas::new(4, 4);
    canvas.wash(Rgb::new(255, 0, 0), 0.5);
    assert_eq!(canvas.pixel(0, 0).unwrap(), [255, 0, 0, 128]);
    canvas.wash(Rgb::new(255, 0, 0), 0.5);
    let a = canvas.pixel(3, 3).unwrap()[3];
    assert!((190..=193).contains(&a), "alpha {a}");

    canvas.fill_circle(NVec2::new(2.0, 2.0), 10.0, &Paint::Solid(Rgb::WHITE, 1.0), 1.0);
    assert_eq!(canvas.pixel(1, 1).unwrap(), [255, 255, 255, 255]);
    canvas.clear();
    assert_eq!(canvas.painted(), 0);
}

// ==================================================================================
// Configuration tests
// ==================================================================================

#[test]
fn shipped_scenarios_build() {
    for name in ["cursor_trail.yaml", "cursor_dots.yaml", "background_shapes.yaml"] {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(name);
        let cfg = ScenarioConfig::load(&path).unwrap_or_else(|e| panic!("{name}: {e}"));
        Scenario::build_scenario(cfg).unwrap_or_else(|e| panic!("{name}: {e}"));
    }
}

#[test]
fn scenario_maps_layout_and_repulsion() {
    let grid = scenario(GRID_YAML);
    assert_eq!(grid.engine.layout, Layout::Grid);
    assert!(!grid.impulses.is_empty());
    assert_eq!(grid.engine.palette, Rgb::new(6, 182, 212));

    let chain = scenario(CHAIN_YAML);
    assert!(chain.impulses.is_empty(), "chain only repels with an explicit radius");
    assert_eq!(chain.policy.mobile_max_width, Some(768));
}

#[test]
fn wash_backdrop_parses() {
    let yaml = r#"
engine: { layout: drift, count: 3 }
parameters:
  easing: 0.1
  friction: 0.9
  opacity: { model: constant }
render:
  style: outline
  backdrop:
    wash: { color: [255, 255, 255], alpha: 0.02 }
surface: { opacity: 0.5, mobile_max_width: null }
"#;
    let s = scenario(yaml);
    assert_eq!(s.render.backdrop, Backdrop::Wash { color: Rgb::WHITE, alpha: 0.02 });
    assert_eq!(s.policy.mobile_max_width, None);
    assert_eq!(s.surface.opacity, 0.5);
}

#[test]
fn out_of_range_constants_are_rejected() {
    let bad_friction = CHAIN_YAML.replace("friction: 0.6", "friction: 1.0");
    let cfg = ScenarioConfig::from_yaml_str(&bad_friction).unwrap();
    match Scenario::build_scenario(cfg) {
        Err(ConfigError::OutOfRange { field, .. }) => assert_eq!(field, "friction"),
        other => panic!("expected friction error, got {:?}", other.err()),
    }

    for rate in [".nan", ".inf", "-1.0"] {
        let bad_rate = GRID_YAML.replace("rate: 1.2", &format!("rate: {rate}"));
        let cfg = ScenarioConfig::from_yaml_str(&bad_rate).unwrap();
        match Scenario::build_scenario(cfg) {
            Err(ConfigError::OutOfRange { field, .. }) => assert_eq!(field, "opacity.rate"),
            other => panic!("expected rate error for {rate}, got {:?}", other.err()),
        }
    }

    let empty = CHAIN_YAML.replace("count: 12", "count: 0");
    let cfg = ScenarioConfig::from_yaml_str(&empty).unwrap();
    assert!(matches!(Scenario::build_scenario(cfg), Err(ConfigError::EmptyField)));
}

#[test]
fn scenario_files_load_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(GRID_YAML.as_bytes()).unwrap();
    let cfg = ScenarioConfig::load(file.path()).unwrap();
    assert_eq!(cfg.engine.count, 12);

    let missing = ScenarioConfig::load(Path::new("/definitely/not/here.yaml"));
    assert!(matches!(missing, Err(ConfigError::Io { .. })));
}

// ==================================================================================
// Headless run
// ==================================================================================

#[test]
fn headless_run_fades_out_after_pointer_stops() {
    let yaml = r#"
engine: { layout: chain, count: 20, seed: 1 }
parameters:
  easing: 0.25
  friction: 0.6
  opacity: { model: speed, scale: 5.0, cap: 0.5, floor: 0.5 }
  idle: { timeout_ms: 1000, fade_ms: 500, floor: 0.0 }
render: { style: halo }
window: { width: 1280, height: 720 }
"#;
    // the pointer stops halfway (~2 s) and the run ends ~2 s later
    let report = run_headless(scenario(yaml), 240).unwrap();

    assert_eq!(report.outcome, MountOutcome::Mounted);
    assert_eq!(report.frames_rendered, 240);
    assert_eq!(report.mean_opacity, 0.0);
    assert_eq!(report.painted_pixels, 0);
}

#[test]
fn headless_run_paints_while_pointer_moves() {
    let report = run_headless(scenario(GRID_YAML), 30).unwrap();
    assert_eq!(report.frames_rendered, 30);
    assert!(report.painted_pixels > 0);
    assert!(report.mean_opacity > 0.0);
}
