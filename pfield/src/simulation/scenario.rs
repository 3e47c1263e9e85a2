//! Build fully-initialized overlay scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing), checks it, and produces the
//! runtime bundle (`Scenario`) containing:
//! - engine settings (`Engine`)
//! - per-frame parameters (`Parameters`)
//! - active impulse set (`ImpulseSet`)
//! - render, surface and mount settings
//!
//! The overlay driver owns a `Scenario` and builds its particle store from
//! it on every mount

use crate::configuration::config::{
    BackdropConfig, ConfigError, LayoutConfig, OpacityConfig, ScenarioConfig, StyleConfig, WindowConfig,
};
use crate::overlay::driver::MountPolicy;
use crate::render::renderer::{Backdrop, RenderSettings, Style};
use crate::simulation::engine::Engine;
use crate::simulation::forces::{ImpulseSet, PointerRepulsion};
use crate::simulation::params::{IdleFade, OpacityModel, Parameters};
use crate::simulation::states::{Layout, Rgb};
use crate::surface::host::SurfaceStyle;

/// Runtime bundle constructed from a [`ScenarioConfig`]
pub struct Scenario {
    pub engine: Engine,
    pub parameters: Parameters,
    pub impulses: ImpulseSet,
    pub render: RenderSettings,
    pub surface: SurfaceStyle,
    pub policy: MountPolicy,
    pub window: WindowConfig,
}

fn check(field: &'static str, value: f64, ok: bool, expected: &'static str) -> Result<(), ConfigError> {
    if ok && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value, expected })
    }
}

fn rgb(c: [u8; 3]) -> Rgb {
    Rgb::new(c[0], c[1], c[2])
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self, ConfigError> {
        // Engine (runtime) from EngineConfig
        let e_cfg = cfg.engine;
        if e_cfg.count == 0 {
            return Err(ConfigError::EmptyField);
        }
        let layout = match e_cfg.layout {
            LayoutConfig::Chain => Layout::Chain,
            LayoutConfig::Grid => Layout::Grid,
            LayoutConfig::Drift => Layout::Drift,
        };
        let engine = Engine {
            layout,
            count: e_cfg.count,
            palette: rgb(cfg.render.color),
            seed: e_cfg.seed,
        };

        // Parameters (runtime) from ParametersConfig
        let p_cfg = cfg.parameters;
        check("easing", p_cfg.easing, p_cfg.easing > 0.0, "> 0")?;
        check("easing_step", p_cfg.easing_step, p_cfg.easing_step >= 0.0, ">= 0")?;
        check("friction", p_cfg.friction, p_cfg.friction > 0.0 && p_cfg.friction < 1.0, "0 < friction < 1")?;
        check("clock_step", p_cfg.clock_step, p_cfg.clock_step >= 0.0, ">= 0")?;
        check("repel_strength", p_cfg.repel_strength, p_cfg.repel_strength >= 0.0, ">= 0")?;
        if let Some(d) = p_cfg.repel_distance {
            check("repel_distance", d, d > 0.0, "> 0")?;
        }

        let opacity = match p_cfg.opacity {
            OpacityConfig::Speed { scale, cap, floor } => {
                check("opacity.scale", scale, scale > 0.0, "> 0")?;
                check("opacity.cap", cap, cap >= 0.0, ">= 0")?;
                check("opacity.floor", floor, (0.0..=1.0).contains(&floor), "0..=1")?;
                OpacityModel::Speed { scale, cap, floor }
            }
            OpacityConfig::Pulse { rate, floor } => {
                check("opacity.rate", rate, rate >= 0.0, ">= 0")?;
                check("opacity.floor", floor, (0.0..=1.0).contains(&floor), "0..=1")?;
                OpacityModel::Pulse { rate, floor }
            }
            OpacityConfig::Constant => OpacityModel::Constant,
        };

        let idle = match p_cfg.idle {
            Some(i) => {
                check("idle.timeout_ms", i.timeout_ms, i.timeout_ms >= 0.0, ">= 0")?;
                check("idle.fade_ms", i.fade_ms, i.fade_ms > 0.0, "> 0")?;
                check("idle.floor", i.floor, (0.0..=1.0).contains(&i.floor), "0..=1")?;
                Some(IdleFade {
                    timeout_ms: i.timeout_ms,
                    fade_ms: i.fade_ms,
                    floor: i.floor,
                })
            }
            None => None,
        };

        let parameters = Parameters {
            easing: p_cfg.easing,
            easing_step: p_cfg.easing_step,
            friction: p_cfg.friction,
            clock_step: p_cfg.clock_step,
            repel_strength: p_cfg.repel_strength,
            repel_distance: p_cfg.repel_distance,
            opacity,
            idle,
        };

        // Impulses: grid particles carry their own repel radius, other layouts
        // only repel when a global radius is configured. Drift ignores the pointer.
        let mut impulses = ImpulseSet::new();
        let repels = match layout {
            Layout::Grid => true,
            Layout::Chain => parameters.repel_distance.is_some(),
            Layout::Drift => false,
        };
        if repels {
            impulses = impulses.with(PointerRepulsion {
                strength: parameters.repel_strength,
                distance: parameters.repel_distance,
            });
        }

        let render = RenderSettings {
            style: match cfg.render.style {
                StyleConfig::Halo => Style::Halo,
                StyleConfig::Shine => Style::Shine,
                StyleConfig::Outline => Style::Outline,
            },
            backdrop: match cfg.render.backdrop {
                BackdropConfig::Clear => Backdrop::Clear,
                BackdropConfig::Wash { color, alpha } => {
                    check("backdrop.alpha", alpha, (0.0..=1.0).contains(&alpha), "0..=1")?;
                    Backdrop::Wash { color: rgb(color), alpha }
                }
            },
        };

        let s_cfg = cfg.surface;
        check("surface.opacity", s_cfg.opacity, (0.0..=1.0).contains(&s_cfg.opacity), "0..=1")?;
        let surface = SurfaceStyle {
            pointer_events: false,
            z_index: s_cfg.z_index,
            opacity: s_cfg.opacity,
        };
        let policy = MountPolicy {
            mobile_max_width: s_cfg.mobile_max_width,
        };

        Ok(Self {
            engine,
            parameters,
            impulses,
            render,
            surface,
            policy,
            window: cfg.window,
        })
    }
}
