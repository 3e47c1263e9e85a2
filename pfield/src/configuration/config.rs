//! Configuration types for loading overlay scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! particle overlay. A scenario consists of:
//!
//! - [`EngineConfig`]     – layout, particle count and random seed
//! - [`ParametersConfig`] – easing, friction, repulsion, opacity and idle fade
//! - [`RenderConfig`]     – particle style, backdrop and colour
//! - [`SurfaceConfig`]    – overlay stacking/opacity and the mobile cut-off
//! - [`WindowConfig`]     – size of the bevy viewer window
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//! A cursor-trail scenario matching these types:
//!
//! ```yaml
//! engine:
//!   layout: chain           # chain | grid | drift
//!   count: 20
//!   seed: 42                # optional, omit for a fresh arrangement each run
//!
//! parameters:
//!   easing: 0.25            # fraction of the gap closed per frame
//!   easing_step: 0.0        # extra easing per chain index
//!   friction: 0.6           # velocity multiplier per frame, 0 < f < 1
//!   clock_step: 0.01        # animation clock advance per frame
//!   repel_strength: 8.0
//!   opacity:
//!     model: speed          # speed | pulse | constant
//!     scale: 5.0
//!     cap: 0.5
//!     floor: 0.5
//!   idle:                   # optional
//!     timeout_ms: 1000
//!     fade_ms: 500
//!     floor: 0.0
//!
//! render:
//!   style: halo             # halo | shine | outline
//!   backdrop: clear         # or { wash: { color: [255, 255, 255], alpha: 0.02 } }
//!   color: [6, 182, 212]
//!
//! surface:
//!   z_index: 9999
//!   opacity: 1.0
//!   mobile_max_width: 768   # null to mount on any width
//! ```
//!
//! [`crate::simulation::scenario::Scenario`] validates this and maps it into
//! the runtime types.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to open scenario {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse scenario {path}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("{field} = {value} is out of range, expected {expected}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },
    #[error("particle count must be at least 1")]
    EmptyField,
}

/// Particle arrangement
/// `layout: chain`, `layout: grid` or `layout: drift`
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LayoutConfig {
    Chain, // trailing snake behind the pointer
    Grid,  // ambient dots repelled by the pointer
    Drift, // floating background shapes, no pointer influence
}

#[derive(Deserialize, Debug, Clone)]
pub struct EngineConfig {
    pub layout: LayoutConfig,
    pub count: usize, // fixed for the lifetime of a mount
    #[serde(default)]
    pub seed: Option<u64>, // deterministic seed to make runs reproducible
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(tag = "model", rename_all = "lowercase")]
pub enum OpacityConfig {
    Speed { scale: f64, cap: f64, floor: f64 },
    Pulse { rate: f64, floor: f64 },
    Constant,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct IdleConfig {
    #[serde(default = "default_idle_timeout")]
    pub timeout_ms: f64,
    #[serde(default = "default_idle_fade")]
    pub fade_ms: f64,
    #[serde(default)]
    pub floor: f64,
}

fn default_idle_timeout() -> f64 {
    1000.0
}

fn default_idle_fade() -> f64 {
    500.0
}

#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    pub easing: f64,
    #[serde(default)]
    pub easing_step: f64,
    pub friction: f64,
    #[serde(default = "default_clock_step")]
    pub clock_step: f64,
    #[serde(default = "default_repel_strength")]
    pub repel_strength: f64,
    #[serde(default)]
    pub repel_distance: Option<f64>, // turns on repulsion for layouts without per-particle radii
    pub opacity: OpacityConfig,
    #[serde(default)]
    pub idle: Option<IdleConfig>,
}

fn default_clock_step() -> f64 {
    0.01
}

fn default_repel_strength() -> f64 {
    8.0
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StyleConfig {
    Halo,
    Shine,
    Outline,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackdropConfig {
    #[default]
    Clear,
    Wash { color: [u8; 3], alpha: f64 },
}

#[derive(Deserialize, Debug, Clone)]
pub struct RenderConfig {
    pub style: StyleConfig,
    #[serde(default)]
    pub backdrop: BackdropConfig,
    #[serde(default = "default_color")]
    pub color: [u8; 3],
}

fn default_color() -> [u8; 3] {
    [6, 182, 212]
}

#[derive(Deserialize, Debug, Clone)]
pub struct SurfaceConfig {
    #[serde(default = "default_z_index")]
    pub z_index: i32,
    #[serde(default = "default_surface_opacity")]
    pub opacity: f64,
    #[serde(default = "default_mobile_max_width")]
    pub mobile_max_width: Option<u32>,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            z_index: default_z_index(),
            opacity: default_surface_opacity(),
            mobile_max_width: default_mobile_max_width(),
        }
    }
}

fn default_z_index() -> i32 {
    9999
}

fn default_surface_opacity() -> f64 {
    1.0
}

fn default_mobile_max_width() -> Option<u32> {
    Some(768)
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct WindowConfig {
    #[serde(default = "default_window_width")]
    pub width: f32,
    #[serde(default = "default_window_height")]
    pub height: f32,
    #[serde(default)]
    pub click_through: bool, // let clicks reach the windows underneath
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_window_width(),
            height: default_window_height(),
            click_through: false,
        }
    }
}

fn default_window_width() -> f32 {
    1280.0
}

fn default_window_height() -> f32 {
    720.0
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    pub engine: EngineConfig,
    pub parameters: ParametersConfig,
    pub render: RenderConfig,
    #[serde(default)]
    pub surface: SurfaceConfig,
    #[serde(default)]
    pub window: WindowConfig,
}

impl ScenarioConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Read and parse a scenario file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_reader(BufReader::new(file)).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }
}
