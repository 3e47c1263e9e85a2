pub mod simulation;
pub mod configuration;
pub mod surface;
pub mod render;
pub mod overlay;
pub mod visualization;
pub mod benchmark;

pub use simulation::states::{Particle, ParticleField, Layout, Shape, Rgb, NVec2};
pub use simulation::params::{Parameters, OpacityModel, IdleFade};
pub use simulation::pointer::{PointerState, InputTracker, FrameInput};
pub use simulation::forces::{Impulse, ImpulseSet, PointerRepulsion};
pub use simulation::integrator::{step, tick};
pub use simulation::layout::initialize;
pub use simulation::scenario::Scenario;

pub use configuration::config::{ScenarioConfig, EngineConfig, ParametersConfig, RenderConfig, SurfaceConfig, WindowConfig, ConfigError};

pub use surface::host::{Host, HostEvent, EventKind, Viewport, PointerKind, SurfaceStyle, SurfaceError, SurfaceId, FrameId, ListenerId};
pub use surface::headless::HeadlessHost;
pub use surface::manager::SurfaceManager;

pub use render::canvas::{Canvas, PixelCanvas, Paint, RadialGradient, ColorStop};
pub use render::renderer::{Renderer, RenderSettings, Style, Backdrop};

pub use overlay::driver::{Overlay, MountOutcome, MountPolicy, SkipReason};

pub use visualization::{field_vis2d::run_2d, headless::run_headless};

pub use benchmark::benchmark::{bench_step, bench_render};
