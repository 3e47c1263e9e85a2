use pfield::{Scenario, ScenarioConfig};
use pfield::{run_2d, run_headless};
use pfield::{bench_render, bench_step};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use std::path::PathBuf;

#[derive(Parser, Debug)]
struct Args {
    /// Scenario file, looked up under scenarios/ unless it exists as given
    #[arg(short, default_value = "cursor_trail.yaml")]
    file_name: String,

    /// Run this many frames against an in-memory host instead of opening a window
    #[arg(long)]
    headless: Option<u64>,

    /// Time the integrator and renderer, then exit
    #[arg(long)]
    bench: bool,
}

fn scenario_path(file_name: &str) -> PathBuf {
    let given = PathBuf::from(file_name);
    if given.exists() {
        return given;
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name)
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let config_path = scenario_path(file_name);
    let scenario_cfg = ScenarioConfig::load(&config_path)?;
    Ok(scenario_cfg)
}

// the windowed viewer gets its subscriber from bevy's LogPlugin
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.bench {
        init_logging();
        bench_step();
        bench_render();
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let scenario = Scenario::build_scenario(scenario_cfg)
        .with_context(|| format!("invalid scenario {}", args.file_name))?;

    match args.headless {
        Some(frames) => {
            init_logging();
            run_headless(scenario, frames).context("headless run failed")?;
        }
        None => run_2d(scenario),
    }

    Ok(())
}
