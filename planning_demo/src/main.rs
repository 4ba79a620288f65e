//! Pick-and-place planning demo
//!
//! Builds a table with three boxes, then picks each box up and puts it down
//! 0.1m further along x.
//!
//! Usage: `planning_demo [config.toml|config.ron]`

use std::path::PathBuf;

use motion_engine::foundation::logging;
use motion_engine::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
enum DemoError {
    #[error("Usage: planning_demo [config.toml|config.ron]")]
    Usage,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Director(#[from] DirectorError),
}

fn config_path() -> Result<Option<PathBuf>, DemoError> {
    let mut args = std::env::args_os().skip(1);
    let path = args.next().map(PathBuf::from);
    if args.next().is_some() {
        return Err(DemoError::Usage);
    }
    Ok(path)
}

fn load_config() -> Result<DemoConfig, DemoError> {
    match config_path()? {
        Some(path) => {
            log::info!("Loading configuration from {}", path.display());
            Ok(DemoConfig::load_from_file(&path)?)
        }
        None => {
            log::info!("Using built-in configuration");
            Ok(DemoConfig::default())
        }
    }
}

fn run() -> Result<(), DemoError> {
    let config = load_config()?;

    log::info!("Initializing scene...");
    let mut director = SceneDirector::new(config)?;
    director.initialize()?;

    log::info!("Running choreography...");
    let report = director.run_choreography()?;

    for entry in &report.boxes {
        log::info!(
            "{}: {} moves, {} gripper actions, now at [{:.3}, {:.3}, {:.3}]",
            entry.name,
            entry.moves,
            entry.gripper_actions,
            entry.final_position.x,
            entry.final_position.y,
            entry.final_position.z
        );
    }
    log::info!(
        "Simulated {:.2}s in {:.1}ms",
        report.sim_time,
        report.elapsed.as_secs_f64() * 1000.0
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init(log::LevelFilter::Info);

    log::info!("Starting pick-and-place planning demo");

    match run() {
        Ok(()) => {
            log::info!("Planning demo completed successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Planning demo failed: {}", e);
            Err(e.into())
        }
    }
}
