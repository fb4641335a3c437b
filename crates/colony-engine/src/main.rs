//! Terminal front end for the Colony simulation.
//!
//! Wires the simulation core to a terminal: stdin lines play the role of
//! the page's buttons and pointer, and grid changes are drawn as text
//! frames on stdout. Logs go to stderr.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `colony-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Create the grid and clock
//! 4. Seed the grid at the configured density
//! 5. Start the stdin reader
//! 6. Run the command loop
//! 7. Log the result

mod error;
mod input;
mod render;

use std::path::Path;

use colony_core::clock::SimulationClock;
use colony_core::config::{ColonyConfig, LoggingConfig};
use colony_core::grid::GridState;
use colony_core::runner;
use colony_core::timer::IntervalTimer;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::render::TerminalRenderer;

/// Name of the configuration file, relative to the working directory.
const CONFIG_FILE: &str = "colony-config.yaml";

/// Pending controls buffered between the stdin thread and the loop.
const COMMAND_BUFFER: usize = 64;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, seeding, or the run itself fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging depends on it, so report afterwards.
    let (config, from_file) = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!("colony-engine starting");
    info!(
        from_file,
        variant = ?config.simulation.variant,
        density = config.simulation.density,
        normal_interval_ms = config.clock.normal_interval_ms,
        fast_interval_ms = config.clock.fast_interval_ms,
        "Configuration loaded"
    );

    // 3. Create the grid and clock.
    let grid = GridState::new(config.simulation.variant, config.simulation.seed);
    info!(
        simulation = %grid.id(),
        rng_seed = grid.rng_seed(),
        rows = grid.dimensions().rows,
        cols = grid.dimensions().cols,
        "Grid created"
    );
    let intervals = config.clock.intervals().map_err(EngineError::from)?;
    let mut clock = SimulationClock::new(grid, IntervalTimer::new(), intervals);
    if config.clock.start_fast {
        clock.set_fast(true);
    }

    // 4. The page starts with a freshly seeded field.
    let mut renderer = TerminalRenderer::stdout(&config.display);
    let _ = clock
        .seed(config.simulation.density, &mut renderer)
        .map_err(EngineError::from)?;

    // 5. Start the stdin reader.
    let (tx, mut rx) = mpsc::channel(COMMAND_BUFFER);
    let _reader =
        input::spawn_stdin_reader(tx, config.simulation.density).map_err(EngineError::from)?;
    eprintln!("{}", input::USAGE);

    // 6. Run the command loop.
    let result = runner::run_simulation(&mut clock, &mut rx, &config.bounds, &mut renderer)
        .await
        .map_err(EngineError::from)?;

    // 7. Log results.
    runner::log_simulation_end(&result);
    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        frames = renderer.frames(),
        "colony-engine shutdown complete"
    );

    Ok(())
}

/// Install the tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level)),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Load configuration from `colony-config.yaml` in the working directory.
///
/// Falls back to defaults (plus environment overrides) when the file does
/// not exist. The flag reports whether the file was read.
fn load_config() -> Result<(ColonyConfig, bool), EngineError> {
    let config_path = Path::new(CONFIG_FILE);
    if config_path.exists() {
        let config = ColonyConfig::from_file(config_path)?;
        Ok((config, true))
    } else {
        let mut config = ColonyConfig::default();
        config.apply_env_overrides();
        Ok((config, false))
    }
}
