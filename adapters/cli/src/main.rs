#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Hearthwood experience.

mod config;
mod simulation;

use std::{cell::RefCell, path::PathBuf, rc::Rc};

use anyhow::{Context, Result};
use clap::Parser;
use hearthwood_persistence::FileStore;
use hearthwood_rendering::{Color, Presentation, RenderingBackend};
use hearthwood_rendering_macroquad::MacroquadBackend;
use tracing_subscriber::EnvFilter;

use self::{
    config::{FileConfig, Settings},
    simulation::Simulation,
};

/// Idle survival in a procedurally grown forest.
#[derive(Debug, Parser)]
#[command(name = "hearthwood", version, about)]
pub(crate) struct CliArgs {
    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory holding save files.
    #[arg(long)]
    save_dir: Option<PathBuf>,
    /// Seed used when generating a new world.
    #[arg(long)]
    seed: Option<u64>,
    /// Simulation tick length in milliseconds.
    #[arg(long)]
    tick_ms: Option<u64>,
    /// Ignore any stored run and start over.
    #[arg(long)]
    fresh: bool,
    /// Never write the run to disk.
    #[arg(long)]
    no_autosave: bool,
    /// Run the simulation without opening a window.
    #[arg(long)]
    headless: bool,
    /// Number of ticks simulated in headless mode.
    #[arg(long, default_value_t = 600)]
    ticks: u64,
    /// Tracing filter directive, e.g. `debug` or `hearthwood=trace`.
    #[arg(long)]
    log_filter: Option<String>,
}

/// Entry point for the Hearthwood command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.log_filter.as_deref())?;

    let file = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(file, &args)?;
    let store = FileStore::new(settings.save_directory.clone());
    let mut simulation = Simulation::start(&settings, store)?;
    tracing::info!(
        seed = simulation.snapshot().seed,
        save_dir = %settings.save_directory.display(),
        "{}",
        simulation.banner()
    );

    if args.headless {
        simulation.run_headless(args.ticks)?;
        simulation.save_on_exit()?;
        let snapshot = simulation.snapshot();
        println!(
            "day {} | health {:.1} | hunger {:.1} | wood {} | food {} | {}",
            snapshot.calendar.day(),
            snapshot.vitals.health,
            snapshot.vitals.hunger,
            snapshot.inventory.wood,
            snapshot.inventory.food,
            if snapshot.player.alive {
                "alive"
            } else {
                "perished"
            },
        );
        return Ok(());
    }

    let presentation = Presentation::new(
        "Hearthwood",
        Color::from_rgb_u8(0x14, 0x12, 0x10),
        simulation.scene()?,
    );
    let session = Rc::new(RefCell::new(simulation));
    let frame_session = Rc::clone(&session);
    MacroquadBackend::new()
        .run(presentation, move |frame_dt, input, scene| {
            let mut simulation = frame_session.borrow_mut();
            simulation.advance(frame_dt, input);
            match simulation.scene() {
                Ok(next) => *scene = next,
                Err(error) => tracing::warn!(error = %error, "keeping previous frame"),
            }
        })
        .context("rendering backend failed")?;

    let result = session.borrow_mut().save_on_exit();
    result
}

fn init_tracing(directive: Option<&str>) -> Result<()> {
    let filter = match directive {
        Some(directive) => EnvFilter::try_new(directive)
            .with_context(|| format!("invalid log filter {directive:?}"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}
