//! Layered configuration: defaults, then an optional TOML file, then flags.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use hearthwood_persistence::{DEFAULT_AUTOSAVE_INTERVAL, DEFAULT_SAVE_KEY};
use hearthwood_world::{
    DEFAULT_GRID_COLUMNS, DEFAULT_GRID_ROWS, DEFAULT_TILE_LENGTH, DEFAULT_TREE_COUNT,
};
use serde::Deserialize;

use crate::CliArgs;

const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(500);
const DEFAULT_SAVE_DIRECTORY: &str = "saves";

/// Contents of a configuration file. Every value is optional.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FileConfig {
    world: WorldSection,
    timing: TimingSection,
    storage: StorageSection,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
struct WorldSection {
    columns: Option<u32>,
    rows: Option<u32>,
    tile_length: Option<f32>,
    tree_count: Option<u32>,
    seed: Option<u64>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
struct TimingSection {
    tick_interval_ms: Option<u64>,
    autosave_interval_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
struct StorageSection {
    directory: Option<PathBuf>,
    key: Option<String>,
}

impl FileConfig {
    /// Reads and parses the TOML file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// World generation parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct WorldSettings {
    pub(crate) columns: u32,
    pub(crate) rows: u32,
    pub(crate) tile_length: f32,
    pub(crate) tree_count: u32,
    pub(crate) seed: u64,
}

/// Fully resolved runtime settings.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Settings {
    pub(crate) world: WorldSettings,
    pub(crate) tick_interval: Duration,
    pub(crate) autosave_interval: Duration,
    pub(crate) save_directory: PathBuf,
    pub(crate) save_key: String,
    pub(crate) autosave: bool,
    pub(crate) fresh: bool,
}

impl Settings {
    /// Merges defaults, the optional file and command-line flags.
    ///
    /// When no seed is configured anywhere a random one is drawn. A zero tick
    /// interval is rejected because the world would never advance.
    pub(crate) fn resolve(file: FileConfig, args: &CliArgs) -> Result<Self> {
        let FileConfig {
            world,
            timing,
            storage,
        } = file;

        let seed = args
            .seed
            .or(world.seed)
            .unwrap_or_else(rand::random::<u64>);
        let tick_interval = args
            .tick_ms
            .or(timing.tick_interval_ms)
            .map_or(DEFAULT_TICK_INTERVAL, Duration::from_millis);
        if tick_interval.is_zero() {
            bail!("tick interval must be at least one millisecond");
        }
        let autosave_interval = timing
            .autosave_interval_secs
            .map_or(DEFAULT_AUTOSAVE_INTERVAL, Duration::from_secs);

        Ok(Self {
            world: WorldSettings {
                columns: world.columns.unwrap_or(DEFAULT_GRID_COLUMNS.get()),
                rows: world.rows.unwrap_or(DEFAULT_GRID_ROWS.get()),
                tile_length: world.tile_length.unwrap_or(DEFAULT_TILE_LENGTH),
                tree_count: world.tree_count.unwrap_or(DEFAULT_TREE_COUNT),
                seed,
            },
            tick_interval,
            autosave_interval,
            save_directory: args
                .save_dir
                .clone()
                .or(storage.directory)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SAVE_DIRECTORY)),
            save_key: storage.key.unwrap_or_else(|| DEFAULT_SAVE_KEY.to_owned()),
            autosave: !args.no_autosave,
            fresh: args.fresh,
        })
    }
}
