//! Glue that wires the world, its systems and persistence into one session.

use std::time::Duration;

use anyhow::{Context, Result};
use hearthwood_core::{Command, Event, TileCoord, WorldSnapshot};
use hearthwood_persistence::{Autosave, KeyValueStore};
use hearthwood_rendering::{project, FrameInput, Scene};
use hearthwood_system_clock::{Config as ClockConfig, TickScheduler};
use hearthwood_system_daylight::Daylight;
use hearthwood_system_foraging::Forager;
use hearthwood_system_survival::Survival;
use hearthwood_world::{self as world, query, World};

use crate::config::Settings;

/// Guard against systems that keep answering their own events.
const MAX_DISPATCH_ROUNDS: usize = 8;

/// Running game session backed by a key-value store.
#[derive(Debug)]
pub(crate) struct Simulation<S> {
    world: World,
    scheduler: TickScheduler,
    forager: Forager,
    survival: Survival,
    daylight: Daylight,
    autosave: Autosave,
    autosave_enabled: bool,
    store: S,
}

impl<S: KeyValueStore> Simulation<S> {
    /// Builds a session, resuming the stored run unless a fresh start was requested.
    pub(crate) fn start(settings: &Settings, store: S) -> Result<Self> {
        let autosave = Autosave::new(settings.autosave_interval, settings.save_key.clone())
            .context("invalid save key")?;

        let mut simulation = Self {
            world: World::new(),
            scheduler: TickScheduler::new(ClockConfig::new(settings.tick_interval)),
            forager: Forager::new(),
            survival: Survival::new(),
            daylight: Daylight::for_tick_interval(settings.tick_interval),
            autosave,
            autosave_enabled: settings.autosave,
            store,
        };

        let restored = if settings.fresh {
            tracing::info!("fresh start requested, ignoring any stored run");
            None
        } else {
            simulation.load_saved()
        };

        match restored {
            Some(world) => {
                simulation.world = world;
                let calendar = query::calendar(&simulation.world);
                simulation.daylight.sync_to_tick(calendar.tick_in_day());
            }
            None => {
                let world = settings.world;
                simulation.execute(Command::ConfigureWorld {
                    columns: TileCoord::new(world.columns),
                    rows: TileCoord::new(world.rows),
                    tile_length: world.tile_length,
                    tree_count: world.tree_count,
                    seed: world.seed,
                });
            }
        }

        Ok(simulation)
    }

    fn load_saved(&self) -> Option<World> {
        let snapshot = match self.autosave.restore(&self.store) {
            Ok(snapshot) => snapshot?,
            Err(error) => {
                tracing::warn!(error = %error, "stored run is unreadable, starting fresh");
                return None;
            }
        };
        match World::from_snapshot(snapshot) {
            Ok(world) => Some(world),
            Err(error) => {
                tracing::warn!(error = %error, "stored run is inconsistent, starting fresh");
                None
            }
        }
    }

    /// Advances the session by one rendered frame.
    pub(crate) fn advance(&mut self, frame_dt: Duration, input: FrameInput) {
        if input.restart {
            self.execute(Command::Restart);
        }
        if let Some(upgrade) = input.purchase {
            self.execute(Command::PurchaseUpgrade { upgrade });
        }

        self.daylight.advance(frame_dt);

        let mut ticks = Vec::new();
        let _ = self.scheduler.advance(frame_dt, &mut ticks);
        for tick in ticks {
            self.execute(tick);
        }

        if self.autosave_enabled && self.autosave.advance(frame_dt) {
            if let Err(error) = self.save() {
                tracing::warn!(error = %error, "autosave failed");
            }
        }
    }

    /// Runs `ticks` fixed ticks without a window, stopping early if the player perishes.
    pub(crate) fn run_headless(&mut self, ticks: u64) -> Result<()> {
        let interval = self.scheduler.tick_interval();
        for _ in 0..ticks {
            if !query::player(&self.world).alive {
                break;
            }
            self.daylight.advance(interval);
            self.execute(Command::Tick { dt: interval });
            if self.autosave_enabled && self.autosave.advance(interval) {
                self.save()?;
            }
        }
        Ok(())
    }

    /// Writes the current run to the store when autosaving is enabled.
    pub(crate) fn save_on_exit(&mut self) -> Result<()> {
        if self.autosave_enabled {
            self.save()?;
        }
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        let snapshot = query::snapshot(&self.world);
        self.autosave
            .save(&mut self.store, &snapshot)
            .with_context(|| format!("failed to save run under {:?}", self.autosave.key()))
    }

    /// Complete capture of the current world.
    pub(crate) fn snapshot(&self) -> WorldSnapshot {
        query::snapshot(&self.world)
    }

    /// Drawable projection of the current world.
    pub(crate) fn scene(&self) -> Result<Scene> {
        project(&self.snapshot(), self.daylight.intensity()).context("world cannot be drawn")
    }

    /// Greeting shown when the session starts.
    pub(crate) fn banner(&self) -> &'static str {
        query::welcome_banner(&self.world)
    }

    fn execute(&mut self, command: Command) {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        self.dispatch(events);
    }

    fn dispatch(&mut self, mut events: Vec<Event>) {
        for _ in 0..MAX_DISPATCH_ROUNDS {
            if events.is_empty() {
                return;
            }
            for event in &events {
                self.observe(event);
            }

            let mut commands = Vec::new();
            let player = query::player(&self.world);
            self.forager.handle(
                &events,
                player,
                &query::tree_view(&self.world),
                &mut commands,
            );
            self.survival.handle(
                &events,
                player,
                query::vitals(&self.world),
                query::inventory(&self.world),
                &mut commands,
            );

            events.clear();
            for command in commands {
                world::apply(&mut self.world, command, &mut events);
            }
        }
        tracing::warn!(pending = events.len(), "dispatch rounds exhausted");
    }

    fn observe(&mut self, event: &Event) {
        match event {
            Event::WorldReset { seed } => {
                self.scheduler.reset();
                self.daylight.reset();
                tracing::info!(seed = *seed, "world generated");
            }
            Event::NightFell { day } => tracing::info!(day = *day, "night falls"),
            Event::DayBegan { day } => tracing::info!(day = *day, "a new day begins"),
            Event::PlayerPerished { day } => tracing::warn!(day = *day, "the player perished"),
            Event::UpgradePurchased {
                upgrade,
                wood_remaining,
            } => tracing::info!(
                upgrade = upgrade.label(),
                wood_remaining = *wood_remaining,
                "upgrade built"
            ),
            Event::PurchaseRejected { upgrade, reason } => tracing::info!(
                upgrade = upgrade.label(),
                reason = ?reason,
                "purchase rejected"
            ),
            Event::TreeFelled { tree, harvest, .. } => tracing::debug!(
                tree = tree.get(),
                wood = harvest.wood,
                food = harvest.food,
                "tree felled"
            ),
            Event::ActionRejected { action, reason } => {
                tracing::debug!(action = ?action, reason = ?reason, "action rejected");
            }
            _ => {}
        }
    }
}

#[cfg(test)]
impl<S> Simulation<S> {
    fn world(&self) -> &World {
        &self.world
    }

    fn store(&self) -> &S {
        &self.store
    }
}
