#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Hearthwood.

mod survival;
mod trees;

use std::{collections::BTreeSet, time::Duration};

use hearthwood_core::{
    ActionError, Calendar, CalendarTransition, CampSites, CellCoord, Command, Direction, Event,
    Inventory, PlayerAction, PurchaseError, TileCoord, TreeId, TreeKind, Upgrade, UpgradeSet,
    Vitals, WorldSnapshot, VITAL_MAX, WELCOME_BANNER,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use self::trees::{Tree, TreeRegistry};

/// Number of tile columns in a freshly created world.
pub const DEFAULT_GRID_COLUMNS: TileCoord = TileCoord::new(12);
/// Number of tile rows in a freshly created world.
pub const DEFAULT_GRID_ROWS: TileCoord = TileCoord::new(9);
/// Side length of a tile in world units, also used when a configured length is invalid.
pub const DEFAULT_TILE_LENGTH: f32 = 48.0;
/// Tree population of a freshly created world.
pub const DEFAULT_TREE_COUNT: u32 = 12;
/// Seed used by [`World::new`].
pub const DEFAULT_SEED: u64 = 0x5eed_4ea7_f00d_cafe;

/// Smallest edge length accepted for the tile grid.
pub const MIN_GRID_EDGE: u32 = 3;

/// Ticks a felled tree waits before a replacement grows.
pub const RESPAWN_TICKS: u32 = 20;

const FRUIT_CHANCE: f64 = 0.3;
const DRAW_STRIDE: u64 = 0x9e37_79b9_7f4a_7c15;

/// Describes the discrete tile layout of the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileGrid {
    columns: TileCoord,
    rows: TileCoord,
    tile_length: f32,
}

impl TileGrid {
    pub(crate) const fn new(columns: TileCoord, rows: TileCoord, tile_length: f32) -> Self {
        Self {
            columns,
            rows,
            tile_length,
        }
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> TileCoord {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> TileCoord {
        self.rows
    }

    /// Side length of a single square tile expressed in world units.
    #[must_use]
    pub const fn tile_length(&self) -> f32 {
        self.tile_length
    }

    /// Total width of the grid measured in world units.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.columns.get() as f32 * self.tile_length
    }

    /// Total height of the grid measured in world units.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.rows.get() as f32 * self.tile_length
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns.get() && cell.row() < self.rows.get()
    }

    fn cell_count(&self) -> u32 {
        self.columns.get().saturating_mul(self.rows.get())
    }
}

#[derive(Clone, Copy, Debug)]
struct Generation {
    tree_count: u32,
    seed: u64,
}

#[derive(Clone, Copy, Debug)]
struct Player {
    cell: CellCoord,
    alive: bool,
}

/// Represents the authoritative Hearthwood world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    tile_grid: TileGrid,
    camp: CampSites,
    generation: Generation,
    rng_draws: u64,
    tick_index: u64,
    acted_at: Option<u64>,
    calendar: Calendar,
    player: Player,
    vitals: Vitals,
    inventory: Inventory,
    upgrades: UpgradeSet,
    trees: TreeRegistry,
    respawns: Vec<u32>,
}

impl World {
    /// Creates a new Hearthwood world ready for simulation.
    #[must_use]
    pub fn new() -> Self {
        let tile_grid = TileGrid::new(DEFAULT_GRID_COLUMNS, DEFAULT_GRID_ROWS, DEFAULT_TILE_LENGTH);
        Self::generate(
            tile_grid,
            Generation {
                tree_count: DEFAULT_TREE_COUNT,
                seed: DEFAULT_SEED,
            },
        )
    }

    /// Restores a world from a previously captured snapshot.
    ///
    /// The snapshot is validated as a whole; a world is only produced when
    /// every tree, the player and the vitals are consistent with the grid.
    pub fn from_snapshot(snapshot: WorldSnapshot) -> Result<Self, RestoreError> {
        let WorldSnapshot {
            columns,
            rows,
            tile_length,
            tree_count,
            seed,
            rng_draws,
            tick_index,
            calendar,
            player,
            vitals,
            inventory,
            upgrades,
            trees,
            respawns,
            next_tree_id,
        } = snapshot;

        if columns < MIN_GRID_EDGE || rows < MIN_GRID_EDGE {
            return Err(RestoreError::DegenerateGrid { columns, rows });
        }
        if !tile_length.is_finite() || tile_length <= 0.0 {
            return Err(RestoreError::InvalidTileLength(tile_length));
        }

        let tile_grid = TileGrid::new(TileCoord::new(columns), TileCoord::new(rows), tile_length);
        let camp = CampSites::for_grid(tile_grid.columns().get(), tile_grid.rows().get());

        if !tile_grid.contains(player.cell) {
            return Err(RestoreError::PlayerOutOfBounds(player.cell));
        }
        if !vital_in_range(vitals.hunger) || !vital_in_range(vitals.health) {
            return Err(RestoreError::InvalidVitals);
        }
        if player.alive != (vitals.health > 0.0) {
            return Err(RestoreError::InvalidVitals);
        }

        let capacity = tile_grid.cell_count().saturating_sub(2);
        if tree_count > capacity {
            return Err(RestoreError::ExceedsGrid {
                tree_count,
                capacity,
            });
        }

        let population = trees.len().saturating_add(respawns.len());
        if population > usize::try_from(tree_count).unwrap_or(usize::MAX) {
            return Err(RestoreError::Overpopulated {
                tree_count,
                population,
            });
        }

        let mut seen_ids = BTreeSet::new();
        let mut seen_cells = BTreeSet::new();
        let mut restored = Vec::with_capacity(trees.len());
        for tree in trees {
            if !tile_grid.contains(tree.cell) {
                return Err(RestoreError::TreeOutOfBounds(tree.id));
            }
            if camp.contains(tree.cell) {
                return Err(RestoreError::TreeOnCampSite(tree.id));
            }
            if !seen_ids.insert(tree.id) {
                return Err(RestoreError::DuplicateTree(tree.id));
            }
            if !seen_cells.insert(tree.cell) {
                return Err(RestoreError::OverlappingTrees(tree.cell));
            }
            if tree.chops_remaining == 0 || tree.chops_remaining > tree.kind.chops_required() {
                return Err(RestoreError::InvalidChopCount(tree.id));
            }
            restored.push(Tree {
                id: tree.id,
                cell: tree.cell,
                kind: tree.kind,
                chops_remaining: tree.chops_remaining,
            });
        }

        Ok(Self {
            banner: WELCOME_BANNER,
            tile_grid,
            camp,
            generation: Generation { tree_count, seed },
            rng_draws,
            tick_index,
            acted_at: None,
            calendar: Calendar::new(calendar.day(), calendar.tick_in_day()),
            player: Player {
                cell: player.cell,
                alive: player.alive,
            },
            vitals,
            inventory,
            upgrades,
            trees: TreeRegistry::from_parts(restored, TreeId::new(next_tree_id)),
            respawns,
        })
    }

    fn generate(tile_grid: TileGrid, generation: Generation) -> Self {
        let camp = CampSites::for_grid(tile_grid.columns().get(), tile_grid.rows().get());
        let capacity = tile_grid.cell_count().saturating_sub(2);
        let generation = Generation {
            tree_count: generation.tree_count.min(capacity),
            seed: generation.seed,
        };

        let mut world = Self {
            banner: WELCOME_BANNER,
            tile_grid,
            camp,
            generation,
            rng_draws: 0,
            tick_index: 0,
            acted_at: None,
            calendar: Calendar::default(),
            player: Player {
                cell: camp.campfire,
                alive: true,
            },
            vitals: Vitals::FULL,
            inventory: Inventory::default(),
            upgrades: UpgradeSet::default(),
            trees: TreeRegistry::new(),
            respawns: Vec::new(),
        };

        let target = usize::try_from(generation.tree_count).unwrap_or(usize::MAX);
        while world.trees.len() < target {
            if world.grow_tree().is_none() {
                break;
            }
        }
        world
    }

    /// Plants a tree on a random free tile, returning its identifier, cell and kind.
    fn grow_tree(&mut self) -> Option<(TreeId, CellCoord, TreeKind)> {
        let free = self.free_cells();
        if free.is_empty() {
            return None;
        }

        let mut rng = placement_rng(self.generation.seed, self.rng_draws);
        self.rng_draws = self.rng_draws.wrapping_add(1);
        let cell = free[rng.gen_range(0..free.len())];
        let kind = if rng.gen_bool(FRUIT_CHANCE) {
            TreeKind::Fruit
        } else {
            TreeKind::Timber
        };
        let id = self.trees.plant(cell, kind)?;
        Some((id, cell, kind))
    }

    fn free_cells(&self) -> Vec<CellCoord> {
        let occupied: BTreeSet<CellCoord> = self.trees.iter().map(|tree| tree.cell).collect();
        let mut cells = Vec::new();
        for row in 0..self.tile_grid.rows().get() {
            for column in 0..self.tile_grid.columns().get() {
                let cell = CellCoord::new(column, row);
                if !occupied.contains(&cell)
                    && !self.camp.contains(cell)
                    && cell != self.player.cell
                {
                    cells.push(cell);
                }
            }
        }
        cells
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced { dt });

        if !self.player.alive {
            return;
        }

        survival::decay(&mut self.vitals, self.calendar.is_night(), self.upgrades);
        self.advance_respawns(out_events);

        match self.calendar.advance() {
            CalendarTransition::NightFell => out_events.push(Event::NightFell {
                day: self.calendar.day(),
            }),
            CalendarTransition::DayBegan => out_events.push(Event::DayBegan {
                day: self.calendar.day(),
            }),
            CalendarTransition::None => {}
        }

        if self.vitals.health <= 0.0 {
            self.vitals.health = 0.0;
            self.player.alive = false;
            out_events.push(Event::PlayerPerished {
                day: self.calendar.day(),
            });
        }
    }

    fn advance_respawns(&mut self, out_events: &mut Vec<Event>) {
        for timer in &mut self.respawns {
            *timer = timer.saturating_sub(1);
        }

        while let Some(index) = self.respawns.iter().position(|timer| *timer == 0) {
            let Some((tree, cell, kind)) = self.grow_tree() else {
                break;
            };
            let _ = self.respawns.remove(index);
            out_events.push(Event::TreeSpawned { tree, cell, kind });
        }
    }

    fn ensure_can_act(&self) -> Result<(), ActionError> {
        if !self.player.alive {
            return Err(ActionError::PlayerPerished);
        }
        if self.acted_at == Some(self.tick_index) {
            return Err(ActionError::AlreadyActed);
        }
        Ok(())
    }

    fn step_player(&mut self, direction: Direction) -> Result<Event, ActionError> {
        self.ensure_can_act()?;
        let from = self.player.cell;
        let to = from
            .neighbor(
                direction,
                self.tile_grid.columns().get(),
                self.tile_grid.rows().get(),
            )
            .ok_or(ActionError::OutOfBounds)?;
        self.player.cell = to;
        self.acted_at = Some(self.tick_index);
        Ok(Event::PlayerMoved { from, to })
    }

    fn chop_tree(&mut self, tree_id: TreeId) -> Result<Event, ActionError> {
        self.ensure_can_act()?;
        let tree = self.trees.get(tree_id).ok_or(ActionError::MissingTree)?;
        if tree.cell.manhattan_distance(self.player.cell) > 1 {
            return Err(ActionError::OutOfReach);
        }
        self.acted_at = Some(self.tick_index);

        let tree = self.trees.get_mut(tree_id).ok_or(ActionError::MissingTree)?;
        tree.chops_remaining = tree.chops_remaining.saturating_sub(1);
        if tree.chops_remaining > 0 {
            return Ok(Event::TreeChopped {
                tree: tree_id,
                chops_remaining: tree.chops_remaining,
            });
        }

        let felled = self.trees.remove(tree_id).ok_or(ActionError::MissingTree)?;
        let harvest = felled.kind.harvest();
        self.inventory.wood = self.inventory.wood.saturating_add(harvest.wood);
        self.inventory.food = self.inventory.food.saturating_add(harvest.food);
        self.respawns.push(RESPAWN_TICKS);
        Ok(Event::TreeFelled {
            tree: tree_id,
            cell: felled.cell,
            kind: felled.kind,
            harvest,
        })
    }

    fn eat_ration(&mut self) -> Result<Event, ActionError> {
        if !self.player.alive {
            return Err(ActionError::PlayerPerished);
        }
        if self.inventory.food == 0 {
            return Err(ActionError::NoFood);
        }
        self.inventory.food -= 1;
        survival::eat(&mut self.vitals, self.upgrades);
        Ok(Event::RationEaten {
            hunger: self.vitals.hunger,
            food_remaining: self.inventory.food,
        })
    }

    fn purchase(&mut self, upgrade: Upgrade) -> Result<Event, PurchaseError> {
        if !self.player.alive {
            return Err(PurchaseError::PlayerPerished);
        }
        if self.upgrades.has(upgrade) {
            return Err(PurchaseError::AlreadyOwned);
        }
        if let Some(required) = upgrade.prerequisite() {
            if !self.upgrades.has(required) {
                return Err(PurchaseError::MissingPrerequisite(required));
            }
        }
        let cost = upgrade.cost();
        if self.inventory.wood < cost {
            return Err(PurchaseError::InsufficientWood {
                required: cost,
                available: self.inventory.wood,
            });
        }

        self.inventory.wood -= cost;
        self.upgrades.insert(upgrade);
        Ok(Event::UpgradePurchased {
            upgrade,
            wood_remaining: self.inventory.wood,
        })
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureWorld {
            columns,
            rows,
            tile_length,
            tree_count,
            seed,
        } => {
            let tile_length = if tile_length.is_finite() && tile_length > 0.0 {
                tile_length
            } else {
                DEFAULT_TILE_LENGTH
            };
            let tile_grid = TileGrid::new(
                TileCoord::new(columns.get().max(MIN_GRID_EDGE)),
                TileCoord::new(rows.get().max(MIN_GRID_EDGE)),
                tile_length,
            );
            *world = World::generate(tile_grid, Generation { tree_count, seed });
            out_events.push(Event::WorldReset { seed });
        }
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::StepPlayer { direction } => {
            out_events.push(world.step_player(direction).unwrap_or_else(|reason| {
                Event::ActionRejected {
                    action: PlayerAction::Step(direction),
                    reason,
                }
            }));
        }
        Command::ChopTree { tree } => {
            out_events.push(
                world
                    .chop_tree(tree)
                    .unwrap_or_else(|reason| Event::ActionRejected {
                        action: PlayerAction::Chop(tree),
                        reason,
                    }),
            );
        }
        Command::EatRation => {
            out_events.push(
                world
                    .eat_ration()
                    .unwrap_or_else(|reason| Event::ActionRejected {
                        action: PlayerAction::Eat,
                        reason,
                    }),
            );
        }
        Command::PurchaseUpgrade { upgrade } => {
            out_events.push(
                world
                    .purchase(upgrade)
                    .unwrap_or_else(|reason| Event::PurchaseRejected { upgrade, reason }),
            );
        }
        Command::Restart => {
            let seed = world.generation.seed.wrapping_add(1);
            *world = World::generate(
                world.tile_grid,
                Generation {
                    tree_count: world.generation.tree_count,
                    seed,
                },
            );
            out_events.push(Event::WorldReset { seed });
        }
    }
}

/// Errors reported when a snapshot cannot be restored into a world.
#[derive(Debug, Error, PartialEq)]
pub enum RestoreError {
    /// The grid is smaller than the minimum edge length.
    #[error("grid {columns}x{rows} is smaller than the minimum edge of {min}", min = MIN_GRID_EDGE)]
    DegenerateGrid {
        /// Stored column count.
        columns: u32,
        /// Stored row count.
        rows: u32,
    },
    /// The tile length is not a positive, finite number.
    #[error("tile length {0} must be positive and finite")]
    InvalidTileLength(f32),
    /// The player stands outside the grid.
    #[error("player cell {0:?} lies outside the grid")]
    PlayerOutOfBounds(CellCoord),
    /// Hunger or health is outside the valid range, or liveness disagrees with health.
    #[error("vitals are outside the 0..={max} range", max = VITAL_MAX)]
    InvalidVitals,
    /// Standing trees plus pending respawns exceed the configured population.
    #[error("{population} trees exceed the configured population of {tree_count}")]
    Overpopulated {
        /// Configured tree population.
        tree_count: u32,
        /// Standing trees plus pending respawns.
        population: usize,
    },
    /// The configured population needs more tiles than the grid leaves free of the camp.
    #[error("{tree_count} trees do not fit in the {capacity} free tiles of the grid")]
    ExceedsGrid {
        /// Configured tree population.
        tree_count: u32,
        /// Tiles available to trees.
        capacity: u32,
    },
    /// A tree stands outside the grid.
    #[error("tree {0:?} lies outside the grid")]
    TreeOutOfBounds(TreeId),
    /// A tree occupies a tile reserved for the camp.
    #[error("tree {0:?} occupies a camp site")]
    TreeOnCampSite(TreeId),
    /// Two trees share an identifier.
    #[error("tree identifier {0:?} appears more than once")]
    DuplicateTree(TreeId),
    /// Two trees share a tile.
    #[error("more than one tree stands on {0:?}")]
    OverlappingTrees(CellCoord),
    /// A tree's chop counter is zero or exceeds what its kind requires.
    #[error("tree {0:?} has an invalid chop count")]
    InvalidChopCount(TreeId),
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use hearthwood_core::{
        Calendar, CampSites, CellCoord, Inventory, PlayerSnapshot, TreeId, TreeView, UpgradeSet,
        Vitals, WorldSnapshot,
    };

    use super::{TileGrid, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the world's tile grid definition.
    #[must_use]
    pub fn tile_grid(world: &World) -> &TileGrid {
        &world.tile_grid
    }

    /// Tiles reserved for the camp structures.
    #[must_use]
    pub fn camp_sites(world: &World) -> CampSites {
        world.camp
    }

    /// Captures the player's position and liveness.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        PlayerSnapshot {
            cell: world.player.cell,
            alive: world.player.alive,
        }
    }

    /// Current survival stats.
    #[must_use]
    pub fn vitals(world: &World) -> Vitals {
        world.vitals
    }

    /// Resources gathered so far.
    #[must_use]
    pub fn inventory(world: &World) -> Inventory {
        world.inventory
    }

    /// Upgrades built so far.
    #[must_use]
    pub fn upgrades(world: &World) -> UpgradeSet {
        world.upgrades
    }

    /// Day counter and position within the day.
    #[must_use]
    pub fn calendar(world: &World) -> Calendar {
        world.calendar
    }

    /// Number of ticks processed since the world was configured.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Seed the current world was generated from.
    #[must_use]
    pub fn seed(world: &World) -> u64 {
        world.generation.seed
    }

    /// Number of felled trees still waiting to regrow.
    #[must_use]
    pub fn pending_respawns(world: &World) -> usize {
        world.respawns.len()
    }

    /// Captures a read-only view of the standing trees.
    #[must_use]
    pub fn tree_view(world: &World) -> TreeView {
        TreeView::from_snapshots(world.trees.iter().map(|tree| tree.snapshot()).collect())
    }

    /// Returns the tree standing on the provided cell, if any.
    #[must_use]
    pub fn tree_at(world: &World, cell: CellCoord) -> Option<TreeId> {
        world.trees.at(cell)
    }

    /// Captures the complete world state for persistence or presentation.
    #[must_use]
    pub fn snapshot(world: &World) -> WorldSnapshot {
        WorldSnapshot {
            columns: world.tile_grid.columns().get(),
            rows: world.tile_grid.rows().get(),
            tile_length: world.tile_grid.tile_length(),
            tree_count: world.generation.tree_count,
            seed: world.generation.seed,
            rng_draws: world.rng_draws,
            tick_index: world.tick_index,
            calendar: world.calendar,
            player: player(world),
            vitals: world.vitals,
            inventory: world.inventory,
            upgrades: world.upgrades,
            trees: tree_view(world).into_vec(),
            respawns: world.respawns.clone(),
            next_tree_id: world.trees.next_tree_id().get(),
        }
    }
}

fn vital_in_range(value: f32) -> bool {
    value.is_finite() && (0.0..=VITAL_MAX).contains(&value)
}

fn placement_rng(seed: u64, draw: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed ^ draw.wrapping_mul(DRAW_STRIDE))
}
