#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Hearthwood engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Hearthwood.";

/// Number of simulation ticks that compose a single in-game day.
pub const TICKS_PER_DAY: u32 = 120;

/// Tick within a day at which night falls. Night lasts until the day rolls over.
pub const NIGHT_START_TICK: u32 = 72;

/// Upper bound shared by every survival stat.
pub const VITAL_MAX: f32 = 100.0;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Rebuilds the world using the provided layout and generation parameters.
    ConfigureWorld {
        /// Number of tile columns laid out in the grid.
        columns: TileCoord,
        /// Number of tile rows laid out in the grid.
        rows: TileCoord,
        /// Length of each square tile measured in world units.
        tile_length: f32,
        /// Number of trees the world maintains once fully grown.
        tree_count: u32,
        /// Seed driving tree generation and respawn placement.
        seed: u64,
    },
    /// Advances the simulation clock by one fixed tick.
    Tick {
        /// Duration of simulated time covered by the tick.
        dt: Duration,
    },
    /// Requests that the player walk a single tile in the given direction.
    StepPlayer {
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Requests that the player strike the given tree once.
    ChopTree {
        /// Identifier of the tree being chopped.
        tree: TreeId,
    },
    /// Requests that the player eat a single food ration.
    EatRation,
    /// Requests the purchase of a camp upgrade using gathered wood.
    PurchaseUpgrade {
        /// Upgrade the player wants to build.
        upgrade: Upgrade,
    },
    /// Discards the current run and starts over with a fresh seed.
    Restart,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that the world was rebuilt from scratch.
    WorldReset {
        /// Seed used to generate the new world.
        seed: u64,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the player moved between two tiles.
    PlayerMoved {
        /// Tile the player occupied before moving.
        from: CellCoord,
        /// Tile the player occupies after the move.
        to: CellCoord,
    },
    /// Confirms that a tree absorbed a chop without falling.
    TreeChopped {
        /// Identifier of the chopped tree.
        tree: TreeId,
        /// Chops still required before the tree falls.
        chops_remaining: u32,
    },
    /// Confirms that a tree was felled and its yield collected.
    TreeFelled {
        /// Identifier of the felled tree.
        tree: TreeId,
        /// Tile the tree occupied.
        cell: CellCoord,
        /// Kind of tree that was felled.
        kind: TreeKind,
        /// Resources added to the inventory.
        harvest: Harvest,
    },
    /// Confirms that a new tree grew on the grid.
    TreeSpawned {
        /// Identifier allocated to the tree.
        tree: TreeId,
        /// Tile the tree occupies.
        cell: CellCoord,
        /// Kind of tree that grew.
        kind: TreeKind,
    },
    /// Confirms that the player ate a ration.
    RationEaten {
        /// Hunger value after eating.
        hunger: f32,
        /// Food rations left in the inventory.
        food_remaining: u32,
    },
    /// Confirms that an upgrade was built.
    UpgradePurchased {
        /// Upgrade that was built.
        upgrade: Upgrade,
        /// Wood left in the inventory after paying.
        wood_remaining: u32,
    },
    /// Reports that an upgrade purchase was rejected.
    PurchaseRejected {
        /// Upgrade requested for purchase.
        upgrade: Upgrade,
        /// Specific reason the purchase failed.
        reason: PurchaseError,
    },
    /// Reports that a player action was rejected.
    ActionRejected {
        /// Action the player attempted.
        action: PlayerAction,
        /// Specific reason the action failed.
        reason: ActionError,
    },
    /// Announces that night fell on the given day.
    NightFell {
        /// Day on which night fell.
        day: u32,
    },
    /// Announces the start of a new day.
    DayBegan {
        /// Number of the day that began, starting at one.
        day: u32,
    },
    /// Announces that the player's health ran out.
    PlayerPerished {
        /// Day on which the player perished.
        day: u32,
    },
}

/// Player actions that consume the per-tick action budget or inventory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerAction {
    /// Walking a single tile.
    Step(Direction),
    /// Striking a tree.
    Chop(TreeId),
    /// Eating a ration.
    Eat,
}

/// Reasons a player action may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionError {
    /// The player has perished and can no longer act.
    PlayerPerished,
    /// The player already spent this tick's action.
    AlreadyActed,
    /// The step would leave the tile grid.
    OutOfBounds,
    /// No tree with the provided identifier exists.
    MissingTree,
    /// The tree is farther than one tile away.
    OutOfReach,
    /// The inventory holds no food.
    NoFood,
}

/// Reasons an upgrade purchase may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PurchaseError {
    /// The upgrade was already built.
    AlreadyOwned,
    /// Another upgrade must be built first.
    MissingPrerequisite(Upgrade),
    /// The inventory holds less wood than the upgrade costs.
    InsufficientWood {
        /// Wood required by the upgrade.
        required: u32,
        /// Wood currently available.
        available: u32,
    },
    /// The player has perished and can no longer build.
    PlayerPerished,
}

/// Cardinal movement directions available to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

/// Unique identifier assigned to a tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TreeId(u32);

impl TreeId {
    /// Creates a new tree identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single tile expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Returns the neighbouring cell in `direction`, or `None` when it would
    /// leave a grid of `columns` by `rows` tiles.
    #[must_use]
    pub fn neighbor(self, direction: Direction, columns: u32, rows: u32) -> Option<CellCoord> {
        let (column, row) = match direction {
            Direction::North => (Some(self.column), self.row.checked_sub(1)),
            Direction::East => (self.column.checked_add(1), Some(self.row)),
            Direction::South => (Some(self.column), self.row.checked_add(1)),
            Direction::West => (self.column.checked_sub(1), Some(self.row)),
        };
        let (column, row) = (column?, row?);
        if column < columns && row < rows {
            Some(CellCoord::new(column, row))
        } else {
            None
        }
    }
}

/// Index within the tile grid measured in whole tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord(u32);

impl TileCoord {
    /// Creates a new tile coordinate wrapper.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the underlying tile index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Species of tree growing on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TreeKind {
    /// Sturdy tree harvested for wood.
    Timber,
    /// Fruit-bearing tree that yields food alongside a little wood.
    Fruit,
}

impl TreeKind {
    /// Number of chops required to fell a fresh tree of this kind.
    #[must_use]
    pub const fn chops_required(self) -> u32 {
        match self {
            Self::Timber => 3,
            Self::Fruit => 2,
        }
    }

    /// Resources collected when a tree of this kind is felled.
    #[must_use]
    pub const fn harvest(self) -> Harvest {
        match self {
            Self::Timber => Harvest::new(3, 0),
            Self::Fruit => Harvest::new(1, 2),
        }
    }
}

/// Resources gathered from a felled tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Harvest {
    /// Wood collected.
    pub wood: u32,
    /// Food rations collected.
    pub food: u32,
}

impl Harvest {
    /// Creates a new harvest descriptor.
    #[must_use]
    pub const fn new(wood: u32, food: u32) -> Self {
        Self { wood, food }
    }
}

/// Camp improvements purchasable with wood.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Upgrade {
    /// Cooks food for better rations and keeps the night cold away.
    Campfire,
    /// Shelter that slows hunger and speeds recovery while sleeping at night.
    Hut,
}

impl Upgrade {
    /// Every upgrade in purchase order.
    pub const ALL: [Upgrade; 2] = [Upgrade::Campfire, Upgrade::Hut];

    /// Wood required to build the upgrade.
    #[must_use]
    pub const fn cost(self) -> u32 {
        match self {
            Self::Campfire => 8,
            Self::Hut => 20,
        }
    }

    /// Upgrade that must already be built before this one can be purchased.
    #[must_use]
    pub const fn prerequisite(self) -> Option<Upgrade> {
        match self {
            Self::Campfire => None,
            Self::Hut => Some(Self::Campfire),
        }
    }

    /// Human-readable label used by adapters.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Campfire => "Campfire",
            Self::Hut => "Hut",
        }
    }
}

/// Flags describing which upgrades have been built.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UpgradeSet {
    /// Whether the campfire stands at the camp.
    pub campfire: bool,
    /// Whether the hut stands at the camp.
    pub hut: bool,
}

impl UpgradeSet {
    /// Reports whether the provided upgrade has been built.
    #[must_use]
    pub const fn has(&self, upgrade: Upgrade) -> bool {
        match upgrade {
            Upgrade::Campfire => self.campfire,
            Upgrade::Hut => self.hut,
        }
    }

    /// Marks the provided upgrade as built.
    pub fn insert(&mut self, upgrade: Upgrade) {
        match upgrade {
            Upgrade::Campfire => self.campfire = true,
            Upgrade::Hut => self.hut = true,
        }
    }
}

/// Tiles reserved for the camp structures.
///
/// The campfire sits at the centre of the grid and the hut one tile east of
/// it. The player starts every run on the campfire tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CampSites {
    /// Tile the campfire is built on.
    pub campfire: CellCoord,
    /// Tile the hut is built on.
    pub hut: CellCoord,
}

impl CampSites {
    /// Computes the camp sites for a grid of `columns` by `rows` tiles.
    #[must_use]
    pub const fn for_grid(columns: u32, rows: u32) -> Self {
        let column = columns / 2;
        let row = rows / 2;
        Self {
            campfire: CellCoord::new(column, row),
            hut: CellCoord::new(column + 1, row),
        }
    }

    /// Tile reserved for the provided upgrade.
    #[must_use]
    pub const fn site_of(&self, upgrade: Upgrade) -> CellCoord {
        match upgrade {
            Upgrade::Campfire => self.campfire,
            Upgrade::Hut => self.hut,
        }
    }

    /// Reports whether `cell` is reserved for a camp structure.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        cell == self.campfire || cell == self.hut
    }
}

/// Survival stats tracked for the player.
///
/// Both values live in `0.0..=VITAL_MAX`. Hunger measures satiety, so a value
/// of zero means the player is starving.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    /// Satiety level; decays every tick.
    pub hunger: f32,
    /// Health level; the run ends when it reaches zero.
    pub health: f32,
}

impl Vitals {
    /// Vitals of a freshly started run.
    pub const FULL: Vitals = Vitals {
        hunger: VITAL_MAX,
        health: VITAL_MAX,
    };
}

impl Default for Vitals {
    fn default() -> Self {
        Self::FULL
    }
}

/// Resources gathered by the player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Inventory {
    /// Wood available for upgrades.
    pub wood: u32,
    /// Food rations available for eating.
    pub food: u32,
}

/// Day counter and position within the current day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Calendar {
    day: u32,
    tick_in_day: u32,
}

impl Calendar {
    /// Creates a calendar positioned at the provided day and tick.
    ///
    /// Day zero is promoted to day one and the tick wraps into the day length.
    #[must_use]
    pub const fn new(day: u32, tick_in_day: u32) -> Self {
        Self {
            day: if day == 0 { 1 } else { day },
            tick_in_day: tick_in_day % TICKS_PER_DAY,
        }
    }

    /// Number of the current day, starting at one.
    #[must_use]
    pub const fn day(&self) -> u32 {
        self.day
    }

    /// Ticks elapsed since the current day began.
    #[must_use]
    pub const fn tick_in_day(&self) -> u32 {
        self.tick_in_day
    }

    /// Reports whether the current tick falls within the night window.
    #[must_use]
    pub const fn is_night(&self) -> bool {
        self.tick_in_day >= NIGHT_START_TICK
    }

    /// Advances the calendar by one tick and reports the transition crossed.
    pub fn advance(&mut self) -> CalendarTransition {
        self.tick_in_day += 1;
        if self.tick_in_day >= TICKS_PER_DAY {
            self.tick_in_day = 0;
            self.day = self.day.saturating_add(1);
            CalendarTransition::DayBegan
        } else if self.tick_in_day == NIGHT_START_TICK {
            CalendarTransition::NightFell
        } else {
            CalendarTransition::None
        }
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Self::new(1, 0)
    }
}

/// Boundary crossed when the calendar advances.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalendarTransition {
    /// Nothing notable happened.
    None,
    /// The night window started.
    NightFell,
    /// A new day started.
    DayBegan,
}

/// Immutable representation of a single tree used for queries and snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreeSnapshot {
    /// Unique identifier assigned to the tree.
    pub id: TreeId,
    /// Tile occupied by the tree.
    pub cell: CellCoord,
    /// Kind of tree.
    pub kind: TreeKind,
    /// Chops still required before the tree falls.
    pub chops_remaining: u32,
}

/// Read-only snapshot describing all standing trees.
#[derive(Clone, Debug, Default)]
pub struct TreeView {
    snapshots: Vec<TreeSnapshot>,
}

impl TreeView {
    /// Creates a new tree view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TreeSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tree snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &TreeSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot for the provided tree.
    #[must_use]
    pub fn get(&self, tree: TreeId) -> Option<&TreeSnapshot> {
        self.snapshots
            .binary_search_by_key(&tree, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of standing trees.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no trees are standing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TreeSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    /// Tile currently occupied by the player.
    pub cell: CellCoord,
    /// Whether the player is still alive.
    pub alive: bool,
}

/// Complete, serialisable capture of the world state.
///
/// Adapters use it both to persist runs and to render frames; restoring a
/// snapshot yields a world that continues exactly where the capture left off.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Number of tile columns.
    pub columns: u32,
    /// Number of tile rows.
    pub rows: u32,
    /// Side length of a tile in world units.
    pub tile_length: f32,
    /// Target tree population.
    pub tree_count: u32,
    /// Seed driving tree placement.
    pub seed: u64,
    /// Number of random placements already drawn from the seed.
    pub rng_draws: u64,
    /// Number of ticks processed since the world was configured.
    pub tick_index: u64,
    /// Day counter and position within the day.
    pub calendar: Calendar,
    /// Player position and liveness.
    pub player: PlayerSnapshot,
    /// Survival stats.
    pub vitals: Vitals,
    /// Gathered resources.
    pub inventory: Inventory,
    /// Built upgrades.
    pub upgrades: UpgradeSet,
    /// Standing trees ordered by identifier.
    pub trees: Vec<TreeSnapshot>,
    /// Remaining ticks for each pending tree respawn.
    pub respawns: Vec<u32>,
    /// Identifier the next spawned tree receives.
    pub next_tree_id: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn neighbor_respects_grid_bounds() {
        let corner = CellCoord::new(0, 0);
        assert_eq!(corner.neighbor(Direction::North, 4, 4), None);
        assert_eq!(corner.neighbor(Direction::West, 4, 4), None);
        assert_eq!(
            corner.neighbor(Direction::East, 4, 4),
            Some(CellCoord::new(1, 0))
        );

        let far = CellCoord::new(3, 3);
        assert_eq!(far.neighbor(Direction::South, 4, 4), None);
        assert_eq!(far.neighbor(Direction::East, 4, 4), None);
        assert_eq!(
            far.neighbor(Direction::North, 4, 4),
            Some(CellCoord::new(3, 2))
        );
    }

    #[test]
    fn calendar_reports_night_and_rollover() {
        let mut calendar = Calendar::new(1, NIGHT_START_TICK - 1);
        assert!(!calendar.is_night());
        assert_eq!(calendar.advance(), CalendarTransition::NightFell);
        assert!(calendar.is_night());

        let mut calendar = Calendar::new(3, TICKS_PER_DAY - 1);
        assert_eq!(calendar.advance(), CalendarTransition::DayBegan);
        assert_eq!(calendar.day(), 4);
        assert_eq!(calendar.tick_in_day(), 0);
        assert!(!calendar.is_night());
    }

    #[test]
    fn calendar_normalises_day_zero() {
        let calendar = Calendar::new(0, TICKS_PER_DAY + 5);
        assert_eq!(calendar.day(), 1);
        assert_eq!(calendar.tick_in_day(), 5);
    }

    #[test]
    fn hut_requires_campfire() {
        assert_eq!(Upgrade::Campfire.prerequisite(), None);
        assert_eq!(Upgrade::Hut.prerequisite(), Some(Upgrade::Campfire));
        assert!(Upgrade::Hut.cost() > Upgrade::Campfire.cost());
    }

    #[test]
    fn camp_sites_sit_at_grid_centre() {
        let camp = CampSites::for_grid(12, 9);
        assert_eq!(camp.campfire, CellCoord::new(6, 4));
        assert_eq!(camp.site_of(Upgrade::Hut), CellCoord::new(7, 4));
        assert!(camp.contains(CellCoord::new(7, 4)));
        assert!(!camp.contains(CellCoord::new(5, 4)));
    }

    #[test]
    fn upgrade_set_tracks_built_upgrades() {
        let mut upgrades = UpgradeSet::default();
        assert!(!upgrades.has(Upgrade::Campfire));
        upgrades.insert(Upgrade::Campfire);
        assert!(upgrades.has(Upgrade::Campfire));
        assert!(!upgrades.has(Upgrade::Hut));
    }

    #[test]
    fn fruit_trees_yield_food() {
        assert_eq!(TreeKind::Fruit.harvest(), Harvest::new(1, 2));
        assert_eq!(TreeKind::Timber.harvest().food, 0);
        assert!(TreeKind::Timber.chops_required() > TreeKind::Fruit.chops_required());
    }

    #[test]
    fn tree_view_lookup_uses_identifier_order() {
        let view = TreeView::from_snapshots(vec![
            TreeSnapshot {
                id: TreeId::new(4),
                cell: CellCoord::new(2, 2),
                kind: TreeKind::Fruit,
                chops_remaining: 2,
            },
            TreeSnapshot {
                id: TreeId::new(1),
                cell: CellCoord::new(0, 3),
                kind: TreeKind::Timber,
                chops_remaining: 3,
            },
        ]);

        let ids: Vec<u32> = view.iter().map(|tree| tree.id.get()).collect();
        assert_eq!(ids, vec![1, 4]);
        assert_eq!(
            view.get(TreeId::new(4)).map(|tree| tree.cell),
            Some(CellCoord::new(2, 2))
        );
        assert!(view.get(TreeId::new(2)).is_none());
    }

    #[test]
    fn calendar_serialises_as_plain_fields() {
        let json = serde_json::to_value(Calendar::new(2, 10)).expect("serialize");
        assert_eq!(json, serde_json::json!({ "day": 2, "tick_in_day": 10 }));
    }
}
