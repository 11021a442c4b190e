#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Hearthwood adapters.
//!
//! [`project`] turns a [`WorldSnapshot`] into a [`Scene`] without keeping any
//! state of its own; backends implementing [`RenderingBackend`] draw scenes
//! and report player input back through [`FrameInput`].

use anyhow::Result as AnyResult;
use glam::Vec2;
use hearthwood_core::{
    CampSites, CellCoord, TreeId, TreeKind, Upgrade, WorldSnapshot, VITAL_MAX,
};
use std::time::Duration;
use thiserror::Error;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the same color with a replaced alpha channel.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self {
            red: self.red,
            green: self.green,
            blue: self.blue,
            alpha,
        }
    }
}

const GROUND_COLOR: Color = Color::from_rgb_u8(0x4c, 0x7a, 0x3d);
const GRID_LINE_COLOR: Color = Color::from_rgb_u8(0x3e, 0x66, 0x31);
const TIMBER_COLOR: Color = Color::from_rgb_u8(0x1f, 0x4d, 0x24);
const FRUIT_COLOR: Color = Color::from_rgb_u8(0x8e, 0x3b, 0x46);
const PLAYER_COLOR: Color = Color::from_rgb_u8(0xf2, 0xd0, 0x8a);
const FALLEN_PLAYER_COLOR: Color = Color::from_rgb_u8(0x6b, 0x6b, 0x6b);
const CAMPFIRE_COLOR: Color = Color::from_rgb_u8(0xf0, 0x8a, 0x24);
const HUT_COLOR: Color = Color::from_rgb_u8(0x8b, 0x5a, 0x2b);
const NIGHT_COLOR: Color = Color::from_rgb_u8(0x0b, 0x10, 0x2a);

/// Color used to draw a tree of the provided kind.
#[must_use]
pub const fn tree_color(kind: TreeKind) -> Color {
    match kind {
        TreeKind::Timber => TIMBER_COLOR,
        TreeKind::Fruit => FRUIT_COLOR,
    }
}

/// Color used to draw the provided camp structure.
#[must_use]
pub const fn structure_color(upgrade: Upgrade) -> Color {
    match upgrade {
        Upgrade::Campfire => CAMPFIRE_COLOR,
        Upgrade::Hut => HUT_COLOR,
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Upgrade the player asked to buy on this frame.
    pub purchase: Option<Upgrade>,
    /// Whether the player asked to start a new run on this frame.
    pub restart: bool,
}

/// Describes a square tile grid that can be rendered by adapters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileGridPresentation {
    /// Number of columns contained in the grid.
    pub columns: u32,
    /// Number of rows contained in the grid.
    pub rows: u32,
    /// Side length of a single tile expressed in world units.
    pub tile_length: f32,
    /// Color used to fill the ground.
    pub ground_color: Color,
    /// Color used when drawing grid lines.
    pub line_color: Color,
}

impl TileGridPresentation {
    /// Creates a new tile grid descriptor.
    ///
    /// Returns an error when the grid has no area or the tile length is not a
    /// positive, finite number.
    pub fn new(
        columns: u32,
        rows: u32,
        tile_length: f32,
        ground_color: Color,
        line_color: Color,
    ) -> Result<Self, RenderingError> {
        if columns == 0 || rows == 0 {
            return Err(RenderingError::EmptyGrid { columns, rows });
        }
        if !tile_length.is_finite() || tile_length <= 0.0 {
            return Err(RenderingError::InvalidTileLength { tile_length });
        }

        Ok(Self {
            columns,
            rows,
            tile_length,
            ground_color,
            line_color,
        })
    }

    /// Calculates the total width of the grid.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.columns as f32 * self.tile_length
    }

    /// Calculates the total height of the grid.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.rows as f32 * self.tile_length
    }

    /// World-space position of the top-left corner of `cell`.
    #[must_use]
    pub fn cell_origin(&self, cell: CellCoord) -> Vec2 {
        Vec2::new(
            cell.column() as f32 * self.tile_length,
            cell.row() as f32 * self.tile_length,
        )
    }

    /// World-space position of the centre of `cell`.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> Vec2 {
        self.cell_origin(cell) + Vec2::splat(self.tile_length * 0.5)
    }
}

/// Tree drawn on the grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreePresentation {
    /// Identifier allocated to the tree by the world.
    pub id: TreeId,
    /// Tile the tree stands on.
    pub cell: CellCoord,
    /// Kind of tree.
    pub kind: TreeKind,
    /// Fill color of the canopy.
    pub color: Color,
    /// Fraction of the required chops already landed, in `0.0..1.0`.
    pub chop_progress: f32,
}

/// Player avatar drawn on the grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerPresentation {
    /// Tile the player occupies.
    pub cell: CellCoord,
    /// Fill color of the avatar.
    pub color: Color,
    /// Whether the player is still alive.
    pub alive: bool,
}

/// Camp structure the player has built.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StructurePresentation {
    /// Upgrade the structure represents.
    pub upgrade: Upgrade,
    /// Tile the structure occupies.
    pub cell: CellCoord,
    /// Fill color of the structure.
    pub color: Color,
}

/// Purchase option listed in the heads-up display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpgradeOffer {
    /// Upgrade on offer.
    pub upgrade: Upgrade,
    /// Wood the upgrade costs.
    pub cost: u32,
    /// Whether the upgrade can be bought right now.
    pub affordable: bool,
    /// Whether the upgrade is already built.
    pub owned: bool,
}

/// Textual status shown alongside the grid.
#[derive(Clone, Debug, PartialEq)]
pub struct HudPresentation {
    /// Satiety in `0.0..=VITAL_MAX`.
    pub hunger: f32,
    /// Health in `0.0..=VITAL_MAX`.
    pub health: f32,
    /// Upper bound of both vitals.
    pub vital_max: f32,
    /// Wood in the inventory.
    pub wood: u32,
    /// Food rations in the inventory.
    pub food: u32,
    /// Current day, starting at one.
    pub day: u32,
    /// Whether the calendar is in its night window.
    pub night: bool,
    /// Upgrades in purchase order.
    pub offers: Vec<UpgradeOffer>,
}

/// Darkness overlay drawn above the grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayPresentation {
    /// Overlay color; its alpha channel carries the darkness.
    pub color: Color,
}

impl OverlayPresentation {
    /// Creates an overlay with the provided darkness in `0.0..=1.0`.
    ///
    /// Non-finite values are treated as full daylight.
    #[must_use]
    pub fn new(darkness: f32) -> Self {
        let darkness = if darkness.is_finite() {
            darkness.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            color: NIGHT_COLOR.with_alpha(darkness),
        }
    }

    /// Darkness of the overlay.
    #[must_use]
    pub const fn darkness(&self) -> f32 {
        self.color.alpha
    }
}

/// Scene description combining the grid, its inhabitants and the HUD.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Tile grid that composes the play area.
    pub tile_grid: TileGridPresentation,
    /// Standing trees in identifier order.
    pub trees: Vec<TreePresentation>,
    /// Player avatar.
    pub player: PlayerPresentation,
    /// Camp structures that have been built.
    pub structures: Vec<StructurePresentation>,
    /// Status display.
    pub hud: HudPresentation,
    /// Day/night overlay.
    pub overlay: OverlayPresentation,
    /// Whether the run has ended and the game-over message should show.
    pub perished: bool,
}

/// Projects a world snapshot into a drawable scene.
///
/// The projection is a pure function of its inputs; `daylight_intensity`
/// controls the darkness of the overlay. Snapshots whose grid cannot be drawn
/// are rejected.
pub fn project(
    snapshot: &WorldSnapshot,
    daylight_intensity: f32,
) -> Result<Scene, RenderingError> {
    let tile_grid = TileGridPresentation::new(
        snapshot.columns,
        snapshot.rows,
        snapshot.tile_length,
        GROUND_COLOR,
        GRID_LINE_COLOR,
    )?;

    let trees = snapshot
        .trees
        .iter()
        .map(|tree| {
            let required = tree.kind.chops_required().max(1);
            let landed = required.saturating_sub(tree.chops_remaining);
            TreePresentation {
                id: tree.id,
                cell: tree.cell,
                kind: tree.kind,
                color: tree_color(tree.kind),
                chop_progress: landed as f32 / required as f32,
            }
        })
        .collect();

    let player = PlayerPresentation {
        cell: snapshot.player.cell,
        color: if snapshot.player.alive {
            PLAYER_COLOR
        } else {
            FALLEN_PLAYER_COLOR
        },
        alive: snapshot.player.alive,
    };

    let camp = CampSites::for_grid(snapshot.columns, snapshot.rows);
    let structures = Upgrade::ALL
        .into_iter()
        .filter(|upgrade| snapshot.upgrades.has(*upgrade))
        .map(|upgrade| StructurePresentation {
            upgrade,
            cell: camp.site_of(upgrade),
            color: structure_color(upgrade),
        })
        .collect();

    let offers = Upgrade::ALL
        .into_iter()
        .map(|upgrade| {
            let owned = snapshot.upgrades.has(upgrade);
            let unlocked = upgrade
                .prerequisite()
                .map_or(true, |required| snapshot.upgrades.has(required));
            UpgradeOffer {
                upgrade,
                cost: upgrade.cost(),
                affordable: snapshot.player.alive
                    && !owned
                    && unlocked
                    && snapshot.inventory.wood >= upgrade.cost(),
                owned,
            }
        })
        .collect();

    let hud = HudPresentation {
        hunger: snapshot.vitals.hunger,
        health: snapshot.vitals.health,
        vital_max: VITAL_MAX,
        wood: snapshot.inventory.wood,
        food: snapshot.inventory.food,
        day: snapshot.calendar.day(),
        night: snapshot.calendar.is_night(),
        offers,
    };

    Ok(Scene {
        tile_grid,
        trees,
        player,
        structures,
        hud,
        overlay: OverlayPresentation::new(daylight_intensity),
        perished: !snapshot.player.alive,
    })
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Hearthwood scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// input captured by the backend, and replaces the scene before it is
    /// drawn.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, Error, PartialEq)]
pub enum RenderingError {
    /// The grid has no columns or no rows.
    #[error("grid {columns}x{rows} has no area")]
    EmptyGrid {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
    /// The tile length is not a positive, finite number.
    #[error("tile length must be positive and finite (received {tile_length})")]
    InvalidTileLength {
        /// Provided tile length that failed validation.
        tile_length: f32,
    },
}
