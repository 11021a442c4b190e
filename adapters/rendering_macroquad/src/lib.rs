#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Hearthwood.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! The status read-out and purchase buttons use Macroquad's immediate-mode UI.
//! All UI-specific calls live inside the local `ui` module to avoid leaking
//! Macroquad UI types throughout the renderer.

mod ui;

use self::ui::{draw_control_panel_ui, ControlPanelUiContext, ControlPanelUiResult};
use anyhow::Result;
use glam::Vec2;
use hearthwood_core::Upgrade;
use hearthwood_rendering::{
    Color, FrameInput, Presentation, RenderingBackend, Scene, TileGridPresentation,
};
use macroquad::input::{is_key_pressed, KeyCode};
use macroquad::math::Vec2 as MacroquadVec2;
use std::time::Duration;

const DEFAULT_PANEL_WIDTH: f32 = 260.0;
const PANEL_BACKGROUND: Color = Color::from_rgb_u8(0x23, 0x1d, 0x17);

/// Tracks UI-sourced interactions so they can be merged with physical input on the next frame.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, Default)]
pub struct ControlPanelInputState {
    purchase_latched: Option<Upgrade>,
    restart_latched: bool,
}

impl ControlPanelInputState {
    /// Returns the latched purchase request, clearing it so the action fires once.
    pub fn take_purchase(&mut self) -> Option<Upgrade> {
        self.purchase_latched.take()
    }

    /// Records that a control-panel button requested a purchase this frame.
    pub fn register_purchase(&mut self, upgrade: Upgrade) {
        self.purchase_latched = Some(upgrade);
    }

    /// Returns whether the UI requested a restart and clears the latch.
    pub fn take_restart(&mut self) -> bool {
        let latched = self.restart_latched;
        self.restart_latched = false;
        latched
    }

    /// Records that the restart button was pressed this frame.
    pub fn register_restart(&mut self) {
        self.restart_latched = true;
    }
}

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Q` or `Escape` to quit the game loop.
    quit_requested: bool,
    /// `1` buys the campfire, `2` buys the hut.
    purchase: Option<Upgrade>,
    /// `R` starts a new run.
    restart: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        let quit_requested = is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q);
        let purchase = if is_key_pressed(KeyCode::Key1) {
            Some(Upgrade::Campfire)
        } else if is_key_pressed(KeyCode::Key2) {
            Some(Upgrade::Hut)
        } else {
            None
        };
        let restart = is_key_pressed(KeyCode::R);

        Self {
            quit_requested,
            purchase,
            restart,
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    window_width: i32,
    window_height: i32,
    panel_width: f32,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            window_width: 960,
            window_height: 640,
            panel_width: DEFAULT_PANEL_WIDTH,
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend using the default window layout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            window_width,
            window_height,
            panel_width,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let config = macroquad::window::Conf {
            window_title,
            window_width,
            window_height,
            ..macroquad::window::Conf::default()
        };

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut control_panel_input = ControlPanelInputState::default();

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break;
                }

                macroquad::window::clear_background(background);

                let screen_width = macroquad::window::screen_width();
                let screen_height = macroquad::window::screen_height();

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let frame_input = merge_frame_input(
                    control_panel_input.take_purchase(),
                    control_panel_input.take_restart(),
                    keyboard,
                );

                update_scene(frame_dt, frame_input, &mut scene);

                let metrics =
                    SceneMetrics::from_scene(&scene, screen_width, screen_height, panel_width);
                draw_ground(&scene.tile_grid, &metrics);
                draw_tile_grid(&scene.tile_grid, &metrics);
                draw_structures(&scene, &metrics);
                draw_trees(&scene, &metrics);
                draw_player(&scene, &metrics);
                draw_overlay(&scene, &metrics);

                let panel_context =
                    draw_control_panel(&scene, screen_width, screen_height, panel_width);
                let mut control_panel_ui = macroquad::ui::root_ui();
                let ControlPanelUiResult { purchase, restart } =
                    draw_control_panel_ui(&mut control_panel_ui, panel_context);
                if let Some(upgrade) = purchase {
                    control_panel_input.register_purchase(upgrade);
                }
                if restart {
                    control_panel_input.register_restart();
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn merge_frame_input(
    ui_purchase: Option<Upgrade>,
    ui_restart: bool,
    keyboard: KeyboardShortcuts,
) -> FrameInput {
    FrameInput {
        purchase: ui_purchase.or(keyboard.purchase),
        restart: ui_restart || keyboard.restart,
    }
}

#[derive(Clone, Copy, Debug)]
struct SceneMetrics {
    scale: f32,
    grid_offset_x: f32,
    grid_offset_y: f32,
    grid_width_scaled: f32,
    grid_height_scaled: f32,
    tile_step: f32,
}

impl SceneMetrics {
    fn from_scene(scene: &Scene, screen_width: f32, screen_height: f32, panel_width: f32) -> Self {
        let tile_grid = scene.tile_grid;
        let world_width = tile_grid.width();
        let world_height = tile_grid.height();
        let panel_width = panel_width.max(0.0).min(screen_width);
        let available_width = (screen_width - panel_width).max(0.0);
        let scale = if world_width <= f32::EPSILON || world_height <= f32::EPSILON {
            1.0
        } else {
            (available_width / world_width).min(screen_height / world_height)
        };

        let grid_width_scaled = world_width * scale;
        let grid_height_scaled = world_height * scale;

        Self {
            scale,
            grid_offset_x: ((available_width - grid_width_scaled) * 0.5).max(0.0),
            grid_offset_y: ((screen_height - grid_height_scaled) * 0.5).max(0.0),
            grid_width_scaled,
            grid_height_scaled,
            tile_step: tile_grid.tile_length * scale,
        }
    }

    fn to_screen(&self, world_position: Vec2) -> Vec2 {
        Vec2::new(
            self.grid_offset_x + world_position.x * self.scale,
            self.grid_offset_y + world_position.y * self.scale,
        )
    }
}

fn draw_ground(tile_grid: &TileGridPresentation, metrics: &SceneMetrics) {
    macroquad::shapes::draw_rectangle(
        metrics.grid_offset_x,
        metrics.grid_offset_y,
        metrics.grid_width_scaled,
        metrics.grid_height_scaled,
        to_macroquad_color(tile_grid.ground_color),
    );
}

fn draw_tile_grid(tile_grid: &TileGridPresentation, metrics: &SceneMetrics) {
    let grid_color = to_macroquad_color(tile_grid.line_color);
    for column in 0..=tile_grid.columns {
        let x = metrics.grid_offset_x + column as f32 * metrics.tile_step;
        macroquad::shapes::draw_line(
            x,
            metrics.grid_offset_y,
            x,
            metrics.grid_offset_y + metrics.grid_height_scaled,
            1.0,
            grid_color,
        );
    }

    for row in 0..=tile_grid.rows {
        let y = metrics.grid_offset_y + row as f32 * metrics.tile_step;
        macroquad::shapes::draw_line(
            metrics.grid_offset_x,
            y,
            metrics.grid_offset_x + metrics.grid_width_scaled,
            y,
            1.0,
            grid_color,
        );
    }
}

fn draw_structures(scene: &Scene, metrics: &SceneMetrics) {
    let inset = metrics.tile_step * 0.15;
    for structure in &scene.structures {
        let origin = metrics.to_screen(scene.tile_grid.cell_origin(structure.cell));
        let color = to_macroquad_color(structure.color);
        match structure.upgrade {
            Upgrade::Campfire => {
                let center = origin + Vec2::splat(metrics.tile_step * 0.5);
                macroquad::shapes::draw_circle(center.x, center.y, metrics.tile_step * 0.3, color);
            }
            Upgrade::Hut => {
                let size = metrics.tile_step - 2.0 * inset;
                macroquad::shapes::draw_rectangle(
                    origin.x + inset,
                    origin.y + inset,
                    size,
                    size,
                    color,
                );
            }
        }
    }
}

fn draw_trees(scene: &Scene, metrics: &SceneMetrics) {
    let radius = metrics.tile_step * 0.38;
    let bar_height = (metrics.tile_step * 0.08).max(1.0);
    for tree in &scene.trees {
        let center = metrics.to_screen(scene.tile_grid.cell_center(tree.cell));
        macroquad::shapes::draw_circle(center.x, center.y, radius, to_macroquad_color(tree.color));

        if tree.chop_progress > 0.0 {
            let left = center.x - radius;
            let top = center.y + radius;
            let width = radius * 2.0;
            macroquad::shapes::draw_rectangle(
                left,
                top,
                width,
                bar_height,
                macroquad::color::BLACK,
            );
            macroquad::shapes::draw_rectangle(
                left,
                top,
                width * tree.chop_progress.clamp(0.0, 1.0),
                bar_height,
                macroquad::color::YELLOW,
            );
        }
    }
}

fn draw_player(scene: &Scene, metrics: &SceneMetrics) {
    let player = scene.player;
    let center = metrics.to_screen(scene.tile_grid.cell_center(player.cell));
    let radius = if player.alive {
        metrics.tile_step * 0.25
    } else {
        metrics.tile_step * 0.18
    };
    macroquad::shapes::draw_circle(center.x, center.y, radius, to_macroquad_color(player.color));
    macroquad::shapes::draw_circle_lines(
        center.x,
        center.y,
        radius,
        1.5,
        macroquad::color::BLACK,
    );
}

fn draw_overlay(scene: &Scene, metrics: &SceneMetrics) {
    let darkness = if scene.perished {
        scene.overlay.darkness().max(0.5)
    } else {
        scene.overlay.darkness()
    };
    if darkness <= f32::EPSILON {
        return;
    }

    macroquad::shapes::draw_rectangle(
        metrics.grid_offset_x,
        metrics.grid_offset_y,
        metrics.grid_width_scaled,
        metrics.grid_height_scaled,
        to_macroquad_color(scene.overlay.color.with_alpha(darkness)),
    );
}

fn draw_control_panel<'a>(
    scene: &'a Scene,
    screen_width: f32,
    screen_height: f32,
    panel_width: f32,
) -> ControlPanelUiContext<'a> {
    let width = panel_width.max(0.0).min(screen_width);
    let left = (screen_width - width).max(0.0);
    let background_color = to_macroquad_color(PANEL_BACKGROUND);
    macroquad::shapes::draw_rectangle(left, 0.0, width, screen_height, background_color);

    ControlPanelUiContext {
        origin: MacroquadVec2::new(left, 0.0),
        size: MacroquadVec2::new(width, screen_height),
        background: background_color,
        hud: &scene.hud,
        perished: scene.perished,
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearthwood_core::CellCoord;
    use hearthwood_rendering::{HudPresentation, OverlayPresentation, PlayerPresentation};

    fn scene(columns: u32, rows: u32) -> Scene {
        let color = Color::from_rgb_u8(10, 20, 30);
        Scene {
            tile_grid: TileGridPresentation::new(columns, rows, 10.0, color, color)
                .expect("valid grid"),
            trees: Vec::new(),
            player: PlayerPresentation {
                cell: CellCoord::new(0, 0),
                color,
                alive: true,
            },
            structures: Vec::new(),
            hud: HudPresentation {
                hunger: 100.0,
                health: 100.0,
                vital_max: 100.0,
                wood: 0,
                food: 0,
                day: 1,
                night: false,
                offers: Vec::new(),
            },
            overlay: OverlayPresentation::new(0.0),
            perished: false,
        }
    }

    #[test]
    fn metrics_fit_grid_beside_the_panel() {
        let metrics = SceneMetrics::from_scene(&scene(10, 5), 300.0, 400.0, 100.0);
        assert_eq!(metrics.scale, 2.0);
        assert_eq!(metrics.grid_width_scaled, 200.0);
        assert_eq!(metrics.grid_height_scaled, 100.0);
        assert_eq!(metrics.grid_offset_x, 0.0);
        assert_eq!(metrics.grid_offset_y, 150.0);
        assert_eq!(metrics.tile_step, 20.0);
    }

    #[test]
    fn screen_positions_follow_scale_and_offset() {
        let metrics = SceneMetrics::from_scene(&scene(4, 4), 200.0, 100.0, 100.0);
        assert_eq!(metrics.scale, 2.5);
        assert_eq!(
            metrics.to_screen(Vec2::new(10.0, 20.0)),
            Vec2::new(25.0, 50.0)
        );
    }

    #[test]
    fn control_panel_input_takes_precedence_over_keyboard() {
        let keyboard = KeyboardShortcuts {
            quit_requested: false,
            purchase: Some(Upgrade::Hut),
            restart: false,
        };
        assert_eq!(
            merge_frame_input(Some(Upgrade::Campfire), false, keyboard),
            FrameInput {
                purchase: Some(Upgrade::Campfire),
                restart: false,
            }
        );
        assert_eq!(
            merge_frame_input(None, true, keyboard),
            FrameInput {
                purchase: Some(Upgrade::Hut),
                restart: true,
            }
        );
    }
}
