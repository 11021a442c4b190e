//! Immediate-mode UI helpers for the Macroquad rendering backend.
//!
//! This module hosts all uses of `macroquad::ui` so the rest of the adapter can
//! remain agnostic of Macroquad's UI types.

use hearthwood_core::Upgrade;
use hearthwood_rendering::{HudPresentation, UpgradeOffer};
use macroquad::{
    color::{Color, WHITE},
    math::{RectOffset, Vec2},
    ui::{hash, Ui},
};

/// Outcome of rendering the control panel UI during the current frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ControlPanelUiResult {
    /// Upgrade whose purchase button was pressed during this frame.
    pub(crate) purchase: Option<Upgrade>,
    /// Whether the restart button was pressed during this frame.
    pub(crate) restart: bool,
}

/// Snapshot of the control panel's UI layout and data for the current frame.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ControlPanelUiContext<'a> {
    /// Top-left corner of the panel in screen coordinates.
    pub(crate) origin: Vec2,
    /// Panel dimensions in screen space.
    pub(crate) size: Vec2,
    /// Background colour applied to the window skin so the UI matches the
    /// adapter's solid rectangle.
    pub(crate) background: Color,
    /// Status values shown as labels.
    pub(crate) hud: &'a HudPresentation,
    /// Whether the run has ended.
    pub(crate) perished: bool,
}

/// Renders the control panel's labels and buttons for the current frame.
pub(crate) fn draw_control_panel_ui(
    ui: &mut Ui,
    context: ControlPanelUiContext<'_>,
) -> ControlPanelUiResult {
    let mut skin = ui.default_skin();
    skin.margin = 0.0;

    let window_style = ui
        .style_builder()
        .color(context.background)
        .color_hovered(context.background)
        .color_clicked(context.background)
        .color_selected(context.background)
        .color_selected_hovered(context.background)
        .color_inactive(context.background)
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .margin(RectOffset::new(16.0, 16.0, 16.0, 16.0))
        .build();
    skin.window_style = window_style;

    let label_style = ui
        .style_builder()
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .margin(RectOffset::new(0.0, 0.0, 4.0, 4.0))
        .build();
    skin.label_style = label_style;

    let button_style = ui
        .style_builder()
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .color(Color::from_rgba(92, 64, 38, 255))
        .color_hovered(Color::from_rgba(120, 86, 52, 255))
        .color_clicked(Color::from_rgba(72, 50, 30, 255))
        .color_selected(Color::from_rgba(92, 64, 38, 255))
        .color_selected_hovered(Color::from_rgba(120, 86, 52, 255))
        .color_inactive(Color::from_rgba(72, 50, 30, 200))
        .margin(RectOffset::new(0.0, 0.0, 8.0, 8.0))
        .build();
    skin.button_style = button_style;

    ui.push_skin(&skin);

    let hud = context.hud;
    let mut result = ControlPanelUiResult::default();
    let _ = ui.window(hash!("control_panel"), context.origin, context.size, |ui| {
        let phase = if hud.night { "night" } else { "day" };
        ui.label(None, &format!("Day {} ({phase})", hud.day));
        ui.label(
            None,
            &format!("Health: {:.0} / {:.0}", hud.health, hud.vital_max),
        );
        ui.label(
            None,
            &format!("Hunger: {:.0} / {:.0}", hud.hunger, hud.vital_max),
        );
        ui.label(None, &format!("Wood: {}", hud.wood));
        ui.label(None, &format!("Food: {}", hud.food));

        for (index, offer) in hud.offers.iter().enumerate() {
            let caption = offer_caption(index + 1, offer);
            match OfferState::of(offer) {
                OfferState::Available => {
                    if ui.button(None, caption.as_str()) {
                        result.purchase = Some(offer.upgrade);
                    }
                }
                OfferState::Built | OfferState::Unavailable => ui.label(None, &caption),
            }
        }

        if context.perished {
            ui.label(None, &format!("You perished on day {}.", hud.day));
        }
        if ui.button(None, "Restart (R)") {
            result.restart = true;
        }
    });

    ui.pop_skin();

    result
}

/// How an upgrade offer is shown in the panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OfferState {
    Built,
    /// Locked behind a prerequisite, too expensive, or the run has ended.
    Unavailable,
    Available,
}

impl OfferState {
    fn of(offer: &UpgradeOffer) -> Self {
        if offer.owned {
            Self::Built
        } else if offer.affordable {
            Self::Available
        } else {
            Self::Unavailable
        }
    }
}

fn offer_caption(shortcut: usize, offer: &UpgradeOffer) -> String {
    let label = offer.upgrade.label();
    match OfferState::of(offer) {
        OfferState::Built => format!("{label}: built"),
        OfferState::Unavailable => format!("{label} ({shortcut}): needs {} wood", offer.cost),
        OfferState::Available => format!("Build {label} ({shortcut}): {} wood", offer.cost),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captions_describe_shortcut_and_cost() {
        let offer = UpgradeOffer {
            upgrade: Upgrade::Hut,
            cost: 20,
            affordable: true,
            owned: false,
        };
        assert_eq!(offer_caption(2, &offer), "Build Hut (2): 20 wood");

        let built = UpgradeOffer {
            owned: true,
            affordable: false,
            ..offer
        };
        assert_eq!(offer_caption(2, &built), "Hut: built");
    }

    #[test]
    fn only_affordable_offers_are_clickable() {
        let locked = UpgradeOffer {
            upgrade: Upgrade::Hut,
            cost: 20,
            affordable: false,
            owned: false,
        };
        assert_eq!(OfferState::of(&locked), OfferState::Unavailable);
        assert_eq!(offer_caption(2, &locked), "Hut (2): needs 20 wood");

        let ready = UpgradeOffer {
            affordable: true,
            ..locked
        };
        assert_eq!(OfferState::of(&ready), OfferState::Available);

        let built = UpgradeOffer {
            owned: true,
            ..locked
        };
        assert_eq!(OfferState::of(&built), OfferState::Built);
    }
}
