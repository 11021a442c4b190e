#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Survival system that keeps the player fed from the food stockpile.

use hearthwood_core::{Command, Event, Inventory, PlayerSnapshot, Vitals};

/// Hunger level at or below which the player eats a ration.
pub const EAT_THRESHOLD: f32 = 60.0;

/// Pure system that reacts to the passage of time by requesting meals.
#[derive(Debug, Default)]
pub struct Survival;

impl Survival {
    /// Creates a new survival system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Emits a single `EatRation` command when a tick passed and the player is hungry.
    pub fn handle(
        &mut self,
        events: &[Event],
        player: PlayerSnapshot,
        vitals: Vitals,
        inventory: Inventory,
        out: &mut Vec<Command>,
    ) {
        if !events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }))
        {
            return;
        }

        if player.alive && vitals.hunger <= EAT_THRESHOLD && inventory.food > 0 {
            out.push(Command::EatRation);
        }
    }
}
