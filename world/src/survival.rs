//! Per-tick survival rules applied to the player's vitals.

use hearthwood_core::{UpgradeSet, Vitals, VITAL_MAX};

const HUNGER_DECAY: f32 = 0.5;
const SHELTERED_HUNGER_DECAY: f32 = 0.25;
const STARVATION_DAMAGE: f32 = 1.5;
const COLD_DAMAGE: f32 = 0.25;
const RECOVERY: f32 = 0.1;
const SHELTERED_RECOVERY: f32 = 0.5;
const WELL_FED_THRESHOLD: f32 = 50.0;
const RATION: f32 = 20.0;
const COOKED_RATION: f32 = 35.0;

/// Applies one tick of hunger decay, damage and recovery.
pub(crate) fn decay(vitals: &mut Vitals, night: bool, upgrades: UpgradeSet) {
    let sheltered = night && upgrades.hut;
    let hunger_decay = if sheltered {
        SHELTERED_HUNGER_DECAY
    } else {
        HUNGER_DECAY
    };
    vitals.hunger = (vitals.hunger - hunger_decay).clamp(0.0, VITAL_MAX);

    let mut damage = 0.0;
    if vitals.hunger <= 0.0 {
        damage += STARVATION_DAMAGE;
    }
    if night && !upgrades.campfire {
        damage += COLD_DAMAGE;
    }

    if damage > 0.0 {
        vitals.health -= damage;
    } else if vitals.hunger >= WELL_FED_THRESHOLD {
        vitals.health += if sheltered {
            SHELTERED_RECOVERY
        } else {
            RECOVERY
        };
    }
    vitals.health = vitals.health.clamp(0.0, VITAL_MAX);
}

/// Hunger restored by a single ration.
pub(crate) fn ration_value(upgrades: UpgradeSet) -> f32 {
    if upgrades.campfire {
        COOKED_RATION
    } else {
        RATION
    }
}

/// Restores hunger from a ration, capped at the maximum.
pub(crate) fn eat(vitals: &mut Vitals, upgrades: UpgradeSet) {
    vitals.hunger = (vitals.hunger + ration_value(upgrades)).min(VITAL_MAX);
}
