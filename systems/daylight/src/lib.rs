#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Day/night oscillator that drives the darkness overlay.
//!
//! The oscillator runs on wall-clock time and never feeds back into the
//! simulation; gameplay night is decided by the world calendar.

use std::{f32::consts::TAU, time::Duration};

use hearthwood_core::TICKS_PER_DAY;

/// Darkness reached at midnight.
pub const MAX_DARKNESS: f32 = 0.65;

/// Phase of the cycle at which darkness peaks.
const MIDNIGHT_PHASE: f32 = 0.8;

/// Continuous darkness oscillator.
#[derive(Clone, Debug)]
pub struct Daylight {
    cycle: Duration,
    elapsed: Duration,
}

impl Daylight {
    /// Creates an oscillator that completes one day every `cycle`.
    #[must_use]
    pub fn new(cycle: Duration) -> Self {
        Self {
            cycle,
            elapsed: Duration::ZERO,
        }
    }

    /// Creates an oscillator whose day spans a full calendar day of ticks.
    #[must_use]
    pub fn for_tick_interval(tick_interval: Duration) -> Self {
        Self::new(tick_interval.saturating_mul(TICKS_PER_DAY))
    }

    /// Length of a full day/night cycle.
    #[must_use]
    pub fn cycle(&self) -> Duration {
        self.cycle
    }

    /// Advances the oscillator by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        if self.cycle.is_zero() {
            return;
        }
        let elapsed = self.elapsed.saturating_add(dt).as_nanos() % self.cycle.as_nanos();
        self.elapsed = Duration::from_nanos(u64::try_from(elapsed).unwrap_or(0));
    }

    /// Rewinds the oscillator to the start of the day.
    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }

    /// Aligns the oscillator with a calendar position, e.g. after restoring a save.
    pub fn sync_to_tick(&mut self, tick_in_day: u32) {
        self.reset();
        let ticks = tick_in_day % TICKS_PER_DAY;
        let offset = self.cycle.as_secs_f64() * f64::from(ticks) / f64::from(TICKS_PER_DAY);
        self.advance(Duration::from_secs_f64(offset));
    }

    /// Fraction of the current cycle that has elapsed, in `0.0..1.0`.
    #[must_use]
    pub fn phase(&self) -> f32 {
        if self.cycle.is_zero() {
            return 0.0;
        }
        (self.elapsed.as_secs_f64() / self.cycle.as_secs_f64()) as f32
    }

    /// Darkness of the overlay in `0.0..=MAX_DARKNESS`.
    #[must_use]
    pub fn intensity(&self) -> f32 {
        if self.cycle.is_zero() {
            return 0.0;
        }
        let angle = TAU * (self.phase() - MIDNIGHT_PHASE);
        (MAX_DARKNESS * (1.0 + angle.cos()) / 2.0).clamp(0.0, MAX_DARKNESS)
    }
}

impl Default for Daylight {
    fn default() -> Self {
        Self::for_tick_interval(Duration::from_millis(500))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_cycle_stays_bright() {
        let mut daylight = Daylight::new(Duration::ZERO);
        daylight.advance(Duration::from_secs(30));
        assert_eq!(daylight.intensity(), 0.0);
        assert_eq!(daylight.phase(), 0.0);
    }

    #[test]
    fn elapsed_wraps_at_cycle_end() {
        let mut daylight = Daylight::new(Duration::from_secs(10));
        daylight.advance(Duration::from_secs(25));
        assert!((daylight.phase() - 0.5).abs() < 1e-6);
    }
}
