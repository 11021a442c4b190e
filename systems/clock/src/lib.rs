#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-interval tick engine that converts frame time into tick commands.

use std::time::Duration;

use hearthwood_core::Command;

/// Upper bound on ticks emitted for a single frame; older backlog is dropped.
pub const MAX_CATCH_UP_TICKS: usize = 8;

/// Configuration parameters required to construct the tick scheduler.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    tick_interval: Duration,
}

impl Config {
    /// Creates a new configuration using the provided tick cadence.
    #[must_use]
    pub const fn new(tick_interval: Duration) -> Self {
        Self { tick_interval }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}

/// Pure system that emits `Command::Tick` once per elapsed interval.
#[derive(Debug)]
pub struct TickScheduler {
    tick_interval: Duration,
    accumulator: Duration,
}

impl TickScheduler {
    /// Creates a new scheduler using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            tick_interval: config.tick_interval,
            accumulator: Duration::ZERO,
        }
    }

    /// Duration of simulated time covered by each emitted tick.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Time accumulated toward the next tick.
    #[must_use]
    pub fn pending(&self) -> Duration {
        self.accumulator
    }

    /// Discards any partially accumulated interval.
    pub fn reset(&mut self) {
        self.accumulator = Duration::ZERO;
    }

    /// Accumulates `frame_dt` and pushes one tick command per whole interval.
    ///
    /// Returns the number of ticks emitted.
    pub fn advance(&mut self, frame_dt: Duration, out: &mut Vec<Command>) -> usize {
        if self.tick_interval.is_zero() {
            return 0;
        }

        self.accumulator = self.accumulator.saturating_add(frame_dt);
        let ticks = self.resolve_tick_count();
        for _ in 0..ticks {
            out.push(Command::Tick {
                dt: self.tick_interval,
            });
        }
        ticks
    }

    fn resolve_tick_count(&mut self) -> usize {
        let mut ticks = 0;
        while self.accumulator >= self.tick_interval {
            if ticks == MAX_CATCH_UP_TICKS {
                let interval = self.tick_interval.as_nanos();
                let remainder = self.accumulator.as_nanos() % interval;
                self.accumulator = Duration::from_nanos(u64::try_from(remainder).unwrap_or(0));
                break;
            }
            self.accumulator -= self.tick_interval;
            ticks += 1;
        }
        ticks
    }
}
