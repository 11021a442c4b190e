#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Persistence adapter that saves and restores world snapshots.
//!
//! Snapshots are encoded as versioned JSON documents and written to a
//! [`KeyValueStore`]. The [`Autosave`] helper decides when a save is due and
//! performs the round trip through the store.

mod codec;
mod store;

use std::time::Duration;

use hearthwood_core::WorldSnapshot;
use thiserror::Error;

pub use codec::{decode, encode, FORMAT_VERSION};
pub use store::{is_valid_key, FileStore, KeyValueStore, MemoryStore, StoreError};

/// Key used when no other save slot is configured.
pub const DEFAULT_SAVE_KEY: &str = "hearthwood-save";

/// Interval between autosaves when none is configured.
pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(10);

/// Errors raised while saving or restoring a world.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The store failed to read or write the save.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The save could not be encoded or parsed as JSON.
    #[error("malformed save data")]
    Json(#[from] serde_json::Error),
    /// The save was written by an incompatible format version.
    #[error("unsupported save format version {0} (expected {expected})", expected = FORMAT_VERSION)]
    UnsupportedVersion(u32),
}

/// Periodic saver bound to a single store key.
#[derive(Clone, Debug)]
pub struct Autosave {
    interval: Duration,
    key: String,
    elapsed: Duration,
}

impl Autosave {
    /// Creates an autosaver that writes under `key` every `interval`.
    ///
    /// A zero interval disables periodic saves; explicit calls to
    /// [`Autosave::save`] still work.
    pub fn new(interval: Duration, key: impl Into<String>) -> Result<Self, StoreError> {
        let key = key.into();
        if !is_valid_key(&key) {
            return Err(StoreError::InvalidKey(key));
        }
        Ok(Self {
            interval,
            key,
            elapsed: Duration::ZERO,
        })
    }

    /// Store key the autosaver writes to.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Time between periodic saves.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Accumulates `dt` and reports whether a save is now due.
    pub fn advance(&mut self, dt: Duration) -> bool {
        if self.interval.is_zero() {
            return false;
        }
        self.elapsed = self.elapsed.saturating_add(dt);
        if self.elapsed >= self.interval {
            self.elapsed = Duration::ZERO;
            return true;
        }
        false
    }

    /// Encodes `snapshot` and writes it to `store`.
    pub fn save<S>(&mut self, store: &mut S, snapshot: &WorldSnapshot) -> Result<(), PersistenceError>
    where
        S: KeyValueStore + ?Sized,
    {
        let text = encode(snapshot)?;
        store.write(&self.key, &text)?;
        self.elapsed = Duration::ZERO;
        tracing::debug!(
            key = %self.key,
            bytes = text.len(),
            tick = snapshot.tick_index,
            "saved world"
        );
        Ok(())
    }

    /// Reads and decodes the saved snapshot, if one exists.
    pub fn restore<S>(&self, store: &S) -> Result<Option<WorldSnapshot>, PersistenceError>
    where
        S: KeyValueStore + ?Sized,
    {
        let Some(text) = store.read(&self.key)? else {
            tracing::debug!(key = %self.key, "no save found");
            return Ok(None);
        };
        let snapshot = decode(&text)?;
        tracing::info!(
            key = %self.key,
            day = snapshot.calendar.day(),
            tick = snapshot.tick_index,
            "restored world"
        );
        Ok(Some(snapshot))
    }

    /// Deletes the save from `store`.
    pub fn clear<S>(&self, store: &mut S) -> Result<(), PersistenceError>
    where
        S: KeyValueStore + ?Sized,
    {
        store.remove(&self.key)?;
        tracing::info!(key = %self.key, "cleared save");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_reports_due_saves() {
        let mut autosave = Autosave::new(Duration::from_secs(10), "slot").expect("autosave");
        assert!(!autosave.advance(Duration::from_secs(4)));
        assert!(!autosave.advance(Duration::from_secs(5)));
        assert!(autosave.advance(Duration::from_secs(1)));
        assert!(!autosave.advance(Duration::from_secs(9)));
    }

    #[test]
    fn zero_interval_disables_periodic_saves() {
        let mut autosave = Autosave::new(Duration::ZERO, DEFAULT_SAVE_KEY).expect("autosave");
        assert!(!autosave.advance(Duration::from_secs(3_600)));
    }

    #[test]
    fn rejects_unsafe_keys() {
        assert!(matches!(
            Autosave::new(DEFAULT_AUTOSAVE_INTERVAL, "../save"),
            Err(StoreError::InvalidKey(_))
        ));
    }
}
