//! JSON encoding of world snapshots.

use hearthwood_core::WorldSnapshot;
use serde::{Deserialize, Serialize};

use crate::PersistenceError;

/// Version written into every save file.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SaveFileRef<'a> {
    version: u32,
    world: &'a WorldSnapshot,
}

#[derive(Deserialize)]
struct SaveHeader {
    version: u32,
}

#[derive(Deserialize)]
struct SaveFile {
    world: WorldSnapshot,
}

/// Serialises a snapshot into the versioned JSON save format.
pub fn encode(snapshot: &WorldSnapshot) -> Result<String, PersistenceError> {
    let file = SaveFileRef {
        version: FORMAT_VERSION,
        world: snapshot,
    };
    Ok(serde_json::to_string(&file)?)
}

/// Parses a versioned JSON save, rejecting versions this build does not understand.
pub fn decode(text: &str) -> Result<WorldSnapshot, PersistenceError> {
    let header: SaveHeader = serde_json::from_str(text)?;
    if header.version != FORMAT_VERSION {
        return Err(PersistenceError::UnsupportedVersion(header.version));
    }
    let file: SaveFile = serde_json::from_str(text)?;
    Ok(file.world)
}
