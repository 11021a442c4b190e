use std::{fs, time::Duration};

use hearthwood_core::{Command, TileCoord};
use hearthwood_persistence::{
    decode, encode, Autosave, FileStore, KeyValueStore, MemoryStore, PersistenceError,
    DEFAULT_AUTOSAVE_INTERVAL, DEFAULT_SAVE_KEY, FORMAT_VERSION,
};
use hearthwood_world::{self as world, query, World};

fn played_world() -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureWorld {
            columns: TileCoord::new(8),
            rows: TileCoord::new(6),
            tile_length: 40.0,
            tree_count: 9,
            seed: 1234,
        },
        &mut events,
    );
    for _ in 0..90 {
        world::apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(500),
            },
            &mut events,
        );
    }
    world
}

#[test]
fn encoded_save_carries_version_and_world() {
    let snapshot = query::snapshot(&played_world());
    let text = encode(&snapshot).expect("encode");
    let value: serde_json::Value = serde_json::from_str(&text).expect("json");

    assert_eq!(value["version"], serde_json::json!(FORMAT_VERSION));
    assert_eq!(value["world"]["columns"], serde_json::json!(8));
    assert_eq!(value["world"]["calendar"]["day"], serde_json::json!(1));
    assert_eq!(decode(&text).expect("decode"), snapshot);
}

#[test]
fn unknown_versions_are_rejected() {
    let snapshot = query::snapshot(&World::new());
    let text = encode(&snapshot)
        .expect("encode")
        .replacen("\"version\":1", "\"version\":7", 1);

    assert!(matches!(
        decode(&text),
        Err(PersistenceError::UnsupportedVersion(7))
    ));
    assert!(matches!(decode("{not json"), Err(PersistenceError::Json(_))));
}

#[test]
fn restored_snapshot_rebuilds_the_same_world() {
    let world = played_world();
    let mut store = MemoryStore::new();
    let mut autosave = Autosave::new(DEFAULT_AUTOSAVE_INTERVAL, DEFAULT_SAVE_KEY).expect("autosave");

    assert_eq!(autosave.restore(&store).expect("restore"), None);
    autosave
        .save(&mut store, &query::snapshot(&world))
        .expect("save");

    let snapshot = autosave
        .restore(&store)
        .expect("restore")
        .expect("save present");
    let restored = World::from_snapshot(snapshot).expect("valid snapshot");
    assert_eq!(query::snapshot(&restored), query::snapshot(&world));

    autosave.clear(&mut store).expect("clear");
    assert_eq!(autosave.restore(&store).expect("restore"), None);
}

#[test]
fn file_store_writes_one_json_file_per_key() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = FileStore::new(dir.path().join("saves"));

    assert_eq!(store.read("slot").expect("read"), None);
    store.write("slot", "{\"a\":1}").expect("write");
    store.write("slot", "{\"a\":2}").expect("overwrite");

    let path = dir.path().join("saves").join("slot.json");
    assert_eq!(fs::read_to_string(&path).expect("file"), "{\"a\":2}");
    assert!(!dir.path().join("saves").join("slot.json.tmp").exists());
    assert_eq!(store.read("slot").expect("read").as_deref(), Some("{\"a\":2}"));

    store.remove("slot").expect("remove");
    assert!(!path.exists());
    store.remove("slot").expect("remove missing");
}

#[test]
fn file_store_round_trips_a_world() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = FileStore::new(dir.path());
    let mut autosave = Autosave::new(Duration::from_secs(5), "run").expect("autosave");
    let snapshot = query::snapshot(&played_world());

    autosave.save(&mut store, &snapshot).expect("save");
    let reopened = FileStore::new(dir.path());
    assert_eq!(
        autosave.restore(&reopened).expect("restore"),
        Some(snapshot)
    );
}

#[test]
fn file_store_rejects_path_like_keys() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = FileStore::new(dir.path());
    assert!(store.write("../outside", "x").is_err());
    assert!(store.read("nested/key").is_err());
}
