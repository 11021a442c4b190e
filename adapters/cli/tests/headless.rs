use std::{fs, process::Command};

fn hearthwood() -> Command {
    Command::new(env!("CARGO_BIN_EXE_hearthwood"))
}

#[test]
fn headless_run_writes_a_versioned_save() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = hearthwood()
        .args(["--headless", "--ticks", "120", "--seed", "42", "--save-dir"])
        .arg(dir.path())
        .output()
        .expect("run hearthwood");
    assert!(output.status.success(), "{output:?}");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("day 2"), "unexpected summary: {stdout}");

    let text = fs::read_to_string(dir.path().join("hearthwood-save.json")).expect("save file");
    let save: serde_json::Value = serde_json::from_str(&text).expect("json");
    assert_eq!(save["version"], serde_json::json!(1));
    assert_eq!(save["world"]["seed"], serde_json::json!(42));
    assert_eq!(save["world"]["tick_index"], serde_json::json!(120));
}

#[test]
fn resumed_run_continues_from_save() {
    let dir = tempfile::tempdir().expect("tempdir");
    for _ in 0..2 {
        let status = hearthwood()
            .args(["--headless", "--ticks", "30", "--seed", "9", "--save-dir"])
            .arg(dir.path())
            .status()
            .expect("run hearthwood");
        assert!(status.success());
    }

    let text = fs::read_to_string(dir.path().join("hearthwood-save.json")).expect("save file");
    let save: serde_json::Value = serde_json::from_str(&text).expect("json");
    assert_eq!(save["world"]["tick_index"], serde_json::json!(60));
}

#[test]
fn no_autosave_leaves_directory_untouched() {
    let dir = tempfile::tempdir().expect("tempdir");
    let status = hearthwood()
        .args(["--headless", "--ticks", "30", "--no-autosave", "--save-dir"])
        .arg(dir.path())
        .status()
        .expect("run hearthwood");
    assert!(status.success());
    assert_eq!(fs::read_dir(dir.path()).expect("dir").count(), 0);
}

#[test]
fn invalid_config_file_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("hearthwood.toml");
    fs::write(&config, "[world]\nwidth = 3\n").expect("write config");

    let output = hearthwood()
        .args(["--headless", "--no-autosave", "--config"])
        .arg(&config)
        .output()
        .expect("run hearthwood");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid config file"));
}

#[test]
fn zero_tick_interval_is_refused() {
    let output = hearthwood()
        .args(["--headless", "--no-autosave", "--tick-ms", "0"])
        .output()
        .expect("run hearthwood");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("tick interval"));
}
