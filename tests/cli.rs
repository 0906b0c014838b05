use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn artfetch() -> Command {
    let mut cmd = Command::cargo_bin("artfetch").unwrap();
    // Keep user and system config files out of the run
    cmd.env("XDG_CONFIG_HOME", "/nonexistent").env_remove("ARTFETCH_LOG");
    cmd
}

fn art_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, content) in files {
        fs::write(dir.path().join(name), content).unwrap();
    }
    dir
}

/// Directory scan order, which `--list-systems` must preserve
fn scan_order(dir: &TempDir) -> Vec<String> {
    fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "txt"))
        .map(|path| path.file_stem().unwrap().to_string_lossy().to_lowercase())
        .collect()
}

#[test]
fn list_systems_prints_keys_and_exits() {
    let dir = art_dir(&[("linux.txt", "L"), ("windows.txt", "W"), ("macos.txt", "M"), ("README", "x")]);
    let expected: String = scan_order(&dir).iter().map(|key| format!("{}\n", key)).collect();

    let output = artfetch()
        .arg("--list-systems")
        .arg("--ascii-dir")
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout, expected);

    let mut keys: Vec<&str> = stdout.lines().collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["linux", "macos", "windows"]);
}

#[test]
fn unknown_system_uses_fallback_art_and_full_report() {
    let dir = art_dir(&[("linux.txt", "LINUXART"), ("unknown.txt", "$1FALLBACK-MARKER")]);

    artfetch()
        .args(["--system", "doesnotexist", "--ascii-dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("FALLBACK-MARKER"))
        .stdout(predicate::str::contains("LINUXART").not())
        .stdout(predicate::str::contains("Kernel"))
        .stdout(predicate::str::contains("Memory"));
}

#[test]
fn name_overrides_hostname() {
    let dir = art_dir(&[("unknown.txt", "?")]);

    artfetch()
        .args(["--name", "custom-host-name", "--ascii-dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("custom-host-name"));
}

#[test]
fn missing_art_directory_still_renders() {
    artfetch()
        .args(["--system", "linux", "--ascii-dir", "/nonexistent/artfetch-art"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hostname"));
}

#[test]
fn explicit_config_is_applied() {
    let dir = art_dir(&[("unknown.txt", "?")]);
    let config = dir.path().join("config.toml");
    fs::write(&config, "[display]\nseparator = \"=\"\nseparator_length = 12\n\n[show_info]\nkernel = false\n").unwrap();

    artfetch()
        .arg("--config")
        .arg(&config)
        .arg("--ascii-dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("============"))
        .stdout(predicate::str::contains("Kernel").not());
}
