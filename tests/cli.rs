use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SCRIPT: &str = r#"
initial:
  name: Alice
  age: 30
mutations:
  - attribute: name
    value: Bob
  - attribute: name
    value: John
  - attribute: age
    value: 31
  - attribute: age
    value: 31
"#;

fn setup() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let script = temp_dir.path().join("script.yaml");
    std::fs::write(&script, SCRIPT).unwrap();
    (temp_dir, script)
}

fn object_tracker(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("object-tracker").unwrap();
    cmd.env("OBJECT_TRACKER_DIR", temp_dir.path().join("config"))
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_run_prints_replay() {
    let (temp_dir, script) = setup();

    object_tracker(&temp_dir)
        .arg("run")
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("name = \"Bob\" (was \"Alice\")"))
        .stdout(predicate::str::contains("name = \"John\" (was \"Bob\")"))
        .stdout(predicate::str::contains("age = 31 (was 30)"))
        .stdout(predicate::str::contains("script.yaml:1 - mutations[0]\n    name = \"Bob\"\n"))
        .stdout(predicate::str::contains("script.yaml:3 - mutations[2]\n    age = 31\n"))
        .stdout(predicate::str::contains(".rs:").not());
}

#[test]
fn test_run_without_stack_trace() {
    let (temp_dir, script) = setup();

    object_tracker(&temp_dir)
        .args(["run", "--no-stack-trace"])
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("age = 31 (was 30)"))
        .stdout(predicate::str::contains("mutations[").not());
}

#[test]
fn test_run_json_changes_only() {
    let (temp_dir, script) = setup();

    let output = object_tracker(&temp_dir)
        .args(["run", "--format", "json", "--changes-only"])
        .arg(&script)
        .output()
        .unwrap();
    assert!(output.status.success());

    let export: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(export["metadata"]["entry_count"], 3);
    assert_eq!(export["entries"][0]["attribute"], "name");
    assert_eq!(export["entries"][0]["new_value"], "Bob");
}

#[test]
fn test_run_restricted_attributes() {
    let (temp_dir, script) = setup();

    object_tracker(&temp_dir)
        .args(["run", "--format", "csv", "--attribute", "age"])
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "attribute,old_value,new_value,timestamp,call_site\n",
        ))
        .stdout(predicate::str::contains("\nage,30,31,"))
        .stdout(predicate::str::contains("name,").not());
}

#[test]
fn test_run_watch_reports_on_stderr() {
    let (temp_dir, script) = setup();

    object_tracker(&temp_dir)
        .args(["run", "--format", "table", "--watch", "age"])
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("4 change(s)"))
        .stderr(predicate::str::contains("watch: age: 30 -> 31"))
        .stderr(predicate::str::contains("watch: name").not());
}

#[test]
fn test_run_details_format() {
    let (temp_dir, script) = setup();

    object_tracker(&temp_dir)
        .args(["run", "--format", "details", "--attribute", "age"])
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Change: age\n"))
        .stdout(predicate::str::contains("  Summary:   30 -> 31"))
        .stdout(predicate::str::contains("  Summary:   unchanged"))
        .stdout(predicate::str::contains("script.yaml:4 - mutations[3]"));
}

#[test]
fn test_run_writes_output_file() {
    let (temp_dir, script) = setup();
    let output = temp_dir.path().join("log.yaml");

    object_tracker(&temp_dir)
        .args(["run", "--format", "yaml", "--output"])
        .arg(&output)
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("Change log written to:"));

    let contents = std::fs::read_to_string(output).unwrap();
    assert!(contents.starts_with("# object-tracker change log export"));
    assert!(contents.contains("# Entries: 4"));
}

#[test]
fn test_run_missing_script() {
    let temp_dir = TempDir::new().unwrap();

    object_tracker(&temp_dir)
        .args(["run", "does-not-exist.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read script"));
}

#[test]
fn test_run_uses_configured_settings() {
    let (temp_dir, script) = setup();
    let config_dir = temp_dir.path().join("config");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.json"),
        r#"{"attributes": ["name"], "stack_trace": false}"#,
    )
    .unwrap();

    object_tracker(&temp_dir)
        .arg("run")
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("name = \"John\""))
        .stdout(predicate::str::contains("age =").not());
}

#[test]
fn test_init_and_config() {
    let temp_dir = TempDir::new().unwrap();

    object_tracker(&temp_dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("(not created)"));

    object_tracker(&temp_dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized object-tracker at:"));
    assert!(temp_dir.path().join("config").join("config.json").exists());

    object_tracker(&temp_dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Already initialized"));

    object_tracker(&temp_dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Tracked attributes: all"))
        .stdout(predicate::str::contains("(not created)").not());
}

#[test]
fn test_init_force_replaces_corrupt_settings() {
    let temp_dir = TempDir::new().unwrap();
    let config_dir = temp_dir.path().join("config");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.json"), "{ broken").unwrap();

    object_tracker(&temp_dir)
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse settings file"));

    object_tracker(&temp_dir)
        .args(["init", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized object-tracker at:"));

    object_tracker(&temp_dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Tracked attributes: all"));
}
