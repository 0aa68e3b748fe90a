use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn temp_path(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "mayhem-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

fn mayhem(state: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mayhem"))
        .args(args)
        .arg("--state")
        .arg(state)
        .args(["--mute", "--tick-ms", "1", "--seed", "42"])
        .env("NO_COLOR", "1")
        .output()
        .expect("run cli")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn cli_rules_prints_every_slide() {
    let state = temp_path("rules");
    let output = mayhem(&state, &["rules", "--all"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Phase 3: Night"));
    assert!(text.contains("WE UNDERSTAND AND WE ARE READY TO NOT DIE"));
    assert!(text.contains("8 / 8"));
    let _ = std::fs::remove_file(state);
}

#[test]
fn cli_rejects_unsupported_player_count() {
    let state = temp_path("reject");
    let output = mayhem(&state, &["setup", "--players", "7"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("player count out of range: 7"));

    let status = mayhem(&state, &["status"]);
    assert!(stdout(&status).contains("Round: 0/10"));
    let _ = std::fs::remove_file(state);
}

#[test]
fn cli_plays_two_days_and_resets() {
    let state = temp_path("days");

    let first = mayhem(&state, &["setup", "--players", "3"]);
    assert!(first.status.success(), "{}", String::from_utf8_lossy(&first.stderr));
    let text = stdout(&first);
    assert!(text.contains("For 3 survivors, a balanced random setup is"));
    assert!(text.contains("NEEDED SUPPLY:"));

    let status = mayhem(&state, &["status"]);
    let text = stdout(&status);
    assert!(text.contains("Round: 1/10"));
    assert!(text.contains("Next: START DAY 2"));

    let before = std::fs::read(&state).expect("read state");
    let grown = mayhem(&state, &["setup", "--players", "4"]);
    assert!(!grown.status.success());
    assert!(String::from_utf8_lossy(&grown.stderr).contains("cannot be higher than yesterday"));
    let out_of_range = mayhem(&state, &["setup", "--players", "9"]);
    assert!(!out_of_range.status.success());
    assert_eq!(std::fs::read(&state).expect("read state"), before);
    assert!(stdout(&mayhem(&state, &["status"])).contains("NEEDED SUPPLY:"));

    let second = mayhem(&state, &["setup", "--players", "2"]);
    assert!(second.status.success());
    let text = stdout(&second);
    assert!(text.contains("Day 2 Setup"));
    assert!(text.contains("For 2 survivors, remove 1"));

    let status = mayhem(&state, &["status"]);
    assert!(stdout(&status).contains("Round: 2/10"));

    let reset = mayhem(&state, &["reset"]);
    assert!(reset.status.success());
    let saved = std::fs::read_to_string(&state).expect("read state");
    assert!(!saved.contains("isFirstDay"));
    assert!(saved.contains("gameState_currentRound"));
    let status = mayhem(&state, &["status"]);
    assert!(stdout(&status).contains("Round: 0/10"));
    let _ = std::fs::remove_file(state);
}

#[test]
fn cli_start_without_setup_asks_for_survivors() {
    let state = temp_path("start");
    let output = mayhem(&state, &["start"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("mayhem setup --players <2-5>"));
    let _ = std::fs::remove_file(state);
}

#[test]
fn cli_sweep_writes_json_report() {
    let report = temp_path("sweep");
    let output = Command::new(env!("CARGO_BIN_EXE_mayhem"))
        .args(["sweep", "--iterations", "25", "--report", "json", "--seed", "9"])
        .arg("--output")
        .arg(&report)
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let content = std::fs::read_to_string(&report).expect("read report");
    let value: serde_json::Value = serde_json::from_str(&content).expect("json report");
    assert_eq!(value["players"].as_array().map(Vec::len), Some(4));
    assert_eq!(value["seed"], 9);
    let _ = std::fs::remove_file(report);
}

#[test]
fn cli_reports_invalid_allocator_config() {
    let config = temp_path("config");
    std::fs::write(&config, r#"{"ranges":{"2":{"min":30,"max":20}}}"#).expect("write config");
    let output = Command::new(env!("CARGO_BIN_EXE_mayhem"))
        .args(["sweep", "--iterations", "1", "--config"])
        .arg(&config)
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid allocator config"));
    let _ = std::fs::remove_file(config);
}
