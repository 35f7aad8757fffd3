use std::{fs, process::Command};

fn derivative_dash() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_derivative-dash"));
    let _ = command.env("RUST_LOG", "warn");
    command
}

#[test]
fn autopilot_wins_and_reports_json() {
    let output = derivative_dash()
        .args(["--headless", "--autopilot", "--seed", "5", "--summary", "json"])
        .output()
        .expect("failed to run derivative-dash");
    assert!(output.status.success(), "{output:?}");

    let summary: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is a json document");
    assert_eq!(summary["outcome"], "VICTORY");
    assert_eq!(summary["score"], 400);
    assert_eq!(summary["checkpoints_passed"], 4);
    assert_eq!(summary["answer_accuracy_bps"], 10_000);
    assert_eq!(summary["seed"], 5);
    assert_eq!(summary["track"], "Sinusoid");
}

#[test]
fn unattended_run_stops_at_tick_budget() {
    let output = derivative_dash()
        .args(["--headless", "--max-ticks", "300"])
        .output()
        .expect("failed to run derivative-dash");
    assert!(output.status.success(), "{output:?}");

    let stdout = String::from_utf8(output.stdout).expect("utf-8 output");
    assert!(stdout.contains("outcome: UNFINISHED"), "{stdout}");
    assert!(stdout.contains("score: 0"), "{stdout}");
    assert!(stdout.contains("ticks: 300"), "{stdout}");
}

#[test]
fn config_file_is_overridden_by_flags() {
    let dir = std::env::temp_dir().join(format!("derivative-dash-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("game.toml");
    fs::write(
        &path,
        "headless = true\nautopilot = true\nsummary = \"json\"\ntolerance = 0.1\n",
    )
    .expect("write config");

    let output = derivative_dash()
        .arg("--config")
        .arg(&path)
        .args(["--tolerance", "0.75"])
        .output()
        .expect("failed to run derivative-dash");
    let _ = fs::remove_dir_all(&dir);
    assert!(output.status.success(), "{output:?}");

    let summary: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is a json document");
    assert_eq!(summary["tolerance"], 0.75);
    assert_eq!(summary["outcome"], "VICTORY");
}

#[test]
fn invalid_tolerance_fails_with_message() {
    let output = derivative_dash()
        .args(["--headless", "--tolerance", "0"])
        .output()
        .expect("failed to run derivative-dash");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("tolerance"), "{stderr}");
}

#[test]
fn unknown_track_fails() {
    let output = derivative_dash()
        .args(["--headless", "--track", "7"])
        .output()
        .expect("failed to run derivative-dash");
    assert!(!output.status.success());
}
