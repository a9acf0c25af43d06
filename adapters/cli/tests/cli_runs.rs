use std::process::Command;

fn spawn_director() -> Command {
    Command::new(env!("CARGO_BIN_EXE_spawn-director"))
}

#[test]
fn simulate_prints_json_summary() {
    let output = spawn_director()
        .args(["simulate", "--ticks", "120", "--json", "--seed", "7"])
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to run spawn-director simulate");

    assert!(output.status.success(), "simulate exited with {:?}", output.status);
    let summary: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("summary is json");
    assert_eq!(summary["ticks"], 120);
    assert!(summary["peak_monsters"].as_u64().expect("peak") > 0);
}

#[test]
fn tune_reports_boss_cycles() {
    let output = spawn_director()
        .args(["tune", "--json", "--threshold", "20000"])
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to run spawn-director tune");

    assert!(output.status.success(), "tune exited with {:?}", output.status);
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("report is json");
    // boss egg fires at 4000 and 14000 before crossing 20000
    assert_eq!(report["bosses_defeated"], 2);
    assert_eq!(report["truncated"], false);
}

#[test]
fn unknown_tuning_file_fails_with_context() {
    let output = spawn_director()
        .args(["tune", "--tuning", "/nonexistent/tuning.toml"])
        .output()
        .expect("failed to run spawn-director tune");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read tuning file"), "{stderr}");
}
