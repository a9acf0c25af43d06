use std::process::Command;

#[test]
fn cli_binary_passes_cargo_check() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "spawn-director"])
        .status()
        .expect("failed to invoke cargo check for spawn-director CLI binary");

    assert!(status.success(), "cargo check --bin spawn-director should succeed");
}
