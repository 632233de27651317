use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "clr-landscape"])
        .status()
        .expect("failed to invoke cargo check for clr-landscape CLI binary");

    assert!(status.success(), "cargo check --bin clr-landscape should succeed");
}

#[test]
fn small_experiment_writes_artefacts() {
    let output = std::env::temp_dir().join(format!("clr-landscape-cli-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&output);

    let status = Command::new(env!("CARGO_BIN_EXE_clr-landscape"))
        .args(["--runs", "2", "--size", "10", "--seed", "5", "--output"])
        .arg(&output)
        .env("RUST_LOG", "warn")
        .status()
        .expect("failed to run clr-landscape");
    assert!(status.success());

    for name in [
        "summary.json",
        "returns-[0.4, 0.6]-0.4.csv",
        "results-0-[0.4, 0.6]-0.4.csv",
        "results-1-[0.4, 0.6]-0.4.csv",
        "map-0-1-[0.4, 0.6]-0.4.csv",
        "map-360-0-[0.4, 0.6]-0.4.csv",
    ] {
        assert!(output.join(name).is_file(), "missing {name}");
    }

    let _ = std::fs::remove_dir_all(&output);
}
