use std::process::{Command, Output};

fn tile_editor(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tile-editor"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to invoke the tile-editor binary")
}

#[test]
fn pathmap_json_lists_every_node() {
    let output = tile_editor(&[
        "pathmap",
        "--paint",
        "5,5,stone",
        "--extent",
        "10x10",
        "--format",
        "json",
    ]);

    assert!(output.status.success(), "pathmap should succeed");
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json stdout");
    assert_eq!(report["nodes"].as_array().map(Vec::len), Some(100));
    assert_eq!(report["blocked"], 1);
    assert!(report["nodes"][55]["weight"].is_null());
    assert_eq!(report["nodes"][54]["weight"], 1.0);
}

#[test]
fn overlay_json_reports_hover_region() {
    let output = tile_editor(&["overlay", "--hover", "5,10", "--format", "json"]);

    assert!(output.status.success(), "overlay should succeed");
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json stdout");
    assert_eq!(report["state"], "HoverOnly");
    assert_eq!(report["region"]["min_x"], 3);
    assert_eq!(report["region"]["max_y"], 12);
    assert_eq!(report["visible"], 60);
}

#[test]
fn missing_config_file_fails_with_path() {
    let output = tile_editor(&["--config", "/nonexistent/editor.toml", "overlay"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("/nonexistent/editor.toml"));
}

#[test]
fn oversized_buffer_is_rejected() {
    let output = tile_editor(&["overlay", "--hover", "0,0", "--buffer", "2000000000"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--buffer"));
}
