#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for the tile editor.
//!
//! Builds a sparse or dense terrain from flags, then prints its pathfinding
//! weight grid or its feathered editing overlay.

mod args;
mod config;
mod report;
mod terrain;

use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tile_editor_system_grid_overlay::{DynamicGridOverlay, OverlaySettings};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    args::{Cli, Command, OverlayArgs, MAX_BUFFER},
    config::EditorConfig,
    terrain::Terrain,
};

/// Entry point for the tile editor command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };
    init_tracing(config.log_level.as_deref());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(&cli.command, &config, &mut out)?;
    out.flush().context("failed to flush standard output")
}

/// Installs the stderr subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(log_level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level.unwrap_or("info")))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .init();
}

fn run<W>(command: &Command, config: &EditorConfig, out: &mut W) -> Result<()>
where
    W: Write,
{
    let terrain_args = command.terrain();
    let terrain = Terrain::build(terrain_args, config)?;

    match command {
        Command::Pathmap(args) => {
            let map = terrain.pathmap(args.extent)?;
            info!(
                width = map.extent().width(),
                height = map.extent().height(),
                blocked = map.blocked_count(),
                "built path map"
            );
            report::write_pathmap(out, &map, args.format)
        }
        Command::Overlay(args) => {
            let mut overlay = DynamicGridOverlay::new(overlay_settings(args, config)?);
            let lines = terrain.update_overlay(&mut overlay, args.hover, args.viewport);
            info!(state = ?overlay.state(), lines, "generated grid overlay");
            report::write_overlay(out, &overlay, terrain_args.format)
        }
    }
}

fn overlay_settings(args: &OverlayArgs, config: &EditorConfig) -> Result<OverlaySettings> {
    let buffer = args.buffer.unwrap_or(config.overlay.buffer);
    if buffer > MAX_BUFFER {
        bail!("overlay buffer {buffer} exceeds the maximum of {MAX_BUFFER} tiles");
    }

    OverlaySettings::new(
        buffer,
        args.fade_distance.unwrap_or(config.overlay.fade_distance),
        args.min_opacity.unwrap_or(config.overlay.min_opacity),
        terrain::tile_size(&args.terrain, config),
    )
    .context("invalid overlay settings")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(arguments: &[&str], config: &EditorConfig) -> Result<String> {
        let cli = Cli::try_parse_from(["tile-editor"].iter().chain(arguments))?;
        let mut out = Vec::new();
        run(&cli.command, config, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn sparse_pathmap_over_explicit_extent() {
        let text = run_args(
            &["pathmap", "--paint", "1,1,stone", "--extent", "3x3"],
            &EditorConfig::default(),
        )
        .expect("pathmap runs");

        assert_eq!(text, "pathmap 3x3 (1 blocked)\n...\n.#.\n...\n");
    }

    #[test]
    fn sparse_pathmap_without_paint_or_extent_fails() {
        let error = run_args(&["pathmap"], &EditorConfig::default())
            .expect_err("undeterminable extent must fail");

        assert!(format!("{error:#}").contains("cannot determine the sparse terrain extent"));
    }

    #[test]
    fn erase_runs_after_paint() {
        let text = run_args(
            &[
                "pathmap",
                "--paint",
                "0,0,water",
                "--paint",
                "2,0,stone",
                "--erase",
                "2,0",
            ],
            &EditorConfig::default(),
        )
        .expect("pathmap runs");

        assert_eq!(text, "pathmap 1x1 (0 blocked)\n~\n");
    }

    #[test]
    fn dense_store_uses_configured_layout() {
        let config = EditorConfig::from_toml_str(
            "[dense]\nchunk_size = 2\nchunks_x = 2\nchunks_y = 1\nfill = \"sand\"\n",
        )
        .expect("config parses");

        let text = run_args(
            &["pathmap", "--store", "dense", "--paint", "3,1,2"],
            &config,
        )
        .expect("pathmap runs");

        assert_eq!(text, "pathmap 4x2 (1 blocked)\n::::\n:::#\n");
    }

    #[test]
    fn dense_store_rejects_erase_and_out_of_bounds_paint() {
        let config = EditorConfig::default();

        assert!(run_args(&["pathmap", "--store", "dense", "--erase", "0,0"], &config).is_err());

        let error = run_args(
            &["pathmap", "--store", "dense", "--paint", "99,0,stone"],
            &config,
        )
        .expect_err("paint outside dense extent must fail");
        assert!(format!("{error:#}").contains("cannot paint tile (99, 0)"));
    }

    #[test]
    fn overlay_flags_override_config() {
        let config = EditorConfig::from_toml_str("[overlay]\nbuffer = 5\n").expect("parses");

        let text = run_args(
            &["overlay", "--paint", "0,0,grass", "--buffer", "1"],
            &config,
        )
        .expect("overlay runs");

        assert!(text.contains("region: x -1..=1 y -1..=1"));
        assert!(text.ends_with("lines: 24\n"));
    }

    #[test]
    fn overlay_rejects_invalid_settings() {
        let error = run_args(
            &["overlay", "--hover", "0,0", "--fade-distance", "0"],
            &EditorConfig::default(),
        )
        .expect_err("zero fade distance must fail");

        assert!(format!("{error:#}").contains("invalid overlay settings"));
    }

    #[test]
    fn overlay_buffer_is_capped_from_flags_and_config() {
        let flagged = run_args(
            &["overlay", "--hover", "0,0", "--buffer", "2000000000"],
            &EditorConfig::default(),
        );
        assert!(flagged.is_err());

        let config = EditorConfig::from_toml_str("[overlay]\nbuffer = 2000000000\n")
            .expect("config parses");
        let error = run_args(&["overlay", "--hover", "0,0"], &config)
            .expect_err("oversized configured buffer must fail");

        assert!(format!("{error:#}").contains("exceeds the maximum of 64 tiles"));
    }
}
