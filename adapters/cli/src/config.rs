use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;
use tile_editor_core::MaterialId;
use tile_editor_system_grid_overlay::{
    DEFAULT_BUFFER, DEFAULT_TILE_SIZE, FADE_DISTANCE, MIN_OPACITY,
};

/// Editor configuration loaded from a TOML file.
///
/// Every section is optional; missing values fall back to the editor defaults.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct EditorConfig {
    /// Tracing filter used when `RUST_LOG` is unset.
    pub(crate) log_level: Option<String>,
    /// Sparse terrain defaults.
    pub(crate) terrain: TerrainConfig,
    /// Dense store dimensions and fill.
    pub(crate) dense: DenseConfig,
    /// Grid overlay tunables.
    pub(crate) overlay: OverlayConfig,
}

impl EditorConfig {
    /// Reads and parses the configuration file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read editor config at {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("invalid editor config at {}", path.display()))
    }

    /// Parses configuration from TOML text.
    pub(crate) fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse editor config toml contents")
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct TerrainConfig {
    pub(crate) default_material: MaterialId,
    pub(crate) tile_size: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            default_material: MaterialId::named("grass"),
            tile_size: DEFAULT_TILE_SIZE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct DenseConfig {
    pub(crate) chunk_size: u32,
    pub(crate) chunks_x: u32,
    pub(crate) chunks_y: u32,
    pub(crate) fill: MaterialId,
}

impl Default for DenseConfig {
    fn default() -> Self {
        Self {
            chunk_size: 8,
            chunks_x: 2,
            chunks_y: 2,
            fill: MaterialId::named("grass"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct OverlayConfig {
    pub(crate) buffer: u32,
    pub(crate) fade_distance: f32,
    pub(crate) min_opacity: f32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            buffer: DEFAULT_BUFFER,
            fade_distance: FADE_DISTANCE,
            min_opacity: MIN_OPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = EditorConfig::from_toml_str("").expect("empty config parses");

        assert_eq!(config, EditorConfig::default());
        assert_eq!(config.overlay.buffer, 2);
        assert_eq!(config.terrain.default_material, MaterialId::named("grass"));
    }

    #[test]
    fn sections_override_defaults() {
        let config = EditorConfig::from_toml_str(
            r#"
            log_level = "debug"

            [terrain]
            default_material = 1
            tile_size = 16.0

            [dense]
            chunk_size = 4
            fill = "sand"

            [overlay]
            fade_distance = 3.0
            "#,
        )
        .expect("config parses");

        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.terrain.default_material, MaterialId::Code(1));
        assert_eq!(config.terrain.tile_size, 16.0);
        assert_eq!(config.dense.chunk_size, 4);
        assert_eq!(config.dense.chunks_x, 2);
        assert_eq!(config.dense.fill, MaterialId::named("sand"));
        assert_eq!(config.overlay.fade_distance, 3.0);
        assert_eq!(config.overlay.min_opacity, MIN_OPACITY);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let error = EditorConfig::from_toml_str("[overlay]\nfeather = 2\n")
            .expect_err("unknown key must fail");

        assert!(format!("{error:#}").contains("feather"));
    }

    #[test]
    fn missing_file_names_path() {
        let error = EditorConfig::load(Path::new("/nonexistent/tile-editor.toml"))
            .expect_err("missing file must fail");

        assert!(error.to_string().contains("/nonexistent/tile-editor.toml"));
    }
}
