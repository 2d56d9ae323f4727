use anyhow::{bail, Context, Result};
use tile_editor_core::{Extent, TileBounds, TileCoord};
use tile_editor_system_grid_overlay::DynamicGridOverlay;
use tile_editor_system_pathmap::PathMap;
use tile_editor_world::{
    ChunkLayout, DenseAdapter, DenseTerrainStore, SparseAdapter, SparseTerrainStore,
};
use tracing::{debug, warn};

use crate::{
    args::{StoreKind, TerrainArgs},
    config::EditorConfig,
};

/// Terrain assembled from command-line edits.
#[derive(Debug)]
pub(crate) enum Terrain {
    Sparse(SparseTerrainStore),
    Dense(DenseTerrainStore),
}

impl Terrain {
    /// Creates the requested store and applies every paint, then every erase.
    pub(crate) fn build(args: &TerrainArgs, config: &EditorConfig) -> Result<Self> {
        match args.store {
            StoreKind::Sparse => {
                let default_material = args
                    .default_material
                    .clone()
                    .unwrap_or_else(|| config.terrain.default_material.clone());
                let mut store = SparseTerrainStore::new(default_material, tile_size(args, config));
                for paint in &args.paints {
                    let _ = store.paint_material(paint.coord, paint.material.clone());
                }
                for &coord in &args.erases {
                    if store.erase(coord).is_none() {
                        warn!(x = coord.x(), y = coord.y(), "erase target was not painted");
                    }
                }
                debug!(painted = store.len(), bounds = ?store.bounds(), "built sparse terrain");
                Ok(Self::Sparse(store))
            }
            StoreKind::Dense => {
                if !args.erases.is_empty() {
                    bail!("--erase requires the sparse store; dense tiles can only be repainted");
                }
                if args.extent.is_some() {
                    bail!(
                        "--extent applies to the sparse store; size dense terrain with \
                         --chunk-size, --chunks-x and --chunks-y"
                    );
                }

                let layout = ChunkLayout::new(
                    args.chunk_size.unwrap_or(config.dense.chunk_size),
                    args.chunks_x.unwrap_or(config.dense.chunks_x),
                    args.chunks_y.unwrap_or(config.dense.chunks_y),
                )
                .context("invalid dense chunk layout")?;
                let fill = args
                    .fill
                    .clone()
                    .unwrap_or_else(|| config.dense.fill.clone());
                let mut store = DenseTerrainStore::filled(layout, fill);
                for paint in &args.paints {
                    let coord = paint.coord;
                    let _ = store
                        .paint_material(coord, paint.material.clone())
                        .with_context(|| {
                            format!("cannot paint tile ({}, {})", coord.x(), coord.y())
                        })?;
                }
                debug!(
                    width = store.width(),
                    height = store.height(),
                    "built dense terrain"
                );
                Ok(Self::Dense(store))
            }
        }
    }

    /// Builds the weight grid through the adapter matching the store.
    pub(crate) fn pathmap(&self, extent: Option<Extent>) -> Result<PathMap> {
        match self {
            Self::Sparse(store) => {
                let adapter = SparseAdapter::new(store, extent)
                    .context("cannot determine the sparse terrain extent")?;
                PathMap::build(&adapter).context("failed to build path map")
            }
            Self::Dense(store) => {
                PathMap::build(&DenseAdapter::new(store)).context("failed to build path map")
            }
        }
    }

    /// Runs one overlay update, returning the number of emitted lines.
    pub(crate) fn update_overlay(
        &self,
        overlay: &mut DynamicGridOverlay,
        hover: Option<TileCoord>,
        viewport: Option<TileBounds>,
    ) -> usize {
        match self {
            Self::Sparse(store) => overlay.update(store, hover, viewport).len(),
            Self::Dense(store) => overlay.update(store, hover, viewport).len(),
        }
    }
}

/// Tile size from the command line, falling back to the configuration.
pub(crate) fn tile_size(args: &TerrainArgs, config: &EditorConfig) -> f32 {
    args.tile_size.unwrap_or(config.terrain.tile_size)
}
