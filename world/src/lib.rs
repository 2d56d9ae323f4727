#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative terrain storage for the tile editor.
//!
//! Two storage strategies live here. [`SparseTerrainStore`] keeps only the
//! painted cells of an unbounded world and answers every other coordinate
//! with its default material. [`DenseTerrainStore`] keeps a fixed rectangle
//! of chunks where every cell always holds a tile. Downstream consumers never
//! see either representation directly: they read through [`DenseAdapter`] or
//! [`SparseAdapter`], both of which implement
//! [`TerrainAdapter`](tile_editor_core::TerrainAdapter), or through the
//! [`PaintedTerrain`](tile_editor_core::PaintedTerrain) contract both stores
//! implement.

mod adapter;
mod dense;
mod sparse;

pub use adapter::{DenseAdapter, SparseAdapter};
pub use dense::{Chunk, ChunkLayout, DenseStoreError, DenseTerrainStore};
pub use sparse::SparseTerrainStore;
