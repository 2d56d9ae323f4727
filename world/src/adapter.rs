//! Uniform read adapters over the two terrain stores.

use std::borrow::Cow;

use tile_editor_core::{AdapterError, Extent, TerrainAdapter, TerrainTile, TileCoord};
use tracing::warn;

use crate::{DenseTerrainStore, SparseTerrainStore};

/// Adapter over a dense store.
///
/// Adapter space coincides with store space; every in-range coordinate
/// resolves through direct indexed access.
#[derive(Clone, Copy, Debug)]
pub struct DenseAdapter<'a> {
    store: &'a DenseTerrainStore,
}

impl<'a> DenseAdapter<'a> {
    /// Wraps the provided dense store.
    #[must_use]
    pub const fn new(store: &'a DenseTerrainStore) -> Self {
        Self { store }
    }
}

impl TerrainAdapter for DenseAdapter<'_> {
    fn extent(&self) -> Extent {
        self.store.extent()
    }

    fn tile_at(&self, coord: TileCoord) -> Option<Cow<'_, TerrainTile>> {
        self.store.tile(coord).map(Cow::Borrowed)
    }

    fn index_of(&self, coord: TileCoord) -> Option<usize> {
        self.store.extent().row_major_index(coord)
    }
}

/// Adapter over a sparse store.
///
/// Sparse storage has no intrinsic extent, so the adapter maps a window of
/// the unbounded store onto `[0, width) x [0, height)`. Adapter coordinate
/// `(x, y)` reads store coordinate `(origin.x + x, origin.y + y)`. Unpainted
/// coordinates inside the window resolve to the store's default material.
#[derive(Clone, Copy, Debug)]
pub struct SparseAdapter<'a> {
    store: &'a SparseTerrainStore,
    origin: TileCoord,
    extent: Extent,
}

impl<'a> SparseAdapter<'a> {
    /// Creates an adapter with an explicit extent anchored at the store origin,
    /// or with the window derived from the painted bounds when `extent` is
    /// `None`.
    ///
    /// Fails when no extent is given and nothing is painted, or when the given
    /// extent addresses no tiles.
    pub fn new(
        store: &'a SparseTerrainStore,
        extent: Option<Extent>,
    ) -> Result<Self, AdapterError> {
        match extent {
            Some(extent) => Self::with_window(store, TileCoord::new(0, 0), extent),
            None => Self::from_painted_bounds(store),
        }
    }

    /// Creates an adapter over an explicit window of the store.
    pub fn with_window(
        store: &'a SparseTerrainStore,
        origin: TileCoord,
        extent: Extent,
    ) -> Result<Self, AdapterError> {
        if extent.is_empty() {
            warn!(
                width = extent.width(),
                height = extent.height(),
                "rejected empty sparse adapter extent"
            );
            return Err(AdapterError::EmptyExtent {
                width: extent.width(),
                height: extent.height(),
            });
        }

        Ok(Self {
            store,
            origin,
            extent,
        })
    }

    /// Creates an adapter whose window equals the current painted bounds.
    pub fn from_painted_bounds(store: &'a SparseTerrainStore) -> Result<Self, AdapterError> {
        let Some(bounds) = store.bounds() else {
            warn!("sparse adapter requested over unpainted terrain without an extent");
            return Err(AdapterError::UndeterminableExtent);
        };

        Self::with_window(
            store,
            bounds.origin(),
            Extent::new(bounds.width(), bounds.height()),
        )
    }

    /// Store coordinate mapped to adapter coordinate `(0, 0)`.
    #[must_use]
    pub const fn origin(&self) -> TileCoord {
        self.origin
    }

    /// Store coordinate addressed by the adapter coordinate.
    #[must_use]
    pub const fn to_store(&self, coord: TileCoord) -> TileCoord {
        self.origin.offset(coord.x(), coord.y())
    }
}

impl TerrainAdapter for SparseAdapter<'_> {
    fn extent(&self) -> Extent {
        self.extent
    }

    fn tile_at(&self, coord: TileCoord) -> Option<Cow<'_, TerrainTile>> {
        if !self.extent.contains(coord) {
            return None;
        }

        Some(self.store.tile_or_default(self.to_store(coord)))
    }

    fn index_of(&self, coord: TileCoord) -> Option<usize> {
        self.extent.row_major_index(coord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChunkLayout;
    use tile_editor_core::MaterialId;

    #[test]
    fn dense_index_is_row_major_for_every_coordinate() {
        let store = DenseTerrainStore::filled(
            ChunkLayout::new(3, 2, 3).expect("valid layout"),
            "grass",
        );
        let adapter = DenseAdapter::new(&store);
        let extent = adapter.extent();
        assert_eq!(extent, Extent::new(6, 9));

        for y in 0..9 {
            for x in 0..6 {
                let coord = TileCoord::new(x, y);
                assert_eq!(adapter.index_of(coord), Some((y * 6 + x) as usize));
                assert!(adapter.tile_at(coord).is_some());
            }
        }
    }

    #[test]
    fn dense_lookup_outside_extent_is_none() {
        let store = DenseTerrainStore::filled(ChunkLayout::new(2, 1, 1).expect("valid"), 0_u32);
        let adapter = DenseAdapter::new(&store);

        assert!(adapter.tile_at(TileCoord::new(2, 0)).is_none());
        assert!(adapter.tile_at(TileCoord::new(-1, 0)).is_none());
        assert!(adapter.index_of(TileCoord::new(0, 2)).is_none());
    }

    #[test]
    fn sparse_unpainted_in_range_yields_default_tile() {
        let mut store = SparseTerrainStore::new("grass", 16.0);
        let _ = store.paint_material(TileCoord::new(5, 5), "stone");
        let adapter = SparseAdapter::new(&store, Some(Extent::new(10, 10))).expect("explicit");

        for y in 0..10 {
            for x in 0..10 {
                let coord = TileCoord::new(x, y);
                let tile = adapter.tile_at(coord).expect("in range never none");
                let expected = if coord == TileCoord::new(5, 5) {
                    "stone"
                } else {
                    "grass"
                };
                assert_eq!(tile.material(), &MaterialId::from(expected));
            }
        }
    }

    #[test]
    fn sparse_lookup_outside_extent_is_none() {
        let store = SparseTerrainStore::new("grass", 16.0);
        let adapter = SparseAdapter::new(&store, Some(Extent::new(4, 4))).expect("explicit");

        assert!(adapter.tile_at(TileCoord::new(4, 0)).is_none());
        assert!(adapter.tile_at(TileCoord::new(0, -1)).is_none());
    }

    #[test]
    fn sparse_without_tiles_or_extent_is_a_configuration_error() {
        let store = SparseTerrainStore::new("grass", 16.0);
        assert_eq!(
            SparseAdapter::new(&store, None).err(),
            Some(AdapterError::UndeterminableExtent)
        );
    }

    #[test]
    fn sparse_empty_extent_is_a_configuration_error() {
        let store = SparseTerrainStore::new("grass", 16.0);
        assert_eq!(
            SparseAdapter::new(&store, Some(Extent::new(0, 5))).err(),
            Some(AdapterError::EmptyExtent {
                width: 0,
                height: 5,
            })
        );
    }

    #[test]
    fn sparse_extent_derives_from_painted_bounds() {
        let mut store = SparseTerrainStore::new("grass", 16.0);
        let _ = store.paint_material(TileCoord::new(-2, 3), "stone");
        let _ = store.paint_material(TileCoord::new(1, 4), "water");

        let adapter = SparseAdapter::new(&store, None).expect("painted bounds");
        assert_eq!(adapter.extent(), Extent::new(4, 2));
        assert_eq!(adapter.origin(), TileCoord::new(-2, 3));

        let corner = adapter.tile_at(TileCoord::new(0, 0)).expect("in range");
        assert_eq!(corner.material(), &MaterialId::from("stone"));
        let far = adapter.tile_at(TileCoord::new(3, 1)).expect("in range");
        assert_eq!(far.material(), &MaterialId::from("water"));
        assert_eq!(adapter.index_of(TileCoord::new(3, 1)), Some(7));
    }
}
