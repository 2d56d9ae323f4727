//! Sparse terrain storage keyed by painted coordinates.

use std::{borrow::Cow, collections::BTreeMap};

use tile_editor_core::{MaterialId, PaintedTerrain, Revision, TerrainTile, TileBounds, TileCoord};
use tracing::debug;

/// Terrain store that only allocates painted cells.
///
/// Bounds always equal the axis-aligned extremes of the painted keys, or
/// `None` when nothing is painted. Unpainted coordinates report the store's
/// default material through [`SparseTerrainStore::tile_or_default`].
#[derive(Clone, Debug)]
pub struct SparseTerrainStore {
    tiles: BTreeMap<TileCoord, TerrainTile>,
    default_material: MaterialId,
    tile_size: f32,
    bounds: Option<TileBounds>,
    revision: Revision,
}

impl SparseTerrainStore {
    /// Creates an empty store.
    ///
    /// `tile_size` is the side length of a tile in world units and is carried
    /// for consumers that convert between tile and pixel space.
    #[must_use]
    pub fn new(default_material: impl Into<MaterialId>, tile_size: f32) -> Self {
        Self {
            tiles: BTreeMap::new(),
            default_material: default_material.into(),
            tile_size,
            bounds: None,
            revision: Revision::next(),
        }
    }

    /// Material reported for unpainted coordinates.
    #[must_use]
    pub fn default_material(&self) -> &MaterialId {
        &self.default_material
    }

    /// Side length of a tile in world units.
    #[must_use]
    pub const fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Places the tile at its own coordinate, returning the tile it replaced.
    pub fn paint(&mut self, tile: TerrainTile) -> Option<TerrainTile> {
        let coord = tile.coord();
        self.bounds = Some(match self.bounds {
            Some(bounds) => bounds.include(coord),
            None => TileBounds::single(coord),
        });
        self.revision = Revision::next();
        debug!(
            x = coord.x(),
            y = coord.y(),
            material = %tile.material(),
            "painted sparse tile"
        );
        self.tiles.insert(coord, tile)
    }

    /// Paints an uncolored tile of the provided material.
    pub fn paint_material(
        &mut self,
        coord: TileCoord,
        material: impl Into<MaterialId>,
    ) -> Option<TerrainTile> {
        self.paint(TerrainTile::new(coord, material))
    }

    /// Removes the painted tile at the coordinate, returning it.
    ///
    /// When the removed tile sat on a bounding edge the bounds are rebuilt by
    /// scanning the remaining tiles.
    pub fn erase(&mut self, coord: TileCoord) -> Option<TerrainTile> {
        let removed = self.tiles.remove(&coord)?;
        self.revision = Revision::next();

        if self.bounds.map_or(true, |bounds| bounds.touches_edge(coord)) {
            self.recompute_bounds();
        }

        debug!(x = coord.x(), y = coord.y(), bounds = ?self.bounds, "erased sparse tile");
        Some(removed)
    }

    /// Removes every painted tile.
    pub fn clear(&mut self) {
        if self.tiles.is_empty() {
            return;
        }

        self.tiles.clear();
        self.bounds = None;
        self.revision = Revision::next();
        debug!("cleared sparse terrain");
    }

    /// Painted tile at the coordinate, if any.
    #[must_use]
    pub fn tile(&self, coord: TileCoord) -> Option<&TerrainTile> {
        self.tiles.get(&coord)
    }

    /// Painted tile at the coordinate, or a synthetic tile of the default
    /// material when the coordinate is unpainted.
    #[must_use]
    pub fn tile_or_default(&self, coord: TileCoord) -> Cow<'_, TerrainTile> {
        match self.tiles.get(&coord) {
            Some(tile) => Cow::Borrowed(tile),
            None => Cow::Owned(TerrainTile::new(coord, self.default_material.clone())),
        }
    }

    /// Every painted tile in row-major coordinate order.
    pub fn tiles(&self) -> impl Iterator<Item = &TerrainTile> {
        self.tiles.values()
    }

    /// Axis-aligned extremes of the painted tiles.
    #[must_use]
    pub const fn bounds(&self) -> Option<TileBounds> {
        self.bounds
    }

    /// Number of painted tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Reports whether nothing is painted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Stamp of the current store state.
    #[must_use]
    pub const fn revision(&self) -> Revision {
        self.revision
    }

    fn recompute_bounds(&mut self) {
        self.bounds = TileBounds::enclosing(self.tiles.keys().copied());
    }
}

impl PaintedTerrain for SparseTerrainStore {
    fn painted_bounds(&self) -> Option<TileBounds> {
        self.bounds
    }

    fn painted_tile(&self, coord: TileCoord) -> Option<&TerrainTile> {
        self.tile(coord)
    }

    fn painted_tiles(&self) -> impl Iterator<Item = &TerrainTile> {
        self.tiles()
    }

    fn revision(&self) -> Revision {
        self.revision
    }
}
