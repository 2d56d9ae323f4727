//! Dense terrain storage laid out as a fixed grid of equal-sized chunks.

use thiserror::Error;
use tile_editor_core::{
    Extent, MaterialId, PaintedTerrain, Revision, TerrainTile, TileBounds, TileCoord,
};
use tracing::debug;

/// Errors raised while building or mutating a dense terrain store.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DenseStoreError {
    /// Chunk size and chunk counts must be positive and the total extent must
    /// fit the signed tile coordinate space.
    #[error(
        "invalid chunk layout: chunk_size={chunk_size}, chunks_x={chunks_x}, chunks_y={chunks_y}"
    )]
    InvalidChunkLayout {
        /// Requested chunk side length in tiles.
        chunk_size: u32,
        /// Requested chunk columns.
        chunks_x: u32,
        /// Requested chunk rows.
        chunks_y: u32,
    },
    /// The coordinate lies outside the fixed store extent.
    #[error("tile ({x}, {y}) lies outside the {width}x{height} dense terrain")]
    OutOfBounds {
        /// Requested column.
        x: i32,
        /// Requested row.
        y: i32,
        /// Store width in tiles.
        width: u32,
        /// Store height in tiles.
        height: u32,
    },
    /// An externally supplied fill did not cover the store exactly.
    #[error("expected {expected} initial tiles but received {actual}")]
    TileCountMismatch {
        /// Number of tiles the layout requires.
        expected: usize,
        /// Number of tiles supplied.
        actual: usize,
    },
}

/// Chunk arrangement of a dense store.
///
/// Total extent equals `chunks_x * chunk_size` by `chunks_y * chunk_size`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkLayout {
    chunk_size: u32,
    chunks_x: u32,
    chunks_y: u32,
}

impl ChunkLayout {
    /// Validates and creates a chunk layout.
    pub fn new(chunk_size: u32, chunks_x: u32, chunks_y: u32) -> Result<Self, DenseStoreError> {
        let invalid = DenseStoreError::InvalidChunkLayout {
            chunk_size,
            chunks_x,
            chunks_y,
        };

        if chunk_size == 0 || chunks_x == 0 || chunks_y == 0 {
            return Err(invalid);
        }

        let width = chunk_size
            .checked_mul(chunks_x)
            .ok_or_else(|| invalid.clone())?;
        let height = chunk_size
            .checked_mul(chunks_y)
            .ok_or_else(|| invalid.clone())?;
        if i32::try_from(width).is_err() || i32::try_from(height).is_err() {
            return Err(invalid);
        }
        if Extent::new(width, height).area().is_none() {
            return Err(invalid);
        }

        Ok(Self {
            chunk_size,
            chunks_x,
            chunks_y,
        })
    }

    /// Side length of a chunk in tiles.
    #[must_use]
    pub const fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    /// Number of chunk columns.
    #[must_use]
    pub const fn chunks_x(&self) -> u32 {
        self.chunks_x
    }

    /// Number of chunk rows.
    #[must_use]
    pub const fn chunks_y(&self) -> u32 {
        self.chunks_y
    }

    /// Total width in tiles.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.chunk_size * self.chunks_x
    }

    /// Total height in tiles.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.chunk_size * self.chunks_y
    }

    /// Total extent in tiles.
    #[must_use]
    pub const fn extent(&self) -> Extent {
        Extent::new(self.width(), self.height())
    }

    /// Inclusive tile bounds `[0, width) x [0, height)`.
    #[must_use]
    pub fn bounds(&self) -> TileBounds {
        TileBounds::new(
            0,
            to_coord(self.width()) - 1,
            0,
            to_coord(self.height()) - 1,
        )
    }

    fn chunk_area(&self) -> usize {
        to_usize(self.chunk_size) * to_usize(self.chunk_size)
    }

    fn chunk_count(&self) -> usize {
        to_usize(self.chunks_x) * to_usize(self.chunks_y)
    }

    /// Chunk index and chunk-local index of the coordinate.
    fn locate(&self, coord: TileCoord) -> Option<(usize, usize)> {
        if !self.extent().contains(coord) {
            return None;
        }

        let x = u32::try_from(coord.x()).ok()?;
        let y = u32::try_from(coord.y()).ok()?;
        let size = self.chunk_size;
        let chunk = to_usize(y / size) * to_usize(self.chunks_x) + to_usize(x / size);
        let local = to_usize(y % size) * to_usize(size) + to_usize(x % size);
        Some((chunk, local))
    }
}

/// Square block of tiles stored contiguously in chunk-local row-major order.
#[derive(Clone, Debug, PartialEq)]
pub struct Chunk {
    origin: TileCoord,
    tiles: Vec<TerrainTile>,
}

impl Chunk {
    /// Upper-left tile coordinate covered by the chunk.
    #[must_use]
    pub const fn origin(&self) -> TileCoord {
        self.origin
    }

    /// Tiles of the chunk in chunk-local row-major order.
    #[must_use]
    pub fn tiles(&self) -> &[TerrainTile] {
        &self.tiles
    }
}

/// Terrain store with a tile at every coordinate of a fixed extent.
///
/// The extent is set at construction and never changes; tiles may only be
/// overwritten.
#[derive(Clone, Debug)]
pub struct DenseTerrainStore {
    layout: ChunkLayout,
    chunks: Vec<Chunk>,
    revision: Revision,
}

impl DenseTerrainStore {
    /// Builds a store by asking `fill` for the material of every coordinate.
    ///
    /// `fill` is called exactly once per coordinate.
    pub fn from_fn<F>(layout: ChunkLayout, mut fill: F) -> Self
    where
        F: FnMut(TileCoord) -> MaterialId,
    {
        let chunk_area = layout.chunk_area();
        let size = to_coord(layout.chunk_size);
        let mut chunks = Vec::with_capacity(layout.chunk_count());

        for chunk_y in 0..to_coord(layout.chunks_y) {
            for chunk_x in 0..to_coord(layout.chunks_x) {
                let origin = TileCoord::new(chunk_x * size, chunk_y * size);
                let mut tiles = Vec::with_capacity(chunk_area);
                for local_y in 0..size {
                    for local_x in 0..size {
                        let coord = origin.offset(local_x, local_y);
                        tiles.push(TerrainTile::new(coord, fill(coord)));
                    }
                }
                chunks.push(Chunk { origin, tiles });
            }
        }

        debug!(
            width = layout.width(),
            height = layout.height(),
            chunk_size = layout.chunk_size,
            "built dense terrain"
        );

        Self {
            layout,
            chunks,
            revision: Revision::next(),
        }
    }

    /// Builds a store where every tile has the same material.
    pub fn filled(layout: ChunkLayout, material: impl Into<MaterialId>) -> Self {
        let material = material.into();
        Self::from_fn(layout, |_| material.clone())
    }

    /// Builds a store from materials listed in row-major order over the full
    /// extent.
    pub fn from_materials(
        layout: ChunkLayout,
        materials: &[MaterialId],
    ) -> Result<Self, DenseStoreError> {
        let expected = layout.chunk_area() * layout.chunk_count();
        if materials.len() != expected {
            return Err(DenseStoreError::TileCountMismatch {
                expected,
                actual: materials.len(),
            });
        }

        let extent = layout.extent();
        Ok(Self::from_fn(layout, |coord| {
            extent
                .row_major_index(coord)
                .and_then(|index| materials.get(index))
                .cloned()
                .unwrap_or(MaterialId::Code(0))
        }))
    }

    /// Chunk arrangement of the store.
    #[must_use]
    pub const fn layout(&self) -> ChunkLayout {
        self.layout
    }

    /// Total width in tiles.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.layout.width()
    }

    /// Total height in tiles.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.layout.height()
    }

    /// Total extent in tiles.
    #[must_use]
    pub const fn extent(&self) -> Extent {
        self.layout.extent()
    }

    /// Tile at the coordinate, or `None` outside the extent.
    #[must_use]
    pub fn tile(&self, coord: TileCoord) -> Option<&TerrainTile> {
        let (chunk, local) = self.layout.locate(coord)?;
        self.chunks.get(chunk)?.tiles.get(local)
    }

    /// Overwrites the tile at its own coordinate, returning the replaced tile.
    pub fn paint(&mut self, tile: TerrainTile) -> Result<TerrainTile, DenseStoreError> {
        let coord = tile.coord();
        let layout = self.layout;
        let slot = layout
            .locate(coord)
            .and_then(|(chunk, local)| self.chunks.get_mut(chunk)?.tiles.get_mut(local))
            .ok_or(DenseStoreError::OutOfBounds {
                x: coord.x(),
                y: coord.y(),
                width: layout.width(),
                height: layout.height(),
            })?;

        debug!(
            x = coord.x(),
            y = coord.y(),
            material = %tile.material(),
            "painted dense tile"
        );
        let previous = std::mem::replace(slot, tile);
        self.revision = Revision::next();
        Ok(previous)
    }

    /// Overwrites the tile at the coordinate with an uncolored material.
    pub fn paint_material(
        &mut self,
        coord: TileCoord,
        material: impl Into<MaterialId>,
    ) -> Result<TerrainTile, DenseStoreError> {
        self.paint(TerrainTile::new(coord, material))
    }

    /// Chunk at the provided chunk column and row.
    #[must_use]
    pub fn chunk(&self, chunk_x: u32, chunk_y: u32) -> Option<&Chunk> {
        if chunk_x >= self.layout.chunks_x || chunk_y >= self.layout.chunks_y {
            return None;
        }

        let index = to_usize(chunk_y) * to_usize(self.layout.chunks_x) + to_usize(chunk_x);
        self.chunks.get(index)
    }

    /// Every chunk in chunk-row-major order.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.iter()
    }

    /// Every tile in row-major coordinate order.
    pub fn tiles(&self) -> impl Iterator<Item = &TerrainTile> {
        self.layout
            .bounds()
            .coords()
            .filter_map(move |coord| self.tile(coord))
    }

    /// Stamp of the current store state.
    #[must_use]
    pub const fn revision(&self) -> Revision {
        self.revision
    }
}

impl PaintedTerrain for DenseTerrainStore {
    fn painted_bounds(&self) -> Option<TileBounds> {
        Some(self.layout.bounds())
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

// Layout validation guarantees every dimension fits both `i32` and `usize`.
fn to_coord(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn to_usize(value: u32) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}
