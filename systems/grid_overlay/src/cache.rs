//! Per-coordinate memoization of feathering results.

use std::collections::HashMap;

use tile_editor_core::{Revision, TileBounds, TileCoord};
use tracing::{debug, trace};

/// Feathering and nearest-painted-tile caches owned by one overlay.
///
/// Entries are only valid for the terrain revision they were computed
/// against; both maps are cleared together whenever that revision changes.
/// Between revisions the overlay prunes them to the tiles around its current
/// region.
#[derive(Clone, Debug, Default)]
pub struct OverlayCaches {
    feathering: HashMap<TileCoord, f32>,
    nearest: HashMap<TileCoord, Option<TileCoord>>,
    revision: Option<Revision>,
}

impl OverlayCaches {
    /// Creates empty caches bound to no terrain revision.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of memoized opacities.
    #[must_use]
    pub fn feathering_len(&self) -> usize {
        self.feathering.len()
    }

    /// Number of memoized nearest-tile lookups.
    #[must_use]
    pub fn nearest_len(&self) -> usize {
        self.nearest.len()
    }

    /// Terrain revision the entries were computed against.
    #[must_use]
    pub const fn revision(&self) -> Option<Revision> {
        self.revision
    }

    /// Drops every entry and forgets the bound revision.
    pub fn clear(&mut self) {
        self.feathering.clear();
        self.nearest.clear();
        self.revision = None;
    }

    /// Binds the caches to `revision`, clearing them if they were computed
    /// against any other terrain state. Returns whether entries were dropped.
    pub(crate) fn sync(&mut self, revision: Revision) -> bool {
        if self.revision == Some(revision) {
            return false;
        }

        let dropped = self.feathering.len() + self.nearest.len();
        self.feathering.clear();
        self.nearest.clear();
        self.revision = Some(revision);
        if dropped > 0 {
            debug!(
                revision = revision.get(),
                dropped,
                "invalidated overlay caches"
            );
        }
        true
    }

    /// Drops entries for coordinates outside `bounds`, or every entry when
    /// there are no bounds. The bound revision is kept.
    pub(crate) fn retain_within(&mut self, bounds: Option<TileBounds>) {
        let before = self.feathering.len() + self.nearest.len();
        match bounds {
            Some(bounds) => {
                self.feathering.retain(|coord, _| bounds.contains(*coord));
                self.nearest.retain(|coord, _| bounds.contains(*coord));
            }
            None => {
                self.feathering.clear();
                self.nearest.clear();
            }
        }

        let dropped = before - (self.feathering.len() + self.nearest.len());
        if dropped > 0 {
            trace!(dropped, "pruned overlay caches");
        }
    }

    pub(crate) fn feathering(&self, coord: TileCoord) -> Option<f32> {
        self.feathering.get(&coord).copied()
    }

    pub(crate) fn store_feathering(&mut self, coord: TileCoord, opacity: f32) {
        let _ = self.feathering.insert(coord, opacity);
    }

    pub(crate) fn nearest(&self, coord: TileCoord) -> Option<Option<TileCoord>> {
        self.nearest.get(&coord).copied()
    }

    pub(crate) fn store_nearest(&mut self, coord: TileCoord, nearest: Option<TileCoord>) {
        let _ = self.nearest.insert(coord, nearest);
    }
}
