#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Feathered editing grid derived from painted terrain.
//!
//! Every [`DynamicGridOverlay::update`] recomputes the covered region from
//! the painted bounds and an optional hover tile, then emits one line segment
//! per tile edge inside that region. Each segment carries an opacity that
//! fades with the distance to the nearest painted tile, so the grid stays
//! crisp over painted terrain and thins out towards the edit frontier.
//! Opacities and nearest-tile lookups are memoized per coordinate, pruned to
//! the covered region on every update, and dropped wholesale whenever the
//! terrain revision changes.

mod cache;
mod region;

pub use cache::OverlayCaches;
pub use region::{calculate_region, overlay_state, OverlayState};

use thiserror::Error;
use tile_editor_core::{GridLineSegment, PaintedTerrain, TileBounds, TileCoord};
use tracing::{trace, warn};

/// Tiles of padding drawn around the painted bounds and the hover tile.
pub const DEFAULT_BUFFER: u32 = 2;
/// Distance in tiles over which the grid fades out.
pub const FADE_DISTANCE: f32 = 1.5;
/// Opacity floor, keeping the grid faintly visible past the fade distance.
pub const MIN_OPACITY: f32 = 0.05;
/// Side length of a tile in pixels.
pub const DEFAULT_TILE_SIZE: f32 = 32.0;

/// Tunables of the overlay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlaySettings {
    buffer: u32,
    fade_distance: f32,
    min_opacity: f32,
    tile_size: f32,
}

impl OverlaySettings {
    /// Validates and creates overlay settings.
    pub fn new(
        buffer: u32,
        fade_distance: f32,
        min_opacity: f32,
        tile_size: f32,
    ) -> Result<Self, OverlaySettingsError> {
        let error = if i32::try_from(buffer).is_err() {
            Some(OverlaySettingsError::BufferTooLarge { buffer })
        } else if !(fade_distance.is_finite() && fade_distance > 0.0) {
            Some(OverlaySettingsError::NonPositiveFadeDistance { fade_distance })
        } else if !(0.0..=1.0).contains(&min_opacity) {
            Some(OverlaySettingsError::MinOpacityOutOfRange { min_opacity })
        } else if !(tile_size.is_finite() && tile_size > 0.0) {
            Some(OverlaySettingsError::NonPositiveTileSize { tile_size })
        } else {
            None
        };

        if let Some(error) = error {
            warn!(%error, "rejected overlay settings");
            return Err(error);
        }

        Ok(Self {
            buffer,
            fade_distance,
            min_opacity,
            tile_size,
        })
    }

    /// Padding in tiles.
    #[must_use]
    pub const fn buffer(&self) -> u32 {
        self.buffer
    }

    /// Fade distance in tiles.
    #[must_use]
    pub const fn fade_distance(&self) -> f32 {
        self.fade_distance
    }

    /// Opacity floor.
    #[must_use]
    pub const fn min_opacity(&self) -> f32 {
        self.min_opacity
    }

    /// Tile side length in pixels.
    #[must_use]
    pub const fn tile_size(&self) -> f32 {
        self.tile_size
    }

    fn buffer_tiles(&self) -> i32 {
        i32::try_from(self.buffer).unwrap_or(i32::MAX)
    }
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            buffer: DEFAULT_BUFFER,
            fade_distance: FADE_DISTANCE,
            min_opacity: MIN_OPACITY,
            tile_size: DEFAULT_TILE_SIZE,
        }
    }
}

/// Reasons overlay settings are rejected.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum OverlaySettingsError {
    /// The buffer does not fit signed tile coordinates.
    #[error("overlay buffer {buffer} exceeds the tile coordinate range")]
    BufferTooLarge {
        /// Requested buffer.
        buffer: u32,
    },
    /// Fade distance must be positive and finite.
    #[error("fade distance must be positive (received {fade_distance})")]
    NonPositiveFadeDistance {
        /// Requested fade distance.
        fade_distance: f32,
    },
    /// Opacity floor must lie in `0.0..=1.0`.
    #[error("minimum opacity must lie within 0.0..=1.0 (received {min_opacity})")]
    MinOpacityOutOfRange {
        /// Requested opacity floor.
        min_opacity: f32,
    },
    /// Tile size must be positive and finite.
    #[error("tile size must be positive (received {tile_size})")]
    NonPositiveTileSize {
        /// Requested tile size.
        tile_size: f32,
    },
}

/// Opacity of a tile `distance` tiles away from the nearest painted tile.
///
/// Falls off as `(1 - distance / fade_distance)^2` and never drops below the
/// opacity floor, which is reached exactly at the fade distance.
#[must_use]
pub fn feathered_opacity(distance: f32, settings: &OverlaySettings) -> f32 {
    let normalized = distance / settings.fade_distance;
    if normalized >= 1.0 {
        return settings.min_opacity;
    }

    let falloff = (1.0 - normalized.max(0.0)).powi(2);
    falloff.clamp(settings.min_opacity, 1.0)
}

/// Overlay that turns painted terrain into feathered grid lines.
#[derive(Clone, Debug)]
pub struct DynamicGridOverlay {
    settings: OverlaySettings,
    caches: OverlayCaches,
    grid_lines: Vec<GridLineSegment>,
    region: Option<TileBounds>,
    state: OverlayState,
}

impl DynamicGridOverlay {
    /// Creates an empty overlay.
    #[must_use]
    pub fn new(settings: OverlaySettings) -> Self {
        Self {
            settings,
            caches: OverlayCaches::new(),
            grid_lines: Vec::new(),
            region: None,
            state: OverlayState::Empty,
        }
    }

    /// Settings the overlay was created with.
    #[must_use]
    pub const fn settings(&self) -> &OverlaySettings {
        &self.settings
    }

    /// Line segments produced by the latest update.
    #[must_use]
    pub fn grid_lines(&self) -> &[GridLineSegment] {
        &self.grid_lines
    }

    /// Region computed by the latest update, before viewport clipping.
    #[must_use]
    pub const fn region(&self) -> Option<TileBounds> {
        self.region
    }

    /// State classified by the latest update.
    #[must_use]
    pub const fn state(&self) -> OverlayState {
        self.state
    }

    /// Memoization state, exposed for inspection.
    #[must_use]
    pub const fn caches(&self) -> &OverlayCaches {
        &self.caches
    }

    /// Drops every memoized opacity and nearest-tile lookup.
    pub fn invalidate(&mut self) {
        self.caches.clear();
    }

    /// Recomputes the region and regenerates the grid lines.
    ///
    /// `hover` is the tile under the cursor. When `viewport` is provided only
    /// the part of the region inside it produces lines.
    pub fn update<T>(
        &mut self,
        terrain: &T,
        hover: Option<TileCoord>,
        viewport: Option<TileBounds>,
    ) -> &[GridLineSegment]
    where
        T: PaintedTerrain,
    {
        let _ = self.caches.sync(terrain.revision());

        let painted = terrain.painted_bounds();
        let buffer = self.settings.buffer_tiles();
        self.state = overlay_state(painted, hover, buffer);
        self.region = calculate_region(painted, hover, buffer);
        // Edges on the region border also read the tiles just outside it.
        let covered = self.region.map(|region| region.expand(1));
        self.caches.retain_within(covered);

        let visible = match (self.region, viewport) {
            (Some(region), Some(viewport)) => region.intersection(viewport),
            (region, None) => region,
            (None, Some(_)) => None,
        };

        let mut lines = std::mem::take(&mut self.grid_lines);
        lines.clear();
        if let Some(visible) = visible {
            self.emit_lines(terrain, visible, &mut lines);
        }
        self.grid_lines = lines;

        trace!(
            state = ?self.state,
            region = ?self.region,
            lines = self.grid_lines.len(),
            "updated grid overlay"
        );

        &self.grid_lines
    }

    /// Region the overlay would cover for the terrain and hover tile.
    #[must_use]
    pub fn calculate_region<T>(&self, terrain: &T, hover: Option<TileCoord>) -> Option<TileBounds>
    where
        T: PaintedTerrain,
    {
        calculate_region(
            terrain.painted_bounds(),
            hover,
            self.settings.buffer_tiles(),
        )
    }

    /// Feathered opacity at the coordinate.
    ///
    /// Painted tiles are fully opaque. With nothing painted there is no
    /// frontier to fade from, and every coordinate is fully opaque as well.
    pub fn calculate_feathering<T>(&mut self, terrain: &T, coord: TileCoord) -> f32
    where
        T: PaintedTerrain,
    {
        let _ = self.caches.sync(terrain.revision());
        self.feathering(terrain, coord)
    }

    /// Painted tile nearest to the coordinate by Euclidean distance.
    ///
    /// Ties resolve to the first candidate in row-major order.
    pub fn nearest_painted_tile<T>(&mut self, terrain: &T, coord: TileCoord) -> Option<TileCoord>
    where
        T: PaintedTerrain,
    {
        let _ = self.caches.sync(terrain.revision());
        self.nearest(terrain, coord)
    }

    fn feathering<T>(&mut self, terrain: &T, coord: TileCoord) -> f32
    where
        T: PaintedTerrain,
    {
        if let Some(opacity) = self.caches.feathering(coord) {
            return opacity;
        }

        let opacity = if terrain.painted_tile(coord).is_some() {
            1.0
        } else {
            match self.nearest(terrain, coord) {
                Some(nearest) => feathered_opacity(coord.distance(nearest), &self.settings),
                None => 1.0,
            }
        };

        self.caches.store_feathering(coord, opacity);
        opacity
    }

    fn nearest<T>(&mut self, terrain: &T, coord: TileCoord) -> Option<TileCoord>
    where
        T: PaintedTerrain,
    {
        if let Some(nearest) = self.caches.nearest(coord) {
            return nearest;
        }

        let nearest = terrain
            .painted_tiles()
            .map(|tile| tile.coord())
            .min_by_key(|candidate| candidate.distance_squared(coord));

        self.caches.store_nearest(coord, nearest);
        nearest
    }

    /// Emits one segment per tile edge within `visible`. An edge shared by two
    /// tiles takes the larger of their opacities.
    fn emit_lines<T>(&mut self, terrain: &T, visible: TileBounds, out: &mut Vec<GridLineSegment>)
    where
        T: PaintedTerrain,
    {
        let size = self.settings.tile_size;
        let to_pixels = |tiles: i32| tiles as f32 * size;

        for y in visible.min_y()..=visible.max_y() {
            for x in visible.min_x()..=visible.max_x().saturating_add(1) {
                let opacity = self
                    .feathering(terrain, TileCoord::new(x.saturating_sub(1), y))
                    .max(self.feathering(terrain, TileCoord::new(x, y)));
                out.push(GridLineSegment::new(
                    to_pixels(x),
                    to_pixels(y),
                    to_pixels(x),
                    to_pixels(y.saturating_add(1)),
                    opacity,
                ));
            }
        }

        for y in visible.min_y()..=visible.max_y().saturating_add(1) {
            for x in visible.min_x()..=visible.max_x() {
                let opacity = self
                    .feathering(terrain, TileCoord::new(x, y.saturating_sub(1)))
                    .max(self.feathering(terrain, TileCoord::new(x, y)));
                out.push(GridLineSegment::new(
                    to_pixels(x),
                    to_pixels(y),
                    to_pixels(x.saturating_add(1)),
                    to_pixels(y),
                    opacity,
                ));
            }
        }
    }
}

impl Default for DynamicGridOverlay {
    fn default() -> Self {
        Self::new(OverlaySettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opacity_floors_at_fade_distance() {
        let settings = OverlaySettings::default();
        assert_eq!(feathered_opacity(1.5, &settings), MIN_OPACITY);
        assert_eq!(feathered_opacity(4.0, &settings), MIN_OPACITY);
    }

    #[test]
    fn opacity_at_one_tile_follows_quadratic_falloff() {
        let settings = OverlaySettings::default();
        let expected = (1.0_f32 - 1.0 / 1.5).powi(2);
        assert!((feathered_opacity(1.0, &settings) - expected).abs() < 1e-6);
        assert!((feathered_opacity(1.0, &settings) - 0.11).abs() < 0.01);
    }

    #[test]
    fn opacity_stays_within_floor_and_one() {
        let settings = OverlaySettings::default();
        for step in 0..200 {
            let distance = step as f32 * 0.05;
            let opacity = feathered_opacity(distance, &settings);
            assert!(opacity >= MIN_OPACITY, "distance {distance} gave {opacity}");
            assert!(opacity <= 1.0, "distance {distance} gave {opacity}");
        }
        assert_eq!(feathered_opacity(0.0, &settings), 1.0);
    }

    #[test]
    fn settings_reject_invalid_values() {
        assert_eq!(
            OverlaySettings::new(u32::MAX, 1.5, 0.05, 32.0),
            Err(OverlaySettingsError::BufferTooLarge { buffer: u32::MAX })
        );
        assert_eq!(
            OverlaySettings::new(2, 0.0, 0.05, 32.0),
            Err(OverlaySettingsError::NonPositiveFadeDistance { fade_distance: 0.0 })
        );
        assert_eq!(
            OverlaySettings::new(2, 1.5, 1.5, 32.0),
            Err(OverlaySettingsError::MinOpacityOutOfRange { min_opacity: 1.5 })
        );
        assert_eq!(
            OverlaySettings::new(2, 1.5, 0.05, -1.0),
            Err(OverlaySettingsError::NonPositiveTileSize { tile_size: -1.0 })
        );
        assert!(OverlaySettings::new(0, 3.0, 0.0, 1.0).is_ok());
    }

    #[test]
    fn default_settings_match_constants() {
        let settings = OverlaySettings::default();
        assert_eq!(settings.buffer(), 2);
        assert_eq!(settings.fade_distance(), 1.5);
        assert_eq!(settings.min_opacity(), 0.05);
        assert_eq!(settings.tile_size(), 32.0);
    }
}
