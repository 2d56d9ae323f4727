#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for tile editor adapters.
//!
//! The overlay produces plain [`GridLineSegment`] descriptors; this crate
//! hands them to whatever backend implements [`LineSink`] and converts cursor
//! positions back into tile coordinates.

use anyhow::{Context, Result as AnyResult};
use glam::Vec2;
use tile_editor_core::{GridLineSegment, TileColor, TileCoord};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Color the editing grid is drawn with before feathering.
    pub const GRID: Self = Self::new(0.85, 0.9, 1.0, 1.0);

    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Scales the alpha channel by `opacity`, clamped to `0.0..=1.0`.
    #[must_use]
    pub fn faded(self, opacity: f32) -> Self {
        Self {
            alpha: self.alpha * opacity.clamp(0.0, 1.0),
            ..self
        }
    }
}

impl From<TileColor> for Color {
    fn from(color: TileColor) -> Self {
        Self::from_rgb_u8(color.red(), color.green(), color.blue())
    }
}

/// Backend capable of drawing straight lines in world space.
pub trait LineSink {
    /// Draws a line between two world-space points.
    fn draw_line(&mut self, from: Vec2, to: Vec2, color: Color) -> AnyResult<()>;
}

/// Reports whether a segment with this opacity is skipped when drawing.
///
/// Feathered opacities never fall below their floor, so this only rejects
/// segments produced elsewhere.
#[must_use]
pub fn is_invisible(opacity: f32) -> bool {
    opacity <= 0.0
}

/// Draws every visible overlay segment with `base` faded by its opacity.
///
/// Returns the number of segments handed to the sink.
pub fn draw_overlay<S>(sink: &mut S, lines: &[GridLineSegment], base: Color) -> AnyResult<usize>
where
    S: LineSink + ?Sized,
{
    let mut drawn = 0;
    for line in lines.iter().filter(|line| !is_invisible(line.opacity)) {
        sink.draw_line(
            Vec2::new(line.x1, line.y1),
            Vec2::new(line.x2, line.y2),
            base.faded(line.opacity),
        )
        .with_context(|| {
            format!(
                "failed to draw grid line ({}, {}) -> ({}, {})",
                line.x1, line.y1, line.x2, line.y2
            )
        })?;
        drawn += 1;
    }
    Ok(drawn)
}

/// Converts a world-space position into the tile containing it.
///
/// Returns `None` for a degenerate tile size or a position beyond the tile
/// coordinate range.
#[must_use]
pub fn tile_at_world_position(position: Vec2, tile_size: f32) -> Option<TileCoord> {
    if !tile_size.is_finite() || tile_size <= f32::EPSILON || !position.is_finite() {
        return None;
    }

    let tile = (position / tile_size).floor();
    Some(TileCoord::new(to_tile_axis(tile.x)?, to_tile_axis(tile.y)?))
}

/// World-space position of the tile's upper-left corner.
#[must_use]
pub fn tile_origin_world_position(coord: TileCoord, tile_size: f32) -> Vec2 {
    Vec2::new(coord.x() as f32, coord.y() as f32) * tile_size
}

fn to_tile_axis(value: f32) -> Option<i32> {
    if value < i32::MIN as f32 || value >= i32::MAX as f32 {
        return None;
    }
    Some(value as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use tile_editor_core::TerrainTile;

    #[derive(Default)]
    struct RecordingSink {
        lines: Vec<(Vec2, Vec2, Color)>,
    }

    impl LineSink for RecordingSink {
        fn draw_line(&mut self, from: Vec2, to: Vec2, color: Color) -> AnyResult<()> {
            self.lines.push((from, to, color));
            Ok(())
        }
    }

    struct FailingSink;

    impl LineSink for FailingSink {
        fn draw_line(&mut self, _from: Vec2, _to: Vec2, _color: Color) -> AnyResult<()> {
            bail!("backend unavailable")
        }
    }

    #[test]
    fn draw_overlay_skips_invisible_lines() {
        let lines = [
            GridLineSegment::new(0.0, 0.0, 0.0, 32.0, 1.0),
            GridLineSegment::new(32.0, 0.0, 32.0, 32.0, 0.0),
            GridLineSegment::new(0.0, 0.0, 32.0, 0.0, 0.05),
        ];
        let mut sink = RecordingSink::default();

        let drawn = draw_overlay(&mut sink, &lines, Color::new(1.0, 1.0, 1.0, 0.5))
            .expect("recording never fails");

        assert_eq!(drawn, 2);
        assert_eq!(sink.lines.len(), 2);
        assert_eq!(sink.lines[0].0, Vec2::ZERO);
        assert_eq!(sink.lines[0].1, Vec2::new(0.0, 32.0));
        assert_eq!(sink.lines[0].2.alpha, 0.5);
        assert!((sink.lines[1].2.alpha - 0.025).abs() < 1e-6);
    }

    #[test]
    fn minimum_opacity_is_visible() {
        assert!(!is_invisible(0.05));
        assert!(is_invisible(0.0));
        assert!(is_invisible(-0.1));
    }

    #[test]
    fn draw_overlay_reports_sink_failures() {
        let lines = [GridLineSegment::new(0.0, 0.0, 0.0, 32.0, 1.0)];

        let error = draw_overlay(&mut FailingSink, &lines, Color::GRID)
            .expect_err("failing sink must surface an error");

        assert!(error.to_string().contains("failed to draw grid line"));
    }

    #[test]
    fn world_positions_floor_to_tiles() {
        assert_eq!(
            tile_at_world_position(Vec2::new(40.0, 70.0), 32.0),
            Some(TileCoord::new(1, 2))
        );
        assert_eq!(
            tile_at_world_position(Vec2::new(-0.5, 0.0), 32.0),
            Some(TileCoord::new(-1, 0))
        );
        assert_eq!(tile_at_world_position(Vec2::new(1.0, 1.0), 0.0), None);
        assert_eq!(tile_at_world_position(Vec2::new(f32::NAN, 1.0), 32.0), None);
        assert_eq!(tile_at_world_position(Vec2::new(1.0e12, 1.0), 1.0), None);
    }

    #[test]
    fn tile_origin_inverts_tile_lookup() {
        let coord = TileCoord::new(-3, 7);
        let origin = tile_origin_world_position(coord, 16.0);

        assert_eq!(origin, Vec2::new(-48.0, 112.0));
        assert_eq!(tile_at_world_position(origin, 16.0), Some(coord));
    }

    #[test]
    fn tile_colors_convert_to_opaque_colors() {
        let color = Color::from(TileColor::from_rgb(255, 0, 51));

        assert_eq!(color, Color::new(1.0, 0.0, 0.2, 1.0));
    }

    #[test]
    fn painted_tile_color_reaches_the_renderer() {
        let tile = TerrainTile::new(TileCoord::new(2, 5), "stone")
            .with_color(TileColor::from_rgb(0, 255, 0));
        let plain = TerrainTile::new(tile.coord(), "stone");
        let color = tile.color().map(Color::from);

        assert_eq!(color, Some(Color::new(0.0, 1.0, 0.0, 1.0)));
        assert_eq!(tile.material(), plain.material());
        assert_eq!(plain.color(), None);
    }
}
