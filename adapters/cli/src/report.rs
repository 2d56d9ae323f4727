use std::io::Write;

use anyhow::{Context, Result};
use glam::Vec2;
use serde::Serialize;
use tile_editor_core::{GridLineSegment, TileBounds};
use tile_editor_rendering::{draw_overlay, is_invisible, Color, LineSink};
use tile_editor_system_grid_overlay::DynamicGridOverlay;
use tile_editor_system_pathmap::{PathMap, PathNode, LIQUID_WEIGHT, ORGANIC_WEIGHT};

use crate::args::OutputFormat;

#[derive(Serialize)]
struct PathMapReport<'a> {
    width: u32,
    height: u32,
    blocked: usize,
    nodes: &'a [PathNode],
}

#[derive(Serialize)]
struct OverlayReport<'a> {
    state: String,
    region: Option<TileBounds>,
    visible: usize,
    lines: &'a [GridLineSegment],
}

/// Writes the weight grid, one glyph per node in text mode.
///
/// Non-finite weights serialize as `null` in JSON.
pub(crate) fn write_pathmap<W>(out: &mut W, map: &PathMap, format: OutputFormat) -> Result<()>
where
    W: Write,
{
    let extent = map.extent();
    match format {
        OutputFormat::Json => {
            let report = PathMapReport {
                width: extent.width(),
                height: extent.height(),
                blocked: map.blocked_count(),
                nodes: map.nodes(),
            };
            serde_json::to_writer_pretty(&mut *out, &report)
                .context("failed to serialise path map")?;
            writeln!(out).context("failed to write path map")
        }
        OutputFormat::Text => {
            writeln!(
                out,
                "pathmap {}x{} ({} blocked)",
                extent.width(),
                extent.height(),
                map.blocked_count()
            )
            .context("failed to write path map")?;
            for y in 0..extent.height() {
                let row = (0..extent.width())
                    .map(|x| map.weight(x, y).map_or('?', weight_glyph))
                    .collect::<String>();
                writeln!(out, "{row}").context("failed to write path map")?;
            }
            Ok(())
        }
    }
}

fn weight_glyph(weight: f32) -> char {
    if !weight.is_finite() {
        '#'
    } else if weight >= LIQUID_WEIGHT {
        '~'
    } else if weight > ORGANIC_WEIGHT {
        ':'
    } else {
        '.'
    }
}

/// Writes the overlay produced by the latest update.
pub(crate) fn write_overlay<W>(
    out: &mut W,
    overlay: &DynamicGridOverlay,
    format: OutputFormat,
) -> Result<()>
where
    W: Write,
{
    let lines = overlay.grid_lines();
    match format {
        OutputFormat::Json => {
            let report = OverlayReport {
                state: format!("{:?}", overlay.state()),
                region: overlay.region(),
                visible: lines.iter().filter(|line| !is_invisible(line.opacity)).count(),
                lines,
            };
            serde_json::to_writer_pretty(&mut *out, &report)
                .context("failed to serialise overlay")?;
            writeln!(out).context("failed to write overlay")
        }
        OutputFormat::Text => {
            writeln!(out, "state: {:?}", overlay.state()).context("failed to write overlay")?;
            match overlay.region() {
                Some(region) => writeln!(
                    out,
                    "region: x {}..={} y {}..={}",
                    region.min_x(),
                    region.max_x(),
                    region.min_y(),
                    region.max_y()
                ),
                None => writeln!(out, "region: none"),
            }
            .context("failed to write overlay")?;

            let mut sink = TextSink { out: &mut *out };
            let drawn = draw_overlay(&mut sink, lines, Color::GRID)?;
            writeln!(out, "lines: {drawn}").context("failed to write overlay")
        }
    }
}

/// Line sink that prints each segment instead of rasterizing it.
struct TextSink<'a, W> {
    out: &'a mut W,
}

impl<W> LineSink for TextSink<'_, W>
where
    W: Write,
{
    fn draw_line(&mut self, from: Vec2, to: Vec2, color: Color) -> Result<()> {
        writeln!(
            self.out,
            "({}, {}) -> ({}, {}) alpha {:.3}",
            from.x, from.y, to.x, to.y, color.alpha
        )
        .context("failed to write grid line")
    }
}
