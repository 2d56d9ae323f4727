use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use thiserror::Error;
use tile_editor_core::{Extent, MaterialId, TileBounds, TileCoord};

const FIELD_DELIMITER: char = ',';

/// Largest overlay padding accepted from flags or configuration.
pub(crate) const MAX_BUFFER: u32 = 64;

/// Builds terrain from the command line and prints what the editor derives from it.
#[derive(Debug, Parser)]
#[command(name = "tile-editor", version, about)]
pub(crate) struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true, value_name = "PATH")]
    pub(crate) config: Option<PathBuf>,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Print the pathfinding weight grid of the terrain.
    Pathmap(TerrainArgs),
    /// Print the feathered grid overlay of the terrain.
    Overlay(OverlayArgs),
}

impl Command {
    pub(crate) fn terrain(&self) -> &TerrainArgs {
        match self {
            Self::Pathmap(terrain) => terrain,
            Self::Overlay(overlay) => &overlay.terrain,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum StoreKind {
    /// Hash-keyed store holding only painted tiles.
    Sparse,
    /// Chunked store covering a fixed extent.
    Dense,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Args)]
pub(crate) struct TerrainArgs {
    /// Terrain store backing the run.
    #[arg(long, value_enum, default_value_t = StoreKind::Sparse)]
    pub(crate) store: StoreKind,
    /// Paint a tile, e.g. `--paint 3,4,stone` or `--paint 3,4,2`.
    #[arg(
        long = "paint",
        value_name = "X,Y,MATERIAL",
        value_parser = parse_paint,
        allow_hyphen_values = true
    )]
    pub(crate) paints: Vec<PaintSpec>,
    /// Erase a painted tile after all paints are applied (sparse store only).
    #[arg(
        long = "erase",
        value_name = "X,Y",
        value_parser = parse_coord,
        allow_hyphen_values = true
    )]
    pub(crate) erases: Vec<TileCoord>,
    /// Explicit sparse adapter extent anchored at the origin.
    #[arg(long, value_name = "WxH", value_parser = parse_extent)]
    pub(crate) extent: Option<Extent>,
    /// Material reported for unpainted sparse tiles.
    #[arg(long, value_name = "MATERIAL", value_parser = parse_material)]
    pub(crate) default_material: Option<MaterialId>,
    /// Tile side length in pixels.
    #[arg(long)]
    pub(crate) tile_size: Option<f32>,
    /// Dense store chunk side length in tiles.
    #[arg(long)]
    pub(crate) chunk_size: Option<u32>,
    /// Dense store chunk columns.
    #[arg(long)]
    pub(crate) chunks_x: Option<u32>,
    /// Dense store chunk rows.
    #[arg(long)]
    pub(crate) chunks_y: Option<u32>,
    /// Material every dense tile starts with.
    #[arg(long, value_name = "MATERIAL", value_parser = parse_material)]
    pub(crate) fill: Option<MaterialId>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
}

#[derive(Debug, Args)]
pub(crate) struct OverlayArgs {
    #[command(flatten)]
    pub(crate) terrain: TerrainArgs,
    /// Tile under the cursor.
    #[arg(
        long,
        value_name = "X,Y",
        value_parser = parse_coord,
        allow_hyphen_values = true
    )]
    pub(crate) hover: Option<TileCoord>,
    /// Only emit lines inside this inclusive tile rectangle.
    #[arg(
        long,
        value_name = "MIN_X,MIN_Y,MAX_X,MAX_Y",
        value_parser = parse_viewport,
        allow_hyphen_values = true
    )]
    pub(crate) viewport: Option<TileBounds>,
    /// Padding in tiles around painted terrain and the hover tile.
    #[arg(
        long,
        value_parser = clap::value_parser!(u32).range(..=i64::from(MAX_BUFFER))
    )]
    pub(crate) buffer: Option<u32>,
    /// Distance in tiles over which the grid fades.
    #[arg(long)]
    pub(crate) fade_distance: Option<f32>,
    /// Opacity floor of the grid.
    #[arg(long)]
    pub(crate) min_opacity: Option<f32>,
}

/// A `--paint` request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct PaintSpec {
    pub(crate) coord: TileCoord,
    pub(crate) material: MaterialId,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ArgError {
    #[error("expected `X,Y` tile coordinates, got `{0}`")]
    InvalidCoord(String),
    #[error("expected `X,Y,MATERIAL`, got `{0}`")]
    InvalidPaint(String),
    #[error("expected `WIDTHxHEIGHT` with positive dimensions, got `{0}`")]
    InvalidExtent(String),
    #[error("expected `MIN_X,MIN_Y,MAX_X,MAX_Y`, got `{0}`")]
    InvalidViewport(String),
    #[error("material must not be empty")]
    EmptyMaterial,
}

/// Numeric materials become legacy codes, anything else a name.
pub(crate) fn parse_material(value: &str) -> Result<MaterialId, ArgError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ArgError::EmptyMaterial);
    }
    Ok(trimmed
        .parse::<u32>()
        .map_or_else(|_| MaterialId::named(trimmed), MaterialId::Code))
}

pub(crate) fn parse_coord(value: &str) -> Result<TileCoord, ArgError> {
    let invalid = || ArgError::InvalidCoord(value.to_owned());
    let (x, y) = value.split_once(FIELD_DELIMITER).ok_or_else(invalid)?;
    let x = parse_axis(x).ok_or_else(invalid)?;
    let y = parse_axis(y).ok_or_else(invalid)?;
    Ok(TileCoord::new(x, y))
}

pub(crate) fn parse_paint(value: &str) -> Result<PaintSpec, ArgError> {
    let invalid = || ArgError::InvalidPaint(value.to_owned());
    let mut fields = value.splitn(3, FIELD_DELIMITER);
    let x = fields.next().and_then(parse_axis).ok_or_else(invalid)?;
    let y = fields.next().and_then(parse_axis).ok_or_else(invalid)?;
    let material = fields
        .next()
        .ok_or_else(invalid)
        .and_then(|material| parse_material(material).map_err(|_| invalid()))?;

    Ok(PaintSpec {
        coord: TileCoord::new(x, y),
        material,
    })
}

pub(crate) fn parse_extent(value: &str) -> Result<Extent, ArgError> {
    let invalid = || ArgError::InvalidExtent(value.to_owned());
    let (width, height) = value.split_once(['x', 'X']).ok_or_else(invalid)?;
    let width = width.trim().parse::<u32>().map_err(|_| invalid())?;
    let height = height.trim().parse::<u32>().map_err(|_| invalid())?;

    if width == 0 || height == 0 {
        return Err(invalid());
    }

    Ok(Extent::new(width, height))
}

pub(crate) fn parse_viewport(value: &str) -> Result<TileBounds, ArgError> {
    let invalid = || ArgError::InvalidViewport(value.to_owned());
    let fields = value
        .split(FIELD_DELIMITER)
        .map(parse_axis)
        .collect::<Option<Vec<_>>>()
        .ok_or_else(invalid)?;
    let [min_x, min_y, max_x, max_y] = fields.as_slice() else {
        return Err(invalid());
    };

    Ok(TileBounds::new(*min_x, *max_x, *min_y, *max_y))
}

fn parse_axis(value: &str) -> Option<i32> {
    value.trim().parse().ok()
}
