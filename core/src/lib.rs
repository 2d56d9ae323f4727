#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the tile editor.
//!
//! This crate defines the vocabulary that connects terrain stores, the
//! derivation systems, and adapters. Stores own [`TerrainTile`] values keyed
//! by [`TileCoord`], expose them through the [`TerrainAdapter`] read contract
//! (consumed by pathfinding) and the [`PaintedTerrain`] contract (consumed by
//! the grid overlay), and stamp every mutation with a fresh [`Revision`] so
//! derived caches can tell when they went stale.

use std::{
    borrow::Cow,
    cmp::Ordering,
    fmt,
    sync::atomic::{AtomicU64, Ordering as AtomicOrdering},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Logical grid coordinate of a tile, measured in whole tiles.
///
/// Sparse terrain is unbounded, so both axes are signed. Coordinates order
/// row-major: by `y` first, then by `x`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    x: i32,
    y: i32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column of the tile.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row of the tile.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the coordinate shifted by the provided deltas, saturating at the
    /// numeric limits.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// Euclidean distance between two coordinates measured in tiles.
    #[must_use]
    pub fn distance(self, other: TileCoord) -> f32 {
        let dx = (i64::from(self.x) - i64::from(other.x)) as f64;
        let dy = (i64::from(self.y) - i64::from(other.y)) as f64;
        (dx * dx + dy * dy).sqrt() as f32
    }

    /// Squared Euclidean distance, exact for every pair of coordinates.
    #[must_use]
    pub fn distance_squared(self, other: TileCoord) -> u64 {
        let dx = i64::from(self.x).abs_diff(i64::from(other.x));
        let dy = i64::from(self.y).abs_diff(i64::from(other.y));
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
    }
}

impl Ord for TileCoord {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for TileCoord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Inclusive axis-aligned rectangle of tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileBounds {
    min_x: i32,
    max_x: i32,
    min_y: i32,
    max_y: i32,
}

impl TileBounds {
    /// Creates bounds from inclusive extremes. Reversed pairs are swapped.
    #[must_use]
    pub fn new(min_x: i32, max_x: i32, min_y: i32, max_y: i32) -> Self {
        Self {
            min_x: min_x.min(max_x),
            max_x: min_x.max(max_x),
            min_y: min_y.min(max_y),
            max_y: min_y.max(max_y),
        }
    }

    /// Bounds covering exactly one tile.
    #[must_use]
    pub const fn single(coord: TileCoord) -> Self {
        Self {
            min_x: coord.x,
            max_x: coord.x,
            min_y: coord.y,
            max_y: coord.y,
        }
    }

    /// Square bounds of `radius` tiles on each side of `center`.
    #[must_use]
    pub fn around(center: TileCoord, radius: i32) -> Self {
        Self::single(center).expand(radius)
    }

    /// Smallest bounds containing every provided coordinate, if any.
    #[must_use]
    pub fn enclosing<I>(coords: I) -> Option<Self>
    where
        I: IntoIterator<Item = TileCoord>,
    {
        coords.into_iter().fold(None, |bounds, coord| {
            Some(match bounds {
                Some(bounds) => bounds.include(coord),
                None => Self::single(coord),
            })
        })
    }

    /// Smallest column covered by the bounds.
    #[must_use]
    pub const fn min_x(&self) -> i32 {
        self.min_x
    }

    /// Largest column covered by the bounds.
    #[must_use]
    pub const fn max_x(&self) -> i32 {
        self.max_x
    }

    /// Smallest row covered by the bounds.
    #[must_use]
    pub const fn min_y(&self) -> i32 {
        self.min_y
    }

    /// Largest row covered by the bounds.
    #[must_use]
    pub const fn max_y(&self) -> i32 {
        self.max_y
    }

    /// Upper-left tile of the bounds.
    #[must_use]
    pub const fn origin(&self) -> TileCoord {
        TileCoord::new(self.min_x, self.min_y)
    }

    /// Number of tile columns covered.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.max_x.abs_diff(self.min_x).saturating_add(1)
    }

    /// Number of tile rows covered.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.max_y.abs_diff(self.min_y).saturating_add(1)
    }

    /// Reports whether the coordinate lies inside the bounds.
    #[must_use]
    pub const fn contains(&self, coord: TileCoord) -> bool {
        coord.x >= self.min_x
            && coord.x <= self.max_x
            && coord.y >= self.min_y
            && coord.y <= self.max_y
    }

    /// Reports whether the coordinate lies on one of the four bounding edges.
    #[must_use]
    pub const fn touches_edge(&self, coord: TileCoord) -> bool {
        coord.x == self.min_x
            || coord.x == self.max_x
            || coord.y == self.min_y
            || coord.y == self.max_y
    }

    /// Grows the bounds so they include the coordinate.
    #[must_use]
    pub fn include(self, coord: TileCoord) -> Self {
        Self {
            min_x: self.min_x.min(coord.x),
            max_x: self.max_x.max(coord.x),
            min_y: self.min_y.min(coord.y),
            max_y: self.max_y.max(coord.y),
        }
    }

    /// Expands the bounds by `by` tiles on all four sides.
    #[must_use]
    pub fn expand(self, by: i32) -> Self {
        Self::new(
            self.min_x.saturating_sub(by),
            self.max_x.saturating_add(by),
            self.min_y.saturating_sub(by),
            self.max_y.saturating_add(by),
        )
    }

    /// Axis-aligned bounding rectangle of both bounds.
    #[must_use]
    pub fn union(self, other: TileBounds) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            max_x: self.max_x.max(other.max_x),
            min_y: self.min_y.min(other.min_y),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Overlapping area of both bounds, if they overlap.
    #[must_use]
    pub fn intersection(self, other: TileBounds) -> Option<Self> {
        let min_x = self.min_x.max(other.min_x);
        let max_x = self.max_x.min(other.max_x);
        let min_y = self.min_y.max(other.min_y);
        let max_y = self.max_y.min(other.max_y);

        if min_x > max_x || min_y > max_y {
            return None;
        }

        Some(Self {
            min_x,
            max_x,
            min_y,
            max_y,
        })
    }

    /// Iterates every covered coordinate in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = TileCoord> {
        let (min_x, max_x) = (self.min_x, self.max_x);
        (self.min_y..=self.max_y)
            .flat_map(move |y| (min_x..=max_x).map(move |x| TileCoord::new(x, y)))
    }
}

/// Addressable tile-count range reported by a [`TerrainAdapter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Extent {
    width: u32,
    height: u32,
}

impl Extent {
    /// Creates a new extent.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of addressable columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of addressable rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the extent addresses no tiles at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Total number of addressable tiles, or `None` when it overflows `usize`.
    #[must_use]
    pub fn area(&self) -> Option<usize> {
        let width = usize::try_from(self.width).ok()?;
        let height = usize::try_from(self.height).ok()?;
        width.checked_mul(height)
    }

    /// Reports whether the coordinate lies within `[0, width) x [0, height)`.
    #[must_use]
    pub fn contains(&self, coord: TileCoord) -> bool {
        u32::try_from(coord.x).map_or(false, |x| x < self.width)
            && u32::try_from(coord.y).map_or(false, |y| y < self.height)
    }

    /// Row-major linear index of the coordinate, `y * width + x`.
    ///
    /// Returns `None` outside the extent.
    #[must_use]
    pub fn row_major_index(&self, coord: TileCoord) -> Option<usize> {
        if !self.contains(coord) {
            return None;
        }

        let x = usize::try_from(coord.x).ok()?;
        let y = usize::try_from(coord.y).ok()?;
        let width = usize::try_from(self.width).ok()?;
        y.checked_mul(width)?.checked_add(x)
    }
}

/// Movement class every material identifier normalizes into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialClass {
    /// Walkable organic ground such as grass or dirt.
    Organic,
    /// Traversable but costly liquid such as water.
    Liquid,
    /// Impassable solid terrain such as stone.
    Solid,
    /// Loose ground such as sand.
    Loose,
    /// Material the editor does not recognise.
    Unrecognized,
}

impl MaterialClass {
    /// Legacy numeric code producers use for the class.
    #[must_use]
    pub const fn legacy_code(self) -> Option<u32> {
        match self {
            Self::Organic => Some(0),
            Self::Liquid => Some(1),
            Self::Solid => Some(2),
            Self::Loose => Some(3),
            Self::Unrecognized => None,
        }
    }

    fn from_code(code: u32) -> Self {
        match code {
            0 => Self::Organic,
            1 => Self::Liquid,
            2 => Self::Solid,
            3 => Self::Loose,
            _ => Self::Unrecognized,
        }
    }

    fn from_name(name: &str) -> Self {
        let name = name.trim();
        if let Ok(code) = name.parse::<u32>() {
            return Self::from_code(code);
        }

        const NAMES: [(&str, MaterialClass); 5] = [
            ("grass", MaterialClass::Organic),
            ("dirt", MaterialClass::Organic),
            ("water", MaterialClass::Liquid),
            ("stone", MaterialClass::Solid),
            ("sand", MaterialClass::Loose),
        ];

        NAMES
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(name))
            .map_or(Self::Unrecognized, |(_, class)| *class)
    }
}

/// Material identifier as written by terrain producers.
///
/// Legacy producers emit numeric type codes while newer ones emit names; both
/// forms are accepted and normalized through [`MaterialId::class`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MaterialId {
    /// Numeric legacy type code, e.g. `2` for stone.
    Code(u32),
    /// Symbolic material name, e.g. `"stone"`.
    Name(String),
}

impl MaterialId {
    /// Creates a named material identifier.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Normalizes the identifier into its movement class.
    #[must_use]
    pub fn class(&self) -> MaterialClass {
        match self {
            Self::Code(code) => MaterialClass::from_code(*code),
            Self::Name(name) => MaterialClass::from_name(name),
        }
    }
}

impl From<u32> for MaterialId {
    fn from(code: u32) -> Self {
        Self::Code(code)
    }
}

impl From<&str> for MaterialId {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<String> for MaterialId {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl fmt::Display for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "{code}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// Display-only tint attached to a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl TileColor {
    /// Creates a new tile color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Single terrain cell placed at a logical coordinate.
///
/// Tiles are immutable once placed; repainting replaces the whole tile.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TerrainTile {
    coord: TileCoord,
    material: MaterialId,
    color: Option<TileColor>,
}

impl TerrainTile {
    /// Creates an uncolored tile.
    #[must_use]
    pub fn new(coord: TileCoord, material: impl Into<MaterialId>) -> Self {
        Self {
            coord,
            material: material.into(),
            color: None,
        }
    }

    /// Returns the tile with the provided display color attached.
    #[must_use]
    pub fn with_color(mut self, color: TileColor) -> Self {
        self.color = Some(color);
        self
    }

    /// Logical coordinate of the tile.
    #[must_use]
    pub const fn coord(&self) -> TileCoord {
        self.coord
    }

    /// Column of the tile.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.coord.x
    }

    /// Row of the tile.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.coord.y
    }

    /// Material identifier as provided by the producer.
    #[must_use]
    pub const fn material(&self) -> &MaterialId {
        &self.material
    }

    /// Optional display color.
    #[must_use]
    pub const fn color(&self) -> Option<TileColor> {
        self.color
    }

    /// Movement class of the tile's material.
    #[must_use]
    pub fn class(&self) -> MaterialClass {
        self.material.class()
    }
}

/// Overlay line segment in world (pixel) space with its feathered opacity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridLineSegment {
    /// Horizontal coordinate of the first endpoint.
    pub x1: f32,
    /// Vertical coordinate of the first endpoint.
    pub y1: f32,
    /// Horizontal coordinate of the second endpoint.
    pub x2: f32,
    /// Vertical coordinate of the second endpoint.
    pub y2: f32,
    /// Opacity in the range `MIN_OPACITY..=1.0`.
    pub opacity: f32,
}

impl GridLineSegment {
    /// Creates a new segment descriptor.
    #[must_use]
    pub const fn new(x1: f32, y1: f32, x2: f32, y2: f32, opacity: f32) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            opacity,
        }
    }

    /// Reports whether the segment runs parallel to the vertical axis.
    #[must_use]
    pub fn is_vertical(&self) -> bool {
        self.x1 == self.x2
    }
}

static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

/// Process-unique stamp identifying one state of a terrain store.
///
/// Stores take a fresh stamp on creation and on every mutation, so two
/// observations with equal revisions always saw identical terrain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Revision(u64);

impl Revision {
    /// Allocates a stamp that no other store state has used.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_REVISION.fetch_add(1, AtomicOrdering::Relaxed))
    }

    /// Retrieves the numeric representation of the stamp.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Uniform read contract over a concrete terrain store.
///
/// Adapter space always spans `[0, width) x [0, height)` as reported by
/// [`TerrainAdapter::extent`].
pub trait TerrainAdapter {
    /// Addressable tile range of the adapter.
    fn extent(&self) -> Extent;

    /// Tile at the adapter coordinate.
    ///
    /// Returns `None` only outside the extent or where terrain is absent;
    /// a tile whose material is impassable is still returned.
    fn tile_at(&self, coord: TileCoord) -> Option<Cow<'_, TerrainTile>>;

    /// Linear index of the coordinate in a row-major layout of the extent.
    fn index_of(&self, coord: TileCoord) -> Option<usize>;
}

/// Read contract over the painted cells of a terrain store.
pub trait PaintedTerrain {
    /// Axis-aligned extremes of every painted cell, or `None` when nothing is
    /// painted.
    fn painted_bounds(&self) -> Option<TileBounds>;

    /// Painted tile at the logical coordinate, if any.
    fn painted_tile(&self, coord: TileCoord) -> Option<&TerrainTile>;

    /// Every painted tile in row-major coordinate order.
    fn painted_tiles(&self) -> impl Iterator<Item = &TerrainTile>;

    /// Stamp of the current store state.
    fn revision(&self) -> Revision;
}

/// Configuration failures raised while constructing an adapter.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum AdapterError {
    /// The sparse store has no painted tiles and no explicit extent was given.
    #[error("sparse terrain has no painted tiles and no explicit extent was configured")]
    UndeterminableExtent,
    /// The configured extent addresses no tiles.
    #[error("adapter extent {width}x{height} addresses no tiles")]
    EmptyExtent {
        /// Configured width.
        width: u32,
        /// Configured height.
        height: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_named_materials_share_a_class() {
        let pairs = [
            (0_u32, "grass", MaterialClass::Organic),
            (1, "water", MaterialClass::Liquid),
            (2, "stone", MaterialClass::Solid),
            (3, "sand", MaterialClass::Loose),
        ];

        for (code, name, class) in pairs {
            assert_eq!(MaterialId::from(code).class(), class);
            assert_eq!(MaterialId::from(name).class(), class);
            assert_eq!(class.legacy_code(), Some(code));
        }
    }

    #[test]
    fn material_names_ignore_case_and_whitespace() {
        assert_eq!(MaterialId::from(" Stone ").class(), MaterialClass::Solid);
        assert_eq!(MaterialId::from("DIRT").class(), MaterialClass::Organic);
        assert_eq!(MaterialId::from("2").class(), MaterialClass::Solid);
    }

    #[test]
    fn unknown_materials_are_unrecognized() {
        assert_eq!(MaterialId::from("lava").class(), MaterialClass::Unrecognized);
        assert_eq!(MaterialId::from(42_u32).class(), MaterialClass::Unrecognized);
    }

    #[test]
    fn material_id_deserializes_from_number_or_string() {
        let code: MaterialId = serde_json::from_str("2").expect("numeric code");
        let name: MaterialId = serde_json::from_str("\"water\"").expect("material name");

        assert_eq!(code, MaterialId::Code(2));
        assert_eq!(name, MaterialId::named("water"));
    }

    #[test]
    fn tile_coords_order_row_major() {
        let mut coords = vec![
            TileCoord::new(1, 1),
            TileCoord::new(0, 1),
            TileCoord::new(5, 0),
        ];
        coords.sort();

        assert_eq!(
            coords,
            vec![
                TileCoord::new(5, 0),
                TileCoord::new(0, 1),
                TileCoord::new(1, 1)
            ]
        );
    }

    #[test]
    fn distance_is_euclidean() {
        let origin = TileCoord::new(0, 0);
        assert!((origin.distance(TileCoord::new(3, 4)) - 5.0).abs() < f32::EPSILON);
        assert_eq!(origin.distance_squared(TileCoord::new(-3, 4)), 25);
    }

    #[test]
    fn bounds_expand_union_and_intersect() {
        let bounds = TileBounds::new(0, 5, 0, 5).expand(2);
        assert_eq!(bounds, TileBounds::new(-2, 7, -2, 7));

        let hover = TileBounds::around(TileCoord::new(12, 3), 2);
        assert_eq!(bounds.union(hover), TileBounds::new(-2, 14, -2, 7));

        assert_eq!(
            bounds.intersection(TileBounds::new(6, 20, 6, 20)),
            Some(TileBounds::new(6, 7, 6, 7))
        );
        assert_eq!(bounds.intersection(TileBounds::new(8, 9, 0, 0)), None);
    }

    #[test]
    fn bounds_normalize_reversed_extremes() {
        let bounds = TileBounds::new(4, -1, 3, 2);
        assert_eq!(bounds.min_x(), -1);
        assert_eq!(bounds.max_x(), 4);
        assert_eq!(bounds.width(), 6);
        assert_eq!(bounds.height(), 2);
    }

    #[test]
    fn enclosing_bounds_cover_every_coordinate() {
        let bounds = TileBounds::enclosing([
            TileCoord::new(3, -2),
            TileCoord::new(-1, 4),
            TileCoord::new(0, 0),
        ]);
        assert_eq!(bounds, Some(TileBounds::new(-1, 3, -2, 4)));
        assert_eq!(TileBounds::enclosing(std::iter::empty()), None);
    }

    #[test]
    fn bounds_iterate_row_major() {
        let coords: Vec<_> = TileBounds::new(0, 1, 0, 1).coords().collect();
        assert_eq!(
            coords,
            vec![
                TileCoord::new(0, 0),
                TileCoord::new(1, 0),
                TileCoord::new(0, 1),
                TileCoord::new(1, 1),
            ]
        );
    }

    #[test]
    fn extent_indexes_row_major_within_range() {
        let extent = Extent::new(4, 3);
        for y in 0..3 {
            for x in 0..4 {
                let index = extent.row_major_index(TileCoord::new(x, y));
                assert_eq!(index, Some((y * 4 + x) as usize));
            }
        }
        assert_eq!(extent.row_major_index(TileCoord::new(4, 0)), None);
        assert_eq!(extent.row_major_index(TileCoord::new(0, -1)), None);
    }

    #[test]
    fn revisions_are_unique() {
        let first = Revision::next();
        let second = Revision::next();
        assert_ne!(first, second);
        assert!(second > first);
    }

    #[test]
    fn adapter_errors_describe_the_configuration() {
        let message = AdapterError::EmptyExtent {
            width: 0,
            height: 7,
        }
        .to_string();
        assert!(message.contains("0x7"));
    }
}
