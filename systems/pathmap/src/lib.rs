#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that derives pathfinding weights from terrain.
//!
//! [`PathMap::build`] walks a [`TerrainAdapter`] once in row-major order and
//! produces an immutable node per coordinate. The map has no incremental
//! update path: callers rebuild it after terrain edits. How the nodes are
//! searched is up to the consumer; adjacency is implicit in the grid.

use serde::Serialize;
use thiserror::Error;
use tile_editor_core::{Extent, MaterialClass, MaterialId, TerrainAdapter, TileCoord};
use tracing::debug;

/// Cost of crossing walkable organic ground.
pub const ORGANIC_WEIGHT: f32 = 1.0;
/// Cost of wading through liquid.
pub const LIQUID_WEIGHT: f32 = 3.0;
/// Cost of solid terrain, which cannot be crossed.
pub const SOLID_WEIGHT: f32 = f32::INFINITY;
/// Cost of crossing loose ground.
pub const LOOSE_WEIGHT: f32 = 1.2;
/// Cost assumed for materials outside the table.
pub const UNRECOGNIZED_WEIGHT: f32 = 1.0;
/// Cost of coordinates without terrain.
pub const ABSENT_WEIGHT: f32 = f32::INFINITY;

/// Movement cost of a material class.
#[must_use]
pub const fn weight_for(class: MaterialClass) -> f32 {
    match class {
        MaterialClass::Organic => ORGANIC_WEIGHT,
        MaterialClass::Liquid => LIQUID_WEIGHT,
        MaterialClass::Solid => SOLID_WEIGHT,
        MaterialClass::Loose => LOOSE_WEIGHT,
        MaterialClass::Unrecognized => UNRECOGNIZED_WEIGHT,
    }
}

/// Movement cost of a material identifier in either representation.
#[must_use]
pub fn material_weight(material: &MaterialId) -> f32 {
    weight_for(material.class())
}

/// Weighted node at an adapter coordinate.
///
/// Weights are positive and finite, or `f32::INFINITY` for impassable nodes.
/// Serializers that cannot express infinity (JSON) write it as `null`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PathNode {
    x: u32,
    y: u32,
    weight: f32,
}

impl PathNode {
    /// Column of the node in adapter space.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Row of the node in adapter space.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Movement cost of entering the node.
    #[must_use]
    pub const fn weight(&self) -> f32 {
        self.weight
    }

    /// Reports whether the node can be entered at all.
    #[must_use]
    pub fn is_passable(&self) -> bool {
        self.weight.is_finite()
    }
}

/// Errors that stop a path map from being built.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum PathMapError {
    /// The adapter extent cannot be addressed in memory or in tile coordinates.
    #[error("adapter extent {width}x{height} is too large to build a path map")]
    ExtentTooLarge {
        /// Reported width.
        width: u32,
        /// Reported height.
        height: u32,
    },
    /// The adapter could not convert an in-range coordinate to an index.
    #[error("adapter provides no index for in-range coordinate ({x}, {y})")]
    MissingIndexConversion {
        /// Column of the coordinate.
        x: u32,
        /// Row of the coordinate.
        y: u32,
    },
    /// The adapter's index conversion is not row-major.
    #[error("adapter maps ({x}, {y}) to index {actual}, expected row-major index {expected}")]
    NonRowMajorIndex {
        /// Column of the coordinate.
        x: u32,
        /// Row of the coordinate.
        y: u32,
        /// Row-major index.
        expected: usize,
        /// Index reported by the adapter.
        actual: usize,
    },
}

/// Immutable weight grid stored in row-major order.
#[derive(Clone, Debug, PartialEq)]
pub struct PathMap {
    extent: Extent,
    nodes: Vec<PathNode>,
}

impl PathMap {
    /// Builds the weight grid for every coordinate of the adapter's extent.
    ///
    /// Coordinates the adapter reports as absent are impassable. Unknown
    /// materials take [`UNRECOGNIZED_WEIGHT`].
    pub fn build<A>(adapter: &A) -> Result<Self, PathMapError>
    where
        A: TerrainAdapter + ?Sized,
    {
        let extent = adapter.extent();
        let too_large = PathMapError::ExtentTooLarge {
            width: extent.width(),
            height: extent.height(),
        };
        let len = extent.area().ok_or(too_large)?;
        if i32::try_from(extent.width()).is_err() || i32::try_from(extent.height()).is_err() {
            return Err(too_large);
        }

        let mut nodes = Vec::with_capacity(len);
        let mut blocked = 0_usize;
        for y in 0..extent.height() {
            for x in 0..extent.width() {
                let coord = TileCoord::new(x as i32, y as i32);
                let expected = nodes.len();
                match adapter.index_of(coord) {
                    None => return Err(PathMapError::MissingIndexConversion { x, y }),
                    Some(actual) if actual != expected => {
                        return Err(PathMapError::NonRowMajorIndex {
                            x,
                            y,
                            expected,
                            actual,
                        })
                    }
                    Some(_) => {}
                }

                let weight = adapter
                    .tile_at(coord)
                    .map_or(ABSENT_WEIGHT, |tile| weight_for(tile.class()));
                if !weight.is_finite() {
                    blocked += 1;
                }
                nodes.push(PathNode { x, y, weight });
            }
        }

        debug!(
            width = extent.width(),
            height = extent.height(),
            blocked,
            "built path map"
        );

        Ok(Self { extent, nodes })
    }

    /// Extent the map was built over.
    #[must_use]
    pub const fn extent(&self) -> Extent {
        self.extent
    }

    /// Number of nodes, always `width * height`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Reports whether the map holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in row-major order; node `(x, y)` sits at `y * width + x`.
    #[must_use]
    pub fn nodes(&self) -> &[PathNode] {
        &self.nodes
    }

    /// Node at the coordinate, if it lies within the extent.
    #[must_use]
    pub fn node(&self, x: u32, y: u32) -> Option<&PathNode> {
        let coord = TileCoord::new(i32::try_from(x).ok()?, i32::try_from(y).ok()?);
        self.extent
            .row_major_index(coord)
            .and_then(|index| self.nodes.get(index))
    }

    /// Weight at the coordinate, if it lies within the extent.
    #[must_use]
    pub fn weight(&self, x: u32, y: u32) -> Option<f32> {
        self.node(x, y).map(PathNode::weight)
    }

    /// Reports whether the coordinate lies within the extent and can be entered.
    #[must_use]
    pub fn is_passable(&self, x: u32, y: u32) -> bool {
        self.node(x, y).map_or(false, PathNode::is_passable)
    }

    /// Number of impassable nodes.
    #[must_use]
    pub fn blocked_count(&self) -> usize {
        self.nodes.iter().filter(|node| !node.is_passable()).count()
    }
}
