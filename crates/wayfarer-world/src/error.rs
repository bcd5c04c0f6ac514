//! Error types for the `wayfarer-world` crate.
//!
//! Every variant here is an invariant violation: a correctly generated grid
//! and a complete terrain catalog never produce one at runtime.

use wayfarer_types::{Coordinate, TerrainKind};

/// Errors that can occur while building or querying the world.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The catalog was asked about a terrain it has no entry for.
    #[error("unknown terrain: {0}")]
    UnknownTerrain(TerrainKind),

    /// A catalog was built without an entry for this terrain.
    #[error("terrain catalog has no entry for {0}")]
    MissingTerrain(TerrainKind),

    /// Width or height is zero or does not fit a coordinate.
    #[error("invalid grid dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// A probability parameter is outside `[0, 1]`.
    #[error("{name} must be within [0, 1], got {value}")]
    InvalidProbability {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// A tile set does not cover every in-bounds coordinate.
    #[error("no tile at in-bounds coordinate {0}")]
    MissingTile(Coordinate),

    /// A tile was supplied for a coordinate outside the grid.
    #[error("tile at {0} lies outside the grid")]
    TileOutOfBounds(Coordinate),

    /// A tile's items and metadata disagree.
    #[error("inconsistent tile at {coordinate}: {reason}")]
    InconsistentTile {
        /// Where the tile is.
        coordinate: Coordinate,
        /// What is wrong with it.
        reason: String,
    },
}
