//! Terrain, grid generation, and vision sampling for the Wayfarer simulation.
//!
//! This crate owns ground truth. The agent never reads it directly; it only
//! ever sees vision samples produced here.
//!
//! # Modules
//!
//! - [`error`] -- Invariant violations raised while building or querying the world.
//! - [`terrain`] -- [`TerrainCatalog`], the terrain-to-cost lookup.
//! - [`grid`] -- [`WorldGrid`] generation, validation and bonus collection.
//! - [`vision`] -- 5x3 vision sampling and [`VisionProfile`] masks.
//! - [`render`] -- Plain-text map rendering.

pub mod error;
pub mod grid;
pub mod render;
pub mod terrain;
pub mod vision;

// Re-export primary types at crate root.
pub use error::WorldError;
pub use grid::{GenerationParams, WorldGrid};
pub use render::{MapMarkers, render_map};
pub use terrain::TerrainCatalog;
pub use vision::VisionProfile;
