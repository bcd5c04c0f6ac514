//! Vision sampling and vision profiles.
//!
//! The sample shape is fixed at 5 rows by 3 columns (see
//! [`wayfarer_types::vision`]). A [`VisionProfile`] masks that shape: cells
//! outside the mask are reported as absent exactly like off-grid cells.

use serde::{Deserialize, Serialize};
use wayfarer_types::{Coordinate, TileView, VISION_COLS, VISION_ROWS, VisionWindow};

use crate::error::WorldError;
use crate::grid::WorldGrid;
use crate::terrain::TerrainCatalog;

/// Vertical offset covered by each window row.
const ROW_OFFSETS: [i32; VISION_ROWS] = [-2, -1, 0, 1, 2];

/// Horizontal offset covered by each window column.
const COL_OFFSETS: [i32; VISION_COLS] = [0, 1, 2];

/// Which cells of the 5x3 window an agent can actually see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisionProfile {
    /// Every cell.
    #[default]
    Full,
    /// Everything except the two far-east corners.
    Farsighted,
    /// Own column north and south, plus the three cells just east.
    Keeneyed,
    /// Own tile and the three cells just east.
    Focused,
    /// Own tile, its north and south neighbours, and the tile east.
    Cautious,
}

impl VisionProfile {
    /// Whether the cell at `(row, col)` is visible under this profile.
    pub const fn shows(self, row: usize, col: usize) -> bool {
        if row >= VISION_ROWS || col >= VISION_COLS {
            return false;
        }
        match self {
            Self::Full => true,
            Self::Farsighted => !(col == 2 && (row == 0 || row == 4)),
            Self::Keeneyed => matches!(
                (row, col),
                (2, 0) | (2, 1) | (1, 1) | (3, 1) | (2, 2) | (1, 0) | (3, 0)
            ),
            Self::Focused => matches!((row, col), (2, 0) | (2, 1) | (1, 1) | (3, 1)),
            Self::Cautious => matches!((row, col), (2, 0) | (1, 0) | (2, 1) | (3, 0)),
        }
    }
}

impl WorldGrid {
    /// Sample the 5x3 window anchored at `position`.
    ///
    /// Off-grid and masked cells are absent; neither is an error.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownTerrain`] if the catalog lacks a visible
    /// tile's terrain.
    pub fn vision(
        &self,
        position: Coordinate,
        profile: VisionProfile,
        catalog: &TerrainCatalog,
    ) -> Result<VisionWindow, WorldError> {
        let mut window = VisionWindow::empty(position);
        for (row, dy) in ROW_OFFSETS.iter().enumerate() {
            for (col, dx) in COL_OFFSETS.iter().enumerate() {
                if !profile.shows(row, col) {
                    continue;
                }
                let Some(target) = position.offset(*dx, *dy) else {
                    continue;
                };
                if let Some(tile) = self.tile(target) {
                    let costs = catalog.cost(tile.terrain)?;
                    window.set(row, col, Some(TileView::of(tile, costs)));
                }
            }
        }
        Ok(window)
    }
}
