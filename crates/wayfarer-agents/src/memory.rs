//! Spatial memory: the agent's accumulated view of the world.
//!
//! Memory is built only from vision samples. Every visible cell of a window
//! is written under its absolute coordinate; re-observing a coordinate
//! overwrites the entry but keeps its original place in insertion order.
//! Nothing is ever forgotten except by [`SpatialMemory::reset`].
//!
//! ## Window transform
//!
//! For a window ingested at `position`, the cell at local `(row, col)` is
//! stored at `position + (col, row - 2)`: row 2 is the agent's own row and
//! column 0 is the agent's own column.
//!
//! ## Queries
//!
//! [`SpatialMemory::recall`] and [`SpatialMemory::summarize`] annotate each
//! remembered tile with its offset from the position passed at query time,
//! not from where it was observed.

use std::collections::BTreeMap;

use tracing::trace;
use wayfarer_types::{
    Coordinate, KnownTile, TileView, VISION_CENTER_ROW, VISION_COLS, VISION_ROWS, VisionWindow,
};

use crate::error::AgentError;

/// A remembered tile.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MemoryEntry {
    /// The most recent observation.
    pub tile: TileView,
    /// How many times the coordinate has been observed.
    pub observations: u32,
}

/// Per-agent partial map keyed by absolute coordinate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpatialMemory {
    /// Coordinates in first-observation order.
    order: Vec<Coordinate>,
    /// Entries by coordinate.
    entries: BTreeMap<Coordinate, MemoryEntry>,
}

impl SpatialMemory {
    /// An empty memory.
    pub const fn new() -> Self {
        Self {
            order: Vec::new(),
            entries: BTreeMap::new(),
        }
    }

    /// Write every visible cell of `window` into memory.
    ///
    /// Returns the number of cells written.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::VisionShape`] if the window is not 5x3, or
    /// [`AgentError::VisionOrigin`] if it was sampled elsewhere. Nothing is
    /// written in either case.
    pub fn ingest(
        &mut self,
        position: Coordinate,
        window: &VisionWindow,
    ) -> Result<usize, AgentError> {
        if !window.has_standard_shape() {
            let widths: Vec<usize> = window.cells.iter().map(Vec::len).collect();
            return Err(AgentError::VisionShape {
                detail: format!(
                    "{} rows with widths {widths:?}, expected {VISION_ROWS}x{VISION_COLS}",
                    window.cells.len()
                ),
            });
        }
        if window.origin != position {
            return Err(AgentError::VisionOrigin {
                window: window.origin,
                position,
            });
        }

        let mut written = 0_usize;
        for (row, col, view) in window.visible() {
            let Some(coordinate) = absolute(position, row, col) else {
                continue;
            };
            self.write(coordinate, view);
            written = written.saturating_add(1);
        }
        trace!(%position, written, known = self.entries.len(), "vision ingested");
        Ok(written)
    }

    /// Remembered tiles in insertion order, at most `limit`, each annotated
    /// with its offset from `position`.
    pub fn recall(&self, position: Coordinate, limit: usize) -> Vec<KnownTile> {
        self.order
            .iter()
            .filter_map(|coordinate| {
                let entry = self.entries.get(coordinate)?;
                let (dx, dy) = coordinate.relative_to(position)?;
                Some(KnownTile {
                    coordinate: *coordinate,
                    dx,
                    dy,
                    tile: entry.tile.clone(),
                })
            })
            .take(limit)
            .collect()
    }

    /// Text rendering of [`recall`](Self::recall), one tile per line.
    pub fn summarize(&self, position: Coordinate, limit: usize) -> String {
        self.recall(position, limit)
            .iter()
            .map(KnownTile::describe)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The entry for `coordinate`, if it has been observed.
    pub fn get(&self, coordinate: Coordinate) -> Option<&MemoryEntry> {
        self.entries.get(&coordinate)
    }

    /// Number of remembered coordinates.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been observed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A copy of every entry keyed by coordinate.
    pub fn snapshot(&self) -> BTreeMap<Coordinate, MemoryEntry> {
        self.entries.clone()
    }

    /// Forget everything.
    pub fn reset(&mut self) {
        self.order.clear();
        self.entries.clear();
    }

    fn write(&mut self, coordinate: Coordinate, view: &TileView) {
        if let Some(entry) = self.entries.get_mut(&coordinate) {
            entry.tile = view.clone();
            entry.observations = entry.observations.saturating_add(1);
        } else {
            self.order.push(coordinate);
            self.entries.insert(
                coordinate,
                MemoryEntry {
                    tile: view.clone(),
                    observations: 1,
                },
            );
        }
    }
}

/// Absolute coordinate of window cell `(row, col)` ingested at `position`.
fn absolute(position: Coordinate, row: usize, col: usize) -> Option<Coordinate> {
    let row = i32::try_from(row).ok()?;
    let center = i32::try_from(VISION_CENTER_ROW).ok()?;
    let dy = row.checked_sub(center)?;
    let dx = i32::try_from(col).ok()?;
    position.offset(dx, dy)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use wayfarer_types::{Bonus, ItemKind, TerrainCost, TerrainKind, Tile};

    use super::*;

    fn view(terrain: TerrainKind) -> TileView {
        TileView::of(&Tile::bare(terrain), TerrainCost::new(1, 1, 1))
    }

    fn window_at(origin: Coordinate, cells: &[(usize, usize, TerrainKind)]) -> VisionWindow {
        let mut window = VisionWindow::empty(origin);
        for (row, col, terrain) in cells {
            window.set(*row, *col, Some(view(*terrain)));
        }
        window
    }

    #[test]
    fn ingest_maps_rows_and_columns_to_offsets() {
        let mut memory = SpatialMemory::new();
        let origin = Coordinate::new(5, 5);
        let window = window_at(
            origin,
            &[
                (0, 0, TerrainKind::Desert),
                (2, 0, TerrainKind::Plains),
                (4, 2, TerrainKind::Mountain),
            ],
        );
        assert_eq!(memory.ingest(origin, &window).unwrap(), 3);
        assert_eq!(
            memory.get(Coordinate::new(5, 3)).unwrap().tile.terrain,
            TerrainKind::Desert
        );
        assert_eq!(
            memory.get(Coordinate::new(5, 5)).unwrap().tile.terrain,
            TerrainKind::Plains
        );
        assert_eq!(
            memory.get(Coordinate::new(7, 7)).unwrap().tile.terrain,
            TerrainKind::Mountain
        );
    }

    #[test]
    fn absent_cells_are_never_stored() {
        let mut memory = SpatialMemory::new();
        let origin = Coordinate::new(0, 0);
        let window = window_at(origin, &[(2, 1, TerrainKind::Forest)]);
        memory.ingest(origin, &window).unwrap();
        assert_eq!(memory.len(), 1);
        assert!(memory.get(Coordinate::new(0, 0)).is_none());
    }

    #[test]
    fn reingesting_the_same_window_is_idempotent() {
        let mut memory = SpatialMemory::new();
        let origin = Coordinate::new(1, 1);
        let window = window_at(
            origin,
            &[(2, 0, TerrainKind::Plains), (3, 1, TerrainKind::Swamp)],
        );
        memory.ingest(origin, &window).unwrap();
        let first = memory.recall(origin, usize::MAX);
        memory.ingest(origin, &window).unwrap();
        assert_eq!(memory.recall(origin, usize::MAX), first);
        assert_eq!(memory.len(), 2);
    }

    #[test]
    fn reobservation_overwrites_but_keeps_order() {
        let mut memory = SpatialMemory::new();
        let origin = Coordinate::new(0, 2);
        memory
            .ingest(
                origin,
                &window_at(
                    origin,
                    &[(2, 0, TerrainKind::Plains), (2, 1, TerrainKind::Forest)],
                ),
            )
            .unwrap();
        let mut changed = VisionWindow::empty(origin);
        let bonus_tile =
            Tile::bare(TerrainKind::Plains).with_bonus(ItemKind::FoodBonus, Bonus::once(5));
        changed.set(2, 0, Some(TileView::of(&bonus_tile, TerrainCost::new(1, 1, 1))));
        memory.ingest(origin, &changed).unwrap();

        let recalled = memory.recall(origin, usize::MAX);
        assert_eq!(recalled.len(), 2);
        assert_eq!(recalled.first().unwrap().coordinate, Coordinate::new(0, 2));
        assert!(recalled.first().unwrap().tile.items.contains(&ItemKind::FoodBonus));
        assert_eq!(memory.get(Coordinate::new(0, 2)).unwrap().observations, 2);
    }

    #[test]
    fn recall_offsets_are_relative_to_query_position() {
        let mut memory = SpatialMemory::new();
        let origin = Coordinate::new(0, 0);
        memory
            .ingest(origin, &window_at(origin, &[(2, 2, TerrainKind::Desert)]))
            .unwrap();
        let from_origin = memory.recall(origin, 10);
        assert_eq!(from_origin.first().map(|t| (t.dx, t.dy)), Some((2, 0)));
        let from_elsewhere = memory.recall(Coordinate::new(3, -1), 10);
        assert_eq!(from_elsewhere.first().map(|t| (t.dx, t.dy)), Some((-1, 1)));
    }

    #[test]
    fn recall_respects_limit() {
        let mut memory = SpatialMemory::new();
        let origin = Coordinate::new(0, 2);
        let window = window_at(
            origin,
            &[
                (0, 0, TerrainKind::Plains),
                (1, 0, TerrainKind::Plains),
                (2, 0, TerrainKind::Plains),
            ],
        );
        memory.ingest(origin, &window).unwrap();
        assert_eq!(memory.recall(origin, 2).len(), 2);
        assert_eq!(memory.summarize(origin, 2).lines().count(), 2);
    }

    #[test]
    fn summarize_lists_offsets() {
        let mut memory = SpatialMemory::new();
        let origin = Coordinate::new(0, 0);
        memory
            .ingest(origin, &window_at(origin, &[(3, 1, TerrainKind::Forest)]))
            .unwrap();
        let text = memory.summarize(origin, 5);
        assert!(text.starts_with("+1,+1: Forest"), "got {text}");
    }

    #[test]
    fn wrong_shape_is_rejected_without_writes() {
        let mut memory = SpatialMemory::new();
        let origin = Coordinate::new(0, 0);
        let mut window = window_at(origin, &[(2, 0, TerrainKind::Plains)]);
        window.cells.pop();
        assert!(matches!(
            memory.ingest(origin, &window),
            Err(AgentError::VisionShape { .. })
        ));
        assert!(memory.is_empty());
    }

    #[test]
    fn foreign_origin_is_rejected() {
        let mut memory = SpatialMemory::new();
        let window = window_at(Coordinate::new(1, 0), &[(2, 0, TerrainKind::Plains)]);
        assert!(matches!(
            memory.ingest(Coordinate::new(0, 0), &window),
            Err(AgentError::VisionOrigin { .. })
        ));
    }

    #[test]
    fn reset_is_indistinguishable_from_new() {
        let mut memory = SpatialMemory::new();
        let origin = Coordinate::new(0, 0);
        memory
            .ingest(origin, &window_at(origin, &[(2, 0, TerrainKind::Plains)]))
            .unwrap();
        memory.reset();
        assert_eq!(memory, SpatialMemory::new());
    }
}
