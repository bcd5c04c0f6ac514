//! What the agent can see.
//!
//! A [`VisionWindow`] is a fixed 5-row by 3-column sample of the grid.
//! Row `r` covers vertical offset `r - 2` from the agent (row 0 is two tiles
//! south, row 4 two tiles north); column `c` covers horizontal offset `c`
//! (the agent's own column and the two east of it). Cells off the grid or
//! hidden by a vision profile are `None`.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::grid::{Bonus, Coordinate, ItemKind, TerrainCost, TerrainKind, Tile, TraderPersonality};

/// Number of rows in a vision window.
pub const VISION_ROWS: usize = 5;

/// Number of columns in a vision window.
pub const VISION_COLS: usize = 3;

/// Row index that holds the agent's own row.
pub const VISION_CENTER_ROW: usize = 2;

/// An observed tile: terrain, contents and the cost of entering it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TileView {
    /// Terrain kind.
    pub terrain: TerrainKind,
    /// Cost of entering the tile.
    pub costs: TerrainCost,
    /// Items seen on the tile.
    pub items: BTreeSet<ItemKind>,
    /// Bonus metadata for each bonus item seen.
    pub bonuses: BTreeMap<ItemKind, Bonus>,
    /// Trader personality, if a trader was seen.
    pub trader: Option<TraderPersonality>,
}

impl TileView {
    /// Describe `tile` with the given entry costs.
    pub fn of(tile: &Tile, costs: TerrainCost) -> Self {
        Self {
            terrain: tile.terrain,
            costs,
            items: tile.items.clone(),
            bonuses: tile.bonuses.clone(),
            trader: tile.trader,
        }
    }

    /// Whether a trader was seen here.
    pub fn has_trader(&self) -> bool {
        self.items.contains(&ItemKind::Trader)
    }

    /// One-line description used in prompts and summaries.
    pub fn describe(&self) -> String {
        let mut text = format!(
            "{} (move {}, food {}, water {})",
            self.terrain, self.costs.move_cost, self.costs.food_cost, self.costs.water_cost
        );
        for (kind, bonus) in &self.bonuses {
            let repeat = if bonus.repeating { ", repeating" } else { "" };
            text.push_str(&format!(" +{:?} {}{repeat}", kind, bonus.amount));
        }
        if let Some(personality) = self.trader {
            text.push_str(&format!(" trader ({personality:?})"));
        }
        text
    }
}

/// A 5x3 sample of the grid anchored at the agent's position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct VisionWindow {
    /// Position the sample was taken from.
    pub origin: Coordinate,
    /// Cells indexed `[row][col]`.
    pub cells: Vec<Vec<Option<TileView>>>,
}

impl VisionWindow {
    /// A window of the standard shape with every cell absent.
    pub fn empty(origin: Coordinate) -> Self {
        Self {
            origin,
            cells: vec![vec![None; VISION_COLS]; VISION_ROWS],
        }
    }

    /// Whether the window has exactly 5 rows of 3 columns.
    pub fn has_standard_shape(&self) -> bool {
        self.cells.len() == VISION_ROWS && self.cells.iter().all(|row| row.len() == VISION_COLS)
    }

    /// The cell at `(row, col)`, if present and visible.
    pub fn cell(&self, row: usize, col: usize) -> Option<&TileView> {
        self.cells.get(row).and_then(|r| r.get(col)).and_then(Option::as_ref)
    }

    /// Replace the cell at `(row, col)`. Out-of-range indices are ignored.
    pub fn set(&mut self, row: usize, col: usize, view: Option<TileView>) {
        if let Some(slot) = self.cells.get_mut(row).and_then(|r| r.get_mut(col)) {
            *slot = view;
        }
    }

    /// Every visible cell with its `(row, col)` index.
    pub fn visible(&self) -> impl Iterator<Item = (usize, usize, &TileView)> {
        self.cells.iter().enumerate().flat_map(|(row, cols)| {
            cols.iter()
                .enumerate()
                .filter_map(move |(col, cell)| cell.as_ref().map(|view| (row, col, view)))
        })
    }

    /// Number of visible cells.
    pub fn visible_count(&self) -> usize {
        self.visible().count()
    }
}

/// A remembered tile annotated with its offset from a query position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct KnownTile {
    /// Absolute coordinate of the tile.
    pub coordinate: Coordinate,
    /// Horizontal offset from the query position (east positive).
    pub dx: i32,
    /// Vertical offset from the query position (north positive).
    pub dy: i32,
    /// What was observed there.
    pub tile: TileView,
}

impl KnownTile {
    /// One-line description such as `"+1,-2: Forest (move 2, ...)"`.
    pub fn describe(&self) -> String {
        format!("{:+},{:+}: {}", self.dx, self.dy, self.tile.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plains() -> TileView {
        TileView::of(&Tile::bare(TerrainKind::Plains), TerrainCost::new(1, 1, 1))
    }

    #[test]
    fn empty_window_has_standard_shape() {
        let window = VisionWindow::empty(Coordinate::new(0, 0));
        assert!(window.has_standard_shape());
        assert_eq!(window.visible_count(), 0);
    }

    #[test]
    fn set_out_of_range_is_ignored() {
        let mut window = VisionWindow::empty(Coordinate::new(0, 0));
        window.set(VISION_ROWS, 0, Some(plains()));
        window.set(0, VISION_COLS, Some(plains()));
        assert_eq!(window.visible_count(), 0);
        window.set(VISION_CENTER_ROW, 1, Some(plains()));
        assert_eq!(window.visible_count(), 1);
        assert!(window.cell(VISION_CENTER_ROW, 1).is_some());
    }

    #[test]
    fn describe_mentions_bonus_and_trader() {
        let tile = Tile::bare(TerrainKind::Desert)
            .with_bonus(ItemKind::WaterBonus, Bonus::repeating(5))
            .with_trader(TraderPersonality::Generous);
        let view = TileView::of(&tile, TerrainCost::new(3, 3, 4));
        let text = view.describe();
        assert!(text.starts_with("Desert (move 3, food 3, water 4)"));
        assert!(text.contains("WaterBonus 5, repeating"));
        assert!(text.contains("trader (Generous)"));
    }
}
