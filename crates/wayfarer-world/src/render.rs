//! Plain-text map rendering.
//!
//! North is at the top. Each cell is one character: `@` for the agent, `X`
//! for the start, then the first item present (`T` trader, `F` food, `W`
//! water, `$` gold), otherwise the lower-case terrain initial.

use wayfarer_types::{Coordinate, ItemKind};

use crate::grid::WorldGrid;

/// Legend printed under the map.
pub const LEGEND: &str = "@=agent X=start T=trader F=food W=water $=gold \
                          p=plains f=forest d=desert s=swamp m=mountain";

/// Positions to highlight on the map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapMarkers {
    /// Where the agent started.
    pub start: Option<Coordinate>,
    /// Where the agent is now.
    pub agent: Option<Coordinate>,
}

/// Render the whole grid, one text line per row, north first.
pub fn render_map(grid: &WorldGrid, markers: MapMarkers) -> String {
    let width = i32::try_from(grid.width()).unwrap_or(i32::MAX);
    let height = i32::try_from(grid.height()).unwrap_or(i32::MAX);
    let mut out = String::new();
    for y in (0..height).rev() {
        let line: String = (0..width)
            .map(|x| cell_glyph(grid, Coordinate::new(x, y), markers))
            .collect();
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str(LEGEND);
    out
}

fn cell_glyph(grid: &WorldGrid, coordinate: Coordinate, markers: MapMarkers) -> char {
    if markers.agent == Some(coordinate) {
        return '@';
    }
    if markers.start == Some(coordinate) {
        return 'X';
    }
    let Some(tile) = grid.tile(coordinate) else {
        return ' ';
    };
    if tile.has_trader() {
        return ItemKind::Trader.glyph();
    }
    tile.items
        .iter()
        .next()
        .map_or_else(|| tile.terrain.glyph(), |kind| kind.glyph())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use wayfarer_types::{Bonus, TerrainKind, Tile, TraderPersonality};

    use super::*;

    #[test]
    fn renders_north_first_with_markers() {
        let tiles = BTreeMap::from([
            (Coordinate::new(0, 0), Tile::bare(TerrainKind::Plains)),
            (Coordinate::new(1, 0), Tile::bare(TerrainKind::Mountain)),
            (
                Coordinate::new(0, 1),
                Tile::bare(TerrainKind::Forest).with_trader(TraderPersonality::Generous),
            ),
            (
                Coordinate::new(1, 1),
                Tile::bare(TerrainKind::Swamp).with_bonus(ItemKind::GoldBonus, Bonus::once(5)),
            ),
        ]);
        let grid = WorldGrid::from_tiles(2, 2, tiles).unwrap();
        let text = render_map(
            &grid,
            MapMarkers {
                start: Some(Coordinate::new(0, 0)),
                agent: None,
            },
        );
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("T$"));
        assert_eq!(lines.next(), Some("Xm"));
        assert_eq!(lines.next(), Some(LEGEND));
    }

    #[test]
    fn agent_marker_wins_over_start() {
        let tiles = BTreeMap::from([(Coordinate::new(0, 0), Tile::bare(TerrainKind::Desert))]);
        let grid = WorldGrid::from_tiles(1, 1, tiles).unwrap();
        let origin = Some(Coordinate::new(0, 0));
        let text = render_map(
            &grid,
            MapMarkers {
                start: origin,
                agent: origin,
            },
        );
        assert!(text.starts_with('@'));
    }
}
