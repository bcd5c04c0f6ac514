//! The world grid: ground truth for every in-bounds coordinate.
//!
//! A [`WorldGrid`] is generated once per episode and afterwards only
//! shrinks: collecting a one-shot bonus removes it from its tile. Terrain
//! never changes and traders never leave.

use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::debug;
use wayfarer_types::{Bonus, Coordinate, ItemKind, TerrainKind, Tile, TraderPersonality};

use crate::error::WorldError;

/// Parameters for [`WorldGrid::generate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    /// Number of columns; the agent escapes at `x >= width`.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
    /// Chance that a tile carries an item.
    pub bonus_probability: f64,
    /// Chance that a food or water bonus is repeating.
    pub repeating_probability: f64,
    /// Amount granted by each bonus.
    pub bonus_amount: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            width: 20,
            height: 5,
            bonus_probability: 0.3,
            repeating_probability: 0.2,
            bonus_amount: 5,
        }
    }
}

/// Ground-truth grid covering `[0, width) x [0, height)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldGrid {
    width: u32,
    height: u32,
    tiles: BTreeMap<Coordinate, Tile>,
}

impl WorldGrid {
    /// Generate a grid from a seeded random source.
    ///
    /// Every tile gets a uniformly random terrain. Independently, with
    /// `bonus_probability`, it also gets exactly one random item. The same
    /// RNG state always yields the same grid.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidDimensions`] or
    /// [`WorldError::InvalidProbability`] for bad parameters.
    pub fn generate<R: Rng>(
        params: &GenerationParams,
        rng: &mut R,
    ) -> Result<Self, WorldError> {
        let (width, height) = checked_dimensions(params.width, params.height)?;
        check_probability("bonus_probability", params.bonus_probability)?;
        check_probability("repeating_probability", params.repeating_probability)?;

        let mut tiles = BTreeMap::new();
        for y in 0..height {
            for x in 0..width {
                let terrain = TerrainKind::ALL
                    .choose(rng)
                    .copied()
                    .unwrap_or(TerrainKind::Plains);
                let mut tile = Tile::bare(terrain);
                if rng.random_bool(params.bonus_probability) {
                    tile = place_random_item(tile, params, rng);
                }
                tiles.insert(Coordinate::new(x, y), tile);
            }
        }

        let grid = Self {
            width: params.width,
            height: params.height,
            tiles,
        };
        debug!(
            width = grid.width,
            height = grid.height,
            items = grid.item_count(),
            "world grid generated"
        );
        Ok(grid)
    }

    /// Build a grid from explicit tiles.
    ///
    /// # Errors
    ///
    /// Fails if the dimensions are invalid, a tile lies out of bounds, a
    /// tile's metadata disagrees with its items, or an in-bounds coordinate
    /// has no tile.
    pub fn from_tiles(
        width: u32,
        height: u32,
        tiles: BTreeMap<Coordinate, Tile>,
    ) -> Result<Self, WorldError> {
        let (w, h) = checked_dimensions(width, height)?;
        for (coordinate, tile) in &tiles {
            if coordinate.x < 0 || coordinate.y < 0 || coordinate.x >= w || coordinate.y >= h {
                return Err(WorldError::TileOutOfBounds(*coordinate));
            }
            validate_tile(*coordinate, tile)?;
        }
        for y in 0..h {
            for x in 0..w {
                let coordinate = Coordinate::new(x, y);
                if !tiles.contains_key(&coordinate) {
                    return Err(WorldError::MissingTile(coordinate));
                }
            }
        }
        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    /// Number of columns.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Whether `coordinate` lies inside the grid.
    pub fn contains(&self, coordinate: Coordinate) -> bool {
        self.tiles.contains_key(&coordinate)
    }

    /// Whether `coordinate` is past the eastern edge.
    pub fn is_escape(&self, coordinate: Coordinate) -> bool {
        i64::from(coordinate.x) >= i64::from(self.width)
    }

    /// The tile at `coordinate`, if in bounds.
    pub fn tile(&self, coordinate: Coordinate) -> Option<&Tile> {
        self.tiles.get(&coordinate)
    }

    /// Every tile with its coordinate, ordered by `(x, y)`.
    pub fn tiles(&self) -> impl Iterator<Item = (Coordinate, &Tile)> {
        self.tiles.iter().map(|(c, t)| (*c, t))
    }

    /// Total number of items on the grid.
    pub fn item_count(&self) -> usize {
        self.tiles.values().map(|tile| tile.items.len()).sum()
    }

    /// Collect `kind` from the tile at `coordinate`.
    ///
    /// Returns the bonus metadata when a bonus was collected. One-shot
    /// bonuses are removed; repeating bonuses stay. Traders are never
    /// collected and absent items are a no-op, both returning `None`.
    pub fn collect(&mut self, coordinate: Coordinate, kind: ItemKind) -> Option<Bonus> {
        if !kind.is_bonus() {
            return None;
        }
        let tile = self.tiles.get_mut(&coordinate)?;
        if !tile.items.contains(&kind) {
            return None;
        }
        let bonus = tile.bonuses.get(&kind).copied()?;
        if !bonus.repeating {
            tile.items.remove(&kind);
            tile.bonuses.remove(&kind);
        }
        debug!(%coordinate, ?kind, amount = bonus.amount, repeating = bonus.repeating, "bonus collected");
        Some(bonus)
    }
}

/// Convert dimensions to coordinate range bounds.
fn checked_dimensions(width: u32, height: u32) -> Result<(i32, i32), WorldError> {
    let invalid = || WorldError::InvalidDimensions { width, height };
    if width == 0 || height == 0 {
        return Err(invalid());
    }
    let w = i32::try_from(width).map_err(|_e| invalid())?;
    let h = i32::try_from(height).map_err(|_e| invalid())?;
    Ok((w, h))
}

fn check_probability(name: &'static str, value: f64) -> Result<(), WorldError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(WorldError::InvalidProbability { name, value })
    }
}

/// Attach one random item to a bare tile.
fn place_random_item<R: Rng>(tile: Tile, params: &GenerationParams, rng: &mut R) -> Tile {
    let kind = ItemKind::ALL.choose(rng).copied().unwrap_or(ItemKind::FoodBonus);
    if kind == ItemKind::Trader {
        let personality = TraderPersonality::ALL
            .choose(rng)
            .copied()
            .unwrap_or(TraderPersonality::Generous);
        return tile.with_trader(personality);
    }
    let repeating = kind.may_repeat() && rng.random_bool(params.repeating_probability);
    let bonus = Bonus {
        amount: params.bonus_amount,
        repeating,
    };
    tile.with_bonus(kind, bonus)
}

/// Check that a tile's item set and metadata agree.
fn validate_tile(coordinate: Coordinate, tile: &Tile) -> Result<(), WorldError> {
    let inconsistent = |reason: String| WorldError::InconsistentTile { coordinate, reason };

    for kind in &tile.items {
        if kind.is_bonus() && !tile.bonuses.contains_key(kind) {
            return Err(inconsistent(format!("{kind:?} has no bonus metadata")));
        }
    }
    for (kind, bonus) in &tile.bonuses {
        if !kind.is_bonus() {
            return Err(inconsistent(format!("{kind:?} cannot carry bonus metadata")));
        }
        if !tile.items.contains(kind) {
            return Err(inconsistent(format!("metadata for absent {kind:?}")));
        }
        if bonus.repeating && !kind.may_repeat() {
            return Err(inconsistent(format!("{kind:?} cannot be repeating")));
        }
    }
    if tile.has_trader() != tile.trader.is_some() {
        return Err(inconsistent(String::from(
            "trader personality does not match trader presence",
        )));
    }
    Ok(())
}
