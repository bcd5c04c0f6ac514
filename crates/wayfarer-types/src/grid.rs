//! Grid geometry and tile contents.
//!
//! Coordinates are absolute integer pairs: `x` grows eastward and `y` grows
//! northward. There is no wraparound; anything outside the generated
//! rectangle is void, except that stepping past the eastern edge is how an
//! agent escapes.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Coordinates and directions
// ---------------------------------------------------------------------------

/// An absolute position on the grid.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct Coordinate {
    /// Column, increasing eastward.
    pub x: i32,
    /// Row, increasing northward.
    pub y: i32,
}

impl Coordinate {
    /// Create a coordinate from its components.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Shift this coordinate by `(dx, dy)`.
    ///
    /// Returns `None` if either component would overflow `i32`.
    pub const fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        let Some(x) = self.x.checked_add(dx) else {
            return None;
        };
        let Some(y) = self.y.checked_add(dy) else {
            return None;
        };
        Some(Self { x, y })
    }

    /// The neighbouring coordinate one step in `direction`.
    pub const fn step(self, direction: Direction) -> Option<Self> {
        let (dx, dy) = direction.offset();
        self.offset(dx, dy)
    }

    /// Offset of `self` relative to `origin`, as `(dx, dy)`.
    pub const fn relative_to(self, origin: Self) -> Option<(i32, i32)> {
        let Some(dx) = self.x.checked_sub(origin.x) else {
            return None;
        };
        let Some(dy) = self.y.checked_sub(origin.y) else {
            return None;
        };
        Some((dx, dy))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the eight compass directions an agent may move in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// `(0, +1)`
    North,
    /// `(0, -1)`
    South,
    /// `(+1, 0)`
    East,
    /// `(-1, 0)`
    West,
    /// `(+1, +1)`
    NorthEast,
    /// `(-1, +1)`
    NorthWest,
    /// `(+1, -1)`
    SouthEast,
    /// `(-1, -1)`
    SouthWest,
}

impl Direction {
    /// All directions, cardinal first.
    pub const ALL: [Self; 8] = [
        Self::North,
        Self::South,
        Self::East,
        Self::West,
        Self::NorthEast,
        Self::NorthWest,
        Self::SouthEast,
        Self::SouthWest,
    ];

    /// Unit offset `(dx, dy)` for this direction.
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, 1),
            Self::South => (0, -1),
            Self::East => (1, 0),
            Self::West => (-1, 0),
            Self::NorthEast => (1, 1),
            Self::NorthWest => (-1, 1),
            Self::SouthEast => (1, -1),
            Self::SouthWest => (-1, -1),
        }
    }

    /// Canonical upper-case name used in action text (`"NORTHEAST"`).
    pub const fn name(self) -> &'static str {
        match self {
            Self::North => "NORTH",
            Self::South => "SOUTH",
            Self::East => "EAST",
            Self::West => "WEST",
            Self::NorthEast => "NORTHEAST",
            Self::NorthWest => "NORTHWEST",
            Self::SouthEast => "SOUTHEAST",
            Self::SouthWest => "SOUTHWEST",
        }
    }

    /// Two-letter (or one-letter) abbreviation (`"NE"`, `"N"`).
    pub const fn abbreviation(self) -> &'static str {
        match self {
            Self::North => "N",
            Self::South => "S",
            Self::East => "E",
            Self::West => "W",
            Self::NorthEast => "NE",
            Self::NorthWest => "NW",
            Self::SouthEast => "SE",
            Self::SouthWest => "SW",
        }
    }

    /// Whether this direction has an eastward component.
    pub const fn heads_east(self) -> bool {
        matches!(self, Self::East | Self::NorthEast | Self::SouthEast)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Terrain
// ---------------------------------------------------------------------------

/// The closed set of terrain kinds a tile can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum TerrainKind {
    /// Open ground, cheapest to cross.
    Plains,
    /// Woodland.
    Forest,
    /// Arid sand, expensive in water.
    Desert,
    /// Wetland, expensive in energy.
    Swamp,
    /// High ground, the most expensive terrain.
    Mountain,
}

impl TerrainKind {
    /// Every terrain kind, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Plains,
        Self::Forest,
        Self::Desert,
        Self::Swamp,
        Self::Mountain,
    ];

    /// Lower-case letter used by the text map renderer.
    pub const fn glyph(self) -> char {
        match self {
            Self::Plains => 'p',
            Self::Forest => 'f',
            Self::Desert => 'd',
            Self::Swamp => 's',
            Self::Mountain => 'm',
        }
    }
}

impl fmt::Display for TerrainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Plains => "Plains",
            Self::Forest => "Forest",
            Self::Desert => "Desert",
            Self::Swamp => "Swamp",
            Self::Mountain => "Mountain",
        };
        f.write_str(name)
    }
}

/// The price of entering a tile of a given terrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TerrainCost {
    /// Energy spent to enter the tile.
    pub move_cost: u32,
    /// Food spent to enter the tile.
    pub food_cost: u32,
    /// Water spent to enter the tile.
    pub water_cost: u32,
}

impl TerrainCost {
    /// Build a cost triple.
    pub const fn new(move_cost: u32, food_cost: u32, water_cost: u32) -> Self {
        Self {
            move_cost,
            food_cost,
            water_cost,
        }
    }

    /// Sum of all three components, saturating.
    pub const fn total(self) -> u32 {
        self.move_cost
            .saturating_add(self.food_cost)
            .saturating_add(self.water_cost)
    }
}

// ---------------------------------------------------------------------------
// Resources and items
// ---------------------------------------------------------------------------

/// A consumable the agent tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Resource {
    /// Food supply.
    Food,
    /// Water supply.
    Water,
    /// Stamina spent on movement.
    Energy,
    /// Currency spent at traders.
    Gold,
}

/// Something that can sit on a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ItemKind {
    /// Grants food when collected.
    FoodBonus,
    /// Grants water when collected.
    WaterBonus,
    /// Grants gold when collected.
    GoldBonus,
    /// A trader the agent can deal with. Never collected.
    Trader,
}

impl ItemKind {
    /// Every item kind, in declaration order.
    pub const ALL: [Self; 4] = [Self::FoodBonus, Self::WaterBonus, Self::GoldBonus, Self::Trader];

    /// The resource this item grants, or `None` for a trader.
    pub const fn resource(self) -> Option<Resource> {
        match self {
            Self::FoodBonus => Some(Resource::Food),
            Self::WaterBonus => Some(Resource::Water),
            Self::GoldBonus => Some(Resource::Gold),
            Self::Trader => None,
        }
    }

    /// Whether the item is a collectable bonus.
    pub const fn is_bonus(self) -> bool {
        self.resource().is_some()
    }

    /// Whether a bonus of this kind may be flagged as repeating.
    ///
    /// Gold is always one-shot.
    pub const fn may_repeat(self) -> bool {
        matches!(self, Self::FoodBonus | Self::WaterBonus)
    }

    /// Upper-case letter used by the text map renderer.
    pub const fn glyph(self) -> char {
        match self {
            Self::FoodBonus => 'F',
            Self::WaterBonus => 'W',
            Self::GoldBonus => '$',
            Self::Trader => 'T',
        }
    }
}

/// Metadata for a bonus item sitting on a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Bonus {
    /// Amount granted on collection.
    pub amount: u32,
    /// Repeating bonuses stay on the tile after collection.
    pub repeating: bool,
}

impl Bonus {
    /// A bonus that disappears once collected.
    pub const fn once(amount: u32) -> Self {
        Self {
            amount,
            repeating: false,
        }
    }

    /// A bonus that can be collected on every visit.
    pub const fn repeating(amount: u32) -> Self {
        Self {
            amount,
            repeating: true,
        }
    }
}

/// How a trader prices its goods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum TraderPersonality {
    /// Accepts deals worth 75% of what it gives away.
    Generous,
    /// Wants 150% of what it gives away.
    Stingy,
}

impl TraderPersonality {
    /// Both personalities.
    pub const ALL: [Self; 2] = [Self::Generous, Self::Stingy];

    /// Required value ratio, in percent.
    pub const fn margin_percent(self) -> u32 {
        match self {
            Self::Generous => 75,
            Self::Stingy => 150,
        }
    }
}

// ---------------------------------------------------------------------------
// Tiles
// ---------------------------------------------------------------------------

/// Ground truth for one grid cell.
///
/// `items` is the authoritative item set. Each bonus item has matching
/// metadata in `bonuses`, and `trader` is set exactly when `items` contains
/// [`ItemKind::Trader`]. The world crate validates this on construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Tile {
    /// Terrain of the cell.
    pub terrain: TerrainKind,
    /// Items currently on the cell.
    pub items: BTreeSet<ItemKind>,
    /// Bonus metadata keyed by bonus item.
    pub bonuses: BTreeMap<ItemKind, Bonus>,
    /// Personality of the trader, if one is present.
    pub trader: Option<TraderPersonality>,
}

impl Tile {
    /// A tile with the given terrain and nothing on it.
    pub const fn bare(terrain: TerrainKind) -> Self {
        Self {
            terrain,
            items: BTreeSet::new(),
            bonuses: BTreeMap::new(),
            trader: None,
        }
    }

    /// Builder: add a bonus item with its metadata.
    #[must_use]
    pub fn with_bonus(mut self, kind: ItemKind, bonus: Bonus) -> Self {
        self.items.insert(kind);
        self.bonuses.insert(kind, bonus);
        self
    }

    /// Builder: add a trader.
    #[must_use]
    pub fn with_trader(mut self, personality: TraderPersonality) -> Self {
        self.items.insert(ItemKind::Trader);
        self.trader = Some(personality);
        self
    }

    /// Whether `kind` is on the tile.
    pub fn has(&self, kind: ItemKind) -> bool {
        self.items.contains(&kind)
    }

    /// Whether a trader is on the tile.
    pub fn has_trader(&self) -> bool {
        self.has(ItemKind::Trader)
    }

    /// Bonus items on the tile, in item order.
    pub fn bonus_items(&self) -> impl Iterator<Item = (ItemKind, Bonus)> + '_ {
        self.items
            .iter()
            .filter_map(|kind| self.bonuses.get(kind).map(|b| (*kind, *b)))
    }
}
