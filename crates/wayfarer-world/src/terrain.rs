//! The terrain catalog: terrain kind to entry cost.

use std::collections::BTreeMap;

use wayfarer_types::{TerrainCost, TerrainKind};

use crate::error::WorldError;

/// Static lookup from [`TerrainKind`] to [`TerrainCost`].
///
/// A catalog always covers every terrain kind; [`TerrainCatalog::new`]
/// refuses partial tables.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TerrainCatalog {
    costs: BTreeMap<TerrainKind, TerrainCost>,
}

impl TerrainCatalog {
    /// Build a catalog from an explicit table.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::MissingTerrain`] for the first terrain kind
    /// without an entry.
    pub fn new(costs: BTreeMap<TerrainKind, TerrainCost>) -> Result<Self, WorldError> {
        if let Some(missing) = TerrainKind::ALL
            .into_iter()
            .find(|kind| !costs.contains_key(kind))
        {
            return Err(WorldError::MissingTerrain(missing));
        }
        Ok(Self { costs })
    }

    /// The default table with per-terrain overrides applied on top.
    pub fn with_overrides(overrides: &BTreeMap<TerrainKind, TerrainCost>) -> Self {
        let mut catalog = Self::default();
        for (kind, cost) in overrides {
            catalog.costs.insert(*kind, *cost);
        }
        catalog
    }

    /// Cost of entering a tile of `terrain`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownTerrain`] if the kind has no entry.
    /// Catalogs built through this module never do, so callers treat this
    /// as fatal.
    pub fn cost(&self, terrain: TerrainKind) -> Result<TerrainCost, WorldError> {
        self.costs
            .get(&terrain)
            .copied()
            .ok_or(WorldError::UnknownTerrain(terrain))
    }

    /// All entries, in terrain order.
    pub fn entries(&self) -> impl Iterator<Item = (TerrainKind, TerrainCost)> + '_ {
        self.costs.iter().map(|(kind, cost)| (*kind, *cost))
    }
}

impl Default for TerrainCatalog {
    fn default() -> Self {
        let costs = BTreeMap::from([
            (TerrainKind::Plains, TerrainCost::new(1, 1, 1)),
            (TerrainKind::Forest, TerrainCost::new(2, 2, 1)),
            (TerrainKind::Desert, TerrainCost::new(3, 3, 4)),
            (TerrainKind::Swamp, TerrainCost::new(4, 2, 2)),
            (TerrainKind::Mountain, TerrainCost::new(5, 3, 3)),
        ]);
        Self { costs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_covers_every_terrain() {
        let catalog = TerrainCatalog::default();
        for kind in TerrainKind::ALL {
            assert!(catalog.cost(kind).is_ok(), "{kind} missing");
        }
    }

    #[test]
    fn default_costs_match_reference_table() {
        let catalog = TerrainCatalog::default();
        let desert = catalog.cost(TerrainKind::Desert).ok();
        assert_eq!(desert, Some(TerrainCost::new(3, 3, 4)));
        let mountain = catalog.cost(TerrainKind::Mountain).ok();
        assert_eq!(mountain, Some(TerrainCost::new(5, 3, 3)));
    }

    #[test]
    fn partial_table_is_rejected() {
        let costs = BTreeMap::from([(TerrainKind::Plains, TerrainCost::new(1, 1, 1))]);
        let result = TerrainCatalog::new(costs);
        assert!(matches!(result, Err(WorldError::MissingTerrain(TerrainKind::Forest))));
    }

    #[test]
    fn overrides_replace_single_entries() {
        let overrides = BTreeMap::from([(TerrainKind::Swamp, TerrainCost::new(9, 0, 0))]);
        let catalog = TerrainCatalog::with_overrides(&overrides);
        assert_eq!(
            catalog.cost(TerrainKind::Swamp).ok(),
            Some(TerrainCost::new(9, 0, 0))
        );
        assert_eq!(
            catalog.cost(TerrainKind::Plains).ok(),
            Some(TerrainCost::new(1, 1, 1))
        );
    }
}
