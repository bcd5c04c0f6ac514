//! Resource accounting applied to the agent each turn.
//!
//! - Entering a tile charges its terrain cost (energy, food, water)
//! - Resting recovers energy and consumes food and water
//! - Bonuses and trades add resources up to the configured caps
//!
//! All arithmetic saturates: nothing goes below zero and nothing wraps.

use wayfarer_types::{AgentState, Resource, TerrainCost};

use crate::config::{AgentRules, ResourceCaps};

/// Charge the cost of entering a tile. Each resource floors at zero.
pub const fn apply_terrain_cost(state: &mut AgentState, cost: TerrainCost) {
    state.energy = state.energy.saturating_sub(cost.move_cost);
    state.food = state.food.saturating_sub(cost.food_cost);
    state.water = state.water.saturating_sub(cost.water_cost);
}

/// Rest for one turn: recover energy (capped), pay food and water upkeep.
pub fn apply_rest(state: &mut AgentState, rules: &AgentRules) {
    gain(state, Resource::Energy, rules.rest_energy, &rules.caps);
    spend(state, Resource::Food, rules.rest_upkeep);
    spend(state, Resource::Water, rules.rest_upkeep);
}

/// Add up to `amount` of `resource` without exceeding its cap.
///
/// Returns what was actually added. A resource already above its cap is
/// left alone rather than clipped.
pub fn gain(state: &mut AgentState, resource: Resource, amount: u32, caps: &ResourceCaps) -> u32 {
    let cap = caps.cap(resource);
    let slot = state.get_mut(resource);
    let before = *slot;
    if before >= cap {
        return 0;
    }
    *slot = before.saturating_add(amount).min(cap);
    slot.saturating_sub(before)
}

/// Remove up to `amount` of `resource`, flooring at zero.
///
/// Returns what was actually removed.
pub const fn spend(state: &mut AgentState, resource: Resource, amount: u32) -> u32 {
    let slot = state.get_mut(resource);
    let before = *slot;
    *slot = before.saturating_sub(amount);
    before.saturating_sub(*slot)
}

#[cfg(test)]
mod tests {
    use wayfarer_types::Coordinate;

    use super::*;

    fn agent(food: u32, water: u32, energy: u32) -> AgentState {
        AgentState {
            position: Coordinate::new(0, 0),
            food,
            water,
            energy,
            gold: 0,
        }
    }

    #[test]
    fn terrain_cost_floors_at_zero() {
        let mut state = agent(2, 10, 3);
        apply_terrain_cost(&mut state, TerrainCost::new(5, 3, 3));
        assert_eq!((state.food, state.water, state.energy), (0, 7, 0));
    }

    #[test]
    fn rest_recovers_energy_and_pays_upkeep() {
        let mut state = agent(10, 10, 10);
        apply_rest(&mut state, &AgentRules::default());
        assert_eq!((state.food, state.water, state.energy), (9, 9, 15));
    }

    #[test]
    fn rest_energy_is_capped() {
        let mut state = agent(10, 10, 48);
        apply_rest(&mut state, &AgentRules::default());
        assert_eq!(state.energy, 50);
    }

    #[test]
    fn rest_upkeep_floors_at_zero() {
        let mut state = agent(0, 1, 10);
        apply_rest(&mut state, &AgentRules::default());
        assert_eq!((state.food, state.water), (0, 0));
    }

    #[test]
    fn gain_reports_actual_amount() {
        let caps = ResourceCaps::default();
        let mut state = agent(47, 10, 10);
        assert_eq!(gain(&mut state, Resource::Food, 5, &caps), 3);
        assert_eq!(state.food, 50);
        assert_eq!(gain(&mut state, Resource::Food, 5, &caps), 0);
    }

    #[test]
    fn gain_leaves_over_cap_values_untouched() {
        let caps = ResourceCaps {
            gold: 10,
            ..ResourceCaps::default()
        };
        let mut state = agent(1, 1, 1);
        state.gold = 30;
        assert_eq!(gain(&mut state, Resource::Gold, 5, &caps), 0);
        assert_eq!(state.gold, 30);
    }

    #[test]
    fn spend_reports_actual_amount() {
        let mut state = agent(2, 2, 2);
        assert_eq!(spend(&mut state, Resource::Water, 5), 2);
        assert_eq!(state.water, 0);
    }
}
