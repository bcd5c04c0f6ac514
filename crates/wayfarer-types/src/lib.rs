//! Shared type definitions for the Wayfarer simulation.
//!
//! Every crate in the workspace speaks in these types, and they are the
//! wire format between the engine, the decision service and the observer.
//! Types flow downstream to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`grid`] -- Coordinates, directions, terrain, items and tiles
//! - [`agent`] -- The agent's position and resource budget
//! - [`action`] -- Parsed actions and trade offers
//! - [`vision`] -- Vision windows and remembered tiles
//! - [`episode`] -- Episode status and the per-turn record
//! - [`decision`] -- Request/response payloads for decision policies

pub mod action;
pub mod agent;
pub mod decision;
pub mod episode;
pub mod grid;
pub mod vision;

// Re-export all public types at crate root for convenience.
pub use action::{Action, TradeOffer, TradeResponse};
pub use agent::AgentState;
pub use decision::{DecisionRequest, DecisionResponse, TradeRequest};
pub use episode::{EpisodeId, EpisodeStatus, FallbackCause, TradeFailure, TurnOutcome, TurnRecord};
pub use grid::{
    Bonus, Coordinate, Direction, ItemKind, Resource, TerrainCost, TerrainKind, Tile,
    TraderPersonality,
};
pub use vision::{
    KnownTile, TileView, VISION_CENTER_ROW, VISION_COLS, VISION_ROWS, VisionWindow,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // Files are written to `bindings/` relative to the crate root.
        use ts_rs::TS;

        // Grid
        let _ = crate::grid::Coordinate::export_all();
        let _ = crate::grid::Direction::export_all();
        let _ = crate::grid::TerrainKind::export_all();
        let _ = crate::grid::TerrainCost::export_all();
        let _ = crate::grid::Resource::export_all();
        let _ = crate::grid::ItemKind::export_all();
        let _ = crate::grid::Bonus::export_all();
        let _ = crate::grid::TraderPersonality::export_all();
        let _ = crate::grid::Tile::export_all();

        // Agent and actions
        let _ = crate::agent::AgentState::export_all();
        let _ = crate::action::Action::export_all();
        let _ = crate::action::TradeOffer::export_all();
        let _ = crate::action::TradeResponse::export_all();

        // Vision
        let _ = crate::vision::TileView::export_all();
        let _ = crate::vision::VisionWindow::export_all();
        let _ = crate::vision::KnownTile::export_all();

        // Episode
        let _ = crate::episode::EpisodeId::export_all();
        let _ = crate::episode::EpisodeStatus::export_all();
        let _ = crate::episode::TradeFailure::export_all();
        let _ = crate::episode::TurnOutcome::export_all();
        let _ = crate::episode::FallbackCause::export_all();
        let _ = crate::episode::TurnRecord::export_all();

        // Decision payloads
        let _ = crate::decision::DecisionRequest::export_all();
        let _ = crate::decision::DecisionResponse::export_all();
        let _ = crate::decision::TradeRequest::export_all();
    }
}
