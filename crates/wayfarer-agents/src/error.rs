//! Error types for the wayfarer-agents crate.
//!
//! These are invariant violations. Ordinary bad luck (a refused trade, a
//! move into the void) is modelled as an outcome, not an error.

use wayfarer_types::Coordinate;

/// Errors that can occur while updating agent-side state.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// A vision window did not have the 5x3 shape.
    #[error("vision window has the wrong shape: {detail}")]
    VisionShape {
        /// Description of the actual shape.
        detail: String,
    },

    /// A vision window was sampled somewhere other than where it is ingested.
    #[error("vision window taken at {window} ingested at {position}")]
    VisionOrigin {
        /// Origin recorded in the window.
        window: Coordinate,
        /// Position passed to ingest.
        position: Coordinate,
    },
}
