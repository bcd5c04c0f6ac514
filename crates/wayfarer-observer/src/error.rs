//! Observer API errors and their JSON responses.
//!
//! Every error renders as `{"error": "...", "status": <code>}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Why an Observer request could not be served.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// The engine has not published an episode yet.
    #[error("no episode has been published yet")]
    NoEpisode,

    /// A query parameter was out of range.
    #[error("invalid `{param}`: {reason}")]
    InvalidQuery {
        /// The offending parameter.
        param: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// Snapshot data could not be encoded.
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ObserverError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::NoEpisode => StatusCode::NOT_FOUND,
            Self::InvalidQuery { .. } => StatusCode::BAD_REQUEST,
            Self::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ObserverError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(ObserverError::NoEpisode.status(), StatusCode::NOT_FOUND);
        let bad = ObserverError::InvalidQuery {
            param: "limit",
            reason: String::from("must be at least 1"),
        };
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
        assert_eq!(bad.to_string(), "invalid `limit`: must be at least 1");
    }
}
