use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;

use crate::message::ErrorBody;

pub type Result<T, E = TriviaError> = std::result::Result<T, E>;

/// Failures surfaced by question generation, the session store and the
/// country source.
#[derive(Debug, thiserror::Error)]
pub enum TriviaError {
    #[error("No active game")]
    NoActiveGame,

    #[error("Game over")]
    GameOver,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("failed to fetch countries: {0}")]
    UpstreamFetch(#[from] reqwest::Error),

    #[error("country source responded with {0}")]
    UpstreamStatus(StatusCode),
}

impl TriviaError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NoActiveGame | Self::GameOver | Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::UpstreamFetch(_) | Self::UpstreamStatus(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for TriviaError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Upstream details stay in the log; clients only learn that the start failed.
        let error = if status.is_server_error() {
            warn!(error = %self, "failed to start game");
            "Failed to start game".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}
