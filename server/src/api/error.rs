use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use crate::error::LeaderboardError;

#[derive(Debug)]
pub struct AppError(LeaderboardError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            LeaderboardError::NotFound(_) => (StatusCode::NOT_FOUND, self.0.to_string()),
            LeaderboardError::Unauthorized => (StatusCode::UNAUTHORIZED, self.0.to_string()),
            LeaderboardError::Forbidden => (StatusCode::FORBIDDEN, self.0.to_string()),
            LeaderboardError::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            LeaderboardError::ResolutionFailure { .. } => {
                warn!("API error: {}", self.0);
                (StatusCode::BAD_GATEWAY, self.0.to_string())
            }
            LeaderboardError::Store(e) => {
                error!("API error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<LeaderboardError> for AppError {
    fn from(err: LeaderboardError) -> Self {
        Self(err)
    }
}
