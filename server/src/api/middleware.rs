use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use super::jwt::JwtManager;

/// Resolve the bearer token into an [`crate::actor::Actor`] request extension.
///
/// Requests without an Authorization header pass through anonymously and
/// the services decide whether identity is required. A header that is
/// present but not a valid token is rejected here.
pub async fn auth_middleware(
    State(jwt_manager): State<Arc<JwtManager>>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .map(|header| header.to_str().unwrap_or_default());

    let token = match auth_header {
        None => return next.run(request).await,
        Some(header) => match header.strip_prefix("Bearer ") {
            Some(token) => token,
            None => return unauthorized("Missing or invalid authorization header"),
        },
    };

    let claims = match jwt_manager.verify_token(token) {
        Ok(claims) => claims,
        Err(e) => {
            debug!("Rejected bearer token: {:#}", e);
            return unauthorized("Invalid or expired token");
        }
    };

    match claims.actor() {
        Ok(actor) => {
            request.extensions_mut().insert(actor);
            next.run(request).await
        }
        Err(_) => unauthorized("Invalid token claims"),
    }
}

fn unauthorized(message: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response()
}
