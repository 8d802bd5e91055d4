use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::auth::AppState;
use crate::blocking;
use crate::error::ApiError;
use crate::gate::Identity;

/// Validate the bearer token, resolve the caller against the user table and
/// attach an [`Identity`] to the request.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user_id = {
        let token = bearer_token(req.headers()).ok_or(ApiError::Unauthorized)?;
        state.tokens.validate(token)?
    };

    let users = state.users.clone();
    let user = blocking(move || Ok(users.get_by_id(user_id)?))
        .await?
        .ok_or_else(|| {
            warn!("Token subject {} no longer exists", user_id);
            ApiError::Unauthorized
        })?;

    req.extensions_mut().insert(Identity {
        user_id: user.user_id,
        is_admin: user.is_admin,
    });
    Ok(next.run(req).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
