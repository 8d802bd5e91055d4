use std::sync::Arc;

use axum::{Json, extract::State};
use tracing::{error, info};

use courier_db::{Database, MessageStore, UserStore};
use courier_types::api::{LoginRequest, TokenResponse};

use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::token::{DisplayClaims, TokenService};
use crate::blocking;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub users: UserStore,
    pub messages: MessageStore,
    pub tokens: TokenService,
}

impl AppStateInner {
    pub fn new(db: Arc<Database>, tokens: TokenService) -> Self {
        Self {
            users: UserStore::new(db.clone()),
            messages: MessageStore::new(db),
            tokens,
        }
    }
}

/// Issues a bearer token for an existing user. The password is accepted but
/// not checked.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let users = state.users.clone();
    let user_id = req.user_id;
    let user = blocking(move || Ok(users.get_by_id(user_id)?))
        .await?
        .ok_or(ApiError::Unauthorized)?;

    let display = DisplayClaims {
        first_name: user.first_name,
        last_name: user.last_name,
    };
    let issued = state.tokens.issue_default(user.user_id, &display).map_err(|e| {
        error!("Failed to sign token for user {}: {}", user.user_id, e);
        ApiError::Internal
    })?;

    info!("Issued token for user {}", user.user_id);
    Ok(Json(TokenResponse {
        token: issued.token,
        token_type: "bearer".into(),
        expires_at: issued.expires_at,
    }))
}
