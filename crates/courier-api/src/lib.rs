pub mod auth;
pub mod error;
pub mod extract;
pub mod gate;
pub mod messages;
pub mod middleware;
pub mod projector;
pub mod token;
pub mod users;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tracing::error;

use courier_db::Repository;

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};
use crate::middleware::require_auth;
use crate::projector::collapse_or_not_found;

/// All REST routes. Message and thread routes sit behind the bearer
/// middleware.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/users", get(users::list_users))
        .route("/api/users/newUser", post(users::add_user))
        .route("/api/users/{user_id}", get(users::get_user))
        .route("/api/login", post(auth::login))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/api/messages", get(messages::list_messages))
        .route(
            "/api/messages/newMessage",
            post(messages::add_message)
                .put(messages::put_message)
                .delete(messages::delete_message),
        )
        .route("/api/messages/{user_id}", get(messages::messages_for_user))
        .route(
            "/api/messages/{user_id}/{thread_id}",
            get(messages::messages_in_thread),
        )
        .route("/api/threads/{thread_id}", get(messages::get_thread))
        .layer(axum_middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    Router::new().merge(public_routes).merge(protected_routes)
}

/// Run blocking store work off the async runtime.
pub(crate) async fn blocking<F, T>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal
    })?
}

/// Single-entity lookup through a store's read capability.
pub(crate) fn find_one<R: Repository>(repo: &R, filter: &R::Filter) -> ApiResult<R::Record> {
    collapse_or_not_found(repo.read(filter)?)
}
