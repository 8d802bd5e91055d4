use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};

use courier_db::{NewUser, UserFilter};
use courier_types::api::{NewUserRequest, NewUserResponse, Resource, UserQuery};
use courier_types::models::User;

use crate::auth::AppState;
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::projector::{project, project_all};
use crate::{blocking, find_one};

pub async fn list_users(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<UserQuery>,
) -> ApiResult<Json<Vec<Resource<User>>>> {
    let filter = UserFilter {
        user_id: query.user_id,
        first_name: query.first_name,
        last_name: query.last_name,
        is_admin: query.is_admin,
        offset: query.offset,
        limit: query.limit,
    };

    let users = state.users.clone();
    let rows = blocking(move || Ok(users.get(&filter)?)).await?;
    Ok(Json(project_all(rows.into_iter().map(User::from))))
}

pub async fn get_user(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<i64>,
) -> ApiResult<Json<Resource<User>>> {
    let users = state.users.clone();
    let row = blocking(move || find_one(&users, &UserFilter::by_id(user_id))).await?;
    Ok(Json(project(User::from(row))))
}

pub async fn add_user(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<NewUserRequest>,
) -> ApiResult<impl IntoResponse> {
    let draft = NewUser {
        first_name: req.first_name,
        last_name: req.last_name,
        is_admin: req.is_admin,
    };

    let users = state.users.clone();
    let user_id = blocking(move || Ok(users.add(&draft)?)).await?;
    Ok((StatusCode::CREATED, Json(NewUserResponse { user_id })))
}
