use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};

use courier_db::{MessageDraft, MessageFilter};
use courier_types::api::{
    DeleteMessageRequest, DeletedMessageResponse, MessageQuery, MessageRequest, Resource,
};
use courier_types::models::{Message, MessageKeys, MessageThread};

use crate::auth::AppState;
use crate::blocking;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::gate::{self, Identity};
use crate::projector::project_all;

fn filter_from(query: MessageQuery) -> MessageFilter {
    MessageFilter {
        user_id: query.user_id,
        thread_id: query.thread_id,
        user_message_id: query.user_message_id,
        contents: query.contents,
        offset: query.offset,
        limit: query.limit,
    }
}

async fn fetch(state: &AppState, filter: MessageFilter) -> ApiResult<Json<Vec<Resource<Message>>>> {
    let messages = state.messages.clone();
    let rows = blocking(move || Ok(messages.get(&filter)?)).await?;
    Ok(Json(project_all(rows.into_iter().map(Message::from))))
}

/// Lists messages. Without an explicit `userID` a non-admin caller only
/// sees their own rows.
pub async fn list_messages(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    ApiQuery(query): ApiQuery<MessageQuery>,
) -> ApiResult<Json<Vec<Resource<Message>>>> {
    let mut filter = filter_from(query);
    filter.user_id = match filter.user_id {
        Some(target) => {
            gate::require(&caller, target)?;
            Some(target)
        }
        None if caller.is_admin => None,
        None => Some(caller.user_id),
    };
    fetch(&state, filter).await
}

pub async fn messages_for_user(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    ApiPath(user_id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<MessageQuery>,
) -> ApiResult<Json<Vec<Resource<Message>>>> {
    gate::require(&caller, user_id)?;
    let filter = MessageFilter {
        user_id: Some(user_id),
        ..filter_from(query)
    };
    fetch(&state, filter).await
}

pub async fn messages_in_thread(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    ApiPath((user_id, thread_id)): ApiPath<(i64, i64)>,
    ApiQuery(query): ApiQuery<MessageQuery>,
) -> ApiResult<Json<Vec<Resource<Message>>>> {
    gate::require(&caller, user_id)?;
    let filter = MessageFilter {
        user_id: Some(user_id),
        thread_id: Some(thread_id),
        ..filter_from(query)
    };
    fetch(&state, filter).await
}

pub async fn add_message(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    ApiJson(req): ApiJson<MessageRequest>,
) -> ApiResult<impl IntoResponse> {
    gate::require(&caller, req.user_id)?;
    let draft = MessageDraft {
        user_id: req.user_id,
        thread_id: req.message_id,
        contents: req.message_contents,
    };

    let messages = state.messages.clone();
    let keys = blocking(move || Ok(messages.add(&draft)?)).await?;
    Ok((StatusCode::CREATED, Json(keys)))
}

/// Upsert keyed on `userMessageID`, so clients can retry safely.
pub async fn put_message(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    ApiJson(req): ApiJson<MessageRequest>,
) -> ApiResult<Json<MessageKeys>> {
    gate::require(&caller, req.user_id)?;
    let user_message_id = req
        .user_message_id
        .ok_or_else(|| ApiError::Validation("userMessageID is required".into()))?;
    let draft = MessageDraft {
        user_id: req.user_id,
        thread_id: req.message_id,
        contents: req.message_contents,
    };

    let messages = state.messages.clone();
    let keys = blocking(move || Ok(messages.put(user_message_id, &draft)?))
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(keys))
}

pub async fn delete_message(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    ApiJson(req): ApiJson<DeleteMessageRequest>,
) -> ApiResult<Json<DeletedMessageResponse>> {
    let messages = state.messages.clone();
    let user_message_id = req.user_message_id;
    let owner = blocking(move || Ok(messages.get_by_id(user_message_id)?))
        .await?
        .ok_or(ApiError::NotFound)?
        .user_id;
    gate::require(&caller, owner)?;

    let messages = state.messages.clone();
    let message_id = blocking(move || Ok(messages.delete(user_message_id)?))
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(DeletedMessageResponse { message_id }))
}

pub async fn get_thread(
    State(state): State<AppState>,
    ApiPath(thread_id): ApiPath<i64>,
) -> ApiResult<Json<MessageThread>> {
    let messages = state.messages.clone();
    let thread = blocking(move || Ok(messages.thread(thread_id)?))
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(MessageThread::from(thread)))
}
