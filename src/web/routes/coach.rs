use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde::Deserialize;

use crate::{
    coach::{HISTORY_LIMIT, MAX_MESSAGE_LEN},
    model::{ResourceTyped, entity::ChatMessage},
    web::{
        AppState, AuthenticatedUser, RequestContext, WebError, WebResult,
        dto::coach::{ChatClearedResponse, ChatMessageResponse},
        error::ErrorResponse,
        extract::JsonBody,
        middlewares,
    },
};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SendMessageBody {
    pub message: String,
}

impl SendMessageBody {
    /// Trimmed message, if it is within bounds.
    fn validated(&self) -> WebResult<&str> {
        let message = self.message.trim();
        if message.is_empty() {
            return Err(WebError::resource_bad_request(
                ChatMessage::get_resource_type(),
                "message must not be empty",
            ));
        }
        if message.chars().count() > MAX_MESSAGE_LEN {
            return Err(WebError::resource_bad_request(
                ChatMessage::get_resource_type(),
                format!("message must be at most {MAX_MESSAGE_LEN} characters"),
            ));
        }
        Ok(message)
    }
}

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/send/", post(coach_send_handler))
        .route("/history/", get(coach_history_handler))
        .route("/clear/", delete(coach_clear_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/v1/coach/send/",
    description = "Asks the AI coach a question. Model failures are answered with a fallback text",
    request_body = SendMessageBody,
    responses(
        (status = 200, description = "Answer stored", body = ChatMessageResponse),
        (status = 400, description = "Message empty or too long", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 429, description = "Daily message limit reached", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "coach",
    security(
        ("cookie" = [])
    )
)]
async fn coach_send_handler(
    user: AuthenticatedUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<SendMessageBody>,
) -> WebResult<impl IntoResponse> {
    let message = payload.validated()?;

    let sent_today = ChatMessage::count_today(state.pool(), &user)
        .await
        .map_err(|e| WebError::resource_fetch_error(ChatMessage::get_resource_type(), e))?;

    let limit = state.coach().daily_limit();
    if sent_today >= limit {
        return Err(WebError::resource_limit_reached(
            ChatMessage::get_resource_type(),
            limit,
        ));
    }

    let reply = state.coach().reply(message).await;

    let stored = ChatMessage::create(state.pool(), &user, message, &reply)
        .await
        .map_err(|e| WebError::resource_fetch_error(ChatMessage::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(ChatMessageResponse::from(stored))))
}

#[utoipa::path(
    get,
    path = "/api/v1/coach/history/",
    description = "Latest conversation with the coach, oldest message first",
    responses(
        (status = 200, description = "Chat history", body = Vec<ChatMessageResponse>),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "coach",
    security(
        ("cookie" = [])
    )
)]
async fn coach_history_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let history = ChatMessage::recent(state.pool(), user, HISTORY_LIMIT)
        .await
        .map_err(|e| WebError::resource_fetch_error(ChatMessage::get_resource_type(), e))?
        .into_iter()
        .map(ChatMessageResponse::from)
        .collect::<Vec<_>>();

    Ok((StatusCode::OK, Json(history)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/coach/clear/",
    description = "Deletes the whole conversation of the current user",
    responses(
        (status = 200, description = "History cleared", body = ChatClearedResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "coach",
    security(
        ("cookie" = [])
    )
)]
async fn coach_clear_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let deleted = ChatMessage::clear(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(ChatMessage::get_resource_type(), e))?;

    tracing::debug!("cleared {} chat messages of {}", deleted, user.user_id());
    let response = ChatClearedResponse {
        detail: String::from("Chat history cleared."),
        deleted,
    };

    Ok((StatusCode::OK, Json(response)))
}
