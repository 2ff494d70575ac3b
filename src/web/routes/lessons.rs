use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    model::{
        CrudRepository, ModelManager, ResourceTyped,
        entity::{Lesson, LessonProgress, ProgressUpdate},
        viewer_can_view_lesson,
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, WebError, WebResult,
        dto::lessons::{LessonProgressView, LessonView},
        error::ErrorResponse,
        extract::JsonBody,
        middlewares,
    },
};

const LOCKED_LESSON: &str = "purchase the course to access this lesson";

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/{id}/", get(lessons_get_handler))
        .route("/{id}/progress/", post(lessons_progress_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

/// The lesson, provided the user may see all of it.
async fn unlocked_lesson(mm: &ModelManager, user: &AuthenticatedUser, id: Uuid) -> WebResult<Lesson> {
    let lesson = Lesson::find_by_id(mm, user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Lesson::get_resource_type()))?;

    let allowed = viewer_can_view_lesson(mm, Some(user), &lesson)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    if !allowed {
        return Err(WebError::resource_forbidden(Lesson::get_resource_type(), LOCKED_LESSON));
    }

    Ok(lesson)
}

#[utoipa::path(
    get,
    path = "/api/v1/lessons/{lesson_id}/",
    description = "Full lesson content with the user's progress",
    params(
        ("lesson_id" = Uuid, Path, description = "ID of the lesson to get")
    ),
    responses(
        (status = 200, description = "Lesson found", body = LessonView),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Lesson is locked", body = ErrorResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "lessons"
)]
async fn lessons_get_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let lesson = unlocked_lesson(state.pool(), user, id).await?;

    let progress = LessonProgress::find_for_lesson(state.pool(), user, lesson.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(LessonProgress::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(LessonView::new(&lesson, true, progress.as_ref()))))
}

#[utoipa::path(
    post,
    path = "/api/v1/lessons/{lesson_id}/progress/",
    description = "Records watch progress. Absent fields keep their values, completion is never undone",
    params(
        ("lesson_id" = Uuid, Path, description = "ID of the lesson")
    ),
    request_body = ProgressUpdate,
    responses(
        (status = 200, description = "Progress recorded", body = LessonProgressView),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Lesson is locked", body = ErrorResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "lessons"
)]
async fn lessons_progress_handler(
    user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    JsonBody(update): JsonBody<ProgressUpdate>,
) -> WebResult<impl IntoResponse> {
    let lesson = unlocked_lesson(state.pool(), &user, id).await?;

    let progress = LessonProgress::record(state.pool(), &user, lesson.id(), update)
        .await
        .map_err(|e| WebError::resource_fetch_error(LessonProgress::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(LessonProgressView::from(&progress))))
}
