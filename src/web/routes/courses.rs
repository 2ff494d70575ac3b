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
        CrudRepository, ResourceTyped, can_view_full_lesson, check_enrollment,
        entity::{
            Course, CourseProgressSummary, CourseReview, CourseReviewCreate, CourseReviewRow,
            CourseSummaryRow, Enrollment, Lesson, LessonProgress,
        },
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, WebError, WebResult,
        dto::{
            courses::{CourseDetailResponse, CourseListItem},
            lessons::{LessonProgressView, LessonView},
            reviews::ReviewResponse,
        },
        error::ErrorResponse,
        extract::JsonBody,
        middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    // one parameter name per segment: a slug for course pages, an id for reviews
    Router::new()
        .route("/", get(courses_list_handler))
        .route("/{course}/", get(courses_detail_handler))
        .route("/{course}/my_progress/", get(courses_my_progress_handler))
        .route("/{course}/reviews/", get(reviews_list_handler))
        .route("/{course}/reviews/create/", post(reviews_create_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/",
    description = "Lists active courses, newest first",
    responses(
        (status = 200, description = "Active courses", body = Vec<CourseListItem>),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses"
)]
async fn courses_list_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let courses = CourseSummaryRow::list_active(state.pool(), &ctx.actor())
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?
        .into_iter()
        .map(CourseListItem::from)
        .collect::<Vec<_>>();

    Ok((StatusCode::OK, Json(courses)))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{slug}/",
    description = "Course page: lessons (locked ones redacted), progress of the viewer and reviews",
    params(
        ("slug" = String, Path, description = "Slug of the course")
    ),
    responses(
        (status = 200, description = "Course found", body = CourseDetailResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses"
)]
async fn courses_detail_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> WebResult<impl IntoResponse> {
    let actor = ctx.actor();
    let viewer = ctx.maybe_user();

    let course = Course::find_active_by_slug(state.pool(), &actor, &slug)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Course::get_resource_type()))?;

    let lessons = Lesson::all_by_course(state.pool(), &actor, course.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    let (is_purchased, progress) = match viewer {
        Some(user) => {
            let enrolled = Enrollment::exists(state.pool(), user.user_id(), course.id())
                .await
                .map_err(|e| WebError::resource_fetch_error(Enrollment::get_resource_type(), e))?;
            let progress = LessonProgress::all_by_course(state.pool(), user, course.id())
                .await
                .map_err(|e| {
                    WebError::resource_fetch_error(LessonProgress::get_resource_type(), e)
                })?;
            (enrolled, progress)
        }
        None => (false, Vec::new()),
    };

    let user_progress =
        viewer.map(|_| CourseProgressSummary::from_progress(&progress, lessons.len() as i64));

    let views = lessons
        .iter()
        .map(|lesson| {
            let own = progress.iter().find(|p| p.lesson_id() == lesson.id());
            LessonView::new(lesson, can_view_full_lesson(viewer, lesson, is_purchased), own)
        })
        .collect();

    let reviews = CourseReviewRow::all_by_course(state.pool(), &actor, course.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(CourseReview::get_resource_type(), e))?
        .into_iter()
        .map(ReviewResponse::from)
        .collect();

    let detail = CourseDetailResponse::new(&course, views, is_purchased, user_progress, reviews);
    Ok((StatusCode::OK, Json(detail)))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{slug}/my_progress/",
    description = "Progress of the current user on every lesson of the course",
    params(
        ("slug" = String, Path, description = "Slug of the course")
    ),
    responses(
        (status = 200, description = "Progress per lesson", body = Vec<LessonProgressView>),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "You're not enrolled in the course", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses",
    security(
        ("cookie" = [])
    )
)]
async fn courses_my_progress_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let course = Course::find_active_by_slug(state.pool(), user, &slug)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Course::get_resource_type()))?;

    check_enrollment(state.pool(), user, course.id(), "you are not enrolled in this course")
        .await
        .map_err(|e| WebError::from_database(Course::get_resource_type(), e))?;

    let lessons = Lesson::all_by_course(state.pool(), user, course.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;
    let progress = LessonProgress::all_by_course(state.pool(), user, course.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(LessonProgress::get_resource_type(), e))?;

    let entries = lessons
        .iter()
        .map(|lesson| {
            progress
                .iter()
                .find(|p| p.lesson_id() == lesson.id())
                .map(LessonProgressView::from)
                .unwrap_or_else(|| LessonProgressView::untouched(lesson.id()))
        })
        .collect::<Vec<_>>();

    Ok((StatusCode::OK, Json(entries)))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{course_id}/reviews/",
    description = "Reviews of the course, newest first",
    params(
        ("course_id" = Uuid, Path, description = "ID of the course")
    ),
    responses(
        (status = 200, description = "Reviews", body = Vec<ReviewResponse>),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "reviews"
)]
async fn reviews_list_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let actor = ctx.actor();

    Course::find_by_id(state.pool(), &actor, course_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Course::get_resource_type()))?;

    let reviews = CourseReviewRow::all_by_course(state.pool(), &actor, course_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(CourseReview::get_resource_type(), e))?
        .into_iter()
        .map(ReviewResponse::from)
        .collect::<Vec<_>>();

    Ok((StatusCode::OK, Json(reviews)))
}

#[utoipa::path(
    post,
    path = "/api/v1/courses/{course_id}/reviews/create/",
    description = "Reviews a purchased course. Each student reviews a course once",
    params(
        ("course_id" = Uuid, Path, description = "ID of the course")
    ),
    request_body = CourseReviewCreate,
    responses(
        (status = 201, description = "Review created", body = ReviewResponse),
        (status = 400, description = "Rating invalid or course already reviewed", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Course is not purchased", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "reviews",
    security(
        ("cookie" = [])
    )
)]
async fn reviews_create_handler(
    user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    JsonBody(payload): JsonBody<CourseReviewCreate>,
) -> WebResult<impl IntoResponse> {
    let review = CourseReview::submit(state.pool(), &user, course_id, payload)
        .await
        .map_err(|e| WebError::from_database(CourseReview::get_resource_type(), e))?;

    Ok((StatusCode::CREATED, Json(ReviewResponse::from(review))))
}
