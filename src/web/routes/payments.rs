use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    model::{
        ModelManager, ResourceTyped,
        entity::{Course, CourseSummaryRow, Order},
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, WebError, WebResult,
        dto::{
            courses::CourseListItem,
            orders::{OrderResponse, PaymentCompletedResponse},
        },
        error::ErrorResponse,
        extract::JsonBody,
        middlewares,
    },
};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateOrderBody {
    pub course_id: Uuid,
}

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/orders/", get(orders_list_handler))
        .route("/orders/create/", post(orders_create_handler))
        .route("/orders/{id}/complete/", post(orders_complete_handler))
        .route("/my-courses/", get(my_courses_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

async fn order_response(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
    order: &Order,
) -> WebResult<OrderResponse> {
    let details = CourseSummaryRow::find_by_id(mm, actor, order.course_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?
        .map(CourseListItem::from);

    Ok(OrderResponse::new(order, details))
}

#[utoipa::path(
    post,
    path = "/api/v1/payments/orders/create/",
    description = "Opens a pending order for a course at its current price",
    request_body = CreateOrderBody,
    responses(
        (status = 201, description = "Order created", body = OrderResponse),
        (status = 400, description = "Course already purchased", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 404, description = "Course not found or inactive", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "payments",
    security(
        ("cookie" = [])
    )
)]
async fn orders_create_handler(
    user: AuthenticatedUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateOrderBody>,
) -> WebResult<impl IntoResponse> {
    let order = Order::place(state.pool(), &user, payload.course_id)
        .await
        .map_err(|e| WebError::from_database(Order::get_resource_type(), e))?;

    let response = order_response(state.pool(), &user, &order).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/v1/payments/orders/{order_id}/complete/",
    description = "Settles the order with the mock provider and unlocks the course",
    params(
        ("order_id" = Uuid, Path, description = "ID of the caller's order")
    ),
    responses(
        (status = 200, description = "Payment completed", body = PaymentCompletedResponse),
        (status = 400, description = "Order already paid", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "payments",
    security(
        ("cookie" = [])
    )
)]
async fn orders_complete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let completed = Order::complete(state.pool(), user, id)
        .await
        .map_err(|e| WebError::from_database(Order::get_resource_type(), e))?;

    let order = order_response(state.pool(), user, &completed.order).await?;
    let response = PaymentCompletedResponse {
        detail: String::from("Payment completed, the course is now available."),
        order,
        payment: (&completed.payment).into(),
        enrollment: (&completed.enrollment).into(),
    };

    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/v1/payments/orders/",
    description = "Orders of the current user, newest first",
    responses(
        (status = 200, description = "Orders", body = Vec<OrderResponse>),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "payments",
    security(
        ("cookie" = [])
    )
)]
async fn orders_list_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let orders = Order::all_by_user(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Order::get_resource_type(), e))?;

    let mut response = Vec::with_capacity(orders.len());
    for order in &orders {
        response.push(order_response(state.pool(), user, order).await?);
    }

    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/v1/payments/my-courses/",
    description = "Courses the current user is enrolled in",
    responses(
        (status = 200, description = "Purchased courses", body = Vec<CourseListItem>),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "payments",
    security(
        ("cookie" = [])
    )
)]
async fn my_courses_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let courses = CourseSummaryRow::list_enrolled(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?
        .into_iter()
        .map(CourseListItem::from)
        .collect::<Vec<_>>();

    Ok((StatusCode::OK, Json(courses)))
}
