use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    model::entity::{Enrollment, Order, Payment},
    web::dto::courses::CourseListItem,
};

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub course: Uuid,
    pub course_details: Option<CourseListItem>,
    pub amount: Decimal,
    pub status: String,
    pub payment_method: String,
    pub created_at: DateTime<Utc>,
}

impl OrderResponse {
    pub fn new(order: &Order, course_details: Option<CourseListItem>) -> Self {
        Self {
            id: order.id(),
            course: order.course_id(),
            course_details,
            amount: order.amount(),
            status: order.status().to_string(),
            payment_method: order.payment_method().to_string(),
            created_at: order.created_at(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PaymentCompletedResponse {
    pub detail: String,
    pub order: OrderResponse,
    pub payment: PaymentResponse,
    pub enrollment: EnrollmentResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub order: Uuid,
    pub paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
}

impl From<&Payment> for PaymentResponse {
    fn from(payment: &Payment) -> Self {
        Self {
            id: payment.id(),
            order: payment.order_id(),
            paid: payment.paid(),
            paid_at: payment.paid_at(),
        }
    }
}

/// Course membership the payment unlocked. `order` points at the order that
/// first granted it.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct EnrollmentResponse {
    pub course: Uuid,
    pub order: Option<Uuid>,
    pub granted_at: DateTime<Utc>,
}

impl From<&Enrollment> for EnrollmentResponse {
    fn from(enrollment: &Enrollment) -> Self {
        Self {
            course: enrollment.course_id(),
            order: enrollment.order_id(),
            granted_at: enrollment.granted_at(),
        }
    }
}
