use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::{
    model::{
        DatabaseError, DatabaseResult, ModelManager, ResourceType, ResourceTyped,
        entity::{Course, Enrollment, Payment},
    },
    web::AuthenticatedUser,
};

/// Order lifecycle. The mock flow only ever moves `Pending -> Completed`,
/// `Failed` and `Refunded` are left for a real payment provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl From<&str> for OrderStatus {
    fn from(value: &str) -> Self {
        match value {
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            "refunded" => Self::Refunded,
            _ => Self::Pending,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
            Self::Refunded => write!(f, "refunded"),
        }
    }
}

pub const MOCK_PAYMENT_METHOD: &str = "mock";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Order {
    id: Uuid,
    user_id: Uuid,
    course_id: Uuid,
    amount: Decimal,
    status: String,
    payment_method: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ResourceTyped for Order {
    fn get_resource_type() -> ResourceType {
        ResourceType::Order
    }
}

impl Order {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn course_id(&self) -> Uuid {
        self.course_id
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn status(&self) -> OrderStatus {
        OrderStatus::from(self.status.as_str())
    }

    pub fn payment_method(&self) -> &str {
        &self.payment_method
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Outcome of a settled order.
#[derive(Debug, Clone)]
pub struct CompletedOrder {
    pub order: Order,
    pub payment: Payment,
    pub enrollment: Enrollment,
}

impl Order {
    /// Opens a pending order for an active course, snapshotting its price.
    #[tracing::instrument(skip(mm, actor), fields(user_id = %actor.user_id()))]
    pub async fn place(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        course_id: Uuid,
    ) -> DatabaseResult<Self> {
        let course = Course::find_active_by_id(mm, actor, course_id)
            .await?
            .ok_or(DatabaseError::NotFound)?;

        if Enrollment::exists(mm, actor.user_id(), course.id()).await? {
            return Err(DatabaseError::Conflict("you have already purchased this course"));
        }

        let order: Self = sqlx::query_as(
            r#"
            INSERT INTO orders (id, user_id, course_id, amount, status, payment_method)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(actor.user_id())
        .bind(course.id())
        .bind(course.price())
        .bind(OrderStatus::Pending.to_string())
        .bind(MOCK_PAYMENT_METHOD)
        .fetch_one(mm.executor())
        .await?;

        tracing::info!("order {} placed for course {}", order.id, course.id());
        Ok(order)
    }

    /// Settles the order: marks it completed, records the payment and enrolls
    /// the buyer, all in one transaction.
    #[tracing::instrument(skip(mm, actor), fields(user_id = %actor.user_id()))]
    pub async fn complete(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        order_id: Uuid,
    ) -> DatabaseResult<CompletedOrder> {
        let mut tx = mm.begin().await?;

        let order: Self = sqlx::query_as(
            "SELECT * FROM orders WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(order_id)
        .bind(actor.user_id())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DatabaseError::NotFound)?;

        if order.status() == OrderStatus::Completed {
            return Err(DatabaseError::Conflict("this order has already been paid"));
        }

        let order: Self = sqlx::query_as(
            "UPDATE orders SET status = $1, updated_at = now() WHERE id = $2 RETURNING *",
        )
        .bind(OrderStatus::Completed.to_string())
        .bind(order.id)
        .fetch_one(&mut *tx)
        .await?;

        let payment = Payment::mark_paid(&mut *tx, order.id).await?;
        Enrollment::grant(&mut *tx, order.user_id, order.course_id, Some(order.id)).await?;
        let enrollment = Enrollment::find_in(&mut *tx, order.user_id, order.course_id)
            .await?
            .ok_or(DatabaseError::NotFound)?;

        tx.commit().await?;

        tracing::info!("order {} completed, course {} unlocked", order.id, order.course_id);
        Ok(CompletedOrder {
            order,
            payment,
            enrollment,
        })
    }

    /// Actor's orders, newest first.
    pub async fn all_by_user(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
    ) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as("SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC")
            .bind(actor.user_id())
            .fetch_all(mm.executor())
            .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_status_parse_and_display() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Completed,
            OrderStatus::Failed,
            OrderStatus::Refunded,
        ] {
            assert_eq!(OrderStatus::from(status.to_string().as_str()), status);
        }
        assert_eq!(OrderStatus::from("garbage"), OrderStatus::Pending);
    }
}
