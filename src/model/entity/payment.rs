use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, prelude::FromRow};
use uuid::Uuid;

use crate::model::{DatabaseResult, ResourceType, ResourceTyped};

/// Settlement record of an order, one per order.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Payment {
    id: Uuid,
    order_id: Uuid,
    provider_reference: Option<String>,
    paid: bool,
    paid_at: Option<DateTime<Utc>>,
}

impl ResourceTyped for Payment {
    fn get_resource_type() -> ResourceType {
        ResourceType::Payment
    }
}

impl Payment {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn order_id(&self) -> Uuid {
        self.order_id
    }

    pub fn paid(&self) -> bool {
        self.paid
    }

    pub fn paid_at(&self) -> Option<DateTime<Utc>> {
        self.paid_at
    }

    /// Creates the order's payment row or flips the existing one to paid.
    pub async fn mark_paid<'c>(conn: impl PgExecutor<'c>, order_id: Uuid) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            INSERT INTO payments (id, order_id, paid, paid_at)
            VALUES ($1, $2, TRUE, now())
            ON CONFLICT (order_id) DO UPDATE SET paid = TRUE, paid_at = now()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(order_id)
        .fetch_one(conn)
        .await?;

        Ok(row)
    }
}
