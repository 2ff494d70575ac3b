use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, prelude::FromRow};
use uuid::Uuid;

use crate::model::{DatabaseResult, ModelManager, ResourceType, ResourceTyped};

/// Membership of a user in a course's student set. The only thing that
/// unlocks paid lessons.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Enrollment {
    user_id: Uuid,
    course_id: Uuid,
    order_id: Option<Uuid>,
    granted_at: DateTime<Utc>,
}

impl ResourceTyped for Enrollment {
    fn get_resource_type() -> ResourceType {
        ResourceType::Enrollment
    }
}

impl Enrollment {
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn course_id(&self) -> Uuid {
        self.course_id
    }

    pub fn order_id(&self) -> Option<Uuid> {
        self.order_id
    }

    pub fn granted_at(&self) -> DateTime<Utc> {
        self.granted_at
    }

    pub async fn exists(
        mm: &ModelManager,
        user_id: Uuid,
        course_id: Uuid,
    ) -> DatabaseResult<bool> {
        Self::exists_in(mm.executor(), user_id, course_id).await
    }

    pub async fn exists_in<'c>(
        conn: impl PgExecutor<'c>,
        user_id: Uuid,
        course_id: Uuid,
    ) -> DatabaseResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM enrollments WHERE user_id = $1 AND course_id = $2)",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_one(conn)
        .await?;

        Ok(exists)
    }

    /// Adds the user to the course's students. Granting twice keeps the
    /// original row.
    pub async fn grant<'c>(
        conn: impl PgExecutor<'c>,
        user_id: Uuid,
        course_id: Uuid,
        order_id: Option<Uuid>,
    ) -> DatabaseResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO enrollments (user_id, course_id, order_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, course_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .bind(order_id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn find_in<'c>(
        conn: impl PgExecutor<'c>,
        user_id: Uuid,
        course_id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM enrollments WHERE user_id = $1 AND course_id = $2",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(conn)
        .await?;

        Ok(result)
    }
}
