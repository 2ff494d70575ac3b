use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::{
    model::{DatabaseResult, ModelManager, ResourceType, ResourceTyped},
    web::AuthenticatedUser,
};

const COLUMNS: &str = "id, message, response, created_at";

/// One exchange with the AI coach: the student's message and what was answered.
/// Rows are always read scoped to their author, so the owner is not carried.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct ChatMessage {
    id: Uuid,
    message: String,
    response: String,
    created_at: DateTime<Utc>,
}

impl ResourceTyped for ChatMessage {
    fn get_resource_type() -> ResourceType {
        ResourceType::ChatMessage
    }
}

impl ChatMessage {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn response(&self) -> &str {
        &self.response
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub async fn create(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        message: &str,
        response: &str,
    ) -> DatabaseResult<Self> {
        let query = format!(
            r#"
            INSERT INTO chat_messages (id, user_id, message, response)
            VALUES ($1, $2, $3, $4)
            RETURNING {COLUMNS}
            "#
        );
        let row = sqlx::query_as(&query)
        .bind(Uuid::new_v4())
        .bind(actor.user_id())
        .bind(message)
        .bind(response)
        .fetch_one(mm.executor())
        .await?;

        Ok(row)
    }

    /// Messages sent by the actor since midnight UTC.
    pub async fn count_today(mm: &ModelManager, actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM chat_messages
            WHERE user_id = $1 AND created_at >= date_trunc('day', now() AT TIME ZONE 'UTC') AT TIME ZONE 'UTC'
            "#,
        )
        .bind(actor.user_id())
        .fetch_one(mm.executor())
        .await?;

        Ok(count)
    }

    /// The `limit` most recent messages, oldest first.
    pub async fn recent(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        limit: i64,
    ) -> DatabaseResult<Vec<Self>> {
        let query = format!(
            r#"
            SELECT {COLUMNS} FROM (
                SELECT {COLUMNS} FROM chat_messages
                WHERE user_id = $1
                ORDER BY created_at DESC
                LIMIT $2
            ) latest
            ORDER BY created_at ASC
            "#
        );
        let rows = sqlx::query_as(&query)
        .bind(actor.user_id())
        .bind(limit)
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }

    pub async fn clear(mm: &ModelManager, actor: &AuthenticatedUser) -> DatabaseResult<u64> {
        let result = sqlx::query("DELETE FROM chat_messages WHERE user_id = $1")
            .bind(actor.user_id())
            .execute(mm.executor())
            .await?;

        Ok(result.rows_affected())
    }
}
