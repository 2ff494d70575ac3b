use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct LessonProgress {
    id: Uuid,
    user_id: Uuid,
    lesson_id: Uuid,
    completed: bool,
    completed_at: Option<DateTime<Utc>>,
    watch_time_seconds: i32,
    last_position_seconds: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ResourceTyped for LessonProgress {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::LessonProgress
    }
}

impl LessonProgress {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn lesson_id(&self) -> Uuid {
        self.lesson_id
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn watch_time_seconds(&self) -> i32 {
        self.watch_time_seconds
    }

    pub fn last_position_seconds(&self) -> i32 {
        self.last_position_seconds
    }
}

/// Partial progress update. `None` keeps the stored value, `completed:
/// Some(false)` is ignored since completion is never revoked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ProgressUpdate {
    pub completed: Option<bool>,
    pub watch_time_seconds: Option<i32>,
    pub last_position_seconds: Option<i32>,
}

impl LessonProgress {
    /// Upserts the actor's progress on `lesson_id`. Access is checked by the caller.
    #[tracing::instrument(skip(mm, actor), fields(user_id = %actor.user_id()))]
    pub async fn record(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        lesson_id: Uuid,
        update: ProgressUpdate,
    ) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            INSERT INTO lesson_progress (
                id, user_id, lesson_id, completed, completed_at,
                watch_time_seconds, last_position_seconds
            )
            VALUES (
                $1, $2, $3, COALESCE($4, FALSE),
                CASE WHEN COALESCE($4, FALSE) THEN now() END,
                COALESCE($5, 0), COALESCE($6, 0)
            )
            ON CONFLICT (user_id, lesson_id) DO UPDATE SET
                completed = lesson_progress.completed OR COALESCE($4, FALSE),
                completed_at = CASE
                    WHEN COALESCE($4, FALSE) THEN COALESCE(lesson_progress.completed_at, now())
                    ELSE lesson_progress.completed_at
                END,
                watch_time_seconds = COALESCE($5, lesson_progress.watch_time_seconds),
                last_position_seconds = COALESCE($6, lesson_progress.last_position_seconds),
                updated_at = now()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(actor.user_id())
        .bind(lesson_id)
        .bind(update.completed)
        .bind(update.watch_time_seconds)
        .bind(update.last_position_seconds)
        .fetch_one(mm.executor())
        .await?;

        tracing::debug!("progress recorded for lesson {}", lesson_id);
        Ok(row)
    }

    /// Actor's progress rows for every lesson of the course that has one.
    pub async fn all_by_course(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        course_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            r#"
            SELECT lp.*
            FROM lesson_progress lp
            JOIN lessons l ON l.id = lp.lesson_id
            WHERE lp.user_id = $1 AND l.course_id = $2
            "#,
        )
        .bind(actor.user_id())
        .bind(course_id)
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }

    pub async fn find_for_lesson(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        lesson_id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let row = sqlx::query_as(
            "SELECT * FROM lesson_progress WHERE user_id = $1 AND lesson_id = $2",
        )
        .bind(actor.user_id())
        .bind(lesson_id)
        .fetch_optional(mm.executor())
        .await?;

        Ok(row)
    }
}

/// Completion of a course by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CourseProgressSummary {
    pub completed: i64,
    pub total: i64,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub percentage: Decimal,
}

impl CourseProgressSummary {
    pub fn new(completed: i64, total: i64) -> Self {
        if total == 0 {
            return Self {
                completed: 0,
                total: 0,
                percentage: Decimal::ZERO,
            };
        }

        let percentage = (Decimal::from(completed) * Decimal::ONE_HUNDRED / Decimal::from(total))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
            .normalize();

        Self {
            completed,
            total,
            percentage,
        }
    }

    pub fn from_progress(progress: &[LessonProgress], total: i64) -> Self {
        let completed = progress.iter().filter(|p| p.completed()).count() as i64;
        Self::new(completed, total)
    }
}
