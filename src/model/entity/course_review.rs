use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, prelude::FromRow};
use uuid::Uuid;

use crate::{
    model::{
        DatabaseError, DatabaseResult, ModelManager, ResourceType, ResourceTyped,
        entity::{Enrollment, user::display_name},
    },
    web::AuthenticatedUser,
};

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct CourseReview {
    id: Uuid,
    course_id: Uuid,
    user_id: Uuid,
    rating: i16,
    comment: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ResourceTyped for CourseReview {
    fn get_resource_type() -> ResourceType {
        ResourceType::CourseReview
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CourseReviewCreate {
    pub rating: i16,
    #[serde(default)]
    pub comment: String,
}

impl CourseReviewCreate {
    pub fn validate(&self) -> DatabaseResult<()> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(DatabaseError::Invalid(format!(
                "rating must be between {} and {}",
                MIN_RATING, MAX_RATING
            )));
        }
        Ok(())
    }
}

/// Review joined with its author, as shown on the course page.
#[derive(Debug, Clone, FromRow)]
pub struct CourseReviewRow {
    pub id: Uuid,
    pub course_id: Uuid,
    pub user_email: String,
    pub first_name: String,
    pub last_name: String,
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl CourseReviewRow {
    pub fn user_name(&self) -> String {
        display_name(&self.first_name, &self.last_name, &self.user_email)
    }

    async fn find_in<'c>(conn: impl PgExecutor<'c>, id: Uuid) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            SELECT r.id, r.course_id, u.email AS user_email, u.first_name, u.last_name,
                   r.rating, r.comment, r.created_at
            FROM course_reviews r
            JOIN users u ON u.id = r.user_id
            WHERE r.id = $1
            "#,
        )
        .bind(id)
        .fetch_one(conn)
        .await?;

        Ok(row)
    }

    /// Reviews of the course, newest first.
    pub async fn all_by_course(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        course_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            r#"
            SELECT r.id, r.course_id, u.email AS user_email, u.first_name, u.last_name,
                   r.rating, r.comment, r.created_at
            FROM course_reviews r
            JOIN users u ON u.id = r.user_id
            WHERE r.course_id = $1
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(course_id)
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }
}

/// Course rating derived from the full set of its reviews.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingSummary {
    pub rating: Decimal,
    pub reviews_count: i32,
}

impl RatingSummary {
    /// Unweighted mean rounded to 2 places, zero when there are no reviews.
    pub fn from_ratings(ratings: &[i16]) -> Self {
        if ratings.is_empty() {
            return Self {
                rating: Decimal::ZERO,
                reviews_count: 0,
            };
        }

        let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
        let rating = (Decimal::from(sum) / Decimal::from(ratings.len()))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);

        Self {
            rating,
            reviews_count: ratings.len() as i32,
        }
    }
}

impl CourseReview {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn rating(&self) -> i16 {
        self.rating
    }

    /// Stores the actor's review and recomputes the course rating in the same
    /// transaction. The course row stays locked until commit so concurrent
    /// reviews of one course are applied one after another.
    #[tracing::instrument(skip(mm, actor, data), fields(user_id = %actor.user_id()))]
    pub async fn submit(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        course_id: Uuid,
        data: CourseReviewCreate,
    ) -> DatabaseResult<CourseReviewRow> {
        let mut tx = mm.begin().await?;

        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM courses WHERE id = $1 FOR UPDATE")
                .bind(course_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(DatabaseError::NotFound);
        }

        if !Enrollment::exists_in(&mut *tx, actor.user_id(), course_id).await? {
            return Err(DatabaseError::Forbidden(
                "you can only review courses you have purchased",
            ));
        }

        let reviewed: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM course_reviews WHERE course_id = $1 AND user_id = $2)",
        )
        .bind(course_id)
        .bind(actor.user_id())
        .fetch_one(&mut *tx)
        .await?;
        if reviewed {
            return Err(DatabaseError::Conflict("you have already reviewed this course"));
        }

        data.validate()?;

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO course_reviews (id, course_id, user_id, rating, comment)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(course_id)
        .bind(actor.user_id())
        .bind(data.rating)
        .bind(data.comment.trim())
        .fetch_one(&mut *tx)
        .await?;

        let ratings: Vec<i16> =
            sqlx::query_scalar("SELECT rating FROM course_reviews WHERE course_id = $1")
                .bind(course_id)
                .fetch_all(&mut *tx)
                .await?;
        let summary = RatingSummary::from_ratings(&ratings);

        sqlx::query(
            "UPDATE courses SET rating = $1, reviews_count = $2, updated_at = now() WHERE id = $3",
        )
        .bind(summary.rating)
        .bind(summary.reviews_count)
        .bind(course_id)
        .execute(&mut *tx)
        .await?;

        let row = CourseReviewRow::find_in(&mut *tx, id).await?;
        tx.commit().await?;

        tracing::info!(
            "review {} stored, course {} rating is now {} ({} reviews)",
            id,
            course_id,
            summary.rating,
            summary.reviews_count
        );
        Ok(row)
    }
}
