use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::entity::CourseReviewRow;

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ReviewResponse {
    pub id: Uuid,
    pub user_email: String,
    pub user_name: String,
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl From<CourseReviewRow> for ReviewResponse {
    fn from(row: CourseReviewRow) -> Self {
        Self {
            user_name: row.user_name(),
            id: row.id,
            user_email: row.user_email,
            rating: row.rating,
            comment: row.comment,
            created_at: row.created_at,
        }
    }
}
