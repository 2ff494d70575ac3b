use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    model::entity::{Course, CourseProgressSummary, CourseSummaryRow},
    utils::uploads::upload_url,
    web::dto::{lessons::LessonView, reviews::ReviewResponse},
};

fn image_url(path: Option<&str>) -> Option<String> {
    path.filter(|p| !p.is_empty()).map(upload_url)
}

/// Course card for catalog lists, without lesson bodies.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CourseListItem {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub cover_image: Option<String>,
    pub price: Decimal,
    pub duration_hours: i32,
    pub level: String,
    pub category: String,
    pub rating: Decimal,
    pub reviews_count: i32,
    pub lessons_count: i64,
    pub access_type: String,
}

impl From<CourseSummaryRow> for CourseListItem {
    fn from(row: CourseSummaryRow) -> Self {
        Self {
            cover_image: image_url(row.cover_image.as_deref()),
            id: row.id,
            title: row.title,
            slug: row.slug,
            description: row.description,
            price: row.price,
            duration_hours: row.duration_hours,
            level: row.level,
            category: row.category,
            rating: row.rating,
            reviews_count: row.reviews_count,
            lessons_count: row.lessons_count,
            access_type: row.access_type,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CourseDetailResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub full_description: String,
    pub cover_image: Option<String>,
    pub banner_image: Option<String>,
    pub price: Decimal,
    pub duration_hours: i32,
    pub level: String,
    pub category: String,
    pub rating: Decimal,
    pub reviews_count: i32,
    pub benefits: Vec<String>,
    pub access_type: String,
    pub has_certificate: bool,
    pub lessons_count: i64,
    pub total_duration_minutes: i64,
    pub lessons: Vec<LessonView>,
    pub is_purchased: bool,
    pub user_progress: Option<CourseProgressSummary>,
    pub reviews: Vec<ReviewResponse>,
    pub created_at: DateTime<Utc>,
}

impl CourseDetailResponse {
    pub fn new(
        course: &Course,
        lessons: Vec<LessonView>,
        is_purchased: bool,
        user_progress: Option<CourseProgressSummary>,
        reviews: Vec<ReviewResponse>,
    ) -> Self {
        let total_duration_minutes = lessons.iter().map(|l| i64::from(l.duration_minutes)).sum();

        Self {
            id: course.id(),
            title: course.title().to_string(),
            slug: course.slug().to_string(),
            description: course.description().to_string(),
            full_description: course.full_description().to_string(),
            cover_image: image_url(course.cover_image()),
            banner_image: image_url(course.banner_image()),
            price: course.price(),
            duration_hours: course.duration_hours(),
            level: course.level().to_string(),
            category: course.category().to_string(),
            rating: course.rating(),
            reviews_count: course.reviews_count(),
            benefits: course.benefits().to_vec(),
            access_type: course.access_type().to_string(),
            has_certificate: course.has_certificate(),
            lessons_count: lessons.len() as i64,
            total_duration_minutes,
            lessons,
            is_purchased,
            user_progress,
            reviews,
            created_at: course.created_at(),
        }
    }
}
