use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseLevel {
    Beginner,
    Intermediate,
    Pro,
}

impl From<&str> for CourseLevel {
    fn from(value: &str) -> Self {
        match value {
            "intermediate" => Self::Intermediate,
            "pro" => Self::Pro,
            _ => Self::Beginner,
        }
    }
}

impl std::fmt::Display for CourseLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Beginner => write!(f, "beginner"),
            Self::Intermediate => write!(f, "intermediate"),
            Self::Pro => write!(f, "pro"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessType {
    Lifetime,
    Monthly,
    Yearly,
}

impl From<&str> for AccessType {
    fn from(value: &str) -> Self {
        match value {
            "monthly" => Self::Monthly,
            "yearly" => Self::Yearly,
            _ => Self::Lifetime,
        }
    }
}

impl std::fmt::Display for AccessType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lifetime => write!(f, "lifetime"),
            Self::Monthly => write!(f, "monthly"),
            Self::Yearly => write!(f, "yearly"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Course {
    id: Uuid,
    title: String,
    slug: String,
    description: String,
    full_description: String,
    cover_image: Option<String>,
    banner_image: Option<String>,
    category: String,
    level: String,
    price: Decimal,
    access_type: String,
    duration_hours: i32,
    rating: Decimal,
    reviews_count: i32,
    #[schema(value_type = Vec<String>)]
    benefits: Json<Vec<String>>,
    is_active: bool,
    has_certificate: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ResourceTyped for Course {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Course
    }
}

impl Course {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn full_description(&self) -> &str {
        &self.full_description
    }

    pub fn cover_image(&self) -> Option<&str> {
        self.cover_image.as_deref()
    }

    pub fn banner_image(&self) -> Option<&str> {
        self.banner_image.as_deref()
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn level(&self) -> CourseLevel {
        CourseLevel::from(self.level.as_str())
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn access_type(&self) -> AccessType {
        AccessType::from(self.access_type.as_str())
    }

    pub fn duration_hours(&self) -> i32 {
        self.duration_hours
    }

    pub fn rating(&self) -> Decimal {
        self.rating
    }

    pub fn reviews_count(&self) -> i32 {
        self.reviews_count
    }

    pub fn benefits(&self) -> &[String] {
        &self.benefits
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn has_certificate(&self) -> bool {
        self.has_certificate
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CourseCreate {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub full_description: String,
    pub cover_image: Option<String>,
    pub banner_image: Option<String>,
    pub category: String,
    pub level: String,
    pub price: Decimal,
    pub access_type: String,
    pub duration_hours: i32,
    pub benefits: Vec<String>,
    pub has_certificate: bool,
}

#[async_trait]
impl CrudRepository<Course, CourseCreate, Uuid> for Course {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: CourseCreate,
    ) -> DatabaseResult<Self> {
        if data.price.is_sign_negative() {
            return Err(crate::model::DatabaseError::Invalid(String::from(
                "price must not be negative",
            )));
        }

        let result = sqlx::query_as(
            r#"
            INSERT INTO courses (
                id, title, slug, description, full_description, cover_image, banner_image,
                category, level, price, access_type, duration_hours, benefits, has_certificate
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.title)
        .bind(&data.slug)
        .bind(&data.description)
        .bind(&data.full_description)
        .bind(&data.cover_image)
        .bind(&data.banner_image)
        .bind(&data.category)
        .bind(CourseLevel::from(data.level.as_str()).to_string())
        .bind(data.price)
        .bind(AccessType::from(data.access_type.as_str()).to_string())
        .bind(data.duration_hours)
        .bind(Json(&data.benefits))
        .bind(data.has_certificate)
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }

    async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM courses WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;

        Ok(result)
    }
}

impl Course {
    pub async fn find_active_by_slug(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        slug: &str,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM courses WHERE slug = $1 AND is_active")
            .bind(slug)
            .fetch_optional(mm.executor())
            .await?;

        Ok(result)
    }

    pub async fn find_active_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM courses WHERE id = $1 AND is_active")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;

        Ok(result)
    }

    pub async fn set_active(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        is_active: bool,
    ) -> DatabaseResult<Self> {
        sqlx::query("UPDATE courses SET is_active = $1, updated_at = now() WHERE id = $2")
            .bind(is_active)
            .bind(self.id)
            .execute(mm.executor())
            .await?;

        self.is_active = is_active;
        Ok(self)
    }
}

// Utils

/// Course row for list views, lessons are only counted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct CourseSummaryRow {
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

const SUMMARY_COLUMNS: &str = r#"
    c.id, c.title, c.slug, c.description, c.cover_image, c.price, c.duration_hours,
    c.level, c.category, c.rating, c.reviews_count, c.access_type,
    (SELECT COUNT(*) FROM lessons l WHERE l.course_id = c.id) AS lessons_count
"#;

impl CourseSummaryRow {
    pub async fn list_active(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Vec<Self>> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS} FROM courses c WHERE c.is_active ORDER BY c.created_at DESC"
        );
        let rows = sqlx::query_as(&query).fetch_all(mm.executor()).await?;
        Ok(rows)
    }

    pub async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let query = format!("SELECT {SUMMARY_COLUMNS} FROM courses c WHERE c.id = $1");
        let row = sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(row)
    }

    /// Courses the user is enrolled in, most recently granted first.
    pub async fn list_enrolled(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
    ) -> DatabaseResult<Vec<Self>> {
        let query = format!(
            r#"
            SELECT {SUMMARY_COLUMNS}
            FROM courses c
            JOIN enrollments e ON e.course_id = c.id
            WHERE e.user_id = $1
            ORDER BY e.granted_at DESC
            "#
        );
        let rows = sqlx::query_as(&query)
            .bind(actor.user_id())
            .fetch_all(mm.executor())
            .await?;
        Ok(rows)
    }
}
