use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

/// A chapter mark inside the lesson video, e.g. `{"time": "01:30", "label": "Footwork"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LessonTimestamp {
    pub time: String,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Pdf,
    Video,
    Image,
    Link,
}

/// Downloadable material attached to a lesson.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LessonResource {
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub url: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoFormat {
    Horizontal,
    Vertical,
    Square,
}

impl From<&str> for VideoFormat {
    fn from(value: &str) -> Self {
        match value {
            "9:16" => Self::Vertical,
            "1:1" => Self::Square,
            _ => Self::Horizontal,
        }
    }
}

impl std::fmt::Display for VideoFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Horizontal => write!(f, "16:9"),
            Self::Vertical => write!(f, "9:16"),
            Self::Square => write!(f, "1:1"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Lesson {
    id: Uuid,
    course_id: Uuid,
    title: String,
    order_index: i32,
    video_file: Option<String>,
    video_url: String,
    video_format: String,
    duration_minutes: i32,
    text_content: String,
    #[schema(value_type = Vec<LessonTimestamp>)]
    timestamps: Json<Vec<LessonTimestamp>>,
    #[schema(value_type = Vec<LessonResource>)]
    resources: Json<Vec<LessonResource>>,
    is_free_preview: bool,
    preview_duration_seconds: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ResourceTyped for Lesson {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Lesson
    }
}

impl Lesson {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn course_id(&self) -> Uuid {
        self.course_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn order_index(&self) -> i32 {
        self.order_index
    }

    /// Uploaded file wins over the external URL; blank means no video.
    pub fn video_reference(&self) -> Option<String> {
        match self.video_file.as_deref() {
            Some(file) if !file.is_empty() => Some(crate::utils::uploads::upload_url(file)),
            _ if !self.video_url.is_empty() => Some(self.video_url.clone()),
            _ => None,
        }
    }

    pub fn video_format(&self) -> VideoFormat {
        VideoFormat::from(self.video_format.as_str())
    }

    pub fn duration_minutes(&self) -> i32 {
        self.duration_minutes
    }

    pub fn text_content(&self) -> &str {
        &self.text_content
    }

    pub fn timestamps(&self) -> &[LessonTimestamp] {
        &self.timestamps
    }

    pub fn resources(&self) -> &[LessonResource] {
        &self.resources
    }

    pub fn is_free_preview(&self) -> bool {
        self.is_free_preview
    }

    pub fn preview_duration_seconds(&self) -> i32 {
        self.preview_duration_seconds
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LessonCreate {
    pub course_id: Uuid,
    pub title: String,
    pub order_index: Option<i32>,
    pub video_file: Option<String>,
    pub video_url: Option<String>,
    pub video_format: Option<String>,
    pub duration_minutes: Option<i32>,
    pub text_content: String,
    pub timestamps: Vec<LessonTimestamp>,
    pub resources: Vec<LessonResource>,
    pub is_free_preview: bool,
    pub preview_duration_seconds: Option<i32>,
}

#[async_trait]
impl CrudRepository<Lesson, LessonCreate, Uuid> for Lesson {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: LessonCreate,
    ) -> DatabaseResult<Self> {
        let format = VideoFormat::from(data.video_format.as_deref().unwrap_or_default());
        let result = sqlx::query_as(
            r#"
            INSERT INTO lessons (
                id, course_id, title, order_index, video_file, video_url, video_format,
                duration_minutes, text_content, timestamps, resources, is_free_preview,
                preview_duration_seconds
            )
            VALUES (
                $1, $2, $3,
                COALESCE($4, (SELECT COALESCE(MAX(order_index) + 1, 0) FROM lessons WHERE course_id = $2)),
                $5, $6, $7, $8, $9, $10, $11, $12, $13
            )
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.course_id)
        .bind(&data.title)
        .bind(data.order_index)
        .bind(&data.video_file)
        .bind(data.video_url.as_deref().unwrap_or_default())
        .bind(format.to_string())
        .bind(data.duration_minutes.unwrap_or(0))
        .bind(&data.text_content)
        .bind(Json(&data.timestamps))
        .bind(Json(&data.resources))
        .bind(data.is_free_preview)
        .bind(data.preview_duration_seconds.unwrap_or(120))
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }

    async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM lessons WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;

        Ok(result)
    }
}

impl Lesson {
    pub async fn all_by_course(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        course_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM lessons WHERE course_id = $1 ORDER BY order_index, created_at",
        )
        .bind(course_id)
        .fetch_all(mm.executor())
        .await?;

        Ok(result)
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    pub(crate) fn lesson_fixture(is_free_preview: bool, text_content: &str) -> Lesson {
        Lesson {
            id: Uuid::new_v4(),
            course_id: Uuid::new_v4(),
            title: String::from("Stance and balance"),
            order_index: 0,
            video_file: None,
            video_url: String::from("https://example.com/lesson1.mp4"),
            video_format: String::from("16:9"),
            duration_minutes: 12,
            text_content: text_content.to_string(),
            timestamps: Json(vec![LessonTimestamp {
                time: String::from("00:00"),
                label: String::from("Intro"),
            }]),
            resources: Json(vec![LessonResource {
                kind: ResourceKind::Pdf,
                url: String::from("https://example.com/stance.pdf"),
                name: String::from("Stance cheatsheet"),
            }]),
            is_free_preview,
            preview_duration_seconds: 120,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_video_reference_prefers_upload() {
        let mut lesson = lesson_fixture(false, "");
        assert_eq!(
            lesson.video_reference().as_deref(),
            Some("https://example.com/lesson1.mp4")
        );

        lesson.video_file = Some(String::from("lessons/videos/stance.mp4"));
        assert_eq!(
            lesson.video_reference().as_deref(),
            Some("/api/v1/static/lessons/videos/stance.mp4")
        );

        lesson.video_file = Some(String::new());
        lesson.video_url = String::new();
        assert_eq!(lesson.video_reference(), None);
    }

    #[test]
    fn test_resource_kind_wire_format() {
        let res: LessonResource =
            serde_json::from_str(r#"{"type":"pdf","url":"/a.pdf","name":"A"}"#).unwrap();
        assert_eq!(res.kind, ResourceKind::Pdf);
        assert!(serde_json::from_str::<LessonResource>(r#"{"type":"exe","url":"x","name":"x"}"#).is_err());
    }

    #[test]
    fn test_video_format_parse() {
        assert_eq!(VideoFormat::from("9:16"), VideoFormat::Vertical);
        assert_eq!(VideoFormat::from("bogus").to_string(), "16:9");
    }
}
