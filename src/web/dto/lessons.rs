use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::entity::{Lesson, LessonProgress, LessonResource, LessonTimestamp};

/// Characters of text kept in a locked lesson.
pub const TEASER_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LessonProgressView {
    pub lesson: Uuid,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub watch_time_seconds: i32,
    pub last_position_seconds: i32,
}

impl LessonProgressView {
    /// Progress of a lesson the user never opened.
    pub fn untouched(lesson_id: Uuid) -> Self {
        Self {
            lesson: lesson_id,
            completed: false,
            completed_at: None,
            watch_time_seconds: 0,
            last_position_seconds: 0,
        }
    }
}

impl From<&LessonProgress> for LessonProgressView {
    fn from(p: &LessonProgress) -> Self {
        Self {
            lesson: p.lesson_id(),
            completed: p.completed(),
            completed_at: p.completed_at(),
            watch_time_seconds: p.watch_time_seconds(),
            last_position_seconds: p.last_position_seconds(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LessonView {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub order_index: i32,
    pub video_url: Option<String>,
    pub video_format: String,
    pub duration_minutes: i32,
    pub text_content: String,
    pub timestamps: Vec<LessonTimestamp>,
    pub resources: Vec<LessonResource>,
    pub is_free_preview: bool,
    pub preview_duration_seconds: i32,
    pub progress: Option<LessonProgressView>,
}

impl LessonView {
    /// Lesson as shown to a viewer; without full access the content is cut
    /// down to a teaser.
    pub fn new(lesson: &Lesson, full_access: bool, progress: Option<&LessonProgress>) -> Self {
        let mut view = Self {
            id: lesson.id(),
            course_id: lesson.course_id(),
            title: lesson.title().to_string(),
            order_index: lesson.order_index(),
            video_url: lesson.video_reference(),
            video_format: lesson.video_format().to_string(),
            duration_minutes: lesson.duration_minutes(),
            text_content: lesson.text_content().to_string(),
            timestamps: lesson.timestamps().to_vec(),
            resources: lesson.resources().to_vec(),
            is_free_preview: lesson.is_free_preview(),
            preview_duration_seconds: lesson.preview_duration_seconds(),
            progress: progress.map(LessonProgressView::from),
        };

        if !full_access {
            view.redact();
        }
        view
    }

    fn redact(&mut self) {
        self.video_url = None;
        self.text_content = teaser(&self.text_content);
        self.resources.clear();
    }
}

pub fn teaser(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let mut cut: String = text.chars().take(TEASER_CHARS).collect();
    cut.push_str("...");
    cut
}
