pub(crate) mod user;
pub use user::{UserEntity, UserEntityCreate};

mod course;
pub use course::{AccessType, Course, CourseCreate, CourseLevel, CourseSummaryRow};

pub(crate) mod lesson;
pub use lesson::{Lesson, LessonCreate, LessonResource, LessonTimestamp, ResourceKind, VideoFormat};

mod lesson_progress;
pub use lesson_progress::{CourseProgressSummary, LessonProgress, ProgressUpdate};

mod course_review;
pub use course_review::{CourseReview, CourseReviewCreate, CourseReviewRow, RatingSummary};

mod enrollment;
pub use enrollment::Enrollment;

mod order;
pub use order::{CompletedOrder, Order, OrderStatus};

mod payment;
pub use payment::Payment;

mod chat_message;
pub use chat_message::ChatMessage;
