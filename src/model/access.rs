use uuid::Uuid;

use crate::{
    model::{
        ModelManager,
        entity::{Enrollment, Lesson},
        error::{DatabaseError, DatabaseResult},
    },
    web::AuthenticatedUser,
};

/// Free previews are open to everybody, anything else needs an enrolled viewer.
pub fn can_view_full_lesson(
    viewer: Option<&AuthenticatedUser>,
    lesson: &Lesson,
    enrolled: bool,
) -> bool {
    if lesson.is_free_preview() {
        return true;
    }

    viewer.is_some() && enrolled
}

/// Looks up the viewer's enrollment only when the predicate depends on it.
pub async fn viewer_can_view_lesson(
    mm: &ModelManager,
    viewer: Option<&AuthenticatedUser>,
    lesson: &Lesson,
) -> DatabaseResult<bool> {
    let enrolled = match viewer {
        Some(user) if !lesson.is_free_preview() => {
            Enrollment::exists(mm, user.user_id(), lesson.course_id()).await?
        }
        _ => false,
    };

    Ok(can_view_full_lesson(viewer, lesson, enrolled))
}

pub async fn check_enrollment(
    mm: &ModelManager,
    ctx: &AuthenticatedUser,
    course_id: Uuid,
    reason: &'static str,
) -> DatabaseResult<()> {
    if Enrollment::exists(mm, ctx.user_id(), course_id).await? {
        Ok(())
    } else {
        Err(DatabaseError::Forbidden(reason))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::entity::lesson::test::lesson_fixture;

    #[test]
    fn test_free_preview_open_to_anyone() {
        let lesson = lesson_fixture(true, "text");
        let user = AuthenticatedUser::new(Uuid::new_v4());

        assert!(can_view_full_lesson(None, &lesson, false));
        assert!(can_view_full_lesson(Some(&user), &lesson, false));
        assert!(can_view_full_lesson(Some(&user), &lesson, true));
    }

    #[test]
    fn test_paid_lesson_requires_enrollment() {
        let lesson = lesson_fixture(false, "text");
        let user = AuthenticatedUser::new(Uuid::new_v4());

        assert!(!can_view_full_lesson(None, &lesson, false));
        assert!(!can_view_full_lesson(Some(&user), &lesson, false));
        assert!(can_view_full_lesson(Some(&user), &lesson, true));
    }

    #[test]
    fn test_anonymous_never_enrolled() {
        let lesson = lesson_fixture(false, "text");
        // enrollment flag without a viewer cannot unlock anything
        assert!(!can_view_full_lesson(None, &lesson, true));
    }
}
