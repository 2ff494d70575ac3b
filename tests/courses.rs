mod common;
use axum::http::StatusCode;

use crate::common::{
    Action, Flow, LONG_TEXT_LEN, complete_order_action, order_action, parse, seed_course,
    seed_inactive_course, setup_server, setup_test_db, signup_action, switch_user_action,
};

#[tokio::test]
async fn route_course_list_test() {
    let pool = setup_test_db().await;
    let seeded = seed_course(&pool, "fundamentals").await;
    seed_inactive_course(&pool, "hidden").await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(Action::new("list", "GET", "/api/v1/courses/").assert_body(move |body| {
            let list = parse(body);
            let list = list.as_array().unwrap();
            assert_eq!(list.len(), 1, "inactive courses are not listed");

            let course = &list[0];
            assert_eq!(course["id"], seeded.id.to_string());
            assert_eq!(course["slug"], "fundamentals");
            assert_eq!(course["lessons_count"], 2);
            assert_eq!(course["price"], "2990.00");
            assert_eq!(course["cover_image"], "/api/v1/static/courses/covers/fundamentals.png");
            assert!(course.get("lessons").is_none());
        }))
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_course_detail_anonymous_test() {
    let pool = setup_test_db().await;
    let seeded = seed_course(&pool, "fundamentals").await;
    seed_inactive_course(&pool, "hidden").await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(
            Action::new("detail", "GET", "/api/v1/courses/fundamentals/").assert_body(
                move |body| {
                    let course = parse(body);
                    assert_eq!(course["is_purchased"], false);
                    assert!(course["user_progress"].is_null());
                    assert_eq!(course["lessons_count"], 2);
                    assert_eq!(course["total_duration_minutes"], 25);
                    assert_eq!(course["benefits"].as_array().unwrap().len(), 2);

                    let lessons = course["lessons"].as_array().unwrap();
                    let free = &lessons[0];
                    assert_eq!(free["id"], seeded.free_lesson.to_string());
                    assert_eq!(free["video_url"], "https://videos.example.com/stance.mp4");
                    assert_eq!(free["text_content"], "Feet shoulder width apart.");
                    assert!(free["progress"].is_null());

                    let paid = &lessons[1];
                    assert_eq!(paid["id"], seeded.paid_lesson.to_string());
                    assert!(paid["video_url"].is_null());
                    assert!(paid["resources"].as_array().unwrap().is_empty());
                    let text = paid["text_content"].as_str().unwrap();
                    assert!(text.len() < LONG_TEXT_LEN);
                    assert_eq!(text.chars().count(), 203);
                    assert!(text.ends_with("..."));
                    // metadata stays visible
                    assert_eq!(paid["video_format"], "9:16");
                    assert_eq!(paid["timestamps"][0]["label"], "Snapping back");
                },
            ),
        )
        .step(
            Action::new("detail_inactive", "GET", "/api/v1/courses/hidden/")
                .with_expect(StatusCode::NOT_FOUND),
        )
        .step(
            Action::new("detail_missing", "GET", "/api/v1/courses/nope/")
                .with_expect(StatusCode::NOT_FOUND),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_course_detail_enrolled_test() {
    let pool = setup_test_db().await;
    let seeded = seed_course(&pool, "fundamentals").await;
    let mut server = setup_server(&pool).await;
    let paid_lesson = seeded.paid_lesson;

    Flow::new()
        .step(signup_action("student@ring.side"))
        // signed in but not enrolled: progress summary exists, content still locked
        .step(
            Action::new("detail_not_enrolled", "GET", "/api/v1/courses/fundamentals/")
                .assert_body(|body| {
                    let course = parse(body);
                    assert_eq!(course["is_purchased"], false);
                    assert_eq!(course["user_progress"]["completed"], 0);
                    assert_eq!(course["user_progress"]["total"], 2);
                    assert!(course["lessons"][1]["video_url"].is_null());
                }),
        )
        .step(order_action(seeded.id))
        .step(complete_order_action())
        .step(
            Action::new("complete_lesson", "POST", format!("/api/v1/lessons/{paid_lesson}/progress/"))
                .with_body(serde_json::json!({ "completed": true })),
        )
        .step(
            Action::new("detail_enrolled", "GET", "/api/v1/courses/fundamentals/")
                .assert_body(|body| {
                    let course = parse(body);
                    assert_eq!(course["is_purchased"], true);
                    assert_eq!(course["user_progress"]["completed"], 1);
                    assert_eq!(course["user_progress"]["total"], 2);
                    assert_eq!(course["user_progress"]["percentage"].as_f64(), Some(50.0));

                    let paid = &course["lessons"][1];
                    assert_eq!(paid["video_url"], "https://videos.example.com/jab.mp4");
                    assert_eq!(paid["text_content"].as_str().unwrap().len(), 500);
                    assert_eq!(paid["resources"][0]["type"], "pdf");
                    assert_eq!(paid["progress"]["completed"], true);
                }),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_course_my_progress_test() {
    let pool = setup_test_db().await;
    let seeded = seed_course(&pool, "fundamentals").await;
    let mut server = setup_server(&pool).await;
    let free_lesson = seeded.free_lesson;
    let paid_lesson = seeded.paid_lesson;

    Flow::new()
        .step(
            Action::new("my_progress_anonymous", "GET", "/api/v1/courses/fundamentals/my_progress/")
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .step(signup_action("student@ring.side"))
        .step(
            Action::new("my_progress_not_enrolled", "GET", "/api/v1/courses/fundamentals/my_progress/")
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(order_action(seeded.id))
        .step(complete_order_action())
        .step(
            Action::new("watch", "POST", format!("/api/v1/lessons/{free_lesson}/progress/"))
                .with_body(serde_json::json!({ "watch_time_seconds": 42, "last_position_seconds": 40 })),
        )
        .step(
            Action::new("my_progress", "GET", "/api/v1/courses/fundamentals/my_progress/")
                .assert_body(move |body| {
                    let entries = parse(body);
                    let entries = entries.as_array().unwrap();
                    assert_eq!(entries.len(), 2);

                    assert_eq!(entries[0]["lesson"], free_lesson.to_string());
                    assert_eq!(entries[0]["watch_time_seconds"], 42);
                    assert_eq!(entries[0]["last_position_seconds"], 40);
                    assert_eq!(entries[0]["completed"], false);

                    // untouched lesson gets defaults
                    assert_eq!(entries[1]["lesson"], paid_lesson.to_string());
                    assert_eq!(entries[1]["watch_time_seconds"], 0);
                    assert!(entries[1]["completed_at"].is_null());
                }),
        )
        // progress belongs to its owner
        .step(switch_user_action("other@ring.side"))
        .step(
            Action::new("my_progress_other", "GET", "/api/v1/courses/fundamentals/my_progress/")
                .with_expect(StatusCode::FORBIDDEN),
        )
        .run(&mut server, pool)
        .await;
}
