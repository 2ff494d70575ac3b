mod common;
use axum::http::StatusCode;
use serde_json::json;

use crate::common::{
    Action, Flow, complete_order_action, order_action, parse, seed_course, setup_server,
    setup_test_db, signup_action,
};

#[tokio::test]
async fn route_lesson_get_test() {
    let pool = setup_test_db().await;
    let seeded = seed_course(&pool, "fundamentals").await;
    let mut server = setup_server(&pool).await;
    let free = seeded.free_lesson;
    let paid = seeded.paid_lesson;

    Flow::new()
        // anonymous viewers are stopped before the access check
        .step(
            Action::new("anonymous_free", "GET", format!("/api/v1/lessons/{free}/"))
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .step(
            Action::new("anonymous_paid", "GET", format!("/api/v1/lessons/{paid}/"))
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .step(signup_action("student@ring.side"))
        .step(
            Action::new("free_preview", "GET", format!("/api/v1/lessons/{free}/")).assert_body(
                |body| {
                    let lesson = parse(body);
                    assert_eq!(lesson["is_free_preview"], true);
                    assert_eq!(lesson["video_url"], "https://videos.example.com/stance.mp4");
                    assert_eq!(lesson["preview_duration_seconds"], 120);
                },
            ),
        )
        .step(
            Action::new("paid_not_enrolled", "GET", format!("/api/v1/lessons/{paid}/"))
                .with_expect(StatusCode::FORBIDDEN)
                .assert_body(|body| assert!(body.contains("purchase the course"))),
        )
        .step(
            Action::new("missing", "GET", format!("/api/v1/lessons/{}/", uuid::Uuid::new_v4()))
                .with_expect(StatusCode::NOT_FOUND),
        )
        .step(order_action(seeded.id))
        .step(complete_order_action())
        .step(
            Action::new("paid_enrolled", "GET", format!("/api/v1/lessons/{paid}/")).assert_body(
                |body| {
                    let lesson = parse(body);
                    assert_eq!(lesson["video_url"], "https://videos.example.com/jab.mp4");
                    assert_eq!(lesson["resources"][0]["name"], "Jab drills");
                    assert!(lesson["progress"].is_null());
                },
            ),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_lesson_progress_test() {
    let pool = setup_test_db().await;
    let seeded = seed_course(&pool, "fundamentals").await;
    let mut server = setup_server(&pool).await;
    let free = seeded.free_lesson;
    let paid = seeded.paid_lesson;
    let progress = move || format!("/api/v1/lessons/{paid}/progress/");

    Flow::new()
        .step(
            Action::new("anonymous", "POST", progress())
                .with_body(json!({ "completed": true }))
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .step(signup_action("student@ring.side"))
        .step(
            Action::new("not_enrolled", "POST", progress())
                .with_body(json!({ "completed": true }))
                .with_expect(StatusCode::FORBIDDEN),
        )
        // free previews track progress without a purchase
        .step(
            Action::new("free_preview", "POST", format!("/api/v1/lessons/{free}/progress/"))
                .with_body(json!({ "watch_time_seconds": 30 }))
                .assert_body(|body| {
                    let p = parse(body);
                    assert_eq!(p["watch_time_seconds"], 30);
                    assert_eq!(p["completed"], false);
                }),
        )
        .step(order_action(seeded.id))
        .step(complete_order_action())
        .step(
            Action::new("malformed", "POST", progress())
                .with_body(json!({ "completed": "yes" }))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("complete", "POST", progress())
                .with_body(json!({ "completed": true, "watch_time_seconds": 100 }))
                .with_save_as("first")
                .assert_body(|body| {
                    let p = parse(body);
                    assert_eq!(p["completed"], true);
                    assert!(p["completed_at"].is_string());
                    assert_eq!(p["watch_time_seconds"], 100);
                }),
        )
        // partial update keeps completion and its timestamp
        .step(
            Action::new("partial", "POST", progress())
                .with_body(json!({ "watch_time_seconds": 10 }))
                .with_save_as("second")
                .assert_body(|body| {
                    let p = parse(body);
                    assert_eq!(p["completed"], true);
                    assert_eq!(p["watch_time_seconds"], 10);
                    assert_eq!(p["last_position_seconds"], 0);
                }),
        )
        // completion cannot be undone, repeating it keeps the first timestamp
        .step(
            Action::new("uncomplete", "POST", progress())
                .with_body(json!({ "completed": false }))
                .assert_body(|body| assert_eq!(parse(body)["completed"], true)),
        )
        .step(
            Action::new("complete_again", "POST", "")
                .with_dyn_path(move |_| format!("/api/v1/lessons/{paid}/progress/"))
                .with_dyn_body(|_| json!({ "completed": true }))
                .with_save_as("third"),
        )
        .step(
            Action::new("lesson", "GET", format!("/api/v1/lessons/{paid}/")).with_dyn_path(
                move |ctx| {
                    let first = ctx.get("first")["completed_at"].clone();
                    assert_eq!(ctx.get("second")["completed_at"], first);
                    assert_eq!(ctx.get("third")["completed_at"], first);
                    format!("/api/v1/lessons/{paid}/")
                },
            )
            .assert_body(|body| {
                let lesson = parse(body);
                assert_eq!(lesson["progress"]["completed"], true);
                assert_eq!(lesson["progress"]["watch_time_seconds"], 10);
            }),
        )
        .run(&mut server, pool)
        .await;
}
