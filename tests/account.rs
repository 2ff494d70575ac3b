mod common;
use axum::http::StatusCode;
use ringside::model::entity::UserEntity;
use ringside::web::middlewares::AUTH_TOKEN;
use serde_json::json;
use tower_cookies::cookie::SameSite;

use crate::common::{
    Action, Flow, PASSWORD, seed_course, setup_server, setup_test_db, signin_action,
    signup_action,
};

#[tokio::test]
async fn route_signup_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(
            signup_action("Rocky@Ring.side")
                .assert_cookie(AUTH_TOKEN, |cookie| {
                    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
                    assert_eq!(cookie.path(), Some("/"));
                    assert_eq!(cookie.http_only(), Some(true));
                })
                .assert_body(|body| {
                    let ent: UserEntity = serde_json::from_str(body).expect("Invalid body format");
                    assert_eq!(ent.email(), "rocky@ring.side");
                    assert_eq!(ent.display_name(), "Rocky");
                    assert!(!body.contains("password"));
                })
                .with_expect(StatusCode::OK),
        )
        // same email, different case
        .step(signup_action("rocky@ring.side").with_expect(StatusCode::CONFLICT))
        .step(
            Action::new("bad_email", "POST", "/api/v1/account/signup")
                .with_body(json!({ "email": "rocky", "password": PASSWORD }))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("short_password", "POST", "/api/v1/account/signup")
                .with_body(json!({ "email": "apollo@ring.side", "password": "short" }))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("missing_field", "POST", "/api/v1/account/signup")
                .with_body(json!({ "email": "apollo@ring.side" }))
                .with_expect(StatusCode::BAD_REQUEST)
                .assert_body(|body| assert!(body.contains("Request error"))),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_signin_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(signup_action("signin@ring.side").with_save_cookies(false))
        .step(
            signin_action("SIGNIN@ring.side", PASSWORD)
                .assert_cookie(AUTH_TOKEN, |cookie| {
                    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
                    assert_eq!(cookie.http_only(), Some(true));
                })
                .assert_body(|body| {
                    let ent: UserEntity = serde_json::from_str(body).expect("Invalid JSON format");
                    assert_eq!(ent.email(), "signin@ring.side");
                })
                .with_expect(StatusCode::OK)
                .with_clear_cookies(true),
        )
        // wrong credentials
        .step(
            signin_action("signin@ring.side", "WRONGPASSWORD")
                .with_save_cookies(false)
                .with_clear_cookies(true)
                .assert_body(|body| {
                    assert!(body.contains("Authentication error"));
                })
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        // non-existing account
        .step(
            signin_action("nobody@ring.side", PASSWORD)
                .with_expect(StatusCode::UNAUTHORIZED)
                .assert_body(|body| assert!(body.contains("Authentication error"))),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_verify_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(
            Action::new("verify_anonymous", "GET", "/api/v1/account/verify")
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .step(signup_action("verify@ring.side"))
        .step(Action::new("verify_signed_in", "GET", "/api/v1/account/verify"))
        .step(
            Action::new("verify_signed_out", "GET", "/api/v1/account/verify")
                .with_clear_cookies(true)
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_session_checked_before_body_test() {
    let pool = setup_test_db().await;
    let seeded = seed_course(&pool, "fundamentals").await;
    let mut server = setup_server(&pool).await;

    let writes = [
        ("create_order", String::from("/api/v1/payments/orders/create/")),
        ("create_review", format!("/api/v1/courses/{}/reviews/create/", seeded.id)),
        ("record_progress", format!("/api/v1/lessons/{}/progress/", seeded.free_lesson)),
        ("send_message", String::from("/api/v1/coach/send/")),
    ];

    let mut flow = Flow::new();
    for (name, path) in writes {
        // anonymous callers hear about the missing session, not the broken body
        flow = flow.step(
            Action::new(name, "POST", path)
                .with_body(json!({ "rating": "five", "course_id": 42, "completed": "yes", "message": [] }))
                .with_expect(StatusCode::UNAUTHORIZED),
        );
    }

    flow.step(signup_action("late@ring.side"))
        .step(
            Action::new("signed_in_bad_body", "POST", "/api/v1/payments/orders/create/")
                .with_body(json!({ "course_id": 42 }))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .run(&mut server, pool)
        .await;
}
