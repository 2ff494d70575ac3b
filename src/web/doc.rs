use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::web::middlewares::AUTH_TOKEN;

pub struct CookieAuthModifier;

impl Modify for CookieAuthModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(schema) = openapi.components.as_mut() {
            schema.add_security_scheme(
                "cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    AUTH_TOKEN,
                    "JWT token for current user",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "Ringside API", description = "Online boxing courses"),
    paths(
        crate::web::routes::account::account_signup_handler,
        crate::web::routes::account::account_signin_handler,
        crate::web::routes::account::account_verify_handler,
        crate::web::routes::courses::courses_list_handler,
        crate::web::routes::courses::courses_detail_handler,
        crate::web::routes::courses::courses_my_progress_handler,
        crate::web::routes::courses::reviews_list_handler,
        crate::web::routes::courses::reviews_create_handler,
        crate::web::routes::lessons::lessons_get_handler,
        crate::web::routes::lessons::lessons_progress_handler,
        crate::web::routes::payments::orders_create_handler,
        crate::web::routes::payments::orders_complete_handler,
        crate::web::routes::payments::orders_list_handler,
        crate::web::routes::payments::my_courses_handler,
        crate::web::routes::coach::coach_send_handler,
        crate::web::routes::coach::coach_history_handler,
        crate::web::routes::coach::coach_clear_handler,
    ),
    modifiers(&CookieAuthModifier),
)]
pub struct ApiDoc;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_openapi_lists_routes() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/courses/",
            "/api/v1/courses/{slug}/",
            "/api/v1/lessons/{lesson_id}/progress/",
            "/api/v1/payments/orders/create/",
            "/api/v1/coach/send/",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
