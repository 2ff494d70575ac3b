use axum::Router;
use tower_cookies::CookieManagerLayer;
use tower_http::{cors::CorsLayer, services::ServeDir};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::web::{AppState, doc::ApiDoc};

pub mod account;
pub mod coach;
pub mod courses;
pub mod lessons;
pub mod payments;

/// URL prefix under which uploaded media is served.
pub const STATIC_PREFIX: &str = "/api/v1/static/";

pub fn build_app<S: Send + Sync + Clone + 'static>(
    state: AppState,
    uploads_dir: std::path::PathBuf,
    docs: bool,
) -> Router<S> {
    let mut router = Router::new()
        .nest("/api/v1/account/", account::routes(state.clone()))
        .nest("/api/v1/courses/", courses::routes(state.clone()))
        .nest("/api/v1/lessons/", lessons::routes(state.clone()))
        .nest("/api/v1/payments/", payments::routes(state.clone()))
        .nest("/api/v1/coach/", coach::routes(state.clone()))
        .nest_service(STATIC_PREFIX, ServeDir::new(uploads_dir))
        .layer(CookieManagerLayer::default())
        .layer(CorsLayer::very_permissive())
        .with_state(state);

    if docs {
        let openapi = ApiDoc::openapi();

        router = router.merge(SwaggerUi::new("/api/v1/docs").url("/api-doc/openapi.json", openapi));
    }

    router
}
