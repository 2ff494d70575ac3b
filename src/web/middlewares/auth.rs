use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::errors::ErrorKind;
use tower_cookies::Cookies;

use crate::{
    auth,
    model::{CrudRepository, ResourceTyped, entity::UserEntity},
    web::{AppState, RequestContext, context::AuthenticatedUser, error::WebError},
};

pub static AUTH_TOKEN: &str = "SID";

/// Resolves the `SID` cookie into a [`RequestContext`]. Requests without a
/// cookie, or whose user no longer exists, continue anonymously.
pub async fn extract_context_fn(
    State(state): State<AppState>,
    cookies: Cookies,
    mut req: Request,
    next: Next,
) -> Result<Response, WebError> {
    let token = match cookies.get(AUTH_TOKEN) {
        Some(token) => token,
        None => {
            req.extensions_mut().insert(RequestContext::anonymous());
            return Ok(next.run(req).await);
        }
    };

    let claims = auth::process_token(token.value(), state.jwt_secret())
        .map_err(|e| WebError::auth_cookie_invalid(AUTH_TOKEN, e))?;

    let id = claims
        .claims
        .user_id()
        .ok_or_else(|| WebError::auth_cookie_invalid(AUTH_TOKEN, ErrorKind::InvalidSubject.into()))?;

    let found = UserEntity::find_by_id(state.pool(), &AuthenticatedUser::system(), id)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    let ctx = match found {
        Some(user) => RequestContext::new(Some(AuthenticatedUser::new(user.id()))),
        None => {
            tracing::debug!("cookie refers to missing user {}", id);
            RequestContext::anonymous()
        }
    };

    req.extensions_mut().insert(ctx);
    Ok(next.run(req).await)
}
