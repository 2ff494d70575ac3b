use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Duration;
use serde::Deserialize;
use tower_cookies::{Cookie, Cookies, cookie::SameSite};
use uuid::Uuid;

use crate::{
    auth::{self, UserClaims, hash_password, verify_password},
    model::{
        CrudRepository, ResourceTyped,
        entity::{UserEntity, UserEntityCreate},
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, WebError, WebResult,
        error::ErrorResponse,
        extract::JsonBody,
        middlewares::{self, AUTH_TOKEN},
    },
};

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SignupBody {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl SignupBody {
    fn validate(&self) -> WebResult<()> {
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(WebError::resource_bad_request(
                UserEntity::get_resource_type(),
                "email is invalid",
            ));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(WebError::resource_bad_request(
                UserEntity::get_resource_type(),
                format!("password must be at least {MIN_PASSWORD_LEN} characters"),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SigninBody {
    pub email: String,
    pub password: String,
}

pub fn routes<S>(state: AppState) -> Router<S> {
    let protected = Router::new()
        .route("/verify", get(account_verify_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ));

    Router::new()
        .route("/signup", post(account_signup_handler))
        .route("/signin", post(account_signin_handler))
        .merge(protected)
        .with_state(state)
}

fn set_session_cookie(cookies: &Cookies, state: &AppState, user_id: Uuid) -> WebResult<()> {
    let claims = UserClaims::for_user(user_id, Duration::days(1));
    let token = auth::generate_token(claims, state.jwt_secret())
        .map_err(|e| WebError::server_crypt_error(e.into()))?;

    let mut cookie = Cookie::new(AUTH_TOKEN, token);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookies.add(cookie);
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/v1/account/signup",
    request_body = SignupBody,
    description = "Registers a new student and signs them in",
    responses(
        (status = 200, description = "User created successfully", body = UserEntity),
        (status = 400, description = "Email or password invalid", body = ErrorResponse),
        (status = 409, description = "User already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "account"
)]
async fn account_signup_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    JsonBody(payload): JsonBody<SignupBody>,
) -> WebResult<impl IntoResponse> {
    payload.validate()?;

    let system = AuthenticatedUser::system();
    let found = UserEntity::find_by_email(state.pool(), &system, &payload.email)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    if found.is_some() {
        return Err(WebError::registration_conflict());
    }

    let hash = hash_password(&payload.password).map_err(WebError::server_crypt_error)?;
    let data = UserEntityCreate {
        email: payload.email,
        first_name: payload.first_name,
        last_name: payload.last_name,
        password_hash: hash,
    };

    let created = UserEntity::create(state.pool(), &system, data)
        .await
        .map_err(|e| {
            // lost a race against a concurrent signup with the same email
            if e.is_unique_violation() {
                WebError::registration_conflict()
            } else {
                WebError::resource_fetch_error(UserEntity::get_resource_type(), e)
            }
        })?;

    set_session_cookie(&cookies, &state, created.id())?;
    tracing::info!("user {} signed up", created.id());

    Ok((StatusCode::OK, Json(created)))
}

#[utoipa::path(
    post,
    path = "/api/v1/account/signin",
    description = "Authorizes user in the system",
    request_body = SigninBody,
    responses(
        (status = 200, description = "User signed in", body = UserEntity),
        (status = 401, description = "Credentials invalid", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "account",
)]
async fn account_signin_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    JsonBody(payload): JsonBody<SigninBody>,
) -> WebResult<impl IntoResponse> {
    let system = AuthenticatedUser::system();
    let found = UserEntity::find_by_email(state.pool(), &system, &payload.email)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or_else(WebError::auth_invalid_credentials)?;

    let is_verified =
        verify_password(found.hash(), &payload.password).map_err(WebError::server_crypt_error)?;

    if !is_verified {
        return Err(WebError::auth_invalid_credentials());
    }

    set_session_cookie(&cookies, &state, found.id())?;

    Ok((StatusCode::OK, Json(found)))
}

#[utoipa::path(
    get,
    path = "/api/v1/account/verify",
    description = "Checks whether the session cookie belongs to a user",
    responses(
        (status = 200, description = "Signed in"),
        (status = 401, description = "Not signed in", body = ErrorResponse),
    ),
    tag = "account",
    security(
        ("cookie" = [])
    )
)]
async fn account_verify_handler(ctx: RequestContext) -> WebResult<impl IntoResponse> {
    ctx.user()?;
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod test {
    use super::*;

    fn body(email: &str, password: &str) -> SignupBody {
        SignupBody {
            email: email.to_string(),
            password: password.to_string(),
            first_name: String::new(),
            last_name: String::new(),
        }
    }

    #[test]
    fn test_signup_validation() {
        assert!(body("boxer@ring.side", "longenough").validate().is_ok());
        assert!(body("boxer", "longenough").validate().is_err());
        assert!(body("  ", "longenough").validate().is_err());
        assert!(body("boxer@ring.side", "short").validate().is_err());
    }
}
