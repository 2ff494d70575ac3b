use axum::{
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
};
use serde::de::DeserializeOwned;

use crate::web::WebError;

/// `axum::Json` whose rejections go through [`WebError`], so malformed bodies
/// get the same JSON error shape as everything else.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = WebError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(reject(rejection)),
        }
    }
}

fn reject(rejection: JsonRejection) -> WebError {
    let details = match rejection.status() {
        StatusCode::UNSUPPORTED_MEDIA_TYPE => String::from("expected a JSON body"),
        _ => rejection.body_text(),
    };
    WebError::request_invalid_body(details)
}
