use thiserror::Error;

pub type CoachResult<T> = std::result::Result<T, CoachError>;

#[derive(Debug, Error)]
pub enum CoachError {
    #[error("http client error: {0}")]
    ClientError(#[from] reqwest::Error),
    #[error("network error: {0}")]
    NetworkError(String),
    #[error("service error: HTTP {status}: {body}")]
    ServiceError { status: u16, body: String },
    #[error("parse error: {0}")]
    ParseError(String),
    #[error("model returned no text")]
    EmptyResponse,
}
