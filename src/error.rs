use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("end date {end} is before start date {start}")]
    EndBeforeStart { start: String, end: String },
    #[error("trip is too long ({days} days), the maximum is {max} days")]
    TooLong { days: i64, max: i64 },
    #[error("dates overlap with \"{title}\" ({range})")]
    Overlap { title: String, range: String },
    #[error("duration must not be negative")]
    NegativeDuration,
    #[error("duration must be at most {max} minutes")]
    DurationTooLong { max: i64 },
    #[error("trip dates cannot change once activities exist")]
    DatesLocked,
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{service} error: {message}")]
    External {
        service: &'static str,
        message: String,
    },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("not found")]
    NotFound,
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
}

impl AppError {
    pub fn external(service: &'static str, message: impl Into<String>) -> Self {
        AppError::External {
            service,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::external("http", err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Config(_)
            | AppError::Io(_)
            | AppError::Database(_)
            | AppError::Migration(_)
            | AppError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::External { .. } => StatusCode::BAD_GATEWAY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        (status, self.to_string()).into_response()
    }
}
