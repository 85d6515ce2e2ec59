use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use common::storage::StorageError;
use sea_orm::DbErr;
use serde::Serialize;

/// Body of the plain-text 404 response.
pub const NOT_FOUND_BODY: &str = "Not Found";

/// Structured error body for failures that are not redirects or 404s.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `FORBIDDEN`,
    /// `INVALID_CREDENTIALS`, `USERNAME_TAKEN`, `INTERNAL_ERROR`.
    #[schema(example = "FORBIDDEN")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Only the owner of this gram may change it")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    /// No identity on a protected action. Answered with a redirect to the
    /// sign-in page rather than a 4xx status.
    Unauthenticated { sign_in: String },
    /// Caller is signed in but does not own the gram.
    Forbidden,
    NotFound,
    /// Malformed request (not a form validation failure, which re-renders).
    Validation(String),
    InvalidCredentials,
    UsernameTaken,
    Internal(String),
}

fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            code,
            message: message.into(),
        }),
    )
        .into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Unauthenticated { sign_in } => Redirect::to(&sign_in).into_response(),
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                NOT_FOUND_BODY,
            )
                .into_response(),
            AppError::Forbidden => json_error(
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Only the owner of this gram may change it",
            ),
            AppError::Validation(msg) => {
                json_error(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg)
            }
            AppError::InvalidCredentials => json_error(
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid username or password",
            ),
            AppError::UsernameTaken => json_error(
                StatusCode::CONFLICT,
                "USERNAME_TAKEN",
                "Username is already taken",
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An unexpected error occurred",
                )
            }
        }
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => {
                tracing::warn!("Picture missing from storage: {key}");
                AppError::NotFound
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}
