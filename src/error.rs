use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::db::WikiError;

/// Error type for HTTP handlers.
///
/// Wraps [`WikiError`] for store and input failures and adds the route-level
/// rejection used for malformed page names and version tokens.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Wiki(#[from] WikiError),

    /// The path did not match an accepted page name or version pattern.
    #[error("404 page not found")]
    NoRoute,
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NoRoute => StatusCode::NOT_FOUND,
            AppError::Wiki(WikiError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Wiki(WikiError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            AppError::Wiki(err) => {
                tracing::error!(error = %err, "Request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, self.to_string()).into_response()
    }
}
