use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use rolodex_core::RolodexError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "message": self.message,
                "status": self.status.as_u16(),
            }
        }));

        (self.status, body).into_response()
    }
}

impl From<RolodexError> for AppError {
    fn from(err: RolodexError) -> Self {
        match err {
            RolodexError::BadRequest(msg) => Self::bad_request(msg),
            RolodexError::InvalidValue(_) => Self::bad_request(err.to_string()),
            RolodexError::Unauthorized(msg) => Self::forbidden(msg),
            RolodexError::NotFound(msg) => Self::not_found(msg),
            RolodexError::Conflict(_) => Self::conflict(err.to_string()),
            RolodexError::Database(db) => db.into(),
            RolodexError::UnknownField(_)
            | RolodexError::UnknownKey(_)
            | RolodexError::Internal(_) => {
                tracing::error!(error = %err, "request failed");
                Self::internal("Internal server error")
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(err.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!(error = ?err, "database operation failed");
        Self::internal("Database operation failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_failures_map_to_boundary_statuses() {
        let cases = [
            (RolodexError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (RolodexError::InvalidValue("x".into()), StatusCode::BAD_REQUEST),
            (RolodexError::Unauthorized("x".into()), StatusCode::FORBIDDEN),
            (RolodexError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (RolodexError::Conflict("x".into()), StatusCode::CONFLICT),
            (
                RolodexError::UnknownField("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                RolodexError::Database(sqlx::Error::RowNotFound),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status, status);
        }
    }

    #[test]
    fn database_details_are_not_echoed() {
        let err = AppError::from(RolodexError::Database(
            sqlx::Error::Protocol("secret detail".into()),
        ));
        assert!(!err.message.contains("secret detail"));
    }
}
