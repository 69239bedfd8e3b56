use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::responses::{FieldError, JsonResponse};

/// Every failure a service can report. `BadRequest` and `Unauthorized` are
/// domain outcomes; `Internal` carries the cause for logging only.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    BadRequest {
        message: String,
        errors: Vec<FieldError>,
    },
    #[error("User is not authorized")]
    Unauthorized,
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
            errors: Vec::new(),
        }
    }

    pub fn validation(errors: Vec<FieldError>) -> Self {
        ApiError::BadRequest {
            message: "Validation error".to_string(),
            errors,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Internal(format!("database error: {err}"))
    }
}

impl From<jsonwebtoken::errors::Error> for ApiError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        ApiError::Internal(format!("token signing error: {err}"))
    }
}

impl From<password_hash::Error> for ApiError {
    fn from(err: password_hash::Error) -> Self {
        ApiError::Internal(format!("password hashing error: {err}"))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest {
            message: "Invalid request body".to_string(),
            errors: vec![FieldError::new("body", rejection.body_text())],
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest {
            message: "Invalid query string".to_string(),
            errors: vec![FieldError::new("query", rejection.body_text())],
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest {
            message: "Invalid path parameter".to_string(),
            errors: vec![FieldError::new("path", rejection.body_text())],
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::BadRequest { message, errors } => {
                JsonResponse::error(status, &message, errors).into_response()
            }
            ApiError::Unauthorized => {
                JsonResponse::error(status, "User is not authorized", Vec::new()).into_response()
            }
            ApiError::Internal(cause) => {
                tracing::error!(%cause, "request failed with an internal error");
                JsonResponse::error(status, "Internal server error", Vec::new()).into_response()
            }
        }
    }
}
