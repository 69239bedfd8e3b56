use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Body of every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

pub struct JsonResponse;

impl JsonResponse {
    pub fn success(msg: &str) -> impl IntoResponse {
        (
            StatusCode::OK,
            Json(MessageBody {
                message: msg.to_string(),
            }),
        )
    }

    pub fn error(status: StatusCode, msg: &str, errors: Vec<FieldError>) -> impl IntoResponse {
        (
            status,
            Json(ErrorBody {
                message: msg.to_string(),
                errors,
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use axum::response::IntoResponse;
    use serde_json::{from_slice, Value};

    use super::*;

    #[tokio::test]
    async fn test_success_response() {
        let resp = JsonResponse::success("ok").into_response();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), 1024).await.unwrap();
        let json: MessageBody = from_slice(&body).unwrap();
        assert_eq!(json.message, "ok");
    }

    #[tokio::test]
    async fn test_error_response_omits_empty_errors() {
        let resp = JsonResponse::error(StatusCode::BAD_REQUEST, "nope", vec![]).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(resp.into_body(), 1024).await.unwrap();
        let json: Value = from_slice(&body).unwrap();
        assert_eq!(json["message"], "nope");
        assert!(json.get("errors").is_none());
    }

    #[tokio::test]
    async fn test_error_response_lists_field_errors() {
        let resp = JsonResponse::error(
            StatusCode::BAD_REQUEST,
            "Validation error",
            vec![FieldError::new("email", "must be a valid email address")],
        )
        .into_response();

        let body = axum::body::to_bytes(resp.into_body(), 1024).await.unwrap();
        let json: ErrorBody = from_slice(&body).unwrap();
        assert_eq!(json.errors.len(), 1);
        assert_eq!(json.errors[0].field, "email");
    }
}
