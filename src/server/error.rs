use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Requests rejected before reaching the classifier
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    /// The request text was empty
    #[error("Texto vacío")]
    EmptyText,
}

impl ApiError {
    /// The HTTP status for this rejection
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::EmptyText => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
