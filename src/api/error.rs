use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::Error;

#[derive(Debug, Serialize)]
struct ApiErrorResponse {
    error: String,
    message: String,
}

/// An [`Error`] on its way to an HTTP client.
///
/// Client errors carry their detail. Server errors carry only the error
/// category; the full error goes to the log.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: String,
    message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidInput(detail) => ApiError {
                status: StatusCode::BAD_REQUEST,
                error: "Invalid request parameters".to_string(),
                message: detail,
            },
            Error::NotFound(detail) => ApiError {
                status: StatusCode::NOT_FOUND,
                error: "Performance report not found".to_string(),
                message: detail,
            },
            other => {
                log::error!("request failed: {other}");
                ApiError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    error: "Failed to compute performance data".to_string(),
                    message: other.kind().to_string(),
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiErrorResponse {
            error: self.error,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}
