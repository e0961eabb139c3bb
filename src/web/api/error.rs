use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::session::SessionError;

#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    NotFound(&'static str),
    Session(SessionError),
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        ApiError::Session(e)
    }
}

impl ApiError {
    fn status_and_body(&self) -> (StatusCode, ErrorResponse) {
        match self {
            ApiError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::with_message("validation_failed", msg),
            ),
            ApiError::NotFound(what) => (StatusCode::NOT_FOUND, ErrorResponse::new(what)),
            ApiError::Session(e) => {
                let (status, code) = match e {
                    SessionError::NetworkFailure(_) => {
                        (StatusCode::BAD_GATEWAY, "backend_unavailable")
                    }
                    SessionError::ElevationUnavailable(_) => {
                        (StatusCode::BAD_GATEWAY, "elevation_unavailable")
                    }
                    SessionError::EmptyCoverageResult(_) => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "unit_unavailable")
                    }
                    SessionError::CancelledRequest => (StatusCode::CONFLICT, "request_superseded"),
                    SessionError::NoReceiverSelected => {
                        (StatusCode::CONFLICT, "no_receiver_selected")
                    }
                };
                (status, ErrorResponse::with_message(code, &e.to_string()))
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: &str) -> Self {
        ErrorResponse {
            error: error.to_string(),
            message: None,
        }
    }

    pub fn with_message(error: &str, message: &str) -> Self {
        ErrorResponse {
            error: error.to_string(),
            message: Some(message.to_string()),
        }
    }
}
