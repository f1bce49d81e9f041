use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

/// Body of every error response.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRep {
    pub message: String,
    /// Details about the underlying failure, such as an upstream response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supported_countries: Option<Vec<String>>,
}

impl ErrorRep {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_error(message: impl Into<String>, error: impl Into<Value>) -> Self {
        Self {
            message: message.into(),
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(ErrorRep),
    NotFound(ErrorRep),
    /// A failure reported by an upstream service, passed on with the
    /// upstream's status code.
    Upstream(StatusCode, ErrorRep),
    ServiceUnavailable(ErrorRep),
    InternalServerError(ErrorRep),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(ErrorRep::new(message))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(ErrorRep::new(message))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, rep) = match self {
            Self::BadRequest(rep) => (StatusCode::BAD_REQUEST, rep),
            Self::NotFound(rep) => (StatusCode::NOT_FOUND, rep),
            Self::Upstream(status, rep) => (status, rep),
            Self::ServiceUnavailable(rep) => (StatusCode::SERVICE_UNAVAILABLE, rep),
            Self::InternalServerError(rep) => (StatusCode::INTERNAL_SERVER_ERROR, rep),
        };

        (status, Json(rep)).into_response()
    }
}

/// Unexpected failures answer 500. The outermost context becomes the message
/// and the root cause is passed along as the error detail.
impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        error!(?error, "Received error.");

        Self::InternalServerError(ErrorRep::with_error(
            error.to_string(),
            error.root_cause().to_string(),
        ))
    }
}

pub type ApiResponse<T> = Result<T, ApiError>;
