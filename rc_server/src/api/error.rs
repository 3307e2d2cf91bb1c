//! Uniform JSON envelopes for API responses.
//!
//! Every domain error converts into [`ApiError`], which renders as
//! `{"error": "<code>", "message": "<text>"}` with a status derived from
//! its [`ErrorKind`]. Successful handlers reply with [`ApiResponse`].

use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use racquet_club::{
    ClassifiedError, ErrorKind, auth::AuthError, matches::MatchError,
    registration::RegistrationError, team::TeamError, tournament::TournamentError,
};
use serde::{Deserialize, Serialize};

use crate::logging::log_security_event;

/// Error body returned by every failing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Success body: a human readable message and an optional payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// `200 OK` with a payload
    pub fn ok(message: impl Into<String>, data: T) -> (StatusCode, Json<Self>) {
        Self::with_status(StatusCode::OK, message, Some(data))
    }

    /// `201 Created` with a payload
    pub fn created(message: impl Into<String>, data: T) -> (StatusCode, Json<Self>) {
        Self::with_status(StatusCode::CREATED, message, Some(data))
    }

    fn with_status(
        status: StatusCode,
        message: impl Into<String>,
        data: Option<T>,
    ) -> (StatusCode, Json<Self>) {
        (
            status,
            Json(Self {
                message: message.into(),
                data,
            }),
        )
    }
}

impl ApiResponse<()> {
    /// `200 OK` without a payload
    pub fn message(message: impl Into<String>) -> (StatusCode, Json<Self>) {
        Self::with_status(StatusCode::OK, message, None)
    }
}

/// An error ready to be rendered as an HTTP response
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    fn from_classified<E: ClassifiedError>(err: E) -> Self {
        let kind = err.kind();
        match kind {
            ErrorKind::Internal => tracing::error!(code = err.code(), "Internal error: {}", err),
            ErrorKind::Forbidden => log_security_event("forbidden", None, &err.to_string()),
            _ => {}
        }

        Self::new(status_for(kind), err.code(), err.client_message())
    }
}

/// HTTP status for each error class
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

macro_rules! impl_from_classified {
    ($($error:ty),+ $(,)?) => {
        $(
            impl From<$error> for ApiError {
                fn from(err: $error) -> Self {
                    ApiError::from_classified(err)
                }
            }
        )+
    };
}

impl_from_classified!(
    AuthError,
    TournamentError,
    RegistrationError,
    TeamError,
    MatchError,
);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(rejection.status(), "invalid_body", rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::bad_request("invalid_path", rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.code.to_string(),
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

/// JSON body extractor whose rejections use the error envelope
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path extractor whose rejections use the error envelope
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

pub type ApiResult<T> = Result<T, ApiError>;

/// Status plus success envelope, the return type of most handlers
pub type Reply<T> = ApiResult<(StatusCode, Json<ApiResponse<T>>)>;
