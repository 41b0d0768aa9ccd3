//! Error taxonomy for the REST layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Object with given uuid doesn't exist: {resource}/{uuid}")]
    NotFound { resource: String, uuid: String },

    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    #[error("Resource '{resource}' does not support operation: {operation}")]
    UnsupportedOperation {
        resource: String,
        operation: &'static str,
    },

    /// The payload cannot be mapped onto the entity's settable fields.
    #[error("Conversion failed: {0}")]
    Conversion(String),

    /// A required linked reference is missing or invalid.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{resource}/{uuid} is already voided")]
    AlreadyVoided { resource: String, uuid: String },

    #[error("Referential integrity violation: {0}")]
    ReferentialIntegrity(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn not_found(resource: &str, uuid: impl ToString) -> Self {
        Self::NotFound {
            resource: resource.to_string(),
            uuid: uuid.to_string(),
        }
    }

    pub fn unsupported(resource: &str, operation: &'static str) -> Self {
        Self::UnsupportedOperation {
            resource: resource.to_string(),
            operation,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound { .. } | Error::UnknownResource(_) => StatusCode::NOT_FOUND,
            Error::UnsupportedOperation { .. }
            | Error::Conversion(_)
            | Error::Validation(_)
            | Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::AlreadyVoided { .. } | Error::ReferentialIntegrity(_) => StatusCode::CONFLICT,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code carried in the error body.
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotFound { .. } => "not_found",
            Error::UnknownResource(_) => "unknown_resource",
            Error::UnsupportedOperation { .. } => "unsupported_operation",
            Error::Conversion(_) => "conversion",
            Error::Validation(_) => "validation",
            Error::BadRequest(_) => "bad_request",
            Error::AlreadyVoided { .. } => "already_voided",
            Error::ReferentialIntegrity(_) => "referential_integrity",
            Error::Internal(_) => "internal",
        }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        Error::Validation(errors.to_string())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Debug, Serialize)]
struct ErrorDetail<'a> {
    code: &'a str,
    message: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code(),
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}
