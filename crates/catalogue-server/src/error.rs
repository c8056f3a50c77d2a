//! Mapping of failures onto HTTP responses
//!
//! Every error body has the shape `{"error": ...}`. Validation failures carry
//! the field → reason map, everything else a message.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use catalogue_core::{CatalogueError, ValidationErrors};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Catalogue(#[from] CatalogueError),

    #[error("{0}")]
    BadRequest(String),

    #[error("you must be authenticated to access this resource")]
    AuthenticationRequired,

    #[error("invalid or missing authentication token")]
    InvalidToken,

    #[error("your user account doesn't have the necessary permissions to access this resource")]
    Forbidden,

    #[error("the requested resource could not be found")]
    NotFound,

    #[error("the {0} method is not supported for this resource")]
    MethodNotAllowed(String),

    /// A handler panicked. The detail is logged, never sent.
    #[error("handler panicked: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Catalogue(CatalogueError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Catalogue(CatalogueError::NotFound) | ApiError::NotFound => {
                StatusCode::NOT_FOUND
            }
            ApiError::Catalogue(CatalogueError::EditConflict) => StatusCode::CONFLICT,
            ApiError::Catalogue(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::AuthenticationRequired | ApiError::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    fn body(&self) -> Value {
        match self {
            ApiError::Catalogue(CatalogueError::Validation(errors)) => json!(errors),
            ApiError::Catalogue(CatalogueError::NotFound) => {
                json!(ApiError::NotFound.to_string())
            }
            ApiError::Catalogue(CatalogueError::EditConflict) => {
                json!("unable to update the record due to an edit conflict, please try again")
            }
            ApiError::Catalogue(_) | ApiError::Internal(_) => {
                json!("the server encountered a problem and could not process your request")
            }
            other => json!(other.to_string()),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Catalogue(CatalogueError::Validation(errors))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(_: PathRejection) -> Self {
        ApiError::NotFound
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.body() }))).into_response()
    }
}
