//! Error Taxonomy
//! Mission: One error surface for every component, mapped onto HTTP at the edge

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Crate-wide error taxonomy.
///
/// Validation errors are produced before any store mutation. Store-layer
/// failures surface as `Internal` carrying the underlying message and are
/// never retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed or missing fields in the caller's input.
    #[error("{0}")]
    InvalidInput(String),

    /// The named entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Duplicate username or document id.
    #[error("{0}")]
    Conflict(String),

    /// Bad credentials or bad token. Carries no credential material.
    #[error("{0}")]
    Unauthorized(&'static str),

    /// Authenticated, but not the owner of the target resource.
    #[error("not the resource owner")]
    Forbidden,

    /// Store or dependency failure.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Internal(err.into())
    }
}

impl Error {
    fn status(&self) -> StatusCode {
        match self {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden => StatusCode::FORBIDDEN,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": true, "message": self.to_string() }));
        (status, body).into_response()
    }
}
