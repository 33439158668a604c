//! Error types for the contact discovery service.
//!
//! ```text
//! Error
//! ├── AuthenticationFailure  - credential missing, malformed or mismatched (401)
//! ├── DuplicateHash          - insert of an already-registered hash     (409)
//! ├── MalformedInput         - request body / path could not be used     (400)
//! ├── StoreUnavailable       - SQLite could not be opened or queried     (500)
//! └── InvalidConfig          - startup configuration rejected            (500)
//! ```
//!
//! Malformed lookup prefixes are never raised as errors: the registry
//! absorbs them as empty results per prefix.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::registry::api::ApiResponse;

/// Result type alias for contact discovery operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Realm advertised in `WWW-Authenticate` challenges.
pub const AUTH_REALM: &str = "Contact Discovery";

#[derive(Error, Debug)]
pub enum Error {
    /// The caller did not present a valid credential for a mutation.
    #[error("authentication failed: {0}")]
    AuthenticationFailure(&'static str),

    /// The canonical hash is already stored.
    #[error("hash already exists: {0}")]
    DuplicateHash(String),

    /// The request could not be decoded.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The durable store could not be opened or queried.
    #[error("hash store unavailable: {0}")]
    StoreUnavailable(String),

    /// Startup configuration was rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::AuthenticationFailure(_) => StatusCode::UNAUTHORIZED,
            Self::DuplicateHash(_) => StatusCode::CONFLICT,
            Self::MalformedInput(_) => StatusCode::BAD_REQUEST,
            Self::StoreUnavailable(_) | Self::InvalidConfig(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();

        match self {
            Self::AuthenticationFailure(reason) => {
                tracing::warn!(reason = reason, "Rejected unauthenticated mutation");
                (
                    status,
                    [(
                        header::WWW_AUTHENTICATE,
                        format!("Basic realm=\"{}\"", AUTH_REALM),
                    )],
                    "401 Unauthorized\n",
                )
                    .into_response()
            }
            Self::StoreUnavailable(_) | Self::InvalidConfig(_) => {
                // Internal details stay in the log.
                tracing::error!(error = %self, "Request failed");
                (status, Json(ApiResponse::error("internal server error"))).into_response()
            }
            other => (status, Json(ApiResponse::error(other.to_string()))).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            Error::AuthenticationFailure("missing").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            Error::DuplicateHash("abcd".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            Error::MalformedInput("bad json".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::StoreUnavailable("locked".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unauthorized_response_has_challenge() {
        let response = Error::AuthenticationFailure("missing").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers()[header::WWW_AUTHENTICATE],
            "Basic realm=\"Contact Discovery\""
        );
    }

    #[tokio::test]
    async fn test_store_failure_hides_details() {
        let response = Error::StoreUnavailable("disk I/O at /secret/path".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(!body.contains("/secret/path"));
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&body).unwrap(),
            serde_json::json!({ "result": "error", "error": "internal server error" })
        );
    }

    #[test]
    fn test_display_includes_hash() {
        let err = Error::DuplicateHash("1111aaaa".into());
        assert!(err.to_string().contains("1111aaaa"));
    }
}
