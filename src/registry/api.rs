//! Registry API endpoints.
//!
//! POST   /contacts/       prefix lookup (open)
//! POST   /hashes/:hash/   insert (Basic auth)
//! DELETE /hashes/:hash/   delete (Basic auth)

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Deserializer, Serialize};

use super::hash::is_lower_hex;
use crate::error::Error;
use crate::state::AppState;

/// Lookup request body.
#[derive(Debug, Deserialize)]
pub struct LookupRequest {
    #[serde(default, alias = "Prefixes", deserialize_with = "null_as_empty")]
    pub prefixes: Vec<String>,
}

/// `null` decodes to an empty list, like a missing field.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Response envelope: `{"result": "success" | "error", ...}`.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum ApiResponse {
    Success {
        #[serde(skip_serializing_if = "Option::is_none")]
        hashes: Option<Vec<String>>,
    },
    Error {
        error: String,
    },
}

impl ApiResponse {
    pub fn ok() -> Self {
        Self::Success { hashes: None }
    }

    pub fn hashes(hashes: Vec<String>) -> Self {
        Self::Success {
            hashes: Some(hashes),
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self::Error { error: msg.into() }
    }
}

/// Route-level pattern `[0-9a-f]+`. Anything else is treated as no route.
fn route_hash(hash: &str) -> Result<&str, Response> {
    if is_lower_hex(hash) {
        Ok(hash)
    } else {
        Err(StatusCode::NOT_FOUND.into_response())
    }
}

/// Look up registered hashes by prefix.
///
/// POST /contacts/
/// Body: { "prefixes": ["abcd", "0123"] }
pub async fn lookup(State(state): State<AppState>, body: Bytes) -> Response {
    let request: LookupRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => return Error::MalformedInput(e.to_string()).into_response(),
    };

    match state.registry.lookup(request.prefixes.as_slice()) {
        Ok(hashes) => Json(ApiResponse::hashes(hashes)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Register a hash.
///
/// POST /hashes/:hash/
pub async fn add_hash(
    State(state): State<AppState>,
    Path(hash): Path<String>,
    headers: HeaderMap,
) -> Response {
    let hash = match route_hash(&hash) {
        Ok(h) => h,
        Err(not_found) => return not_found,
    };

    if let Err(e) = state.verifier.authorize(&headers) {
        return e.into_response();
    }

    match state.registry.insert(hash) {
        Ok(()) => Json(ApiResponse::ok()).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Remove a hash. Unknown hashes are not an error.
///
/// DELETE /hashes/:hash/
pub async fn delete_hash(
    State(state): State<AppState>,
    Path(hash): Path<String>,
    headers: HeaderMap,
) -> Response {
    let hash = match route_hash(&hash) {
        Ok(h) => h,
        Err(not_found) => return not_found,
    };

    if let Err(e) = state.verifier.authorize(&headers) {
        return e.into_response();
    }

    match state.registry.delete(hash) {
        Ok(()) => Json(ApiResponse::ok()).into_response(),
        Err(e) => e.into_response(),
    }
}
