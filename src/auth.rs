//! Credential verification for mutating requests.
//!
//! Insert and delete require HTTP Basic credentials whose password matches
//! the configured API password. The username is ignored.

use axum::http::{header, HeaderMap};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use subtle::{Choice, ConstantTimeEq};

use crate::error::{Error, Result};

/// Filler used to bring a short candidate up to the reference length.
const PAD_BYTE: u8 = b'*';

/// Checks caller secrets against the configured reference secret.
///
/// The comparison runs over the full reference length no matter where the
/// first mismatch is, and a candidate of any other length is rejected.
#[derive(Clone)]
pub struct CredentialVerifier {
    reference: Vec<u8>,
}

impl CredentialVerifier {
    pub fn new(reference: &str) -> Self {
        Self {
            reference: reference.as_bytes().to_vec(),
        }
    }

    /// Constant-time check of a candidate secret.
    pub fn verify(&self, candidate: &str) -> bool {
        let candidate = candidate.as_bytes();

        // Normalize to the reference length so the byte comparison does the
        // same amount of work for short, long and exact candidates.
        let normalized: Vec<u8> = (0..self.reference.len())
            .map(|i| candidate.get(i).copied().unwrap_or(PAD_BYTE))
            .collect();

        let bytes_match: Choice = normalized.as_slice().ct_eq(self.reference.as_slice());
        let length_match: Choice = (candidate.len() as u64).ct_eq(&(self.reference.len() as u64));

        (bytes_match & length_match).into()
    }

    /// Authorize a request from its headers.
    ///
    /// Missing or malformed credentials fail closed.
    pub fn authorize(&self, headers: &HeaderMap) -> Result<()> {
        let password = basic_auth_password(headers)?;
        if self.verify(&password) {
            Ok(())
        } else {
            Err(Error::AuthenticationFailure("credential mismatch"))
        }
    }
}

impl std::fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVerifier")
            .field("reference", &"[REDACTED]")
            .finish()
    }
}

/// Extract the password from an `Authorization: Basic ...` header.
pub fn basic_auth_password(headers: &HeaderMap) -> Result<String> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(Error::AuthenticationFailure("no Basic Authorization header"))?
        .to_str()
        .map_err(|_| Error::AuthenticationFailure("unreadable Authorization header"))?;

    let encoded = match value.split_once(' ') {
        Some(("Basic", encoded)) => encoded.trim(),
        _ => return Err(Error::AuthenticationFailure("no Basic Authorization header")),
    };

    let decoded = STANDARD
        .decode(encoded)
        .map_err(|_| Error::AuthenticationFailure("unable to decode username/password pair"))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|_| Error::AuthenticationFailure("unable to decode username/password pair"))?;

    match decoded.split_once(':') {
        Some((_username, password)) => Ok(password.to_string()),
        None => Err(Error::AuthenticationFailure("missing username/password separator")),
    }
}
