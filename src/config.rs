//! Service configuration.
//!
//! Built once at startup from the command line and handed to the registry
//! and credential verifier. Nothing mutates it afterwards.

use std::path::PathBuf;

use crate::error::{Error, Result};

/// Default minimum accepted prefix length.
pub const DEFAULT_MIN_PREFIX_LEN: usize = 4;

/// Default length returned hashes are truncated to.
pub const DEFAULT_MAX_HASH_LEN: usize = 20;

/// Default SQLite database file.
pub const DEFAULT_DATABASE: &str = "contacts.sqlite3";

/// Server configuration.
///
/// Custom `Debug` redacts the API password so the config can be logged.
#[derive(Clone)]
pub struct ServiceConfig {
    pub port: u16,
    /// Path of the SQLite database holding the registered hashes.
    pub database: PathBuf,
    /// Prefixes shorter than this (after canonicalization) match nothing.
    pub min_prefix_len: usize,
    /// Matched hashes are truncated to this many characters.
    pub max_hash_len: usize,
    /// Reference secret for insert/delete.
    pub api_password: String,
}

impl ServiceConfig {
    /// Reject configurations the service cannot safely run with.
    pub fn validate(&self) -> Result<()> {
        if self.api_password.is_empty() {
            return Err(Error::InvalidConfig("API password must not be empty".into()));
        }
        if self.min_prefix_len == 0 {
            return Err(Error::InvalidConfig(
                "minimum prefix length must be at least 1".into(),
            ));
        }
        if self.max_hash_len == 0 {
            return Err(Error::InvalidConfig(
                "hash length must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            database: PathBuf::from(DEFAULT_DATABASE),
            min_prefix_len: DEFAULT_MIN_PREFIX_LEN,
            max_hash_len: DEFAULT_MAX_HASH_LEN,
            api_password: String::new(),
        }
    }
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("port", &self.port)
            .field("database", &self.database)
            .field("min_prefix_len", &self.min_prefix_len)
            .field("max_hash_len", &self.max_hash_len)
            .field("api_password", &"[REDACTED]")
            .finish()
    }
}
