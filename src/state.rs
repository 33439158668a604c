//! Shared server state handed to every handler.

use crate::auth::CredentialVerifier;
use crate::config::ServiceConfig;
use crate::error::Result;
use crate::registry::{HashRegistry, HashStore};

#[derive(Clone)]
pub struct AppState {
    pub registry: HashRegistry,
    pub verifier: CredentialVerifier,
}

impl AppState {
    /// Build state around an already-open store.
    pub fn new(config: &ServiceConfig, store: HashStore) -> Self {
        Self {
            registry: HashRegistry::new(store, config),
            verifier: CredentialVerifier::new(&config.api_password),
        }
    }

    /// Validate the config and open its database.
    pub fn open(config: &ServiceConfig) -> Result<Self> {
        config.validate()?;
        let store = HashStore::open(Some(config.database.as_path()))?;
        Ok(Self::new(config, store))
    }
}
