//! The hash registry: storage policy on top of [`HashStore`].
//!
//! Lookups apply the minimum prefix length and hex-only rule per prefix and
//! truncate every match. Malformed prefixes contribute nothing instead of
//! failing the batch. Insert and delete assume the caller has already been
//! authorized.

use crate::config::ServiceConfig;
use crate::error::Result;

use super::hash::{canonicalize, is_lower_hex, truncate};
use super::store::HashStore;

/// Hash characters included in log lines.
const LOG_PREFIX_LEN: usize = 4;

/// Leading characters of a hash, safe to log.
fn log_prefix(hash: &str) -> String {
    truncate(hash, LOG_PREFIX_LEN)
}

#[derive(Clone)]
pub struct HashRegistry {
    store: HashStore,
    min_prefix_len: usize,
    max_hash_len: usize,
}

impl HashRegistry {
    pub fn new(store: HashStore, config: &ServiceConfig) -> Self {
        Self {
            store,
            min_prefix_len: config.min_prefix_len,
            max_hash_len: config.max_hash_len,
        }
    }

    pub fn min_prefix_len(&self) -> usize {
        self.min_prefix_len
    }

    pub fn max_hash_len(&self) -> usize {
        self.max_hash_len
    }

    /// Canonical prefix if it is eligible for lookup.
    fn accept_prefix(&self, prefix: &str) -> Option<String> {
        let canonical = canonicalize(prefix);
        if canonical.chars().count() < self.min_prefix_len || !is_lower_hex(&canonical) {
            return None;
        }
        Some(canonical)
    }

    /// Look up every prefix and return the truncated matches, flattened in
    /// prefix order. Duplicated prefixes yield duplicated matches.
    pub fn lookup<S: AsRef<str>>(&self, prefixes: &[S]) -> Result<Vec<String>> {
        let accepted: Vec<String> = prefixes
            .iter()
            .filter_map(|p| self.accept_prefix(p.as_ref()))
            .collect();

        if accepted.is_empty() {
            tracing::debug!(prefixes = prefixes.len(), "[Registry] No eligible prefixes");
            return Ok(Vec::new());
        }

        let hashes: Vec<String> = self
            .store
            .find_by_prefixes(&accepted)?
            .into_iter()
            .flatten()
            .map(|hash| truncate(&hash, self.max_hash_len))
            .collect();

        tracing::debug!(
            prefixes = prefixes.len(),
            accepted = accepted.len(),
            matches = hashes.len(),
            "[Registry] Lookup complete"
        );

        Ok(hashes)
    }

    /// Register a hash. Fails with `DuplicateHash` if already present.
    pub fn insert(&self, hash: &str) -> Result<()> {
        let canonical = canonicalize(hash);
        self.store.insert(&canonical)?;
        tracing::debug!(
            prefix = log_prefix(&canonical).as_str(),
            "[Registry] Hash inserted"
        );
        Ok(())
    }

    /// Remove a hash. Removing an unknown hash succeeds.
    pub fn delete(&self, hash: &str) -> Result<()> {
        let canonical = canonicalize(hash);
        let removed = self.store.delete(&canonical)?;
        tracing::debug!(
            prefix = log_prefix(&canonical).as_str(),
            removed = removed,
            "[Registry] Hash deleted"
        );
        Ok(())
    }

    /// Remove every registered hash. Returns how many were removed.
    pub fn clear_all(&self) -> Result<usize> {
        let removed = self.store.clear()?;
        tracing::info!(removed = removed, "[Registry] All hashes cleared");
        Ok(removed)
    }

    /// Number of registered hashes.
    pub fn count(&self) -> Result<usize> {
        self.store.count()
    }
}
