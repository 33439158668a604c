//! Hash registry for contact discovery.
//!
//! Stores one-way hashes of contact identifiers and answers prefix queries
//! with truncated matches.
//!
//! ## Privacy Design
//!
//! 1. **Hashes only**: clients hash contact identifiers locally; plaintext never reaches the server
//! 2. **Prefix commitment**: a lookup must name at least `min_prefix_len` hex digits
//! 3. **Truncated answers**: matches are cut to `max_hash_len` characters, enough to refine locally

pub mod api;
pub mod hash;
pub mod service;
pub mod store;

pub use service::HashRegistry;
pub use store::HashStore;
