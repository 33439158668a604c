//! SQLite-backed hash store.
//!
//! A single table of unique hash values. One long-lived connection is
//! shared behind a mutex and every operation runs in its own transaction,
//! which rolls back if it is dropped before commit.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::{params, Connection, ErrorCode};

use crate::error::{Error, Result};

const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS hashes (
    hash TEXT PRIMARY KEY NOT NULL
);
"#;

/// Range scan over the primary-key index for a prefix with an upper bound.
const SELECT_PREFIX_RANGE: &str =
    "SELECT hash FROM hashes WHERE hash >= ?1 AND hash < ?2 ORDER BY hash";

/// Range scan for an all-`f` prefix, which has no upper bound.
const SELECT_PREFIX_OPEN: &str = "SELECT hash FROM hashes WHERE hash >= ?1 ORDER BY hash";

/// Smallest lowercase-hex string greater than every string starting with
/// `prefix`, or `None` when the prefix is all `f`.
fn prefix_upper_bound(prefix: &str) -> Option<String> {
    let mut digits = prefix.as_bytes().to_vec();
    while let Some(last) = digits.pop() {
        let next = match last {
            b'0'..=b'8' | b'a'..=b'e' => last + 1,
            b'9' => b'a',
            _ => continue,
        };
        digits.push(next);
        return String::from_utf8(digits).ok();
    }
    None
}

fn read_hash(row: &rusqlite::Row<'_>) -> rusqlite::Result<String> {
    row.get(0)
}

/// Durable set of registered hashes.
#[derive(Clone)]
pub struct HashStore {
    conn: Arc<Mutex<Connection>>,
}

impl HashStore {
    /// Open or create a store.
    ///
    /// If path is None, creates an in-memory store (useful for testing).
    pub fn open(path: Option<&Path>) -> Result<Self> {
        let conn = match path {
            Some(p) => Connection::open(p).map_err(|e| {
                Error::StoreUnavailable(format!("Failed to open {}: {}", p.display(), e))
            })?,
            None => Connection::open_in_memory().map_err(|e| {
                Error::StoreUnavailable(format!("Failed to create in-memory database: {}", e))
            })?,
        };

        conn.execute_batch(CREATE_TABLES)
            .map_err(|e| Error::StoreUnavailable(format!("Failed to create tables: {}", e)))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Insert a hash. Fails with `DuplicateHash` if it is already stored.
    pub fn insert(&self, hash: &str) -> Result<()> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| Error::StoreUnavailable(format!("Failed to begin transaction: {}", e)))?;

        match tx.execute("INSERT INTO hashes (hash) VALUES (?1)", params![hash]) {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                return Err(Error::DuplicateHash(hash.to_string()));
            }
            Err(e) => {
                return Err(Error::StoreUnavailable(format!("Failed to insert hash: {}", e)));
            }
        }

        tx.commit()
            .map_err(|e| Error::StoreUnavailable(format!("Failed to commit insert: {}", e)))
    }

    /// Remove a hash. Returns whether a row was removed.
    pub fn delete(&self, hash: &str) -> Result<bool> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| Error::StoreUnavailable(format!("Failed to begin transaction: {}", e)))?;

        let rows = tx
            .execute("DELETE FROM hashes WHERE hash = ?1", params![hash])
            .map_err(|e| Error::StoreUnavailable(format!("Failed to delete hash: {}", e)))?;

        tx.commit()
            .map_err(|e| Error::StoreUnavailable(format!("Failed to commit delete: {}", e)))?;

        Ok(rows > 0)
    }

    /// Remove every hash. Returns the number removed.
    pub fn clear(&self) -> Result<usize> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| Error::StoreUnavailable(format!("Failed to begin transaction: {}", e)))?;

        let rows = tx
            .execute("DELETE FROM hashes", [])
            .map_err(|e| Error::StoreUnavailable(format!("Failed to clear hashes: {}", e)))?;

        tx.commit()
            .map_err(|e| Error::StoreUnavailable(format!("Failed to commit clear: {}", e)))?;

        Ok(rows)
    }

    /// Fetch the stored hashes starting with each prefix, in prefix order.
    ///
    /// All prefixes are read in one transaction. Callers must pass prefixes
    /// already validated as lowercase hex; each becomes a range scan on the
    /// primary-key index.
    pub fn find_by_prefixes(&self, prefixes: &[String]) -> Result<Vec<Vec<String>>> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| Error::StoreUnavailable(format!("Failed to begin transaction: {}", e)))?;

        let mut results = Vec::with_capacity(prefixes.len());
        for prefix in prefixes {
            let upper = prefix_upper_bound(prefix);
            let sql = if upper.is_some() {
                SELECT_PREFIX_RANGE
            } else {
                SELECT_PREFIX_OPEN
            };

            let mut stmt = tx
                .prepare_cached(sql)
                .map_err(|e| Error::StoreUnavailable(format!("Failed to prepare query: {}", e)))?;

            let rows = match &upper {
                Some(upper) => stmt.query_map(params![prefix, upper], read_hash),
                None => stmt.query_map(params![prefix], read_hash),
            }
            .map_err(|e| Error::StoreUnavailable(format!("Failed to query hashes: {}", e)))?;

            let mut matches = Vec::new();
            for row in rows {
                let hash =
                    row.map_err(|e| Error::StoreUnavailable(format!("Failed to read hash: {}", e)))?;
                // Inserts are not format-checked, so a non-hex row can sort inside the range.
                if hash.starts_with(prefix.as_str()) {
                    matches.push(hash);
                }
            }
            results.push(matches);
        }

        tx.commit()
            .map_err(|e| Error::StoreUnavailable(format!("Failed to commit lookup: {}", e)))?;

        Ok(results)
    }

    /// Whether the exact hash is stored.
    #[cfg(test)]
    pub fn contains(&self, hash: &str) -> Result<bool> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM hashes WHERE hash = ?1)",
            params![hash],
            |row| row.get(0),
        )
        .map_err(|e| Error::StoreUnavailable(format!("Failed to check hash: {}", e)))
    }

    /// Number of stored hashes.
    pub fn count(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM hashes", [], |row| row.get(0))
            .map_err(|e| Error::StoreUnavailable(format!("Failed to count hashes: {}", e)))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_creation() {
        let store = HashStore::open(None).unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_insert_and_duplicate() {
        let store = HashStore::open(None).unwrap();
        store.insert("abcdef1234").unwrap();

        let err = store.insert("abcdef1234").unwrap_err();
        assert!(matches!(err, Error::DuplicateHash(ref h) if h == "abcdef1234"));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_delete_reports_removal() {
        let store = HashStore::open(None).unwrap();
        store.insert("abcdef1234").unwrap();

        assert!(store.delete("abcdef1234").unwrap());
        assert!(!store.delete("abcdef1234").unwrap());
        assert!(!store.contains("abcdef1234").unwrap());
    }

    #[test]
    fn test_find_by_prefixes() {
        let store = HashStore::open(None).unwrap();
        store.insert("abcd0001").unwrap();
        store.insert("abcd0002").unwrap();
        store.insert("ffff0000").unwrap();

        let results = store
            .find_by_prefixes(&["abcd".to_string(), "ffff".to_string(), "0000".to_string()])
            .unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0], vec!["abcd0001", "abcd0002"]);
        assert_eq!(results[1], vec!["ffff0000"]);
        assert!(results[2].is_empty());
    }

    #[test]
    fn test_prefix_upper_bound() {
        assert_eq!(prefix_upper_bound("abcd").as_deref(), Some("abce"));
        assert_eq!(prefix_upper_bound("abc9").as_deref(), Some("abca"));
        assert_eq!(prefix_upper_bound("abcf").as_deref(), Some("abd"));
        assert_eq!(prefix_upper_bound("a9ff").as_deref(), Some("aa"));
        assert_eq!(prefix_upper_bound("ffff"), None);
    }

    #[test]
    fn test_prefix_queries_use_index() {
        let store = HashStore::open(None).unwrap();
        let conn = store.conn.lock();

        for (sql, args) in [
            (SELECT_PREFIX_RANGE, vec!["abcd", "abce"]),
            (SELECT_PREFIX_OPEN, vec!["ffff"]),
        ] {
            let mut stmt = conn.prepare(&format!("EXPLAIN QUERY PLAN {}", sql)).unwrap();
            let details: Vec<String> = stmt
                .query_map(rusqlite::params_from_iter(args), |row| row.get(3))
                .unwrap()
                .collect::<std::result::Result<_, _>>()
                .unwrap();
            assert!(
                details.iter().any(|d| d.starts_with("SEARCH")),
                "expected index search for {:?}, got {:?}",
                sql,
                details
            );
        }
    }

    #[test]
    fn test_find_by_prefixes_at_digit_boundaries() {
        let store = HashStore::open(None).unwrap();
        for hash in [
            "abc9ffff", "abca0000", "abcf0001", "abcg0000", "abd00000", "fffe0000", "ffff",
            "ffff1234", "fg00",
        ] {
            store.insert(hash).unwrap();
        }

        let results = store
            .find_by_prefixes(&["abc9".to_string(), "abcf".to_string(), "ffff".to_string()])
            .unwrap();
        assert_eq!(results[0], vec!["abc9ffff"]);
        assert_eq!(results[1], vec!["abcf0001"]);
        assert_eq!(results[2], vec!["ffff", "ffff1234"]);
    }

    #[test]
    fn test_clear() {
        let store = HashStore::open(None).unwrap();
        store.insert("aaaa").unwrap();
        store.insert("bbbb").unwrap();

        assert_eq!(store.clear().unwrap(), 2);
        assert_eq!(store.count().unwrap(), 0);
        assert_eq!(store.clear().unwrap(), 0);
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contacts.sqlite3");

        {
            let store = HashStore::open(Some(&path)).unwrap();
            store.insert("1111aaaa").unwrap();
        }

        let store = HashStore::open(Some(&path)).unwrap();
        assert!(store.contains("1111aaaa").unwrap());
        assert!(matches!(
            store.insert("1111aaaa"),
            Err(Error::DuplicateHash(_))
        ));
    }

    #[test]
    fn test_open_fails_for_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("contacts.sqlite3");
        assert!(matches!(
            HashStore::open(Some(&path)),
            Err(Error::StoreUnavailable(_))
        ));
    }
}
