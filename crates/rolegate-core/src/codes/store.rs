//! In-memory verification code store
//!
//! Codes are minted lazily on first lookup and rotated in place once their
//! time-to-live has passed. All entries live in a single map behind one
//! lock, so concurrent lookups for the same session always agree on one
//! code. Entries are never removed; a session that stops being looked up
//! simply goes stale until its next request rotates it.

use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::codes::client::CodeSource;
use crate::error::Result;

/// Lifetime of a code before the next lookup rotates it
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Default number of digits per code
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Length of generated session ids
pub const SESSION_ID_LENGTH: usize = 8;

#[derive(Debug, Clone)]
struct CodeEntry {
    code: String,
    issued_at: Instant,
}

/// Thread-safe store of per-session verification codes
#[derive(Debug)]
pub struct CodeStore {
    entries: Mutex<HashMap<String, CodeEntry>>,
    ttl: Duration,
    code_length: usize,
}

impl Default for CodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeStore {
    /// Create a store with the default TTL and code length
    pub fn new() -> Self {
        Self::with_settings(DEFAULT_TTL, DEFAULT_CODE_LENGTH)
    }

    /// Create a store with custom TTL and code length
    pub fn with_settings(ttl: Duration, code_length: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            code_length,
        }
    }

    /// Return the current code for a session, minting or rotating as needed
    ///
    /// Within the TTL every call returns the same code. Once the TTL has
    /// passed, the next call mints a fresh code and restarts the clock.
    pub fn get_or_create(&self, session_id: &str) -> String {
        let mut entries = self.entries.lock().unwrap();

        match entries.get_mut(session_id) {
            Some(entry) if entry.issued_at.elapsed() < self.ttl => entry.code.clone(),
            Some(entry) => {
                entry.code = generate_code(self.code_length);
                entry.issued_at = Instant::now();
                entry.code.clone()
            }
            None => {
                let entry = CodeEntry {
                    code: generate_code(self.code_length),
                    issued_at: Instant::now(),
                };
                let code = entry.code.clone();
                entries.insert(session_id.to_string(), entry);
                code
            }
        }
    }

    /// Number of sessions that have been issued a code
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Whether no session has been issued a code yet
    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}

// Direct source for deployments where the store lives in-process
#[async_trait]
impl CodeSource for CodeStore {
    async fn fetch(&self, session_id: &str) -> Result<String> {
        Ok(self.get_or_create(session_id))
    }
}

/// Generate a numeric verification code of the given length
///
/// Leading zeros are valid, so the result is a string rather than a number.
pub fn generate_code(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length).map(|_| rng.gen_range(0..10).to_string()).collect()
}

/// Generate a random alphanumeric session id
pub fn new_session_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_ID_LENGTH)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_code_is_all_digits() {
        let store = CodeStore::new();
        let code = store.get_or_create("session-1");
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_custom_code_length() {
        let store = CodeStore::with_settings(DEFAULT_TTL, 9);
        assert_eq!(store.get_or_create("session-1").len(), 9);
    }

    #[test]
    fn test_same_code_within_ttl() {
        let store = CodeStore::new();
        let first = store.get_or_create("session-1");
        let second = store.get_or_create("session-1");
        assert_eq!(first, second);
    }

    #[test]
    fn test_distinct_sessions_get_own_entries() {
        let store = CodeStore::new();
        store.get_or_create("session-1");
        store.get_or_create("session-2");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_rotates_after_ttl() {
        // long codes keep the accidental-collision chance negligible
        let store = CodeStore::with_settings(Duration::from_millis(20), 12);
        let first = store.get_or_create("session-1");

        std::thread::sleep(Duration::from_millis(40));

        let rotated = store.get_or_create("session-1");
        assert_ne!(first, rotated);

        // rotation restarts the clock, so the next lookup sees the new code
        let again = store.get_or_create("session-1");
        assert_eq!(rotated, again);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_concurrent_first_lookup_agrees() {
        let store = Arc::new(CodeStore::new());
        let mut handles = Vec::new();

        for _ in 0..16 {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || store.get_or_create("shared")));
        }

        let codes: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(codes.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_store_serves_as_code_source() {
        let store = CodeStore::new();
        let direct = store.get_or_create("session-1");
        let fetched = store.fetch("session-1").await.unwrap();
        assert_eq!(direct, fetched);
    }

    #[test]
    fn test_session_id_shape() {
        let id = new_session_id();
        assert_eq!(id.len(), SESSION_ID_LENGTH);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(id, new_session_id());
    }
}
