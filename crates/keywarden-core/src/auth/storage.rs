//! Key-value persistence for session tokens.
//!
//! The session store persists exactly two keys (`token` and `expires_at`).
//! Storage is abstracted behind the `TokenStorage` trait so tests can run
//! against an in-memory map while the application uses a JSON file in the
//! platform config directory.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Storage key for the bearer token.
pub const TOKEN_KEY: &str = "token";

/// Storage key for the token expiry instant (epoch milliseconds, as a string).
pub const EXPIRES_AT_KEY: &str = "expires_at";

/// Minimal key-value store for session state.
///
/// Implementations must be durable for the lifetime they advertise and must
/// not touch keys other than the ones passed in.
pub trait TokenStorage {
    /// Read a value, or `None` if the key is absent.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, creating the key if needed.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove a key. Removing an absent key is a no-op.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// File-backed store: a flat JSON object in a single file.
///
/// Survives process restarts; each operation is a complete read-modify-write
/// of the file, so unrelated keys written by other callers are preserved.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Read the backing file into a map. A missing or unparsable file reads
    /// as empty rather than failing.
    fn read_map(&self) -> HashMap<String, String> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_default(),
            Err(_) => HashMap::new(),
        }
    }

    fn write_map(&self, map: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let contents = serde_json::to_string_pretty(map)?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }
}

impl TokenStorage for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read_map().get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut map = self.read_map();
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let mut map = self.read_map();
        if map.remove(key).is_some() || self.path.exists() {
            self.write_map(&map)?;
        }
        Ok(())
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStorage for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> FileStore {
        let path = std::env::temp_dir().join(format!(
            "keywarden-test-{}-{}.json",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        FileStore::new(path)
    }

    #[test]
    fn file_store_round_trip() {
        let mut store = temp_store("round-trip");
        assert_eq!(store.get(TOKEN_KEY), None);

        store.set(TOKEN_KEY, "abc").unwrap();
        store.set(EXPIRES_AT_KEY, "12345").unwrap();
        assert_eq!(store.get(TOKEN_KEY).as_deref(), Some("abc"));
        assert_eq!(store.get(EXPIRES_AT_KEY).as_deref(), Some("12345"));

        store.remove(TOKEN_KEY).unwrap();
        assert_eq!(store.get(TOKEN_KEY), None);
        // Other key untouched
        assert_eq!(store.get(EXPIRES_AT_KEY).as_deref(), Some("12345"));
    }

    #[test]
    fn file_store_tolerates_corrupt_file() {
        let store = temp_store("corrupt");
        std::fs::write(store.path.clone(), "not json {{{").unwrap();
        assert_eq!(store.get(TOKEN_KEY), None);
    }

    #[test]
    fn file_store_preserves_unrelated_keys() {
        let mut store = temp_store("unrelated");
        store.set("other", "kept").unwrap();
        store.set(TOKEN_KEY, "abc").unwrap();
        store.remove(TOKEN_KEY).unwrap();
        assert_eq!(store.get("other").as_deref(), Some("kept"));
    }

    #[test]
    fn memory_store_remove_is_idempotent() {
        let mut store = MemoryStore::new();
        store.set(TOKEN_KEY, "abc").unwrap();
        store.remove(TOKEN_KEY).unwrap();
        store.remove(TOKEN_KEY).unwrap();
        assert_eq!(store.get(TOKEN_KEY), None);
    }
}
