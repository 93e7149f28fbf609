//! Durable local key-value store.
//!
//! # Design
//!
//! The persistence medium the storefront core assumes: a small string →
//! string map with synchronous writes. [`KvStore`] is the seam; the ledger
//! crate is written against the trait so tests run on [`MemStore`] while a
//! real session uses [`JsonFileStore`].
//!
//! # Durability contract
//!
//! - `put` completes the write before returning. A crash after a successful
//!   `put` leaves durable state consistent with in-memory state.
//! - Last-write-wins; no partial-write protection is assumed of the medium.
//! - A corrupt store file degrades to an empty map with a warning — it never
//!   blocks startup.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

// ---------------------------------------------------------------------------
// KvStore
// ---------------------------------------------------------------------------

/// Minimal key-value surface the core persists through.
pub trait KvStore {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, synchronously. The write is durable (to
    /// the extent the backend is) before this returns.
    fn put(&mut self, key: &str, value: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// MemStore
// ---------------------------------------------------------------------------

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemStore {
    entries: BTreeMap<String, String>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JsonFileStore
// ---------------------------------------------------------------------------

/// File-backed store: one JSON object per file, rewritten on every `put`.
///
/// The file is read once at [`open`][JsonFileStore::open]; `get` serves from
/// the in-memory map. Suitable for the single-threaded session model — no
/// cross-process coordination is attempted.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open (or create) the store at `path`, ensuring parent dirs exist.
    ///
    /// A missing file starts empty. A file that cannot be parsed as a JSON
    /// string map also starts empty, with a `warn!` — corrupt persisted
    /// state must never block startup.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create_dir_all {parent:?}"))?;
        }

        // Only genuine IO failures propagate; a file with corrupt contents
        // (non-UTF-8 bytes or malformed JSON) degrades to an empty map.
        let entries = if path.exists() {
            let bytes = fs::read(&path).with_context(|| format!("read store file {:?}", path))?;
            match serde_json::from_slice::<BTreeMap<String, String>>(&bytes) {
                Ok(map) => map,
                Err(err) => {
                    warn!(path = ?path, %err, "corrupt store file, starting empty");
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        let json =
            serde_json::to_string_pretty(&self.entries).context("serialize store map failed")?;
        fs::write(&self.path, format!("{json}\n"))
            .with_context(|| format!("write store file {:?}", self.path))?;
        Ok(())
    }
}

impl KvStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mem_store_round_trip() {
        let mut s = MemStore::new();
        assert_eq!(s.get("orders").unwrap(), None);
        s.put("orders", "[]").unwrap();
        assert_eq!(s.get("orders").unwrap().as_deref(), Some("[]"));
        s.put("orders", "[1]").unwrap();
        assert_eq!(s.get("orders").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let mut s = JsonFileStore::open(&path).unwrap();
        s.put("orders", r#"[{"id":1}]"#).unwrap();
        s.put("order_seq", "2").unwrap();
        drop(s);

        let s = JsonFileStore::open(&path).unwrap();
        assert_eq!(s.get("orders").unwrap().as_deref(), Some(r#"[{"id":1}]"#));
        assert_eq!(s.get("order_seq").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let s = JsonFileStore::open(dir.path().join("absent.json")).unwrap();
        assert_eq!(s.get("orders").unwrap(), None);
    }

    #[test]
    fn creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/store.json");
        let mut s = JsonFileStore::open(&path).unwrap();
        s.put("k", "v").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn corrupt_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{not json at all").unwrap();

        let mut s = JsonFileStore::open(&path).unwrap();
        assert_eq!(s.get("orders").unwrap(), None, "corrupt file reads as empty");

        // The store is usable again after the first write.
        s.put("orders", "[]").unwrap();
        drop(s);
        let s = JsonFileStore::open(&path).unwrap();
        assert_eq!(s.get("orders").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn non_utf8_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, [0xff, 0xfe, 0x00, 0x7b]).unwrap();

        let mut s = JsonFileStore::open(&path).expect("corrupt bytes must not block startup");
        assert_eq!(s.get("orders").unwrap(), None);

        s.put("orders", "[]").unwrap();
        drop(s);
        let s = JsonFileStore::open(&path).unwrap();
        assert_eq!(s.get("orders").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn put_overwrites_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = JsonFileStore::open(dir.path().join("store.json")).unwrap();
        s.put("order_seq", "1").unwrap();
        s.put("order_seq", "7").unwrap();
        assert_eq!(s.get("order_seq").unwrap().as_deref(), Some("7"));
    }
}
