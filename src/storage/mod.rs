// Storage module - durable key-value entry holding the serialized AppState
//
// The whole state is one JSON document under a single named key. Every write
// replaces the document completely; the file backend writes to a temp file and
// renames it over the previous snapshot, so a crash mid-write leaves the last
// good snapshot in place.
//
// Layout: <state_dir>/<key>.json
// Example: jq '.riskAlerts' ~/.local/share/marketmind/marketmind_state.json

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Default key the state document is stored under
pub const DEFAULT_STATE_KEY: &str = "marketmind_state";

/// Failure reading or writing the persisted snapshot
#[derive(Debug)]
pub enum StorageError {
    /// Filesystem failure
    Io(io::Error),
    /// State could not be turned into JSON
    Serialize(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::Serialize(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<io::Error> for StorageError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// A single named entry in durable key-value storage
///
/// Implementations only move opaque documents around; (de)serialization and
/// fallback handling belong to the Store.
pub trait SnapshotStorage: Send {
    /// Human-readable location for logs and `state --path`
    fn describe(&self) -> String;

    /// Read the stored document, `None` if nothing has been written yet
    fn load(&self) -> Result<Option<String>, StorageError>;

    /// Replace the stored document with `document`
    fn save(&mut self, document: &str) -> Result<(), StorageError>;

    /// Remove the stored document
    fn clear(&mut self) -> Result<(), StorageError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// File backend
// ─────────────────────────────────────────────────────────────────────────────

/// Stores the document as `<dir>/<key>.json`
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(dir: &Path, key: &str) -> Self {
        Self {
            path: dir.join(format!("{}.json", key)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}

impl SnapshotStorage for FileStorage {
    fn describe(&self) -> String {
        self.path().display().to_string()
    }

    fn load(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, document: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.tmp_path();
        fs::write(&tmp, document)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory backend
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct MemoryCell {
    document: Option<String>,
    writes: usize,
}

/// In-process storage; clones share the same entry
///
/// Backs `--no-persist` sessions, and lets tests reopen a Store against the
/// same "disk".
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    cell: Arc<Mutex<MemoryCell>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from whatever `source` currently holds; nothing is written back
    ///
    /// An unreadable source starts empty, the same as a fresh install.
    pub fn seeded_from(source: &dyn SnapshotStorage) -> Self {
        match source.load() {
            Ok(Some(document)) => Self::with_document(document),
            Ok(None) => Self::new(),
            Err(e) => {
                tracing::warn!("Could not read {}: {}", source.describe(), e);
                Self::new()
            }
        }
    }

    /// Start with `document` already stored
    pub fn with_document(document: impl Into<String>) -> Self {
        let storage = Self::new();
        storage.lock().document = Some(document.into());
        storage
    }

    /// Number of successful saves so far
    pub fn writes(&self) -> usize {
        self.lock().writes
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryCell> {
        // A poisoned cell still holds a whole document; keep using it
        self.cell.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SnapshotStorage for MemoryStorage {
    fn describe(&self) -> String {
        "memory (not persisted)".to_string()
    }

    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.lock().document.clone())
    }

    fn save(&mut self, document: &str) -> Result<(), StorageError> {
        let mut cell = self.lock();
        cell.document = Some(document.to_string());
        cell.writes += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.lock().document = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path(), DEFAULT_STATE_KEY);
        assert!(storage.load().unwrap().is_none());
        assert!(storage.describe().ends_with("marketmind_state.json"));
    }

    #[test]
    fn test_file_storage_overwrites_whole_document() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(&dir.path().join("nested"), "state");

        storage.save(r#"{"rawCsv":"first"}"#).unwrap();
        storage.save(r#"{"rawCsv":"second"}"#).unwrap();

        assert_eq!(
            storage.load().unwrap().as_deref(),
            Some(r#"{"rawCsv":"second"}"#)
        );
        // Temp file is renamed away after each write
        assert!(!storage.tmp_path().exists());
    }

    #[test]
    fn test_file_storage_clear() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path(), "state");
        storage.save("{}").unwrap();
        storage.clear().unwrap();
        assert!(storage.load().unwrap().is_none());
        // Clearing twice is fine
        storage.clear().unwrap();
    }

    #[test]
    fn test_seeded_memory_never_touches_source() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = FileStorage::new(dir.path(), "state");
        file.save(r#"{"rawCsv":"on disk"}"#).unwrap();

        let mut memory = MemoryStorage::seeded_from(&file);
        assert_eq!(memory.load().unwrap().as_deref(), Some(r#"{"rawCsv":"on disk"}"#));

        memory.save(r#"{"rawCsv":"scratch"}"#).unwrap();
        assert_eq!(memory.writes(), 1);
        assert_eq!(
            std::fs::read_to_string(file.path()).unwrap(),
            r#"{"rawCsv":"on disk"}"#
        );
    }

    #[test]
    fn test_seeded_from_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let file = FileStorage::new(dir.path(), "absent");
        assert!(MemoryStorage::seeded_from(&file).load().unwrap().is_none());
    }

    #[test]
    fn test_memory_storage_clones_share_entry() {
        let mut storage = MemoryStorage::new();
        let observer = storage.clone();

        storage.save("doc").unwrap();
        assert_eq!(observer.load().unwrap().as_deref(), Some("doc"));
        assert_eq!(observer.writes(), 1);
    }
}
