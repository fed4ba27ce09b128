//! Application state store
//!
//! The Store owns the one `AppState` of the process. Every change goes through
//! [`Store::update`], which builds a fresh immutable snapshot, commits it, and
//! then writes the full document to [`SnapshotStorage`]. Readers hold
//! `Arc<AppState>` snapshots, so an update never changes a snapshot someone
//! else is looking at.
//!
//! # Lifecycle
//!
//! ```text
//! Store::open ──▶ restored snapshot ─┐
//!       │                            ├──▶ update(patch) ──▶ commit ──▶ save
//!       └──▶ built-in default ───────┘
//! ```

use crate::state::{ensure_non_empty_csv, initial_state, AppState, StatePatch};
use crate::storage::{SnapshotStorage, StorageError};
use std::fmt;
use std::sync::Arc;

/// A change to apply to the state
pub enum Patch {
    /// Shallow merge: present fields overwrite, absent fields are kept
    Merge(StatePatch),
    /// Compute the whole next state from the previous one
    Replace(Box<dyn FnOnce(&AppState) -> AppState + Send>),
}

impl Patch {
    pub fn replace<F>(f: F) -> Self
    where
        F: FnOnce(&AppState) -> AppState + Send + 'static,
    {
        Self::Replace(Box::new(f))
    }
}

impl From<StatePatch> for Patch {
    fn from(patch: StatePatch) -> Self {
        Self::Merge(patch)
    }
}

impl fmt::Debug for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Merge(patch) => f.debug_tuple("Merge").field(patch).finish(),
            Self::Replace(_) => f.write_str("Replace(..)"),
        }
    }
}

/// Where the initial state came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Deserialized from storage
    Restored,
    /// Storage was empty, unreadable or corrupt
    Default,
}

/// Whether the latest snapshot reached durable storage
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PersistenceStatus {
    #[default]
    Saved,
    /// In-memory state is ahead of storage; changes will not survive a reload
    Unsaved { reason: String },
}

impl PersistenceStatus {
    pub fn is_unsaved(&self) -> bool {
        matches!(self, Self::Unsaved { .. })
    }
}

/// Single owner of the application state
pub struct Store {
    current: Arc<AppState>,
    storage: Box<dyn SnapshotStorage>,
    origin: Origin,
    persistence: PersistenceStatus,
    /// Demo CSV check runs once per session
    csv_checked: bool,
}

impl Store {
    /// Rehydrate from `storage`, falling back to the built-in default
    ///
    /// The fallback always has an empty `product_analysis`, whatever the
    /// unreadable snapshot contained. Bootstrap problems are logged, never
    /// returned.
    pub fn open(storage: impl SnapshotStorage + 'static) -> Self {
        let (state, origin) = match storage.load() {
            Ok(Some(document)) => match serde_json::from_str::<AppState>(&document) {
                Ok(state) => (state, Origin::Restored),
                Err(e) => {
                    tracing::warn!(
                        "Persisted state at {} is corrupt, using defaults: {}",
                        storage.describe(),
                        e
                    );
                    (Self::default_state(), Origin::Default)
                }
            },
            Ok(None) => {
                tracing::debug!("No persisted state at {}", storage.describe());
                (Self::default_state(), Origin::Default)
            }
            Err(e) => {
                tracing::warn!(
                    "Could not read persisted state at {}, using defaults: {}",
                    storage.describe(),
                    e
                );
                (Self::default_state(), Origin::Default)
            }
        };

        tracing::info!("State loaded ({:?}) from {}", origin, storage.describe());

        Self {
            current: Arc::new(state),
            storage: Box::new(storage),
            origin,
            persistence: PersistenceStatus::Saved,
            csv_checked: false,
        }
    }

    fn default_state() -> AppState {
        AppState {
            product_analysis: Vec::new(),
            ..initial_state()
        }
    }

    /// Shared handle to the current snapshot
    pub fn snapshot(&self) -> Arc<AppState> {
        Arc::clone(&self.current)
    }

    /// Borrow the current state
    pub fn state(&self) -> &AppState {
        &self.current
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn persistence(&self) -> &PersistenceStatus {
        &self.persistence
    }

    pub fn storage_location(&self) -> String {
        self.storage.describe()
    }

    /// Apply `patch`, commit the new snapshot, then persist it
    ///
    /// The update always takes effect in memory. A failed write only marks
    /// the store as [`PersistenceStatus::Unsaved`].
    pub fn update(&mut self, patch: impl Into<Patch>) -> Arc<AppState> {
        let next = match patch.into() {
            Patch::Merge(patch) => {
                tracing::debug!("Merging state patch: {:?}", patch.slices());
                patch.apply_to(&self.current)
            }
            Patch::Replace(f) => {
                tracing::debug!("Replacing state");
                f(&self.current)
            }
        };

        for violation in next.invariant_violations() {
            tracing::warn!("State invariant violated: {}", violation);
        }

        self.current = Arc::new(next);
        self.persist();
        self.snapshot()
    }

    /// Inject the demo dataset if rawCsv is blank
    ///
    /// Only the first call of a session checks; returns true if the dataset
    /// was injected.
    pub fn ensure_demo_csv(&mut self) -> bool {
        if self.csv_checked {
            return false;
        }
        self.csv_checked = true;

        if !self.current.raw_csv.trim().is_empty() {
            return false;
        }

        tracing::info!("Raw dataset empty, loading demo CSV");
        self.update(Patch::replace(|prev| ensure_non_empty_csv(prev.clone())));
        true
    }

    /// Delete the persisted snapshot; the in-memory state is kept
    pub fn clear_persisted(&mut self) -> Result<(), StorageError> {
        self.storage.clear()?;
        tracing::info!("Cleared persisted state at {}", self.storage.describe());
        Ok(())
    }

    fn persist(&mut self) {
        let result = serde_json::to_string(&*self.current)
            .map_err(|e| StorageError::Serialize(e.to_string()))
            .and_then(|document| self.storage.save(&document));

        match result {
            Ok(()) => {
                if matches!(self.persistence, PersistenceStatus::Unsaved { .. }) {
                    tracing::info!("State persisted again after earlier failure");
                }
                self.persistence = PersistenceStatus::Saved;
            }
            Err(e) => {
                tracing::warn!("Changes not saved across reloads: {}", e);
                self.persistence = PersistenceStatus::Unsaved {
                    reason: e.to_string(),
                };
            }
        }
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("origin", &self.origin)
            .field("persistence", &self.persistence)
            .field("storage", &self.storage.describe())
            .finish_non_exhaustive()
    }
}
