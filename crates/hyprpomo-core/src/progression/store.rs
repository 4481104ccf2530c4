//! Progression persistence.
//!
//! The whole [`ProgressionState`] is read and rewritten as one JSON document.
//! There is no locking and no partial-write protocol: last writer wins.

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

use tracing::warn;

use super::ProgressionState;
use crate::error::{ConfigError, StoreError};
use crate::storage::data_dir;

/// Whole-state storage for progression data.
pub trait ProgressionStore {
    /// Read the latest persisted state. A store with nothing persisted yet
    /// returns the empty default.
    fn load(&self) -> Result<ProgressionState, StoreError>;

    /// Overwrite the persisted state.
    fn save(&self, state: &ProgressionState) -> Result<(), StoreError>;
}

impl<S: ProgressionStore + ?Sized> ProgressionStore for &S {
    fn load(&self) -> Result<ProgressionState, StoreError> {
        (**self).load()
    }

    fn save(&self, state: &ProgressionState) -> Result<(), StoreError> {
        (**self).save(state)
    }
}

/// `data.json` on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Open the store in the data directory, creating an empty file if needed.
    ///
    /// Failing to create the file is only logged; later writes retry it.
    pub fn open() -> Result<Self, ConfigError> {
        let store = Self::with_path(data_dir()?.join("data.json"));
        if let Err(e) = store.ensure_file() {
            warn!("{e}");
        }
        Ok(store)
    }

    /// Create a store with a custom path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the data file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_file(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            return Ok(());
        }
        self.save(&ProgressionState::default())
    }
}

impl ProgressionStore for JsonFileStore {
    fn load(&self) -> Result<ProgressionState, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(ProgressionState::default())
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_str(&content).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, state: &ProgressionState) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(state).map_err(StoreError::Serialize)?;
        std::fs::write(&self.path, content).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

/// In-memory store, used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RefCell<ProgressionState>,
    saves: Cell<usize>,
    fail_writes: Cell<bool>,
}

impl MemoryStore {
    pub fn new(state: ProgressionState) -> Self {
        Self {
            state: RefCell::new(state),
            ..Self::default()
        }
    }

    /// Current persisted state.
    pub fn snapshot(&self) -> ProgressionState {
        self.state.borrow().clone()
    }

    /// Number of successful saves so far.
    pub fn saves(&self) -> usize {
        self.saves.get()
    }

    /// Make every following save fail with a write error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }
}

impl ProgressionStore for MemoryStore {
    fn load(&self) -> Result<ProgressionState, StoreError> {
        Ok(self.snapshot())
    }

    fn save(&self, state: &ProgressionState) -> Result<(), StoreError> {
        if self.fail_writes.get() {
            return Err(StoreError::Write {
                path: PathBuf::from("<memory>"),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "writes disabled"),
            });
        }
        *self.state.borrow_mut() = state.clone();
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
