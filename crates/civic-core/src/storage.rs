//! Key-value persistence adapter.
//!
//! Every piece of application state is one JSON document under a fixed key.
//! The store itself only moves raw JSON text; [`load_json`] and [`save_json`]
//! add serialization and the degrade-to-default error policy.
//!
//! # Layout
//!
//! ```text
//! .civic/
//!   issues.json         # array of Issue, newest first
//!   current_user.json   # User or null
//!   language.json       # "en" | "hi" | "gu"
//!   upvotes.json        # { "<user id>": ["<issue id>", ...] }
//!   store.lock          # advisory lock for single reads and writes
//!   update.lock         # held across a read-modify-write cycle
//! ```
//!
//! Writes go to `<key>.json.tmp` and are renamed over the target, so a crash
//! mid-write leaves the previous document intact.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io::{self, Write as IoWrite};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ErrorCode;
use crate::lock::{LockError, ReadLock, WriteLock};

/// Persisted keys.
pub mod keys {
    pub const ISSUES: &str = "issues";
    pub const CURRENT_USER: &str = "current_user";
    pub const LANGUAGE: &str = "language";
    pub const UPVOTES: &str = "upvotes";

    pub const ALL: [&str; 4] = [ISSUES, CURRENT_USER, LANGUAGE, UPVOTES];
}

/// Errors raised by a [`KvStore`] backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    #[error("write to {0} rejected")]
    Rejected(String),
}

/// Minimal get/set contract over raw JSON text.
pub trait KvStore {
    /// Read the document stored under `key`, `None` if never written.
    ///
    /// # Errors
    ///
    /// Backend-specific read failures.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the document stored under `key`.
    ///
    /// # Errors
    ///
    /// Backend-specific write failures.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Exclude other processes from a read-modify-write cycle until the
    /// guard drops. `None` when the backend is private to this process.
    ///
    /// # Errors
    ///
    /// The lock could not be acquired in time.
    fn lock_for_update(&self) -> Result<Option<WriteLock>, StorageError> {
        Ok(None)
    }
}

impl<S: KvStore + ?Sized> KvStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn lock_for_update(&self) -> Result<Option<WriteLock>, StorageError> {
        (**self).lock_for_update()
    }
}

fn check_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

/// One `<key>.json` file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileKvStore {
    root: PathBuf,
    lock_timeout: Duration,
}

impl FileKvStore {
    pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(2);

    /// Open (creating if needed) a store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Fails if the directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StorageError::Io {
            path: root.clone(),
            source,
        })?;
        Ok(Self {
            root,
            lock_timeout: Self::DEFAULT_LOCK_TIMEOUT,
        })
    }

    #[must_use]
    pub const fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    fn lock_path(&self) -> PathBuf {
        self.root.join("store.lock")
    }

    fn update_lock_path(&self) -> PathBuf {
        self.root.join("update.lock")
    }
}

impl KvStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        check_key(key)?;
        let path = self.key_path(key);
        let _lock = ReadLock::acquire(&self.lock_path(), self.lock_timeout)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        check_key(key)?;
        let path = self.key_path(key);
        let tmp = self.root.join(format!("{key}.json.tmp"));
        let _lock = WriteLock::acquire(&self.lock_path(), self.lock_timeout)?;

        let io_err = |source| StorageError::Io {
            path: path.clone(),
            source,
        };
        {
            let mut file = fs::File::create(&tmp).map_err(io_err)?;
            file.write_all(value.as_bytes()).map_err(io_err)?;
            file.write_all(b"\n").map_err(io_err)?;
            file.sync_all().map_err(io_err)?;
        }
        fs::rename(&tmp, &path).map_err(io_err)?;
        Ok(())
    }

    fn lock_for_update(&self) -> Result<Option<WriteLock>, StorageError> {
        let guard = WriteLock::acquire(&self.update_lock_path(), self.lock_timeout)?;
        Ok(Some(guard))
    }
}

/// In-process store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: RefCell<BTreeMap<String, String>>,
    fail_writes: RefCell<HashSet<String>>,
}

impl MemoryKvStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set` on `key` fail.
    pub fn fail_writes_to(&self, key: &str) {
        self.fail_writes.borrow_mut().insert(key.to_string());
    }

    pub fn clear_failures(&self) {
        self.fail_writes.borrow_mut().clear();
    }

    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        check_key(key)?;
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        check_key(key)?;
        if self.fail_writes.borrow().contains(key) {
            return Err(StorageError::Rejected(key.to_string()));
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Load a typed document, falling back to `default` on any failure.
///
/// Missing keys, read errors and unparseable JSON are all treated as "no
/// stored data"; the latter two are logged.
pub fn load_json<T: DeserializeOwned>(store: &dyn KvStore, key: &str, default: T) -> T {
    match try_load_json(store, key) {
        Ok(Some(value)) => value,
        Ok(None) => {
            tracing::debug!(key, "no stored value, using default");
            default
        }
        Err(e) => {
            tracing::warn!(
                key,
                code = ErrorCode::StorageReadFailed.code(),
                error = %e,
                "error loading from storage, using default"
            );
            default
        }
    }
}

/// Load a typed document, surfacing failures.
///
/// # Errors
///
/// Returns backend read errors and JSON parse errors.
pub fn try_load_json<T: DeserializeOwned>(
    store: &dyn KvStore,
    key: &str,
) -> anyhow::Result<Option<T>> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    let value = serde_json::from_str(&raw)?;
    Ok(Some(value))
}

/// Persist a typed document. Failures are logged and reported as `false`,
/// never propagated.
pub fn save_json<T: Serialize + ?Sized>(store: &dyn KvStore, key: &str, value: &T) -> bool {
    let raw = match serde_json::to_string_pretty(value) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::error!(key, error = %e, "error serializing value for storage");
            return false;
        }
    };
    match store.set(key, &raw) {
        Ok(()) => {
            tracing::debug!(key, bytes = raw.len(), "persisted");
            true
        }
        Err(e) => {
            tracing::warn!(
                key,
                code = ErrorCode::StorageWriteFailed.code(),
                error = %e,
                "error saving to storage"
            );
            false
        }
    }
}
