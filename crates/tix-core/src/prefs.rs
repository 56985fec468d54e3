//! Preference store: remembers the grouping dimension across sessions.
//!
//! The store is best-effort. [`PreferenceStore::load`] never fails (it falls
//! back to the default dimension) and [`PreferenceStore::save`] never
//! returns an error to its caller; both log what went wrong instead.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use fs2::FileExt;
use tracing::{debug, warn};

use crate::error::ErrorCode;
use crate::model::GroupingDimension;

/// Key under which the grouping dimension is stored.
pub const GROUPING_KEY: &str = "grouping";

/// Errors from a preference backing.
#[derive(Debug, thiserror::Error)]
pub enum PrefsError {
    #[error("failed to read preferences at {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to parse preferences at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failed to write preferences at {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to encode preferences: {0}")]
    Encode(#[from] toml::ser::Error),

    #[error("preference backing unavailable: {0}")]
    Unavailable(String),
}

impl PrefsError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Read { .. } | Self::Parse { .. } | Self::Unavailable(_) => {
                ErrorCode::PreferenceReadFailed
            }
            Self::Write { .. } | Self::Encode(_) => ErrorCode::PreferenceWriteFailed,
        }
    }
}

/// Minimal string key-value persistence surface.
pub trait KeyValueStore {
    /// Value stored under `key`, or `None` if nothing was stored.
    ///
    /// # Errors
    ///
    /// Returns [`PrefsError`] when the backing cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, PrefsError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`PrefsError`] when the backing cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), PrefsError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, PrefsError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PrefsError> {
        (**self).set(key, value)
    }
}

/// Process-local backing; nothing outlives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PrefsError> {
        let values = self
            .values
            .lock()
            .map_err(|_| PrefsError::Unavailable("memory store lock poisoned".to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PrefsError> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| PrefsError::Unavailable("memory store lock poisoned".to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// TOML-file backing, one flat table of string values.
///
/// Writes go to a sibling temp file that is renamed over the target while an
/// advisory lock on `<file>.lock` is held.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_table(&self) -> Result<toml::Table, PrefsError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(toml::Table::new()),
            Err(source) => {
                return Err(PrefsError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        toml::from_str::<toml::Table>(&content).map_err(|source| PrefsError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn write_err(&self, source: io::Error) -> PrefsError {
        PrefsError::Write {
            path: self.path.clone(),
            source,
        }
    }

    fn lock(&self) -> Result<File, PrefsError> {
        let mut lock_path = self.path.clone().into_os_string();
        lock_path.push(".lock");
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(PathBuf::from(lock_path))
            .map_err(|err| self.write_err(err))?;
        file.lock_exclusive().map_err(|err| self.write_err(err))?;
        Ok(file)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PrefsError> {
        let table = self.read_table()?;
        Ok(table
            .get(key)
            .and_then(toml::Value::as_str)
            .map(ToString::to_string))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PrefsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| self.write_err(err))?;
        }

        let lock = self.lock()?;

        // A corrupt file is replaced rather than blocking every future save.
        let mut table = self.read_table().unwrap_or_default();
        table.insert(key.to_string(), toml::Value::String(value.to_string()));
        let encoded = toml::to_string(&table)?;

        let mut tmp_path = self.path.clone().into_os_string();
        tmp_path.push(".tmp");
        let tmp_path = PathBuf::from(tmp_path);
        let mut tmp = File::create(&tmp_path).map_err(|err| self.write_err(err))?;
        tmp.write_all(encoded.as_bytes())
            .and_then(|()| tmp.sync_all())
            .map_err(|err| self.write_err(err))?;
        fs::rename(&tmp_path, &self.path).map_err(|err| self.write_err(err))?;

        FileExt::unlock(&lock).map_err(|err| self.write_err(err))?;
        Ok(())
    }
}

/// Typed facade over a [`KeyValueStore`] for the grouping preference.
#[derive(Debug)]
pub struct PreferenceStore<S> {
    backing: S,
}

impl<S: KeyValueStore> PreferenceStore<S> {
    pub const fn new(backing: S) -> Self {
        Self { backing }
    }

    pub const fn backing(&self) -> &S {
        &self.backing
    }

    /// Stored grouping dimension, or the default when none is stored, the
    /// stored value is unrecognized, or the backing cannot be read.
    pub fn load(&self) -> GroupingDimension {
        match self.backing.get(GROUPING_KEY) {
            Ok(Some(raw)) => raw.parse::<GroupingDimension>().unwrap_or_else(|err| {
                warn!(%err, "ignoring unrecognized stored grouping");
                GroupingDimension::default()
            }),
            Ok(None) => {
                debug!("no stored grouping, using default");
                GroupingDimension::default()
            }
            Err(err) => {
                warn!(code = err.code().code(), %err, "preference read failed, using default");
                GroupingDimension::default()
            }
        }
    }

    /// Persist `dimension`, reporting failures to the caller.
    ///
    /// # Errors
    ///
    /// Returns the backing store's [`PrefsError`].
    pub fn try_save(&self, dimension: GroupingDimension) -> Result<(), PrefsError> {
        self.backing.set(GROUPING_KEY, dimension.as_str())?;
        debug!(grouping = dimension.as_str(), "saved grouping preference");
        Ok(())
    }

    /// Persist `dimension`. Failures are logged and swallowed.
    pub fn save(&self, dimension: GroupingDimension) {
        if let Err(err) = self.try_save(dimension) {
            warn!(code = err.code().code(), %err, "preference write failed, continuing");
        }
    }
}
