use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("failed to serialize {path:?}: {message}")]
    Serialize { path: PathBuf, message: String },
    #[error("cannot use state directory {dir:?}: {source}")]
    StateDir { dir: PathBuf, source: io::Error },
    #[error("failed to write {path:?}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// One RON document of type `T` inside a state directory.
///
/// Saving replaces the whole file in a single rename, so readers see
/// either the previous document or the new one, never a partial write.
pub struct RonDocument<T> {
    dir: PathBuf,
    path: PathBuf,
    _doc: PhantomData<fn() -> T>,
}

impl<T> Clone for RonDocument<T> {
    fn clone(&self) -> Self {
        Self {
            dir: self.dir.clone(),
            path: self.path.clone(),
            _doc: PhantomData,
        }
    }
}

impl<T> fmt::Debug for RonDocument<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RonDocument").field("path", &self.path).finish()
    }
}

impl<T> RonDocument<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(state_dir: impl Into<PathBuf>, filename: &str) -> Self {
        let dir = state_dir.into();
        let path = dir.join(filename);
        Self {
            dir,
            path,
            _doc: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when the file does not exist yet.
    pub fn read(&self) -> Result<Option<T>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        ron::from_str(&content)
            .map(Some)
            .map_err(|err| StoreError::Parse {
                path: self.path.clone(),
                message: err.to_string(),
            })
    }

    /// Creates the state directory on first use.
    pub fn write(&self, value: &T) -> Result<(), StoreError> {
        let content = ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::new())
            .map_err(|err| StoreError::Serialize {
                path: self.path.clone(),
                message: err.to_string(),
            })?;

        fs::create_dir_all(&self.dir).map_err(|source| StoreError::StateDir {
            dir: self.dir.clone(),
            source,
        })?;
        self.replace_with(&content).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }

    fn replace_with(&self, content: &str) -> io::Result<()> {
        let mut staged = NamedTempFile::new_in(&self.dir)?;
        staged.write_all(content.as_bytes())?;
        staged.as_file().sync_all()?;
        staged.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }
}
