//! Per-device anonymous identity.
//!
//! The device's favourites are keyed by an identifier generated on first use
//! and kept in a small text file. The server never creates or stores users;
//! it only sees this value on each favourite call.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;
use vitrine_core::{AnonymousUserId, AnonymousUserIdError};

/// Default location relative to the home directory.
const DEFAULT_DIR: &str = ".vitrine";
const DEFAULT_FILE: &str = "device-id";

/// Errors reading or writing the identity file.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("identity file {path} holds an invalid id ({source}); run `vitrine identity reset`")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: AnonymousUserIdError,
    },
}

/// File-backed anonymous identity of this device.
#[derive(Debug, Clone)]
pub struct DeviceIdentity {
    path: PathBuf,
}

impl DeviceIdentity {
    /// Identity stored at `path`.
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$HOME/.vitrine/device-id`, or `./.vitrine/device-id` without a home.
    #[must_use]
    pub fn default_path() -> PathBuf {
        std::env::var_os("HOME")
            .map_or_else(PathBuf::new, PathBuf::from)
            .join(DEFAULT_DIR)
            .join(DEFAULT_FILE)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored id, or generate and persist one if none exists yet.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or written, or holds an
    /// invalid id.
    pub fn load_or_create(&self, now: DateTime<Utc>) -> Result<AnonymousUserId, IdentityError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                AnonymousUserId::parse(&contents).map_err(|source| IdentityError::Corrupt {
                    path: self.path.clone(),
                    source,
                })
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let id = AnonymousUserId::generate(now);
                self.store(&id)?;
                tracing::debug!(path = %self.path.display(), "Created device identity");
                Ok(id)
            }
            Err(source) => Err(self.io_error(source)),
        }
    }

    /// Replace the stored id with a fresh one.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written.
    pub fn reset(&self, now: DateTime<Utc>) -> Result<AnonymousUserId, IdentityError> {
        let id = AnonymousUserId::generate(now);
        self.store(&id)?;
        Ok(id)
    }

    fn store(&self, id: &AnonymousUserId) -> Result<(), IdentityError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        std::fs::write(&self.path, format!("{id}\n")).map_err(|e| self.io_error(e))
    }

    fn io_error(&self, source: io::Error) -> IdentityError {
        IdentityError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_first_load_creates_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let identity = DeviceIdentity::at(dir.path().join("nested").join("device-id"));

        let first = identity.load_or_create(Utc::now()).unwrap();
        assert!(first.as_str().starts_with("user_"));
        assert!(identity.path().exists());

        let second = identity.load_or_create(Utc::now()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_reset_replaces_id() {
        let dir = tempfile::tempdir().unwrap();
        let identity = DeviceIdentity::at(dir.path().join("device-id"));

        let before = identity.load_or_create(Utc::now()).unwrap();
        let after = identity.reset(Utc::now()).unwrap();

        assert_ne!(before, after);
        assert_eq!(identity.load_or_create(Utc::now()).unwrap(), after);
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("device-id");
        std::fs::write(&path, "   \n").unwrap();

        let err = DeviceIdentity::at(&path)
            .load_or_create(Utc::now())
            .unwrap_err();
        assert!(matches!(err, IdentityError::Corrupt { .. }));
    }
}
