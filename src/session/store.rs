//! File-backed session store

use super::{Identity, Session};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from reading or writing the session file
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt session file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),
}

/// Persists the logged-in identity as TOML
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved session; anonymous when no file exists
    pub fn load(&self) -> Result<Session, SessionError> {
        if !self.path.exists() {
            return Ok(Session::anonymous());
        }

        let content = std::fs::read_to_string(&self.path)?;
        let identity: Identity = toml::from_str(&content)?;
        Ok(Session::new(identity))
    }

    /// Save an identity, replacing any previous one
    pub fn save(&self, identity: &Identity) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string(identity)?;
        std::fs::write(&self.path, content)?;
        tracing::debug!(path = ?self.path, role = %identity.role, "Session saved");
        Ok(())
    }

    /// Remove the saved session. Returns whether one existed.
    pub fn clear(&self) -> Result<bool, SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Role;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_anonymous() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.toml"));
        assert!(!store.load().unwrap().is_authenticated());
        assert!(!store.clear().unwrap());
    }

    #[test]
    fn test_save_load_clear() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("nested").join("session.toml"));

        let identity = Identity {
            id: 11,
            role: Role::Doctor,
            name: "Ann Lee".into(),
            city: None,
            hospital_name: Some("Smile Clinic".into()),
        };
        store.save(&identity).unwrap();

        let session = store.load().unwrap();
        assert_eq!(session.doctor_id(), Some(11));
        assert_eq!(session.identity(), Some(&identity));

        assert!(store.clear().unwrap());
        assert!(!store.load().unwrap().is_authenticated());
    }

    #[test]
    fn test_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.toml");
        std::fs::write(&path, "id = \"not a number\"").unwrap();

        let store = SessionStore::new(&path);
        assert!(matches!(store.load(), Err(SessionError::Parse(_))));
    }
}
