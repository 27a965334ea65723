//! Enrolled profiles: username → ordered sessions, persisted as JSON

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use behavioral_dna_core::Session;
use parking_lot::RwLock;

use super::StoreError;

pub type Profiles = BTreeMap<String, Vec<Session>>;

pub struct ProfileStore {
    path: PathBuf,
    profiles: RwLock<Profiles>,
}

/// State right after an enrollment, taken under the write lock
#[derive(Debug, Clone)]
pub struct EnrollSnapshot {
    pub session_count: usize,
    /// Every session of every user
    pub pool: Vec<Session>,
}

impl ProfileStore {
    /// Load profiles from `path`; a missing file is an empty store
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let profiles = if path.exists() {
            serde_json::from_slice(&fs::read(&path)?)?
        } else {
            Profiles::new()
        };

        Ok(Self {
            path,
            profiles: RwLock::new(profiles),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a session and persist. On a failed write the session is dropped again.
    pub fn enroll(&self, username: &str, session: Session) -> Result<EnrollSnapshot, StoreError> {
        let mut profiles = self.profiles.write();
        profiles.entry(username.to_string()).or_default().push(session);

        if let Err(e) = self.persist(&profiles) {
            if let Some(sessions) = profiles.get_mut(username) {
                sessions.pop();
                if sessions.is_empty() {
                    profiles.remove(username);
                }
            }
            return Err(e);
        }

        Ok(EnrollSnapshot {
            session_count: profiles.get(username).map_or(0, Vec::len),
            pool: profiles.values().flatten().cloned().collect(),
        })
    }

    pub fn sessions(&self, username: &str) -> Vec<Session> {
        self.profiles.read().get(username).cloned().unwrap_or_default()
    }

    pub fn counts(&self) -> BTreeMap<String, usize> {
        self.profiles
            .read()
            .iter()
            .map(|(user, sessions)| (user.clone(), sessions.len()))
            .collect()
    }

    fn persist(&self, profiles: &Profiles) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(profiles)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
