//! Durable profile state for the console.
//!
//! Two entries survive restarts: the access token and the last known
//! username the silent refresh flow is keyed by. The store is a flat
//! JSON map read once at startup and written through on every
//! mutation, kept separate from the in-memory session state so it can
//! be tested on its own.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};

/// Profile file name inside the data directory
const PROFILE_FILE: &str = "profile.json";

/// Durable key for the access token
pub const SESSION_TOKEN_KEY: &str = "sessionToken";

/// Durable key for the last username that authenticated on this profile
pub const LAST_USERNAME_KEY: &str = "lastKnownUsername";

/// Key-value store backing the persisted half of the session.
pub struct ProfileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl ProfileStore {
    /// Open the profile under the given directory, creating it if needed.
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create profile directory: {}", dir.display()))?;

        let path = dir.join(PROFILE_FILE);
        let entries = if path.exists() {
            let contents = std::fs::read_to_string(&path).context("Failed to read profile file")?;
            serde_json::from_str(&contents).context("Failed to parse profile file")?
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    /// Set a key and write the profile through to disk.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.lock();
        entries.insert(key.to_string(), value.to_string());
        self.write(&entries)
    }

    /// Remove a key. Removing a key that was never set is fine.
    pub fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.lock();
        if entries.remove(key).is_some() {
            self.write(&entries)?;
        }
        Ok(())
    }

    pub fn token(&self) -> Option<String> {
        self.get(SESSION_TOKEN_KEY)
    }

    pub fn set_token(&self, token: &str) -> Result<()> {
        self.set(SESSION_TOKEN_KEY, token)
    }

    pub fn clear_token(&self) -> Result<()> {
        self.remove(SESSION_TOKEN_KEY)
    }

    pub fn username(&self) -> Option<String> {
        self.get(LAST_USERNAME_KEY)
    }

    pub fn set_username(&self, username: &str) -> Result<()> {
        self.set(LAST_USERNAME_KEY, username)
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let contents = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, contents).context("Failed to write profile file")?;
        Ok(())
    }
}
