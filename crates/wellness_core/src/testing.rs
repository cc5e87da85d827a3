//! crates/wellness_core/src/testing.rs
//!
//! In-memory port implementations for tests, in this crate and in the
//! service crate.

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::domain::SessionId;
use crate::ports::{PortError, PortResult, PreferenceStore, RemoteSession, SessionSource};

/// Builds a remote record with plausible filler for the fields tests rarely
/// care about.
pub fn remote_session(id: SessionId, title: &str, category: &str) -> RemoteSession {
    RemoteSession {
        id,
        title: title.to_string(),
        category: category.to_string(),
        duration_minutes: 30,
        rating: 4.5,
        image_url: format!("https://example.com/sessions/{id}.jpg"),
        description: format!("{title} description"),
        instructor: "Jane Doe".to_string(),
    }
}

//=========================================================================================
// Preferences
//=========================================================================================

/// A `PreferenceStore` held in a `HashMap`. Writes can be made to fail.
#[derive(Default)]
pub struct InMemoryPreferences {
    sets: Mutex<HashMap<String, BTreeSet<String>>>,
    fail_writes: AtomicBool,
}

impl InMemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// While enabled, every put and remove returns `PortError::Storage`.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> PortResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PortError::Storage("write rejected".to_string()));
        }
        Ok(())
    }

    fn lock(&self) -> PortResult<std::sync::MutexGuard<'_, HashMap<String, BTreeSet<String>>>> {
        self.sets
            .lock()
            .map_err(|e| PortError::Storage(e.to_string()))
    }
}

#[async_trait]
impl PreferenceStore for InMemoryPreferences {
    async fn get_string_set(&self, key: &str) -> PortResult<BTreeSet<String>> {
        Ok(self.lock()?.get(key).cloned().unwrap_or_default())
    }

    async fn put_string_set(&self, key: &str, values: &BTreeSet<String>) -> PortResult<()> {
        self.check_writable()?;
        self.lock()?.insert(key.to_string(), values.clone());
        Ok(())
    }

    async fn remove(&self, key: &str) -> PortResult<()> {
        self.check_writable()?;
        self.lock()?.remove(key);
        Ok(())
    }
}

//=========================================================================================
// Remote source
//=========================================================================================

/// A `SessionSource` serving a fixed catalogue and counting every call.
#[derive(Default)]
pub struct StubSessionSource {
    sessions: Mutex<Vec<RemoteSession>>,
    failure: Mutex<Option<String>>,
    list_calls: AtomicUsize,
    category_calls: AtomicUsize,
    get_calls: AtomicUsize,
}

impl StubSessionSource {
    pub fn new(sessions: Vec<RemoteSession>) -> Self {
        Self {
            sessions: Mutex::new(sessions),
            ..Self::default()
        }
    }

    /// Replaces the catalogue served from now on.
    pub fn set_sessions(&self, sessions: Vec<RemoteSession>) {
        if let Ok(mut guard) = self.sessions.lock() {
            *guard = sessions;
        }
    }

    /// While set, every call fails with `PortError::Network(message)`.
    pub fn fail_with(&self, message: Option<&str>) {
        if let Ok(mut guard) = self.failure.lock() {
            *guard = message.map(str::to_string);
        }
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn category_calls(&self) -> usize {
        self.category_calls.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.list_calls() + self.category_calls() + self.get_calls()
    }

    fn check_failure(&self) -> PortResult<()> {
        let failure = self
            .failure
            .lock()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        match failure.as_ref() {
            Some(message) => Err(PortError::Network(message.clone())),
            None => Ok(()),
        }
    }

    fn snapshot(&self) -> PortResult<Vec<RemoteSession>> {
        self.sessions
            .lock()
            .map(|s| s.clone())
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }
}

#[async_trait]
impl SessionSource for StubSessionSource {
    async fn list_sessions(&self) -> PortResult<Vec<RemoteSession>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        self.snapshot()
    }

    async fn list_sessions_by_category(&self, category: &str) -> PortResult<Vec<RemoteSession>> {
        self.category_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        Ok(self
            .snapshot()?
            .into_iter()
            .filter(|s| s.category.eq_ignore_ascii_case(category))
            .collect())
    }

    async fn get_session(&self, id: SessionId) -> PortResult<RemoteSession> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        self.snapshot()?
            .into_iter()
            .find(|s| s.id == id)
            .ok_or_else(|| PortError::NotFound(format!("Session {} not found", id)))
    }
}
