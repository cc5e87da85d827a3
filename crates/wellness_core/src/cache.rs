//! crates/wellness_core/src/cache.rs
//!
//! In-memory holder of the last fetched session list.

use chrono::{DateTime, Utc};

use crate::domain::{Session, SessionId};

/// The last successfully fetched session list, in server order.
///
/// Only the gateway can mutate it: the two mutators are crate-private.
/// Everyone else reads through shared borrows or owned copies.
#[derive(Debug, Default)]
pub struct SessionCache {
    sessions: Vec<Session>,
    refreshed_at: Option<DateTime<Utc>>,
}

impl SessionCache {
    /// Creates a new empty `SessionCache`.
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached sessions, in the order the server returned them.
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// An owned copy of the cached sessions.
    pub fn snapshot(&self) -> Vec<Session> {
        self.sessions.clone()
    }

    /// Finds a cached session by id (linear scan).
    pub fn find(&self, id: SessionId) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// When the cache was last replaced, `None` before the first fetch.
    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    /// Cached sessions currently flagged as favorites.
    pub fn favorites(&self) -> impl Iterator<Item = &Session> + '_ {
        self.sessions.iter().filter(|s| s.is_favorite)
    }

    /// Replaces the whole list after a successful fetch.
    pub(crate) fn replace(&mut self, sessions: Vec<Session>) {
        self.sessions = sessions;
        self.refreshed_at = Some(Utc::now());
    }

    /// Sets the favorite flag on every record with `id`. Returns how many
    /// records were patched.
    pub(crate) fn patch_favorite(&mut self, id: SessionId, is_favorite: bool) -> usize {
        let mut patched = 0;
        for session in self.sessions.iter_mut().filter(|s| s.id == id) {
            session.is_favorite = is_favorite;
            patched += 1;
        }
        patched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::remote_session;

    fn sessions() -> Vec<Session> {
        vec![
            remote_session(1, "Morning Yoga", "Yoga").into_session(false),
            remote_session(2, "Deep Breath", "Meditation").into_session(true),
            remote_session(3, "Lap Swim", "Swimming").into_session(false),
        ]
    }

    #[test]
    fn starts_empty_without_timestamp() {
        let cache = SessionCache::new();
        assert!(cache.is_empty());
        assert!(cache.refreshed_at().is_none());
    }

    #[test]
    fn replace_is_wholesale_and_stamps_time() {
        let mut cache = SessionCache::new();
        cache.replace(sessions());
        assert_eq!(cache.len(), 3);
        assert!(cache.refreshed_at().is_some());

        cache.replace(vec![remote_session(9, "Salsa", "Dance").into_session(false)]);
        assert_eq!(cache.len(), 1);
        assert!(cache.find(1).is_none());
        assert!(cache.find(9).is_some());
    }

    #[test]
    fn patch_touches_only_matching_id() {
        let mut cache = SessionCache::new();
        cache.replace(sessions());
        let before = cache.snapshot();

        assert_eq!(cache.patch_favorite(3, true), 1);

        for (old, new) in before.iter().zip(cache.sessions()) {
            if old.id == 3 {
                assert_eq!(new, &old.with_favorite(true));
            } else {
                assert_eq!(new, old);
            }
        }
    }

    #[test]
    fn patch_of_unknown_id_changes_nothing() {
        let mut cache = SessionCache::new();
        cache.replace(sessions());
        let before = cache.snapshot();
        assert_eq!(cache.patch_favorite(99, true), 0);
        assert_eq!(cache.sessions(), before.as_slice());
    }

    #[test]
    fn favorites_follow_flags() {
        let mut cache = SessionCache::new();
        cache.replace(sessions());
        let ids: Vec<_> = cache.favorites().map(|s| s.id).collect();
        assert_eq!(ids, vec![2]);
    }
}
