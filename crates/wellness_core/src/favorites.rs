//! crates/wellness_core/src/favorites.rs
//!
//! The favorite store: a durable set of session ids kept in the preference
//! substrate under a single fixed key.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::SessionId;
use crate::ports::{PortResult, PreferenceStore};

/// The preference key holding the favorite id set.
pub const FAVORITE_IDS_KEY: &str = "favorite_session_ids";

/// Durable mapping from session id to favorite flag.
#[derive(Clone)]
pub struct FavoriteStore {
    prefs: Arc<dyn PreferenceStore>,
}

impl FavoriteStore {
    /// Creates a new `FavoriteStore` over the given preference substrate.
    pub fn new(prefs: Arc<dyn PreferenceStore>) -> Self {
        Self { prefs }
    }

    /// Returns every favorited id.
    ///
    /// Stored members that are not valid ids are skipped.
    pub async fn list_all(&self) -> PortResult<HashSet<SessionId>> {
        let raw = self.prefs.get_string_set(FAVORITE_IDS_KEY).await?;
        let ids = raw
            .iter()
            .filter_map(|value| match value.parse::<SessionId>() {
                Ok(id) => Some(id),
                Err(_) => {
                    warn!(value = %value, "Skipping malformed favorite id");
                    None
                }
            })
            .collect();
        Ok(ids)
    }

    pub async fn contains(&self, id: SessionId) -> PortResult<bool> {
        Ok(self.list_all().await?.contains(&id))
    }

    /// Marks `id` as a favorite. No-op if it already is one.
    pub async fn add(&self, id: SessionId) -> PortResult<()> {
        let mut ids = self.list_all().await?;
        if ids.insert(id) {
            self.save(&ids).await?;
        }
        Ok(())
    }

    /// Unmarks `id`. No-op if it is not a favorite.
    pub async fn remove(&self, id: SessionId) -> PortResult<()> {
        let mut ids = self.list_all().await?;
        if ids.remove(&id) {
            self.save(&ids).await?;
        }
        Ok(())
    }

    /// Flips the membership of `id` and returns the new state
    /// (`true` = now a favorite).
    ///
    /// The flip is computed from one read of the set and written back in one
    /// put, so repeated calls from a single caller never lose a toggle.
    pub async fn toggle(&self, id: SessionId) -> PortResult<bool> {
        let mut ids = self.list_all().await?;
        let now_favorite = if ids.remove(&id) {
            false
        } else {
            ids.insert(id);
            true
        };
        self.save(&ids).await?;
        debug!(session_id = id, is_favorite = now_favorite, "Toggled favorite");
        Ok(now_favorite)
    }

    /// Removes every favorite.
    pub async fn clear(&self) -> PortResult<()> {
        self.prefs.remove(FAVORITE_IDS_KEY).await
    }

    async fn save(&self, ids: &HashSet<SessionId>) -> PortResult<()> {
        let values: BTreeSet<String> = ids.iter().map(|id| id.to_string()).collect();
        self.prefs.put_string_set(FAVORITE_IDS_KEY, &values).await
    }
}
