//! crates/wellness_core/src/gateway.rs
//!
//! The data gateway: the only component that talks to the remote source and
//! the only writer of the session cache. It merges the favorite store into
//! every record it materializes.

use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::SessionCache;
use crate::domain::{Session, SessionId};
use crate::favorites::FavoriteStore;
use crate::ports::{PortResult, RemoteSession, SessionSource};

pub struct SessionGateway {
    source: Arc<dyn SessionSource>,
    favorites: FavoriteStore,
    cache: SessionCache,
}

impl SessionGateway {
    /// Creates a new `SessionGateway` with an empty cache.
    pub fn new(source: Arc<dyn SessionSource>, favorites: FavoriteStore) -> Self {
        Self {
            source,
            favorites,
            cache: SessionCache::new(),
        }
    }

    /// A handle to the remote source, for running a fetch away from the
    /// gateway's owner and handing the result back to [`Self::materialize_list`].
    pub fn source(&self) -> Arc<dyn SessionSource> {
        self.source.clone()
    }

    pub fn favorites(&self) -> &FavoriteStore {
        &self.favorites
    }

    /// Read-only access to the cache.
    pub fn cache(&self) -> &SessionCache {
        &self.cache
    }

    /// Fetches every session, merges favorites and replaces the cache.
    pub async fn list_sessions(&mut self) -> PortResult<Vec<Session>> {
        let fetched = self.source.list_sessions().await;
        self.materialize_list(fetched).await
    }

    /// Fetches the sessions the server files under `category`, merges
    /// favorites and replaces the cache with this smaller set.
    pub async fn list_sessions_by_category(&mut self, category: &str) -> PortResult<Vec<Session>> {
        let fetched = self.source.list_sessions_by_category(category).await;
        self.materialize_list(fetched).await
    }

    /// Second half of a list fetch: on success every record gets its favorite
    /// flag and the cache is replaced in server order. On failure the cache
    /// keeps its previous contents.
    pub async fn materialize_list(
        &mut self,
        fetched: PortResult<Vec<RemoteSession>>,
    ) -> PortResult<Vec<Session>> {
        let records = match fetched {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, cached = self.cache.len(), "Session fetch failed, keeping cache");
                return Err(e);
            }
        };

        let favorite_ids = self.favorites.list_all().await?;
        let sessions: Vec<Session> = records
            .into_iter()
            .map(|record| {
                let is_favorite = favorite_ids.contains(&record.id);
                record.into_session(is_favorite)
            })
            .collect();

        self.cache.replace(sessions.clone());
        info!(
            count = sessions.len(),
            refreshed_at = ?self.cache.refreshed_at(),
            "Session cache refreshed"
        );
        Ok(sessions)
    }

    /// Looks a session up in the cache, falling back to the remote source.
    ///
    /// A remote hit is returned without being added to the cache.
    pub async fn get_session_by_id(&self, id: SessionId) -> PortResult<Session> {
        if let Some(cached) = self.cached_session(id) {
            return Ok(cached);
        }
        self.remote_lookup(id).await
    }

    /// The cache half of [`Self::get_session_by_id`].
    pub fn cached_session(&self, id: SessionId) -> Option<Session> {
        let cached = self.cache.find(id).cloned();
        if cached.is_some() {
            debug!(session_id = id, "Session served from cache");
        }
        cached
    }

    /// The remote half of [`Self::get_session_by_id`], detached from the
    /// gateway so it can run while the gateway's owner handles other work.
    /// Never touches the cache.
    pub fn remote_lookup(
        &self,
        id: SessionId,
    ) -> impl Future<Output = PortResult<Session>> + Send + 'static {
        let source = self.source.clone();
        let favorites = self.favorites.clone();
        async move {
            let record = source.get_session(id).await?;
            let is_favorite = favorites.contains(id).await?;
            Ok(record.into_session(is_favorite))
        }
    }

    /// Flips the favorite flag of `id` in the store, then patches the cache.
    /// Returns the new flag. A store failure leaves the cache untouched.
    pub async fn toggle_favorite(&mut self, id: SessionId) -> PortResult<bool> {
        let is_favorite = self.favorites.toggle(id).await?;
        let patched = self.cache.patch_favorite(id, is_favorite);
        debug!(session_id = id, is_favorite, patched, "Patched cache after toggle");
        Ok(is_favorite)
    }

    /// The cached sessions that are favorites, recomputed on every call.
    pub fn favorites_view(&self) -> impl Iterator<Item = &Session> + '_ {
        self.cache.favorites()
    }
}
