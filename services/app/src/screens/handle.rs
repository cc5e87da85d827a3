//! services/app/src/screens/handle.rs
//!
//! The cloneable front door to the screen loop.

use tokio::sync::{mpsc, oneshot, watch};
use wellness_core::domain::SessionId;
use wellness_core::filter::SessionFilter;
use wellness_core::view_state::{DetailSnapshot, FavoritesSnapshot, ListSnapshot};

use super::event_loop::ScreenEvent;
use crate::error::AppError;

/// Sends events to the screen loop and observes the published screen states.
#[derive(Clone)]
pub struct ScreenHandle {
    events: mpsc::Sender<ScreenEvent>,
    list: watch::Receiver<ListSnapshot>,
    favorites: watch::Receiver<FavoritesSnapshot>,
    detail: watch::Receiver<DetailSnapshot>,
}

impl ScreenHandle {
    pub(super) fn new(
        events: mpsc::Sender<ScreenEvent>,
        list: watch::Receiver<ListSnapshot>,
        favorites: watch::Receiver<FavoritesSnapshot>,
        detail: watch::Receiver<DetailSnapshot>,
    ) -> Self {
        Self {
            events,
            list,
            favorites,
            detail,
        }
    }

    // ----------------------------------------------------------------------------
    // Session list
    // ----------------------------------------------------------------------------

    /// Enters (or retries) the list screen. Returns as soon as the screen is
    /// `Loading`; the fetch outcome is published later.
    pub async fn load_sessions(&self) -> Result<ListSnapshot, AppError> {
        self.request(|reply| ScreenEvent::LoadSessions { reply }).await
    }

    /// Like [`Self::load_sessions`], but waits until the list has left
    /// `Loading`.
    pub async fn load_sessions_settled(&self) -> Result<ListSnapshot, AppError> {
        self.load_sessions().await?;
        let mut rx = self.list.clone();
        let snapshot = rx
            .wait_for(|s| !s.state.is_loading())
            .await
            .map_err(|_| AppError::LoopClosed)?;
        Ok(snapshot.clone())
    }

    pub async fn set_list_filter(&self, filter: SessionFilter) -> Result<ListSnapshot, AppError> {
        self.request(|reply| ScreenEvent::SetListFilter { filter, reply })
            .await
    }

    pub async fn toggle_list_search(&self) -> Result<ListSnapshot, AppError> {
        self.request(|reply| ScreenEvent::ToggleListSearch { reply })
            .await
    }

    pub fn list_snapshot(&self) -> ListSnapshot {
        self.list.borrow().clone()
    }

    pub fn subscribe_list(&self) -> watch::Receiver<ListSnapshot> {
        self.list.clone()
    }

    // ----------------------------------------------------------------------------
    // Favorites
    // ----------------------------------------------------------------------------

    pub async fn set_favorites_filter(
        &self,
        filter: SessionFilter,
    ) -> Result<FavoritesSnapshot, AppError> {
        self.request(|reply| ScreenEvent::SetFavoritesFilter { filter, reply })
            .await
    }

    pub async fn toggle_favorites_search(&self) -> Result<FavoritesSnapshot, AppError> {
        self.request(|reply| ScreenEvent::ToggleFavoritesSearch { reply })
            .await
    }

    pub fn favorites_snapshot(&self) -> FavoritesSnapshot {
        self.favorites.borrow().clone()
    }

    pub fn subscribe_favorites(&self) -> watch::Receiver<FavoritesSnapshot> {
        self.favorites.clone()
    }

    // ----------------------------------------------------------------------------
    // Detail
    // ----------------------------------------------------------------------------

    /// Opens the detail screen for `id`. A cached session is shown at once;
    /// otherwise the screen is `Loading` until the remote lookup completes.
    pub async fn open_detail(&self, id: SessionId) -> Result<DetailSnapshot, AppError> {
        self.request(|reply| ScreenEvent::OpenDetail { id, reply })
            .await
    }

    /// Like [`Self::open_detail`], but waits for the lookup to finish (or for
    /// another id to be opened).
    pub async fn open_detail_settled(&self, id: SessionId) -> Result<DetailSnapshot, AppError> {
        self.open_detail(id).await?;
        let mut rx = self.detail.clone();
        let snapshot = rx
            .wait_for(|s| s.session_id != Some(id) || !s.state.is_loading())
            .await
            .map_err(|_| AppError::LoopClosed)?;
        Ok(snapshot.clone())
    }

    pub fn detail_snapshot(&self) -> DetailSnapshot {
        self.detail.borrow().clone()
    }

    pub fn subscribe_detail(&self) -> watch::Receiver<DetailSnapshot> {
        self.detail.clone()
    }

    // ----------------------------------------------------------------------------
    // Favorites toggling (any screen)
    // ----------------------------------------------------------------------------

    /// Flips the favorite flag of `id` and returns the new flag once every
    /// screen has been patched.
    pub async fn toggle_favorite(&self, id: SessionId) -> Result<bool, AppError> {
        let result = self
            .request(|reply| ScreenEvent::ToggleFavorite { id, reply })
            .await?;
        Ok(result?)
    }

    // ----------------------------------------------------------------------------
    // Helpers
    // ----------------------------------------------------------------------------

    /// Sends an event carrying a reply channel and waits for the reply.
    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> ScreenEvent,
    ) -> Result<T, AppError> {
        let (reply, rx) = oneshot::channel();
        self.events
            .send(make(reply))
            .await
            .map_err(|_| AppError::LoopClosed)?;
        rx.await.map_err(|_| AppError::LoopClosed)
    }
}
