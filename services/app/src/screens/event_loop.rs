//! services/app/src/screens/event_loop.rs
//!
//! The single control thread of the app. One task owns the gateway (and with
//! it the session cache) plus the three screen projectors, and handles UI
//! events, fetch completions and toggles strictly one at a time.
//!
//! Remote fetches run in spawned tasks that only hold the remote port; their
//! outcomes come back through the same queue, so the cache is only ever
//! mutated here.

use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use wellness_core::domain::{Session, SessionId};
use wellness_core::filter::SessionFilter;
use wellness_core::ports::{PortResult, RemoteSession};
use wellness_core::view_state::{
    DetailSnapshot, FavoritesScreen, FavoritesSnapshot, ListSnapshot, SessionDetailScreen,
    SessionListScreen,
};
use wellness_core::SessionGateway;

use super::handle::ScreenHandle;

/// Capacity of the event queue. A full queue makes senders wait.
const CHANNEL_CAPACITY: usize = 64;

//=========================================================================================
// Screen Events
//=========================================================================================

/// Everything the loop reacts to.
pub enum ScreenEvent {
    // --- Session list ---
    /// Screen entry or manual retry.
    LoadSessions {
        reply: oneshot::Sender<ListSnapshot>,
    },
    SetListFilter {
        filter: SessionFilter,
        reply: oneshot::Sender<ListSnapshot>,
    },
    ToggleListSearch {
        reply: oneshot::Sender<ListSnapshot>,
    },

    // --- Favorites ---
    SetFavoritesFilter {
        filter: SessionFilter,
        reply: oneshot::Sender<FavoritesSnapshot>,
    },
    ToggleFavoritesSearch {
        reply: oneshot::Sender<FavoritesSnapshot>,
    },

    // --- Detail ---
    OpenDetail {
        id: SessionId,
        reply: oneshot::Sender<DetailSnapshot>,
    },

    // --- Any screen ---
    ToggleFavorite {
        id: SessionId,
        reply: oneshot::Sender<PortResult<bool>>,
    },

    // --- Completions posted by spawned fetches ---
    SessionsFetched {
        result: PortResult<Vec<RemoteSession>>,
    },
    DetailFetched {
        id: SessionId,
        result: PortResult<Session>,
    },
}

//=========================================================================================
// The Loop
//=========================================================================================

pub struct ScreenLoop {
    gateway: SessionGateway,
    list: SessionListScreen,
    favorites: FavoritesScreen,
    detail: SessionDetailScreen,

    events_rx: mpsc::Receiver<ScreenEvent>,
    /// Weak so the loop ends once every handle is dropped.
    completions_tx: mpsc::WeakSender<ScreenEvent>,

    list_tx: watch::Sender<ListSnapshot>,
    favorites_tx: watch::Sender<FavoritesSnapshot>,
    detail_tx: watch::Sender<DetailSnapshot>,

    shutdown: CancellationToken,
}

impl ScreenLoop {
    /// Spawns the loop over `gateway` and returns a handle for sending events
    /// and observing screen states, plus the task's `JoinHandle`.
    pub fn spawn(
        gateway: SessionGateway,
        shutdown: CancellationToken,
    ) -> (ScreenHandle, tokio::task::JoinHandle<()>) {
        let (events_tx, events_rx) = mpsc::channel(CHANNEL_CAPACITY);

        let list = SessionListScreen::new();
        let favorites = FavoritesScreen::new();
        let detail = SessionDetailScreen::new();

        let (list_tx, list_rx) = watch::channel(list.snapshot());
        let (favorites_tx, favorites_rx) = watch::channel(favorites.snapshot());
        let (detail_tx, detail_rx) = watch::channel(detail.snapshot());

        let screen_loop = Self {
            gateway,
            list,
            favorites,
            detail,
            events_rx,
            completions_tx: events_tx.downgrade(),
            list_tx,
            favorites_tx,
            detail_tx,
            shutdown,
        };

        let handle = ScreenHandle::new(events_tx, list_rx, favorites_rx, detail_rx);
        let task = tokio::spawn(screen_loop.run());
        (handle, task)
    }

    async fn run(mut self) {
        debug!("Screen loop started");
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("Screen loop received shutdown signal");
                    break;
                }
                event = self.events_rx.recv() => {
                    match event {
                        Some(event) => self.handle_event(event).await,
                        None => {
                            debug!("All screen handles dropped, shutting down");
                            break;
                        }
                    }
                }
            }
        }
        debug!("Screen loop stopped");
    }

    async fn handle_event(&mut self, event: ScreenEvent) {
        match event {
            ScreenEvent::LoadSessions { reply } => {
                self.list.begin_load();
                self.publish_list();
                self.spawn_list_fetch();
                let _ = reply.send(self.list.snapshot());
            }
            ScreenEvent::SetListFilter { filter, reply } => {
                self.list.set_filter(filter);
                self.publish_list();
                let _ = reply.send(self.list.snapshot());
            }
            ScreenEvent::ToggleListSearch { reply } => {
                self.list.toggle_search();
                self.publish_list();
                let _ = reply.send(self.list.snapshot());
            }
            ScreenEvent::SetFavoritesFilter { filter, reply } => {
                self.favorites.set_filter(filter);
                self.publish_favorites();
                let _ = reply.send(self.favorites.snapshot());
            }
            ScreenEvent::ToggleFavoritesSearch { reply } => {
                self.favorites.toggle_search();
                self.publish_favorites();
                let _ = reply.send(self.favorites.snapshot());
            }
            ScreenEvent::OpenDetail { id, reply } => {
                self.open_detail(id);
                let _ = reply.send(self.detail.snapshot());
            }
            ScreenEvent::ToggleFavorite { id, reply } => {
                let result = self.toggle_favorite(id).await;
                let _ = reply.send(result);
            }
            ScreenEvent::SessionsFetched { result } => {
                let materialized = self.gateway.materialize_list(result).await;
                self.list.finish_load(materialized);
                self.publish_list();
                self.reproject_favorites();
            }
            ScreenEvent::DetailFetched { id, result } => {
                if self.detail.finish_load(id, result) {
                    self.publish_detail();
                } else {
                    debug!(session_id = id, "Dropping detail result for a closed screen");
                }
            }
        }
    }

    /// Runs the remote list call off the loop. No generation check is made on
    /// completion: a slower, older fetch may overwrite a newer one.
    fn spawn_list_fetch(&self) {
        let source = self.gateway.source();
        let completions = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = source.list_sessions().await;
            post(completions, ScreenEvent::SessionsFetched { result }).await;
        });
    }

    fn open_detail(&mut self, id: SessionId) {
        self.detail.begin_load(id);
        if let Some(session) = self.gateway.cached_session(id) {
            self.detail.finish_load(id, Ok(session));
        } else {
            let lookup = self.gateway.remote_lookup(id);
            let completions = self.completions_tx.clone();
            tokio::spawn(async move {
                let result = lookup.await;
                post(completions, ScreenEvent::DetailFetched { id, result }).await;
            });
        }
        self.publish_detail();
    }

    async fn toggle_favorite(&mut self, id: SessionId) -> PortResult<bool> {
        match self.gateway.toggle_favorite(id).await {
            Ok(is_favorite) => {
                self.list.apply_favorite(id, is_favorite);
                self.publish_list();
                if self.detail.apply_favorite(id, is_favorite) {
                    self.publish_detail();
                }
                self.reproject_favorites();
                Ok(is_favorite)
            }
            Err(e) => {
                error!(session_id = id, error = %e, "Favorite toggle failed, screens left unchanged");
                Err(e)
            }
        }
    }

    fn reproject_favorites(&mut self) {
        self.favorites.project(self.gateway.favorites_view());
        self.publish_favorites();
    }

    fn publish_list(&self) {
        self.list_tx.send_replace(self.list.snapshot());
    }

    fn publish_favorites(&self) {
        self.favorites_tx.send_replace(self.favorites.snapshot());
    }

    fn publish_detail(&self) {
        self.detail_tx.send_replace(self.detail.snapshot());
    }
}

/// Posts a completion back to the loop if it is still running.
async fn post(completions: mpsc::WeakSender<ScreenEvent>, event: ScreenEvent) {
    match completions.upgrade() {
        Some(tx) => {
            if tx.send(event).await.is_err() {
                debug!("Screen loop gone before completion could be delivered");
            }
        }
        None => debug!("Screen loop gone before completion could be delivered"),
    }
}
