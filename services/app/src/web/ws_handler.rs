//! services/app/src/web/ws_handler.rs
//!
//! This is the entry point and control loop for a WebSocket connection.
//! Client messages are turned into screen events, and every published screen
//! state is pushed back to the client as it changes.

use crate::{
    error::AppError,
    screens::ScreenHandle,
    web::{
        protocol::{ClientMessage, ServerMessage},
        state::AppState,
    },
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{
    stream::{SplitSink, StreamExt},
    SinkExt,
};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use wellness_core::filter::SessionFilter;
use wellness_core::view_state::{DetailSnapshot, FavoritesSnapshot, ListSnapshot};

type WsSender = Arc<Mutex<SplitSink<WebSocket, Message>>>;

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>) {
    info!("New WebSocket connection established.");

    let (sender, mut receiver) = socket.split();
    let ws_sender: WsSender = Arc::new(Mutex::new(sender));
    let screens = app_state.screens.clone();

    // --- 1. Initial state of every screen ---
    // Read through the receivers the push task will watch, so anything
    // published from here on is seen as a change.
    let mut watched = WatchedScreens::subscribe(&screens);
    for msg in watched.current() {
        if !send_message(&ws_sender, &msg).await {
            error!("Failed to send initial screen state.");
            return;
        }
    }

    // --- 2. Push every later screen change ---
    let stop = CancellationToken::new();
    let push_task = tokio::spawn(push_screen_changes(watched, ws_sender.clone(), stop.clone()));

    // --- 3. Main Message Loop ---
    while let Some(frame) = receiver.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                handle_text_message(text.as_str(), &screens, &ws_sender).await;
            }
            Ok(Message::Close(_)) => {
                info!("Client sent close message.");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                warn!("WebSocket receive error: {}", e);
                break;
            }
        }
    }

    // --- 4. Cleanup ---
    stop.cancel();
    let _ = push_task.await;
    info!("WebSocket connection closed.");
}

/// The three screen receivers of one connection.
struct WatchedScreens {
    list: watch::Receiver<ListSnapshot>,
    favorites: watch::Receiver<FavoritesSnapshot>,
    detail: watch::Receiver<DetailSnapshot>,
}

impl WatchedScreens {
    fn subscribe(screens: &ScreenHandle) -> Self {
        Self {
            list: screens.subscribe_list(),
            favorites: screens.subscribe_favorites(),
            detail: screens.subscribe_detail(),
        }
    }

    /// The latest state of every screen, marking each as seen.
    fn current(&mut self) -> [ServerMessage; 3] {
        [
            ServerMessage::ListState {
                snapshot: self.list.borrow_and_update().clone(),
            },
            ServerMessage::FavoritesState {
                snapshot: self.favorites.borrow_and_update().clone(),
            },
            ServerMessage::DetailState {
                snapshot: self.detail.borrow_and_update().clone(),
            },
        ]
    }
}

/// Forwards screen state changes to the client until `stop` fires or a
/// watch channel closes.
async fn push_screen_changes(
    mut watched: WatchedScreens,
    ws_sender: WsSender,
    stop: CancellationToken,
) {
    let WatchedScreens {
        list,
        favorites,
        detail,
    } = &mut watched;

    loop {
        let msg = tokio::select! {
            _ = stop.cancelled() => break,
            changed = list.changed() => {
                if changed.is_err() { break; }
                ServerMessage::ListState { snapshot: list.borrow_and_update().clone() }
            }
            changed = favorites.changed() => {
                if changed.is_err() { break; }
                ServerMessage::FavoritesState { snapshot: favorites.borrow_and_update().clone() }
            }
            changed = detail.changed() => {
                if changed.is_err() { break; }
                ServerMessage::DetailState { snapshot: detail.borrow_and_update().clone() }
            }
        };
        if !send_message(&ws_sender, &msg).await {
            debug!("Client went away; stopping screen push.");
            break;
        }
    }
}

/// Helper function to handle the logic for different `ClientMessage` variants.
///
/// State changes reach the client through the push task, so only toggles and
/// failures get a direct reply here.
async fn handle_text_message(text: &str, screens: &ScreenHandle, ws_sender: &WsSender) {
    let client_msg = match serde_json::from_str::<ClientMessage>(text) {
        Ok(msg) => msg,
        Err(e) => {
            warn!("Failed to deserialize client message: {}", e);
            send_error(ws_sender, format!("Invalid message: {}", e)).await;
            return;
        }
    };
    debug!(?client_msg, "Client message received");

    let outcome: Result<Option<ServerMessage>, AppError> = match client_msg {
        ClientMessage::LoadSessions => screens.load_sessions().await.map(|_| None),
        ClientMessage::SetListFilter { category, query } => screens
            .set_list_filter(SessionFilter::new(category, query))
            .await
            .map(|_| None),
        ClientMessage::ToggleListSearch => screens.toggle_list_search().await.map(|_| None),
        ClientMessage::SetFavoritesFilter { category, query } => screens
            .set_favorites_filter(SessionFilter::new(category, query))
            .await
            .map(|_| None),
        ClientMessage::ToggleFavoritesSearch => {
            screens.toggle_favorites_search().await.map(|_| None)
        }
        ClientMessage::OpenDetail { session_id } => {
            screens.open_detail(session_id).await.map(|_| None)
        }
        ClientMessage::ToggleFavorite { session_id } => {
            screens.toggle_favorite(session_id).await.map(|is_favorite| {
                Some(ServerMessage::FavoriteToggled {
                    session_id,
                    is_favorite,
                })
            })
        }
    };

    match outcome {
        Ok(Some(reply)) => {
            if !send_message(ws_sender, &reply).await {
                error!("Failed to send reply message.");
            }
        }
        Ok(None) => {}
        Err(e) => {
            error!("Client request failed: {:?}", e);
            send_error(ws_sender, e.to_string()).await;
        }
    }
}

async fn send_error(ws_sender: &WsSender, message: String) {
    if !send_message(ws_sender, &ServerMessage::Error { message }).await {
        error!("Failed to send error message.");
    }
}

/// Serializes and sends one message. Returns `false` if the client is gone.
async fn send_message(ws_sender: &WsSender, msg: &ServerMessage) -> bool {
    let json = match serde_json::to_string(msg) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize server message: {}", e);
            return true;
        }
    };
    ws_sender
        .lock()
        .await
        .send(Message::Text(json.into()))
        .await
        .is_ok()
}
