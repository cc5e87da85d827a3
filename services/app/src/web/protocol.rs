//! services/app/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between the frontend and the app
//! for driving the three screens.

use serde::{Deserialize, Serialize};
use wellness_core::domain::{Category, SessionId};
use wellness_core::view_state::{DetailSnapshot, FavoritesSnapshot, ListSnapshot};

//=========================================================================================
// Messages Sent FROM the Frontend TO the App
//=========================================================================================

/// Represents the structured text messages a frontend can send.
#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Enters the session list, or retries after an error.
    LoadSessions,

    /// Changes the category chip and/or search text of the session list.
    SetListFilter {
        category: Option<Category>,
        #[serde(default)]
        query: String,
    },

    /// Opens or closes the session list's search field.
    ToggleListSearch,

    SetFavoritesFilter {
        category: Option<Category>,
        #[serde(default)]
        query: String,
    },

    ToggleFavoritesSearch,

    /// Navigates to the detail screen of one session.
    OpenDetail { session_id: SessionId },

    /// Flips the favorite flag of a session from any screen.
    ToggleFavorite { session_id: SessionId },
}

//=========================================================================================
// Messages Sent FROM the App TO the Frontend
//=========================================================================================

/// Represents the structured text messages the app pushes to the frontend.
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The session list screen changed.
    ListState { snapshot: ListSnapshot },

    /// The favorites screen changed.
    FavoritesState { snapshot: FavoritesSnapshot },

    /// The detail screen changed.
    DetailState { snapshot: DetailSnapshot },

    /// Confirms a favorite toggle.
    FavoriteToggled {
        session_id: SessionId,
        is_favorite: bool,
    },

    /// Reports a failed request; the connection stays open.
    Error { message: String },
}
