//! crates/wellness_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the concrete HTTP client and preference storage.

use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::domain::{Session, SessionId};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
///
/// The three fetch failures (`Network`, `Server`, `Decode`) stay distinct for
/// diagnostics but render with the same user-facing prefix.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// Transport failure: connection refused, DNS, timeout.
    #[error("Failed to fetch sessions: {0}")]
    Network(String),
    /// The remote answered with a non-2xx status.
    #[error("Failed to fetch sessions: {message}")]
    Server { status: u16, message: String },
    /// The payload could not be decoded into session records.
    #[error("Failed to fetch sessions: {0}")]
    Decode(String),
    #[error("Item not found: {0}")]
    NotFound(String),
    /// The preference substrate failed to read or write.
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl PortError {
    /// True for the failures that come from talking to the remote source.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            PortError::Network(_) | PortError::Server { .. } | PortError::Decode(_)
        )
    }

    /// The message shown when looking up a single session fails. Fetch
    /// failures name the one record instead of the list.
    pub fn lookup_message(&self) -> String {
        match self {
            PortError::Network(detail)
            | PortError::Decode(detail)
            | PortError::Server { message: detail, .. } => {
                format!("Failed to fetch session: {}", detail)
            }
            other => other.to_string(),
        }
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Remote Data Types
//=========================================================================================

/// A session record exactly as the remote source describes it, before the
/// favorite flag has been merged in.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteSession {
    pub id: SessionId,
    pub title: String,
    pub category: String,
    pub duration_minutes: u32,
    pub rating: f64,
    pub image_url: String,
    pub description: String,
    pub instructor: String,
}

impl RemoteSession {
    /// Materializes the record for the UI with the given favorite flag.
    pub fn into_session(self, is_favorite: bool) -> Session {
        Session {
            id: self.id,
            title: self.title,
            category: self.category,
            duration_minutes: self.duration_minutes,
            rating: self.rating,
            image_url: self.image_url,
            description: self.description,
            instructor: self.instructor,
            is_favorite,
        }
    }
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The remote catalogue of wellness sessions.
#[async_trait]
pub trait SessionSource: Send + Sync {
    /// Fetches every session, in server order.
    async fn list_sessions(&self) -> PortResult<Vec<RemoteSession>>;

    /// Fetches the sessions the server files under `category`.
    async fn list_sessions_by_category(&self, category: &str) -> PortResult<Vec<RemoteSession>>;

    /// Fetches a single session.
    async fn get_session(&self, id: SessionId) -> PortResult<RemoteSession>;
}

/// A string-keyed store of string sets, the substrate for local preferences.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Reads the set stored under `key`. A missing key reads as an empty set.
    async fn get_string_set(&self, key: &str) -> PortResult<BTreeSet<String>>;

    /// Replaces the set stored under `key`. Must be atomic: readers see either
    /// the old set or the new one.
    async fn put_string_set(&self, key: &str, values: &BTreeSet<String>) -> PortResult<()>;

    /// Deletes `key` and its set.
    async fn remove(&self, key: &str) -> PortResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_message_names_a_single_session() {
        let offline = PortError::Network("connection refused".into());
        assert_eq!(offline.lookup_message(), "Failed to fetch session: connection refused");

        let missing = PortError::NotFound("Session 9 not found".into());
        assert_eq!(missing.lookup_message(), missing.to_string());
    }

    #[test]
    fn fetch_failures_share_one_message_prefix() {
        let errors = [
            PortError::Network("connection refused".into()),
            PortError::Server {
                status: 503,
                message: "Service Unavailable".into(),
            },
            PortError::Decode("expected an array".into()),
        ];
        for err in errors {
            assert!(err.is_fetch_failure());
            assert!(err.to_string().starts_with("Failed to fetch sessions: "));
        }
        assert!(!PortError::Storage("disk full".into()).is_fetch_failure());
    }

    #[test]
    fn ports_are_object_safe() {
        fn _source(_s: &dyn SessionSource) {}
        fn _prefs(_p: &dyn PreferenceStore) {}
    }
}
