//! services/app/src/adapters/remote.rs
//!
//! This module contains the adapter for the remote wellness session API.
//! It implements the `SessionSource` port from the `core` crate over HTTP.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};
use wellness_core::domain::SessionId;
use wellness_core::ports::{PortError, PortResult, RemoteSession, SessionSource};

/// Path of the session collection, relative to the base URL.
const SESSIONS_PATH: &str = "WellnessSession";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `SessionSource` port with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpSessionSource {
    base_url: String,
    http: Client,
}

impl HttpSessionSource {
    /// Creates a new `HttpSessionSource` pointing at `base_url`.
    ///
    /// Example: `HttpSessionSource::new("https://example.mockapi.io/api/v1")`
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Creates the adapter around an already configured client.
    #[must_use]
    pub fn with_client(http: Client, base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, SESSIONS_PATH)
    }

    /// Sends a GET to the collection with the given query pairs.
    async fn get(&self, query: &[(&str, String)]) -> PortResult<Response> {
        let url = self.collection_url();
        debug!(url = %url, ?query, "GET");
        self.http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| PortError::Network(e.to_string()))
    }

    async fn fetch_list(&self, query: &[(&str, String)]) -> PortResult<Vec<RemoteSession>> {
        let response = self.get(query).await?;
        let body = success_body(response).await?;
        let records: Vec<WellnessSessionDto> =
            serde_json::from_str(&body).map_err(|e| PortError::Decode(e.to_string()))?;
        Ok(records.into_iter().map(WellnessSessionDto::into_domain).collect())
    }
}

//=========================================================================================
// Wire Records
//=========================================================================================

/// A session record as the remote API serializes it.
#[derive(Debug, Deserialize)]
struct WellnessSessionDto {
    id: SessionId,
    title: String,
    category: String,
    duration: i64,
    rating: f64,
    image: String,
    description: String,
    instructor: String,
}

impl WellnessSessionDto {
    fn into_domain(self) -> RemoteSession {
        let duration_minutes = u32::try_from(self.duration.max(0)).unwrap_or(u32::MAX);
        if self.duration < 0 {
            warn!(session_id = self.id, duration = self.duration, "Negative duration clamped to 0");
        }
        RemoteSession {
            id: self.id,
            title: self.title,
            category: self.category,
            duration_minutes,
            rating: self.rating,
            image_url: self.image,
            description: self.description,
            instructor: self.instructor,
        }
    }
}

/// Some backends answer `?id=` with a one-element array instead of an object.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(WellnessSessionDto),
    Many(Vec<WellnessSessionDto>),
}

//=========================================================================================
// `SessionSource` Trait Implementation
//=========================================================================================

#[async_trait]
impl SessionSource for HttpSessionSource {
    async fn list_sessions(&self) -> PortResult<Vec<RemoteSession>> {
        self.fetch_list(&[]).await
    }

    async fn list_sessions_by_category(&self, category: &str) -> PortResult<Vec<RemoteSession>> {
        self.fetch_list(&[("category", category.to_string())]).await
    }

    async fn get_session(&self, id: SessionId) -> PortResult<RemoteSession> {
        let response = self.get(&[("id", id.to_string())]).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(PortError::NotFound(format!("Session {} not found", id)));
        }
        let body = success_body(response).await?;
        let parsed: OneOrMany =
            serde_json::from_str(&body).map_err(|e| PortError::Decode(e.to_string()))?;

        let record = match parsed {
            OneOrMany::One(record) => Some(record),
            OneOrMany::Many(records) => records.into_iter().find(|r| r.id == id),
        };
        record
            .map(WellnessSessionDto::into_domain)
            .ok_or_else(|| PortError::NotFound(format!("Session {} not found", id)))
    }
}

/// Returns the body of a 2xx response, or maps the status into a
/// `PortError::Server`.
async fn success_body(response: Response) -> PortResult<String> {
    let status = response.status();
    if !status.is_success() {
        return Err(PortError::Server {
            status: status.as_u16(),
            message: status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
        });
    }
    response
        .text()
        .await
        .map_err(|e| PortError::Network(e.to_string()))
}
