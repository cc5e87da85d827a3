//! services/app/src/web/state.rs
//!
//! Defines the application's shared state and how it is assembled from the
//! configured adapters.

use crate::{
    adapters::{HttpSessionSource, SqlitePreferences},
    config::Config,
    error::AppError,
    screens::{ScreenHandle, ScreenLoop},
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;
use wellness_core::{FavoriteStore, PreferenceStore, SessionGateway, SessionSource};

/// Sent with every request to the remote session API.
const USER_AGENT: &str = concat!("wellness/", env!("CARGO_PKG_VERSION"));

//=========================================================================================
// AppState (Shared Across All Requests and Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub screens: ScreenHandle,
    pub config: Arc<Config>,
}

/// A running app: its shared state plus the screen loop task.
pub struct AppRuntime {
    pub state: Arc<AppState>,
    pub screen_task: JoinHandle<()>,
    pub shutdown: CancellationToken,
}

impl AppRuntime {
    /// Wires the gateway from explicit ports and starts the screen loop.
    pub fn start(
        config: Arc<Config>,
        source: Arc<dyn SessionSource>,
        prefs: Arc<dyn PreferenceStore>,
    ) -> Self {
        let gateway = SessionGateway::new(source, FavoriteStore::new(prefs));
        let shutdown = CancellationToken::new();
        let (screens, screen_task) = ScreenLoop::spawn(gateway, shutdown.clone());

        Self {
            state: Arc::new(AppState { screens, config }),
            screen_task,
            shutdown,
        }
    }

    /// Builds the production adapters from `config` and starts the app.
    pub async fn from_config(config: Arc<Config>) -> Result<Self, AppError> {
        info!("Opening preference store...");
        let prefs = SqlitePreferences::connect(&config.database_url).await?;
        info!("Running database migrations...");
        prefs.run_migrations().await?;
        info!("Database migrations complete.");

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()?;
        let source = HttpSessionSource::with_client(http, &config.api_base_url);
        info!(base_url = %config.api_base_url, "Remote session API configured");

        Ok(Self::start(config, Arc::new(source), Arc::new(prefs)))
    }

    /// Stops the screen loop and waits for it to finish.
    pub async fn shutdown(self) -> Result<(), AppError> {
        self.shutdown.cancel();
        self.screen_task
            .await
            .map_err(|e| AppError::Internal(format!("Screen loop task failed: {}", e)))
    }
}
