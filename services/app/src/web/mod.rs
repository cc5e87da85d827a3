pub mod protocol;
pub mod rest;
pub mod state;
pub mod ws_handler;

use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use rest::ApiDoc;
pub use state::{AppRuntime, AppState};
pub use ws_handler::ws_handler;

/// Builds the full application router: REST routes, the WebSocket endpoint and
/// the Swagger UI.
pub fn router(app_state: Arc<AppState>) -> Router {
    let cors = cors_layer(&app_state.config.frontend_origin);

    let api_router = Router::new()
        .route("/categories", get(rest::list_categories_handler))
        .route("/screens/sessions", get(rest::get_sessions_handler))
        .route("/screens/sessions/load", post(rest::load_sessions_handler))
        .route(
            "/screens/sessions/filter",
            put(rest::set_sessions_filter_handler),
        )
        .route(
            "/screens/sessions/search/toggle",
            post(rest::toggle_sessions_search_handler),
        )
        .route("/screens/favorites", get(rest::get_favorites_handler))
        .route(
            "/screens/favorites/filter",
            put(rest::set_favorites_filter_handler),
        )
        .route(
            "/screens/favorites/search/toggle",
            post(rest::toggle_favorites_search_handler),
        )
        .route("/screens/detail", get(rest::get_detail_handler))
        .route("/screens/detail/{id}/load", post(rest::load_detail_handler))
        .route("/sessions/{id}/favorite", post(rest::toggle_favorite_handler))
        .route("/ws", get(ws_handler))
        .layer(cors)
        .with_state(app_state);

    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

fn cors_layer(origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);
    match HeaderValue::from_str(origin) {
        Ok(value) => cors.allow_origin(value),
        Err(e) => {
            warn!(origin, error = %e, "Ignoring invalid FRONTEND_ORIGIN; cross-origin requests will be refused");
            cors
        }
    }
}
