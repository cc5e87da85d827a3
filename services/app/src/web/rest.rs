//! services/app/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI document.

use crate::{error::AppError, web::state::AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::{OpenApi, ToSchema};
use wellness_core::domain::{Category, SessionId};
use wellness_core::filter::SessionFilter;
use wellness_core::ports::PortError;
use wellness_core::view_state::{DetailSnapshot, FavoritesSnapshot, ListSnapshot};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        list_categories_handler,
        load_sessions_handler,
        get_sessions_handler,
        set_sessions_filter_handler,
        toggle_sessions_search_handler,
        get_favorites_handler,
        set_favorites_filter_handler,
        toggle_favorites_search_handler,
        load_detail_handler,
        get_detail_handler,
        toggle_favorite_handler,
    ),
    components(
        schemas(CategoriesResponse, FilterRequest, ToggleFavoriteResponse)
    ),
    tags(
        (name = "Wellness Sessions", description = "Screen state for the session list, favorites and detail views.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The category labels available as filter chips.
#[derive(Serialize, ToSchema)]
pub struct CategoriesResponse {
    categories: Vec<String>,
}

/// New filter inputs for a list screen.
#[derive(Deserialize, ToSchema)]
pub struct FilterRequest {
    /// A category label, matched case-insensitively. `null` clears the filter.
    category: Option<String>,
    #[serde(default)]
    query: String,
}

impl FilterRequest {
    fn into_filter(self) -> Result<SessionFilter, (StatusCode, String)> {
        let category = self
            .category
            .as_deref()
            .map(str::parse::<Category>)
            .transpose()
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
        Ok(SessionFilter::new(category, self.query))
    }
}

/// The outcome of a favorite toggle.
#[derive(Serialize, ToSchema)]
pub struct ToggleFavoriteResponse {
    session_id: SessionId,
    is_favorite: bool,
}

type HandlerResult<T> = Result<Json<T>, (StatusCode, String)>;

/// Maps an app error into a status code and a message for the frontend.
fn error_response(context: &str, e: AppError) -> (StatusCode, String) {
    error!("{}: {:?}", context, e);
    let status = match &e {
        AppError::Port(PortError::NotFound(_)) => StatusCode::NOT_FOUND,
        AppError::Port(PortError::Storage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        AppError::Port(p) if p.is_fetch_failure() => StatusCode::BAD_GATEWAY,
        AppError::LoopClosed => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, format!("{}: {}", context, e))
}

//=========================================================================================
// Categories
//=========================================================================================

/// List the category labels.
#[utoipa::path(
    get,
    path = "/categories",
    responses((status = 200, description = "Category labels in display order", body = CategoriesResponse))
)]
pub async fn list_categories_handler() -> Json<CategoriesResponse> {
    Json(CategoriesResponse {
        categories: Category::labels().into_iter().map(str::to_string).collect(),
    })
}

//=========================================================================================
// Session List Screen
//=========================================================================================

/// Enter or retry the session list.
///
/// Emits `loading` to observers at once, then waits for the fetch to settle
/// and returns the resulting `success` or `error` state.
#[utoipa::path(
    post,
    path = "/screens/sessions/load",
    responses(
        (status = 200, description = "The list screen after the fetch settled"),
        (status = 503, description = "The screen loop is not running")
    )
)]
pub async fn load_sessions_handler(
    State(app_state): State<Arc<AppState>>,
) -> HandlerResult<ListSnapshot> {
    app_state
        .screens
        .load_sessions_settled()
        .await
        .map(Json)
        .map_err(|e| error_response("Failed to load sessions", e))
}

/// Current state of the session list.
#[utoipa::path(
    get,
    path = "/screens/sessions",
    responses((status = 200, description = "The list screen"))
)]
pub async fn get_sessions_handler(State(app_state): State<Arc<AppState>>) -> Json<ListSnapshot> {
    Json(app_state.screens.list_snapshot())
}

/// Change the category and search text of the session list.
#[utoipa::path(
    put,
    path = "/screens/sessions/filter",
    request_body = FilterRequest,
    responses(
        (status = 200, description = "The list screen with the new filter applied"),
        (status = 400, description = "Unknown category")
    )
)]
pub async fn set_sessions_filter_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<FilterRequest>,
) -> HandlerResult<ListSnapshot> {
    let filter = request.into_filter()?;
    app_state
        .screens
        .set_list_filter(filter)
        .await
        .map(Json)
        .map_err(|e| error_response("Failed to apply filter", e))
}

/// Open or close the session list's search field.
#[utoipa::path(
    post,
    path = "/screens/sessions/search/toggle",
    responses((status = 200, description = "The list screen"))
)]
pub async fn toggle_sessions_search_handler(
    State(app_state): State<Arc<AppState>>,
) -> HandlerResult<ListSnapshot> {
    app_state
        .screens
        .toggle_list_search()
        .await
        .map(Json)
        .map_err(|e| error_response("Failed to toggle search", e))
}

//=========================================================================================
// Favorites Screen
//=========================================================================================

/// Current state of the favorites screen.
#[utoipa::path(
    get,
    path = "/screens/favorites",
    responses((status = 200, description = "The favorites screen"))
)]
pub async fn get_favorites_handler(
    State(app_state): State<Arc<AppState>>,
) -> Json<FavoritesSnapshot> {
    Json(app_state.screens.favorites_snapshot())
}

/// Change the category and search text of the favorites screen.
#[utoipa::path(
    put,
    path = "/screens/favorites/filter",
    request_body = FilterRequest,
    responses(
        (status = 200, description = "The favorites screen with the new filter applied"),
        (status = 400, description = "Unknown category")
    )
)]
pub async fn set_favorites_filter_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<FilterRequest>,
) -> HandlerResult<FavoritesSnapshot> {
    let filter = request.into_filter()?;
    app_state
        .screens
        .set_favorites_filter(filter)
        .await
        .map(Json)
        .map_err(|e| error_response("Failed to apply filter", e))
}

/// Open or close the favorites screen's search field.
#[utoipa::path(
    post,
    path = "/screens/favorites/search/toggle",
    responses((status = 200, description = "The favorites screen"))
)]
pub async fn toggle_favorites_search_handler(
    State(app_state): State<Arc<AppState>>,
) -> HandlerResult<FavoritesSnapshot> {
    app_state
        .screens
        .toggle_favorites_search()
        .await
        .map(Json)
        .map_err(|e| error_response("Failed to toggle search", e))
}

//=========================================================================================
// Detail Screen
//=========================================================================================

/// Open (or retry) the detail screen for one session.
#[utoipa::path(
    post,
    path = "/screens/detail/{id}/load",
    params(("id" = i64, Path, description = "The session id")),
    responses((status = 200, description = "The detail screen after the lookup settled"))
)]
pub async fn load_detail_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> HandlerResult<DetailSnapshot> {
    app_state
        .screens
        .open_detail_settled(id)
        .await
        .map(Json)
        .map_err(|e| error_response("Failed to load session", e))
}

/// Current state of the detail screen.
#[utoipa::path(
    get,
    path = "/screens/detail",
    responses((status = 200, description = "The detail screen"))
)]
pub async fn get_detail_handler(State(app_state): State<Arc<AppState>>) -> Json<DetailSnapshot> {
    Json(app_state.screens.detail_snapshot())
}

//=========================================================================================
// Favorites
//=========================================================================================

/// Flip the favorite flag of a session.
#[utoipa::path(
    post,
    path = "/sessions/{id}/favorite",
    params(("id" = i64, Path, description = "The session id")),
    responses(
        (status = 200, description = "The new favorite flag", body = ToggleFavoriteResponse),
        (status = 500, description = "The favorite could not be stored")
    )
)]
pub async fn toggle_favorite_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> HandlerResult<ToggleFavoriteResponse> {
    let is_favorite = app_state
        .screens
        .toggle_favorite(id)
        .await
        .map_err(|e| error_response("Failed to toggle favorite", e))?;
    Ok(Json(ToggleFavoriteResponse {
        session_id: id,
        is_favorite,
    }))
}
