//! crates/wellness_core/src/view_state.rs
//!
//! Presentation state for the three screens (session list, favorites,
//! session detail) and the rules that move them between states.
//!
//! Every projector here is a plain state machine: it never performs I/O.
//! The caller fetches through the gateway and feeds the outcome in.

use serde::Serialize;

use crate::domain::{Category, Session, SessionId};
use crate::filter::SessionFilter;
use crate::ports::PortResult;

//=========================================================================================
// Tri-state model
//=========================================================================================

/// The state of a screen that loads a payload of type `T`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum ViewState<T> {
    Loading,
    Success(T),
    Error(String),
}

impl<T> ViewState<T> {
    pub fn is_loading(&self) -> bool {
        match self {
            ViewState::Loading => true,
            ViewState::Success(_) | ViewState::Error(_) => false,
        }
    }

    /// The payload, if loaded.
    pub fn success(&self) -> Option<&T> {
        match self {
            ViewState::Success(payload) => Some(payload),
            ViewState::Loading | ViewState::Error(_) => None,
        }
    }
}

//=========================================================================================
// Session list screen
//=========================================================================================

/// Everything a frontend needs to render a list screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListSnapshot {
    pub state: ViewState<Vec<Session>>,
    pub filter: SessionFilter,
    pub search_active: bool,
}

/// The session list: a fetched set shown through the current filter.
#[derive(Debug)]
pub struct SessionListScreen {
    state: ViewState<Vec<Session>>,
    all: Vec<Session>,
    filter: SessionFilter,
    search_active: bool,
}

impl Default for SessionListScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionListScreen {
    /// A screen that has not loaded yet starts in `Loading`.
    pub fn new() -> Self {
        Self {
            state: ViewState::Loading,
            all: Vec::new(),
            filter: SessionFilter::default(),
            search_active: false,
        }
    }

    pub fn state(&self) -> &ViewState<Vec<Session>> {
        &self.state
    }

    pub fn filter(&self) -> &SessionFilter {
        &self.filter
    }

    pub fn search_active(&self) -> bool {
        self.search_active
    }

    /// The last successfully loaded, unfiltered set.
    pub fn all_sessions(&self) -> &[Session] {
        &self.all
    }

    pub fn snapshot(&self) -> ListSnapshot {
        ListSnapshot {
            state: self.state.clone(),
            filter: self.filter.clone(),
            search_active: self.search_active,
        }
    }

    /// Screen entry or manual retry.
    pub fn begin_load(&mut self) -> &ViewState<Vec<Session>> {
        self.state = ViewState::Loading;
        &self.state
    }

    /// Feeds the outcome of the gateway fetch in.
    pub fn finish_load(&mut self, result: PortResult<Vec<Session>>) -> &ViewState<Vec<Session>> {
        match result {
            Ok(sessions) => {
                self.all = sessions;
                self.state = ViewState::Success(self.filter.apply(&self.all));
            }
            Err(e) => {
                self.state = ViewState::Error(e.to_string());
            }
        }
        &self.state
    }

    pub fn set_category(&mut self, category: Option<Category>) -> &ViewState<Vec<Session>> {
        self.filter.category = category;
        self.refilter()
    }

    pub fn set_query(&mut self, query: impl Into<String>) -> &ViewState<Vec<Session>> {
        self.filter.query = query.into();
        self.refilter()
    }

    pub fn set_filter(&mut self, filter: SessionFilter) -> &ViewState<Vec<Session>> {
        self.filter = filter;
        self.refilter()
    }

    /// Shows or hides the search field. Hiding it clears the query.
    pub fn toggle_search(&mut self) -> &ViewState<Vec<Session>> {
        self.search_active = !self.search_active;
        if !self.search_active {
            self.filter.query.clear();
        }
        self.refilter()
    }

    /// Applies a confirmed favorite toggle to the held sessions in place.
    ///
    /// Favorite status takes no part in filtering, so the visible subset
    /// does not need to be recomputed.
    pub fn apply_favorite(&mut self, id: SessionId, is_favorite: bool) {
        patch(&mut self.all, id, is_favorite);
        match &mut self.state {
            ViewState::Success(visible) => patch(visible, id, is_favorite),
            ViewState::Loading | ViewState::Error(_) => {}
        }
    }

    /// Recomputes the visible subset from the full set. While a fetch is
    /// outstanding the new filter is only recorded; it takes effect when the
    /// fetch completes.
    fn refilter(&mut self) -> &ViewState<Vec<Session>> {
        match self.state {
            ViewState::Loading => {}
            ViewState::Success(_) | ViewState::Error(_) => {
                self.state = ViewState::Success(self.filter.apply(&self.all));
            }
        }
        &self.state
    }
}

//=========================================================================================
// Favorites screen
//=========================================================================================

/// Rendering data for the favorites screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FavoritesSnapshot {
    pub sessions: Vec<Session>,
    pub filter: SessionFilter,
    pub search_active: bool,
}

/// The favorites list: the gateway's favorites view seen through a filter.
///
/// It has no loading state of its own; it is re-projected whenever the
/// cache changes.
#[derive(Debug, Default)]
pub struct FavoritesScreen {
    all: Vec<Session>,
    visible: Vec<Session>,
    filter: SessionFilter,
    search_active: bool,
}

impl FavoritesScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sessions(&self) -> &[Session] {
        &self.visible
    }

    pub fn filter(&self) -> &SessionFilter {
        &self.filter
    }

    pub fn snapshot(&self) -> FavoritesSnapshot {
        FavoritesSnapshot {
            sessions: self.visible.clone(),
            filter: self.filter.clone(),
            search_active: self.search_active,
        }
    }

    /// Replaces the favorite set with a fresh read of the favorites view.
    pub fn project<'a>(&mut self, favorites: impl IntoIterator<Item = &'a Session>) -> &[Session] {
        self.all = favorites.into_iter().cloned().collect();
        self.refilter()
    }

    pub fn set_filter(&mut self, filter: SessionFilter) -> &[Session] {
        self.filter = filter;
        self.refilter()
    }

    pub fn toggle_search(&mut self) -> &[Session] {
        self.search_active = !self.search_active;
        if !self.search_active {
            self.filter.query.clear();
        }
        self.refilter()
    }

    fn refilter(&mut self) -> &[Session] {
        self.visible = self.filter.apply(&self.all);
        &self.visible
    }
}

//=========================================================================================
// Session detail screen
//=========================================================================================

/// Rendering data for the detail screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailSnapshot {
    pub session_id: Option<SessionId>,
    pub state: ViewState<Session>,
}

/// A single session, loaded by id.
#[derive(Debug)]
pub struct SessionDetailScreen {
    session_id: Option<SessionId>,
    state: ViewState<Session>,
}

impl Default for SessionDetailScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionDetailScreen {
    pub fn new() -> Self {
        Self {
            session_id: None,
            state: ViewState::Loading,
        }
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session_id
    }

    pub fn state(&self) -> &ViewState<Session> {
        &self.state
    }

    pub fn snapshot(&self) -> DetailSnapshot {
        DetailSnapshot {
            session_id: self.session_id,
            state: self.state.clone(),
        }
    }

    /// Opens (or retries) the screen for `id`.
    pub fn begin_load(&mut self, id: SessionId) -> &ViewState<Session> {
        self.session_id = Some(id);
        self.state = ViewState::Loading;
        &self.state
    }

    /// Feeds a lookup outcome in. Outcomes for an id other than the one
    /// currently open are dropped; returns whether the state changed.
    pub fn finish_load(&mut self, id: SessionId, result: PortResult<Session>) -> bool {
        if self.session_id != Some(id) {
            return false;
        }
        self.state = match result {
            Ok(session) => ViewState::Success(session),
            Err(e) => ViewState::Error(e.lookup_message()),
        };
        true
    }

    /// Mirrors a confirmed toggle onto the held session. Returns whether the
    /// held session was the one toggled.
    pub fn apply_favorite(&mut self, id: SessionId, is_favorite: bool) -> bool {
        match &mut self.state {
            ViewState::Success(session) if session.id == id => {
                session.is_favorite = is_favorite;
                true
            }
            ViewState::Success(_) | ViewState::Loading | ViewState::Error(_) => false,
        }
    }
}

fn patch(sessions: &mut [Session], id: SessionId, is_favorite: bool) {
    for session in sessions.iter_mut().filter(|s| s.id == id) {
        session.is_favorite = is_favorite;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::PortError;
    use crate::testing::remote_session;

    fn sessions() -> Vec<Session> {
        vec![
            remote_session(1, "Sunrise Yoga", "Yoga").into_session(false),
            remote_session(2, "Sound Bath", "Meditation").into_session(false),
            remote_session(3, "Power Yoga", "Fitness").into_session(true),
        ]
    }

    fn visible_ids(state: &ViewState<Vec<Session>>) -> Vec<SessionId> {
        state
            .success()
            .map(|s| s.iter().map(|s| s.id).collect())
            .unwrap_or_default()
    }

    #[test]
    fn list_starts_loading_then_succeeds() {
        let mut screen = SessionListScreen::new();
        assert!(screen.state().is_loading());
        screen.finish_load(Ok(sessions()));
        assert_eq!(visible_ids(screen.state()), vec![1, 2, 3]);
    }

    #[test]
    fn failure_then_retry_reaches_success() {
        let mut screen = SessionListScreen::new();
        screen.begin_load();
        let state = screen
            .finish_load(Err(PortError::Network("offline".into())))
            .clone();
        assert_eq!(state, ViewState::Error("Failed to fetch sessions: offline".into()));

        assert!(screen.begin_load().is_loading());
        screen.finish_load(Ok(sessions()));
        assert_eq!(visible_ids(screen.state()), vec![1, 2, 3]);
    }

    #[test]
    fn filter_changes_recompute_from_full_set() {
        let mut screen = SessionListScreen::new();
        screen.finish_load(Ok(sessions()));

        assert_eq!(visible_ids(screen.set_query("yoga")), vec![1, 3]);
        assert_eq!(visible_ids(screen.set_category(Some(Category::Fitness))), vec![3]);
        assert_eq!(visible_ids(screen.set_category(None)), vec![1, 3]);
        assert_eq!(visible_ids(screen.set_query("")), vec![1, 2, 3]);
    }

    #[test]
    fn filter_change_while_loading_is_deferred() {
        let mut screen = SessionListScreen::new();
        screen.begin_load();
        assert!(screen.set_category(Some(Category::Meditation)).is_loading());

        screen.finish_load(Ok(sessions()));
        assert_eq!(visible_ids(screen.state()), vec![2]);
    }

    #[test]
    fn closing_search_clears_query() {
        let mut screen = SessionListScreen::new();
        screen.finish_load(Ok(sessions()));
        screen.toggle_search();
        screen.set_query("sound");
        assert_eq!(visible_ids(screen.state()), vec![2]);

        screen.toggle_search();
        assert!(!screen.search_active());
        assert!(screen.filter().query.is_empty());
        assert_eq!(visible_ids(screen.state()), vec![1, 2, 3]);
    }

    #[test]
    fn toggle_patches_displayed_and_full_set() {
        let mut screen = SessionListScreen::new();
        screen.finish_load(Ok(sessions()));
        screen.set_query("sound");

        screen.apply_favorite(2, true);

        let shown = screen.state().success().unwrap();
        assert!(shown[0].is_favorite);
        screen.set_query("");
        let all = screen.state().success().unwrap();
        assert!(all.iter().find(|s| s.id == 2).unwrap().is_favorite);
        assert!(!all.iter().find(|s| s.id == 1).unwrap().is_favorite);
    }

    #[test]
    fn favorites_screen_filters_projection() {
        let mut screen = FavoritesScreen::new();
        let mut all = sessions();
        all[0].is_favorite = true;
        let favorites: Vec<_> = all.iter().filter(|s| s.is_favorite).collect();

        let ids: Vec<_> = screen.project(favorites).iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 3]);

        let filtered = screen.set_filter(SessionFilter {
            category: Some(Category::Yoga),
            query: String::new(),
        });
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, 1);
    }

    #[test]
    fn detail_toggle_mutates_held_session() {
        let mut screen = SessionDetailScreen::new();
        screen.begin_load(2);
        let session = sessions().remove(1);
        assert!(screen.finish_load(2, Ok(session)));

        assert!(!screen.apply_favorite(1, true));
        assert!(screen.apply_favorite(2, true));
        assert!(screen.state().success().unwrap().is_favorite);
    }

    #[test]
    fn detail_failure_names_the_single_session() {
        let mut screen = SessionDetailScreen::new();
        screen.begin_load(4);
        screen.finish_load(4, Err(PortError::Network("timed out".into())));
        assert_eq!(
            screen.state(),
            &ViewState::Error("Failed to fetch session: timed out".to_string())
        );
    }

    #[test]
    fn detail_ignores_outcome_for_other_id() {
        let mut screen = SessionDetailScreen::new();
        screen.begin_load(1);
        screen.begin_load(2);
        let first = sessions().remove(0);
        assert!(!screen.finish_load(1, Ok(first)));
        assert!(screen.state().is_loading());
    }

    #[test]
    fn view_state_serializes_with_status_tag() {
        let loading: ViewState<Vec<Session>> = ViewState::Loading;
        assert_eq!(serde_json::to_value(&loading).unwrap(), serde_json::json!({"status": "loading"}));
        let error: ViewState<Session> = ViewState::Error("boom".into());
        assert_eq!(
            serde_json::to_value(&error).unwrap(),
            serde_json::json!({"status": "error", "data": "boom"})
        );
    }
}
