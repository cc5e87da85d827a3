//! crates/wellness_core/src/filter.rs
//!
//! Category + title search over a session list.

use serde::{Deserialize, Serialize};

use crate::domain::{Category, Session};

/// The filter inputs of one list screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFilter {
    pub category: Option<Category>,
    #[serde(default)]
    pub query: String,
}

impl SessionFilter {
    pub fn new(category: Option<Category>, query: impl Into<String>) -> Self {
        Self {
            category,
            query: query.into(),
        }
    }

    /// Runs [`apply`] with these inputs.
    pub fn apply(&self, sessions: &[Session]) -> Vec<Session> {
        apply(sessions, self.category, &self.query)
    }

    /// True when neither predicate would drop anything.
    pub fn is_noop(&self) -> bool {
        self.category.is_none() && self.query.trim().is_empty()
    }
}

/// Returns the sessions matching `category` (case-insensitive equality with
/// its label) and whose title contains the trimmed `query`
/// (case-insensitive). A `None` category or blank query keeps everything.
/// Input order is preserved.
pub fn apply(sessions: &[Session], category: Option<Category>, query: &str) -> Vec<Session> {
    let needle = query.trim().to_lowercase();
    sessions
        .iter()
        .filter(|s| category.map_or(true, |c| c.matches(&s.category)))
        .filter(|s| needle.is_empty() || s.title.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::remote_session;

    fn session(id: i64, title: &str, category: &str) -> Session {
        remote_session(id, title, category).into_session(false)
    }

    fn catalogue() -> Vec<Session> {
        vec![
            session(1, "Sunrise Yoga Flow", "Yoga"),
            session(2, "Evening yoga stretch", "yoga"),
            session(3, "HIIT Blast", "Fitness"),
            session(4, "Yoga Nidra", "Meditation"),
            session(5, "Freestyle", "Aquatics"),
        ]
    }

    fn ids(sessions: &[Session]) -> Vec<i64> {
        sessions.iter().map(|s| s.id).collect()
    }

    #[test]
    fn no_filter_is_identity() {
        let all = catalogue();
        assert_eq!(apply(&all, None, ""), all);
        assert_eq!(apply(&all, None, "   "), all);
    }

    #[test]
    fn category_matches_label_case_insensitively() {
        let input = vec![
            session(1, "A", "Yoga"),
            session(2, "B", "yoga"),
            session(3, "C", "Fitness"),
        ];
        assert_eq!(ids(&apply(&input, Some(Category::Yoga), "")), vec![1, 2]);
    }

    #[test]
    fn query_is_trimmed_substring_match() {
        let all = catalogue();
        assert_eq!(ids(&apply(&all, None, "  YOGA ")), vec![1, 2, 4]);
        assert_eq!(ids(&apply(&all, None, "blast")), vec![3]);
    }

    #[test]
    fn predicates_combine_with_and() {
        let all = catalogue();
        assert_eq!(ids(&apply(&all, Some(Category::Meditation), "yoga")), vec![4]);
        assert!(apply(&all, Some(Category::Dance), "yoga").is_empty());
    }

    #[test]
    fn unknown_server_categories_pass_without_category_filter() {
        let all = catalogue();
        assert!(ids(&apply(&all, None, "")).contains(&5));
        assert!(!ids(&apply(&all, Some(Category::Swimming), "")).contains(&5));
    }

    #[test]
    fn filtering_always_starts_from_the_full_set() {
        let all = catalogue();
        let narrowed = apply(&all, None, "hiit");
        assert_eq!(ids(&narrowed), vec![3]);

        // Clearing the query over the narrowed list cannot bring rows back;
        // callers must re-run over the full set.
        assert_eq!(apply(&narrowed, None, ""), narrowed);
        assert_ne!(apply(&all, None, ""), narrowed);
    }

    #[test]
    fn session_filter_delegates_to_apply() {
        let filter = SessionFilter {
            category: Some(Category::Yoga),
            query: "evening".to_string(),
        };
        assert_eq!(ids(&filter.apply(&catalogue())), vec![2]);
        assert!(!filter.is_noop());
        assert!(SessionFilter::default().is_noop());
    }
}
