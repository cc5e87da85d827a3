//! crates/wellness_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any transport or storage format.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Server-assigned, stable identifier of a wellness session.
pub type SessionId = i64;

/// One wellness activity as shown to the user.
///
/// `is_favorite` is derived locally from the favorite store when the record
/// is materialized; the server never sends it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub title: String,
    /// Free-text category as sent by the server. Never validated against
    /// [`Category`].
    pub category: String,
    pub duration_minutes: u32,
    pub rating: f64,
    pub image_url: String,
    pub description: String,
    pub instructor: String,
    pub is_favorite: bool,
}

impl Session {
    /// Returns a copy of this session carrying the given favorite flag.
    pub fn with_favorite(&self, is_favorite: bool) -> Self {
        Self {
            is_favorite,
            ..self.clone()
        }
    }
}

/// The closed set of activity types offered as filter chips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Category {
    Yoga,
    Meditation,
    Massage,
    Mindfulness,
    Swimming,
    Dance,
    Fitness,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 7] = [
        Category::Yoga,
        Category::Meditation,
        Category::Massage,
        Category::Mindfulness,
        Category::Swimming,
        Category::Dance,
        Category::Fitness,
    ];

    /// The stable display label, also used for matching server categories.
    pub fn label(self) -> &'static str {
        match self {
            Category::Yoga => "Yoga",
            Category::Meditation => "Meditation",
            Category::Massage => "Massage",
            Category::Mindfulness => "Mindfulness",
            Category::Swimming => "Swimming",
            Category::Dance => "Dance",
            Category::Fitness => "Fitness",
        }
    }

    /// Labels of every category, for populating filter UIs.
    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|c| c.label()).collect()
    }

    /// True when a server-side category string names this category.
    pub fn matches(self, raw: &str) -> bool {
        raw.eq_ignore_ascii_case(self.label())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Returned when a string does not name any [`Category`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.matches(trimmed))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.label().to_string()
    }
}

impl TryFrom<String> for Category {
    type Error = UnknownCategory;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("yoga".parse::<Category>(), Ok(Category::Yoga));
        assert_eq!(" MINDFULNESS ".parse::<Category>(), Ok(Category::Mindfulness));
        assert!("Pilates".parse::<Category>().is_err());
    }

    #[test]
    fn category_serializes_as_label() {
        let json = serde_json::to_string(&Category::Dance).unwrap();
        assert_eq!(json, "\"Dance\"");
        let back: Category = serde_json::from_str("\"swimming\"").unwrap();
        assert_eq!(back, Category::Swimming);
    }

    #[test]
    fn labels_keep_display_order() {
        assert_eq!(
            Category::labels(),
            vec!["Yoga", "Meditation", "Massage", "Mindfulness", "Swimming", "Dance", "Fitness"]
        );
    }
}
