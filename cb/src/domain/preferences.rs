//! Suggestion preferences domain type

use docstore::{Record, now_ms};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_GENRE: &str = "Pop";
pub const DEFAULT_COMPLEXITY: &str = "Simple";
pub const DEFAULT_KEY: &str = "C";

/// Per-progression parameters that steer prompt construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionPreferences {
    pub progression_id: String,
    pub genre: String,
    /// Free-form level such as Simple, Intermediate or Advanced
    pub complexity: String,
    pub key: String,
    pub updated_at: i64,
}

impl SuggestionPreferences {
    pub fn new(progression_id: impl Into<String>) -> Self {
        Self {
            progression_id: progression_id.into(),
            genre: DEFAULT_GENRE.to_string(),
            complexity: DEFAULT_COMPLEXITY.to_string(),
            key: DEFAULT_KEY.to_string(),
            updated_at: now_ms(),
        }
    }

    pub fn apply(&mut self, change: PreferencesChange) {
        debug!(progression_id = %self.progression_id, ?change, "SuggestionPreferences::apply: called");
        match change {
            PreferencesChange::Genre(genre) => self.genre = genre,
            PreferencesChange::Complexity(complexity) => self.complexity = complexity,
            PreferencesChange::Key(key) => self.key = key,
        }
        self.updated_at = now_ms();
    }
}

impl Record for SuggestionPreferences {
    fn id(&self) -> &str {
        &self.progression_id
    }

    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    fn collection_name() -> &'static str {
        "suggestion_preferences"
    }
}

/// A change to one preference field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferencesChange {
    Genre(String),
    Complexity(String),
    Key(String),
}
