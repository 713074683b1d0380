//! SuggestChord concept
//!
//! Owns the per-progression suggestion preferences and turns them, plus the
//! chord context, into LLM prompts. Responses go through the pure parsers in
//! [`super::parse`].

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::domain::{PreferencesChange, SuggestionPreferences};
use crate::error::{ActionError, ErrorKind};
use crate::llm::{self, LlmClient};
use crate::prompts::{ChordPromptContext, EMPTY_SLOT, ProgressionPromptContext, PromptLoader};
use crate::state::{StateError, StateManager};

use super::parse::{ParseFailure, parse_chord_suggestions, parse_progression_suggestions};

const CHORD_TEMPLATE: &str = "suggest-chord";
const PROGRESSION_TEMPLATE: &str = "suggest-progression";

/// Errors from the suggestion concept
#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("Preferences for progression {0} not found.")]
    NotFound(String),

    #[error("Preferences for progression {0} already exist.")]
    AlreadyExists(String),

    #[error("Invalid position: {position}. Must be within 0 and {max}.")]
    InvalidPosition { position: i64, max: i64 },

    #[error("Invalid length: {0}. Must be greater than 0.")]
    InvalidLength(i64),

    #[error("Failed to get chord suggestions: {0}")]
    ChordRequestFailed(String),

    #[error("Failed to get progression suggestion: {0}")]
    ProgressionRequestFailed(String),

    #[error(transparent)]
    Empty(#[from] ParseFailure),

    #[error("Failed to build prompt: {0}")]
    Prompt(String),

    #[error(transparent)]
    State(StateError),
}

impl SuggestError {
    /// Map a store failure for the given progression id
    fn from_state(progression_id: &str, e: StateError) -> Self {
        match e {
            StateError::NotFound(_) => SuggestError::NotFound(progression_id.to_string()),
            StateError::AlreadyExists(_) => SuggestError::AlreadyExists(progression_id.to_string()),
            other => SuggestError::State(other),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SuggestError::NotFound(_) => ErrorKind::NotFound,
            SuggestError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            SuggestError::InvalidPosition { .. } => ErrorKind::OutOfRange,
            SuggestError::InvalidLength(_) => ErrorKind::InvalidArgument,
            SuggestError::ChordRequestFailed(_) | SuggestError::ProgressionRequestFailed(_) => {
                ErrorKind::UpstreamFailure
            }
            SuggestError::Empty(_) => ErrorKind::EmptyResult,
            SuggestError::Prompt(_) | SuggestError::State(_) => ErrorKind::Internal,
        }
    }
}

impl From<SuggestError> for ActionError {
    fn from(e: SuggestError) -> Self {
        ActionError::from_error(e.kind(), &e)
    }
}

/// Knobs for prompt construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestOptions {
    /// Candidate chords requested per chord suggestion
    pub chord_candidates: usize,
    /// Progressions requested per progression suggestion
    pub progression_candidates: usize,
    pub max_tokens: u32,
}

impl SuggestOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            chord_candidates: config.suggestions.chord_candidates,
            progression_candidates: config.suggestions.progression_candidates,
            max_tokens: config.llm.max_tokens,
        }
    }
}

impl Default for SuggestOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Suggestion preferences plus the LLM-backed suggestion actions
#[derive(Clone)]
pub struct SuggestChord {
    state: StateManager,
    llm: Arc<dyn LlmClient>,
    prompts: Arc<PromptLoader>,
    options: SuggestOptions,
}

impl SuggestChord {
    pub fn new(state: StateManager, llm: Arc<dyn LlmClient>, prompts: Arc<PromptLoader>, options: SuggestOptions) -> Self {
        debug!(?options, "SuggestChord::new: called");
        Self {
            state,
            llm,
            prompts,
            options,
        }
    }

    // === Preferences ===

    /// Create default preferences; fails if a record already exists
    pub async fn initialize_preferences(&self, progression_id: &str) -> Result<SuggestionPreferences, SuggestError> {
        debug!(%progression_id, "initialize_preferences: called");
        let preferences = SuggestionPreferences::new(progression_id);
        self.state
            .create_preferences(preferences.clone())
            .await
            .map_err(|e| SuggestError::from_state(progression_id, e))?;
        info!(%progression_id, "Initialized suggestion preferences");
        Ok(preferences)
    }

    pub async fn get_suggestion_preferences(&self, progression_id: &str) -> Result<SuggestionPreferences, SuggestError> {
        debug!(%progression_id, "get_suggestion_preferences: called");
        self.state
            .get_preferences(progression_id)
            .await
            .map_err(|e| SuggestError::from_state(progression_id, e))?
            .ok_or_else(|| SuggestError::NotFound(progression_id.to_string()))
    }

    pub async fn set_genre(&self, progression_id: &str, genre: &str) -> Result<SuggestionPreferences, SuggestError> {
        debug!(%progression_id, %genre, "set_genre: called");
        self.update(progression_id, PreferencesChange::Genre(genre.to_string()))
            .await
    }

    pub async fn set_complexity(
        &self,
        progression_id: &str,
        complexity: &str,
    ) -> Result<SuggestionPreferences, SuggestError> {
        debug!(%progression_id, %complexity, "set_complexity: called");
        self.update(progression_id, PreferencesChange::Complexity(complexity.to_string()))
            .await
    }

    pub async fn set_key(&self, progression_id: &str, key: &str) -> Result<SuggestionPreferences, SuggestError> {
        debug!(%progression_id, %key, "set_key: called");
        self.update(progression_id, PreferencesChange::Key(key.to_string()))
            .await
    }

    pub async fn delete_preferences(&self, progression_id: &str) -> Result<(), SuggestError> {
        debug!(%progression_id, "delete_preferences: called");
        let removed = self
            .state
            .delete_preferences(progression_id)
            .await
            .map_err(|e| SuggestError::from_state(progression_id, e))?;
        if !removed {
            return Err(SuggestError::NotFound(progression_id.to_string()));
        }
        Ok(())
    }

    async fn update(&self, progression_id: &str, change: PreferencesChange) -> Result<SuggestionPreferences, SuggestError> {
        self.state
            .update_preferences(progression_id, change)
            .await
            .map_err(|e| SuggestError::from_state(progression_id, e))
    }

    // === Suggestions ===

    /// Candidate chords for `chords[position]`
    ///
    /// Empty slots in `chords` are sent to the model as `_`. The position is
    /// checked before any prompt is built, so a bad position never reaches the
    /// LLM.
    pub async fn suggest_chord(
        &self,
        progression_id: &str,
        chords: &[Option<String>],
        position: i64,
    ) -> Result<Vec<String>, SuggestError> {
        debug!(%progression_id, chord_count = chords.len(), %position, "suggest_chord: called");
        let preferences = self.get_suggestion_preferences(progression_id).await?;

        let index = usize::try_from(position)
            .ok()
            .filter(|&i| i < chords.len())
            .ok_or(SuggestError::InvalidPosition {
                position,
                max: chords.len() as i64 - 1,
            })?;

        let context = ChordPromptContext {
            progression: ChordPromptContext::render_chords(chords),
            position: index,
            current: chords[index].clone().unwrap_or_else(|| EMPTY_SLOT.to_string()),
            genre: preferences.genre,
            complexity: preferences.complexity,
            key: preferences.key,
            count: self.options.chord_candidates,
        };
        let prompt = self
            .prompts
            .render(CHORD_TEMPLATE, &context)
            .map_err(|e| SuggestError::Prompt(e.to_string()))?;

        let text = llm::execute(self.llm.as_ref(), &prompt, self.options.max_tokens)
            .await
            .map_err(|e| {
                warn!(%progression_id, error = %e, retryable = e.is_retryable(), "suggest_chord: LLM call failed");
                SuggestError::ChordRequestFailed(e.to_string())
            })?;

        let suggestions = parse_chord_suggestions(&text)?;
        info!(%progression_id, count = suggestions.len(), "Produced chord suggestions");
        Ok(suggestions)
    }

    /// Whole progressions of roughly `length` chords
    ///
    /// Only the overall list is required to be non-empty; each line is
    /// returned with whatever length the model produced.
    pub async fn suggest_progression(&self, progression_id: &str, length: i64) -> Result<Vec<Vec<String>>, SuggestError> {
        debug!(%progression_id, %length, "suggest_progression: called");
        let preferences = self.get_suggestion_preferences(progression_id).await?;

        let length = usize::try_from(length)
            .ok()
            .filter(|&n| n > 0)
            .ok_or(SuggestError::InvalidLength(length))?;

        let context = ProgressionPromptContext {
            genre: preferences.genre,
            complexity: preferences.complexity,
            key: preferences.key,
            count: self.options.progression_candidates,
            length,
        };
        let prompt = self
            .prompts
            .render(PROGRESSION_TEMPLATE, &context)
            .map_err(|e| SuggestError::Prompt(e.to_string()))?;

        let text = llm::execute(self.llm.as_ref(), &prompt, self.options.max_tokens)
            .await
            .map_err(|e| {
                warn!(%progression_id, error = %e, retryable = e.is_retryable(), "suggest_progression: LLM call failed");
                SuggestError::ProgressionRequestFailed(e.to_string())
            })?;

        let progressions = parse_progression_suggestions(&text)?;
        if progressions.iter().any(|p| p.len() != length) {
            debug!(%length, "suggest_progression: model returned mismatched lengths");
        }
        info!(%progression_id, count = progressions.len(), "Produced progression suggestions");
        Ok(progressions)
    }
}
