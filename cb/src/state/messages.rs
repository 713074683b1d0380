//! State manager messages
//!
//! Commands and responses for the actor pattern.

use thiserror::Error;
use tokio::sync::oneshot;

use crate::domain::{
    PlaybackSettings, PreferencesChange, Progression, ProgressionEdit, SettingsChange, SlotError,
    SuggestionPreferences,
};

/// Errors from state operations
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Record already exists: {0}")]
    AlreadyExists(String),

    #[error(transparent)]
    Slot(#[from] SlotError),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Channel error")]
    ChannelError,
}

/// Response from state operations
pub type StateResponse<T> = Result<T, StateError>;

/// Commands sent to the StateManager actor
#[derive(Debug)]
pub enum StateCommand {
    // Progression operations
    CreateProgression {
        progression: Progression,
        reply: oneshot::Sender<StateResponse<String>>,
    },
    GetProgression {
        id: String,
        reply: oneshot::Sender<StateResponse<Option<Progression>>>,
    },
    EditProgression {
        id: String,
        edit: ProgressionEdit,
        reply: oneshot::Sender<StateResponse<Progression>>,
    },
    DeleteProgression {
        id: String,
        reply: oneshot::Sender<StateResponse<bool>>,
    },
    ListProgressions {
        reply: oneshot::Sender<StateResponse<Vec<Progression>>>,
    },

    // Playback settings operations
    CreateSettings {
        settings: PlaybackSettings,
        reply: oneshot::Sender<StateResponse<()>>,
    },
    GetSettings {
        progression_id: String,
        reply: oneshot::Sender<StateResponse<Option<PlaybackSettings>>>,
    },
    UpdateSettings {
        progression_id: String,
        change: SettingsChange,
        reply: oneshot::Sender<StateResponse<PlaybackSettings>>,
    },
    DeleteSettings {
        progression_id: String,
        reply: oneshot::Sender<StateResponse<bool>>,
    },

    // Suggestion preferences operations
    CreatePreferences {
        preferences: SuggestionPreferences,
        reply: oneshot::Sender<StateResponse<()>>,
    },
    GetPreferences {
        progression_id: String,
        reply: oneshot::Sender<StateResponse<Option<SuggestionPreferences>>>,
    },
    UpdatePreferences {
        progression_id: String,
        change: PreferencesChange,
        reply: oneshot::Sender<StateResponse<SuggestionPreferences>>,
    },
    DeletePreferences {
        progression_id: String,
        reply: oneshot::Sender<StateResponse<bool>>,
    },

    // Shutdown
    Shutdown,
}
