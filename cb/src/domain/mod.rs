//! Domain types for ChordBuilder
//!
//! Records persisted in the document store:
//! - `Progression` - named, ordered sequence of chord slots
//! - `PlaybackSettings` - instrument and duration per progression
//! - `SuggestionPreferences` - genre, complexity and key per progression

mod id;
mod preferences;
mod progression;
mod settings;

pub use id::generate_id;
pub use preferences::{DEFAULT_COMPLEXITY, DEFAULT_GENRE, DEFAULT_KEY, PreferencesChange, SuggestionPreferences};
pub use progression::{Progression, ProgressionEdit, ProgressionSummary, Slot, SlotError, checked_index};
pub use settings::{
    Instrument, MAX_SECONDS_PER_CHORD, MIN_SECONDS_PER_CHORD, PlaybackSettings, SettingsChange, SettingsError,
    validate_seconds,
};
