//! PlayBack concept
//!
//! Per-progression instrument and chord duration, plus note lookup through
//! the chord theory adapter.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{Instrument, PlaybackSettings, SettingsChange, SettingsError, validate_seconds};
use crate::error::{ActionError, ErrorKind};
use crate::state::{StateError, StateManager};
use crate::theory::{ChordTheory, TheoryError};

/// Errors from the playback concept
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("Playback settings for progression ID {0} not found.")]
    NotFound(String),

    #[error("Playback settings already exist for progression ID {0}.")]
    AlreadyExists(String),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Theory(#[from] TheoryError),

    #[error(transparent)]
    State(StateError),
}

impl PlaybackError {
    fn from_state(progression_id: &str, e: StateError) -> Self {
        match e {
            StateError::NotFound(_) => PlaybackError::NotFound(progression_id.to_string()),
            StateError::AlreadyExists(_) => PlaybackError::AlreadyExists(progression_id.to_string()),
            other => PlaybackError::State(other),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PlaybackError::NotFound(_) => ErrorKind::NotFound,
            PlaybackError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            PlaybackError::Settings(_) => ErrorKind::InvalidArgument,
            PlaybackError::Theory(_) => ErrorKind::InvalidChord,
            PlaybackError::State(_) => ErrorKind::Internal,
        }
    }
}

impl From<PlaybackError> for ActionError {
    fn from(e: PlaybackError) -> Self {
        ActionError::from_error(e.kind(), &e)
    }
}

/// Playback settings store and note lookup
#[derive(Clone)]
pub struct PlayBack {
    state: StateManager,
    theory: Arc<dyn ChordTheory>,
}

impl PlayBack {
    pub fn new(state: StateManager, theory: Arc<dyn ChordTheory>) -> Self {
        debug!("PlayBack::new: called");
        Self { state, theory }
    }

    /// Create default settings (Piano, 1 second per chord)
    pub async fn initialize_settings(&self, progression_id: &str) -> Result<PlaybackSettings, PlaybackError> {
        debug!(%progression_id, "initialize_settings: called");
        let settings = PlaybackSettings::new(progression_id);
        self.state
            .create_settings(settings.clone())
            .await
            .map_err(|e| PlaybackError::from_state(progression_id, e))?;
        info!(%progression_id, "Initialized playback settings");
        Ok(settings)
    }

    /// Set the instrument by name; the name is checked before the record
    pub async fn set_instrument(&self, progression_id: &str, instrument: &str) -> Result<PlaybackSettings, PlaybackError> {
        debug!(%progression_id, %instrument, "set_instrument: called");
        let instrument: Instrument = instrument.parse()?;
        self.update(progression_id, SettingsChange::Instrument(instrument))
            .await
    }

    pub async fn set_seconds_per_chord(&self, progression_id: &str, seconds: f64) -> Result<PlaybackSettings, PlaybackError> {
        debug!(%progression_id, %seconds, "set_seconds_per_chord: called");
        let seconds = validate_seconds(seconds)?;
        self.update(progression_id, SettingsChange::SecondsPerChord(seconds))
            .await
    }

    pub async fn get_playback_settings(&self, progression_id: &str) -> Result<PlaybackSettings, PlaybackError> {
        debug!(%progression_id, "get_playback_settings: called");
        self.state
            .get_settings(progression_id)
            .await
            .map_err(|e| PlaybackError::from_state(progression_id, e))?
            .ok_or_else(|| PlaybackError::NotFound(progression_id.to_string()))
    }

    pub async fn delete_settings(&self, progression_id: &str) -> Result<(), PlaybackError> {
        debug!(%progression_id, "delete_settings: called");
        let removed = self
            .state
            .delete_settings(progression_id)
            .await
            .map_err(|e| PlaybackError::from_state(progression_id, e))?;
        if !removed {
            return Err(PlaybackError::NotFound(progression_id.to_string()));
        }
        Ok(())
    }

    pub fn get_chord_notes(&self, chord: &str) -> Result<Vec<String>, PlaybackError> {
        debug!(%chord, "get_chord_notes: called");
        Ok(self.theory.notes_for_chord(chord)?)
    }

    /// Notes for each chord in order; the first bad symbol fails the call
    pub fn get_progression_notes(&self, chords: &[String]) -> Result<Vec<Vec<String>>, PlaybackError> {
        debug!(count = chords.len(), "get_progression_notes: called");
        Ok(self.theory.notes_for_progression(chords)?)
    }

    async fn update(&self, progression_id: &str, change: SettingsChange) -> Result<PlaybackSettings, PlaybackError> {
        self.state
            .update_settings(progression_id, change)
            .await
            .map_err(|e| PlaybackError::from_state(progression_id, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theory::BuiltinTheory;

    async fn setup() -> PlayBack {
        let state = StateManager::spawn_in_memory().unwrap();
        PlayBack::new(state, Arc::new(BuiltinTheory::new()))
    }

    #[tokio::test]
    async fn test_initialize_defaults() {
        let playback = setup().await;
        let settings = playback.initialize_settings("p1").await.unwrap();
        assert_eq!(settings.instrument, Instrument::Piano);
        assert_eq!(settings.seconds_per_chord, 1.0);

        let stored = playback.get_playback_settings("p1").await.unwrap();
        assert_eq!(stored.instrument, Instrument::Piano);
    }

    #[tokio::test]
    async fn test_initialize_twice() {
        let playback = setup().await;
        playback.initialize_settings("p1").await.unwrap();
        playback.set_seconds_per_chord("p1", 4.5).await.unwrap();

        let err = playback.initialize_settings("p1").await.unwrap_err();
        assert_eq!(err.to_string(), "Playback settings already exist for progression ID p1.");
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);

        let stored = playback.get_playback_settings("p1").await.unwrap();
        assert_eq!(stored.seconds_per_chord, 4.5);
    }

    #[tokio::test]
    async fn test_set_instrument() {
        let playback = setup().await;
        playback.initialize_settings("p1").await.unwrap();

        let settings = playback.set_instrument("p1", "Synthesizer").await.unwrap();
        assert_eq!(settings.instrument, Instrument::Synthesizer);

        let err = playback.set_instrument("p1", "Banjo").await.unwrap_err();
        assert_eq!(err.to_string(), "Instrument must be one of Piano, Guitar, Synthesizer.");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn test_invalid_value_checked_before_existence() {
        let playback = setup().await;
        let err = playback.set_instrument("missing", "Banjo").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = playback.set_instrument("missing", "Guitar").await.unwrap_err();
        assert_eq!(err.to_string(), "Playback settings for progression ID missing not found.");
    }

    #[tokio::test]
    async fn test_seconds_bounds() {
        let playback = setup().await;
        playback.initialize_settings("p1").await.unwrap();

        assert_eq!(playback.set_seconds_per_chord("p1", 1.0).await.unwrap().seconds_per_chord, 1.0);
        assert_eq!(playback.set_seconds_per_chord("p1", 10.0).await.unwrap().seconds_per_chord, 10.0);

        for bad in [0.5, 10.01, f64::NAN, f64::INFINITY] {
            let err = playback.set_seconds_per_chord("p1", bad).await.unwrap_err();
            assert_eq!(err.to_string(), "secondsPerChord must be between 1 and 10.");
        }
        assert_eq!(playback.get_playback_settings("p1").await.unwrap().seconds_per_chord, 10.0);
    }

    #[tokio::test]
    async fn test_delete_settings() {
        let playback = setup().await;
        playback.initialize_settings("p1").await.unwrap();
        playback.delete_settings("p1").await.unwrap();

        assert!(matches!(
            playback.get_playback_settings("p1").await,
            Err(PlaybackError::NotFound(_))
        ));
        assert!(matches!(playback.delete_settings("p1").await, Err(PlaybackError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_notes() {
        let playback = setup().await;
        assert_eq!(playback.get_chord_notes("Cmaj7").unwrap(), vec!["C4", "E4", "G4", "B4"]);

        let chords = vec!["C".to_string(), "Am".to_string()];
        let notes = playback.get_progression_notes(&chords).unwrap();
        assert_eq!(notes, vec![vec!["C4", "E4", "G4"], vec!["A4", "C4", "E4"]]);

        let chords = vec!["C".to_string(), "Hm".to_string(), "Xq".to_string()];
        let err = playback.get_progression_notes(&chords).unwrap_err();
        assert_eq!(err.to_string(), "Invalid chord specified: 'Hm'.");
        assert_eq!(err.kind(), ErrorKind::InvalidChord);
    }
}
