//! Playback settings domain type

use std::fmt;
use std::str::FromStr;

use docstore::{Record, now_ms};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Shortest allowed duration per chord (seconds)
pub const MIN_SECONDS_PER_CHORD: f64 = 1.0;

/// Longest allowed duration per chord (seconds)
pub const MAX_SECONDS_PER_CHORD: f64 = 10.0;

/// Validation errors for playback settings values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("Instrument must be one of Piano, Guitar, Synthesizer.")]
    InvalidInstrument(String),

    #[error("secondsPerChord must be between 1 and 10.")]
    InvalidDuration(String),
}

/// Instrument used for playback
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instrument {
    #[default]
    Piano,
    Guitar,
    Synthesizer,
}

impl Instrument {
    pub const ALL: [Instrument; 3] = [Instrument::Piano, Instrument::Guitar, Instrument::Synthesizer];

    pub fn name(&self) -> &'static str {
        match self {
            Instrument::Piano => "Piano",
            Instrument::Guitar => "Guitar",
            Instrument::Synthesizer => "Synthesizer",
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Instrument {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "Instrument::from_str: called");
        Instrument::ALL
            .into_iter()
            .find(|i| i.name() == s)
            .ok_or_else(|| SettingsError::InvalidInstrument(s.to_string()))
    }
}

/// Check a duration lies in `[1, 10]`
pub fn validate_seconds(seconds: f64) -> Result<f64, SettingsError> {
    if seconds.is_finite() && (MIN_SECONDS_PER_CHORD..=MAX_SECONDS_PER_CHORD).contains(&seconds) {
        Ok(seconds)
    } else {
        Err(SettingsError::InvalidDuration(seconds.to_string()))
    }
}

/// Per-progression playback settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSettings {
    pub progression_id: String,
    pub instrument: Instrument,
    pub seconds_per_chord: f64,
    pub updated_at: i64,
}

impl PlaybackSettings {
    /// Default settings: Piano, one second per chord
    pub fn new(progression_id: impl Into<String>) -> Self {
        Self {
            progression_id: progression_id.into(),
            instrument: Instrument::default(),
            seconds_per_chord: MIN_SECONDS_PER_CHORD,
            updated_at: now_ms(),
        }
    }

    pub fn apply(&mut self, change: SettingsChange) {
        debug!(progression_id = %self.progression_id, ?change, "PlaybackSettings::apply: called");
        match change {
            SettingsChange::Instrument(instrument) => self.instrument = instrument,
            SettingsChange::SecondsPerChord(seconds) => self.seconds_per_chord = seconds,
        }
        self.updated_at = now_ms();
    }
}

impl Record for PlaybackSettings {
    fn id(&self) -> &str {
        &self.progression_id
    }

    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    fn collection_name() -> &'static str {
        "playback_settings"
    }
}

/// A validated change to playback settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingsChange {
    Instrument(Instrument),
    SecondsPerChord(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = PlaybackSettings::new("p1");
        assert_eq!(s.instrument, Instrument::Piano);
        assert_eq!(s.seconds_per_chord, 1.0);
    }

    #[test]
    fn test_instrument_from_str() {
        assert_eq!("Guitar".parse::<Instrument>(), Ok(Instrument::Guitar));
        assert_eq!("Synthesizer".parse::<Instrument>(), Ok(Instrument::Synthesizer));

        let err = "Drums".parse::<Instrument>().unwrap_err();
        assert_eq!(err.to_string(), "Instrument must be one of Piano, Guitar, Synthesizer.");
    }

    #[test]
    fn test_validate_seconds_bounds() {
        assert_eq!(validate_seconds(1.0), Ok(1.0));
        assert_eq!(validate_seconds(10.0), Ok(10.0));
        assert_eq!(validate_seconds(2.5), Ok(2.5));
        assert!(validate_seconds(0.5).is_err());
        assert!(validate_seconds(11.0).is_err());
        assert!(validate_seconds(f64::NAN).is_err());
        assert_eq!(
            validate_seconds(0.0).unwrap_err().to_string(),
            "secondsPerChord must be between 1 and 10."
        );
    }

    #[test]
    fn test_apply_change() {
        let mut s = PlaybackSettings::new("p1");
        s.apply(SettingsChange::Instrument(Instrument::Guitar));
        s.apply(SettingsChange::SecondsPerChord(4.0));
        assert_eq!(s.instrument, Instrument::Guitar);
        assert_eq!(s.seconds_per_chord, 4.0);
    }
}
