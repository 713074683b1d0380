//! Uniform action errors
//!
//! Every concept action fails with an [`ActionError`]: a kind plus exactly one
//! human-readable message. Callers branch on the kind or just show the message;
//! serialized, it is `{"error": "<message>"}`.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};
use thiserror::Error;

use crate::domain::{SettingsError, SlotError};
use crate::state::StateError;
use crate::theory::TheoryError;

/// Failure classification shared by all concepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum ErrorKind {
    /// No record for the requested id
    NotFound,
    /// Position or index failed its bounds check
    OutOfRange,
    /// Value outside its legal set or range
    InvalidArgument,
    /// Record for the id already exists
    AlreadyExists,
    /// Chord symbol not recognized by the theory adapter
    InvalidChord,
    /// The LLM call itself failed
    UpstreamFailure,
    /// The LLM answered but nothing usable survived parsing
    EmptyResult,
    /// Store or channel failure
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not-found",
            ErrorKind::OutOfRange => "out-of-range",
            ErrorKind::InvalidArgument => "invalid-argument",
            ErrorKind::AlreadyExists => "already-exists",
            ErrorKind::InvalidChord => "invalid-chord",
            ErrorKind::UpstreamFailure => "upstream-failure",
            ErrorKind::EmptyResult => "empty-result",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A failed action, returned as data
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ActionError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ActionError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Build from any error that knows its kind
    pub fn from_error(kind: ErrorKind, error: &dyn std::error::Error) -> Self {
        Self::new(kind, error.to_string())
    }
}

impl Serialize for ActionError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("error", &self.message)?;
        map.end()
    }
}

impl From<SlotError> for ActionError {
    fn from(e: SlotError) -> Self {
        Self::from_error(ErrorKind::OutOfRange, &e)
    }
}

impl From<SettingsError> for ActionError {
    fn from(e: SettingsError) -> Self {
        Self::from_error(ErrorKind::InvalidArgument, &e)
    }
}

impl From<TheoryError> for ActionError {
    fn from(e: TheoryError) -> Self {
        Self::from_error(ErrorKind::InvalidChord, &e)
    }
}

impl From<StateError> for ActionError {
    fn from(e: StateError) -> Self {
        let kind = match &e {
            StateError::NotFound(_) => ErrorKind::NotFound,
            StateError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            StateError::Slot(_) => ErrorKind::OutOfRange,
            StateError::StoreError(_) | StateError::ChannelError => ErrorKind::Internal,
        };
        Self::from_error(kind, &e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_error_field() {
        let err = ActionError::new(ErrorKind::NotFound, "Progression with ID x not found.");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json, serde_json::json!({"error": "Progression with ID x not found."}));
    }

    #[test]
    fn test_display_is_message() {
        let err = ActionError::internal("Channel error");
        assert_eq!(err.to_string(), "Channel error");
        assert_eq!(err.kind, ErrorKind::Internal);
    }

    #[test]
    fn test_conversions() {
        let err: ActionError = SlotError::OutOfBounds(-1).into();
        assert_eq!(err.kind, ErrorKind::OutOfRange);
        assert_eq!(err.message, "Invalid position: -1. Index out of bounds.");

        let err: ActionError = TheoryError::InvalidChord("Q".to_string()).into();
        assert_eq!(err.kind, ErrorKind::InvalidChord);

        let err: ActionError = SettingsError::InvalidDuration("0".to_string()).into();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);

        let err: ActionError = StateError::ChannelError.into();
        assert_eq!(err.kind, ErrorKind::Internal);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ErrorKind::UpstreamFailure.to_string(), "upstream-failure");
        assert_eq!(ErrorKind::EmptyResult.as_str(), "empty-result");
    }
}
