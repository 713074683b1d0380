//! Action events
//!
//! One variant per completed concept action that other components may want
//! to react to.

use serde::{Deserialize, Serialize};

/// A completed action
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ActionEvent {
    // === ProgressionBuilder ===
    ProgressionCreated { progression_id: String, name: String },
    ProgressionRenamed { progression_id: String, name: String },
    ProgressionDeleted { progression_id: String },
    /// Slot sequence changed (add, set, clear, delete, reorder, replace)
    SlotsChanged { progression_id: String, len: usize },

    // === PlayBack ===
    SettingsInitialized { progression_id: String },

    // === SuggestChord ===
    PreferencesInitialized { progression_id: String },
    SuggestionsProduced {
        progression_id: String,
        /// "chord" or "progression"
        kind: String,
        count: usize,
    },
}

impl ActionEvent {
    pub fn progression_id(&self) -> &str {
        match self {
            ActionEvent::ProgressionCreated { progression_id, .. }
            | ActionEvent::ProgressionRenamed { progression_id, .. }
            | ActionEvent::ProgressionDeleted { progression_id }
            | ActionEvent::SlotsChanged { progression_id, .. }
            | ActionEvent::SettingsInitialized { progression_id }
            | ActionEvent::PreferencesInitialized { progression_id }
            | ActionEvent::SuggestionsProduced { progression_id, .. } => progression_id,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            ActionEvent::ProgressionCreated { .. } => "ProgressionCreated",
            ActionEvent::ProgressionRenamed { .. } => "ProgressionRenamed",
            ActionEvent::ProgressionDeleted { .. } => "ProgressionDeleted",
            ActionEvent::SlotsChanged { .. } => "SlotsChanged",
            ActionEvent::SettingsInitialized { .. } => "SettingsInitialized",
            ActionEvent::PreferencesInitialized { .. } => "PreferencesInitialized",
            ActionEvent::SuggestionsProduced { .. } => "SuggestionsProduced",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let event = ActionEvent::SlotsChanged {
            progression_id: "p1".to_string(),
            len: 3,
        };
        assert_eq!(event.progression_id(), "p1");
        assert_eq!(event.event_type(), "SlotsChanged");
    }

    #[test]
    fn test_serialization_is_tagged() {
        let event = ActionEvent::ProgressionDeleted {
            progression_id: "p1".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"ProgressionDeleted\""));

        let parsed: ActionEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }
}
