//! Synchronizer - declarative follow-up actions
//!
//! A [`SyncRule`] pairs an event predicate with a follow-up action. After an
//! action completes, the application hands its event to
//! [`Synchronizer::dispatch`], which runs every matching follow-up before
//! returning. A follow-up that fails is logged and reported in its
//! [`SyncOutcome`]; the triggering action is never rolled back.

use tracing::{debug, info, warn};

use crate::error::ActionError;
use crate::events::ActionEvent;
use crate::playback::{PlayBack, PlaybackError};
use crate::suggest::{SuggestChord, SuggestError};

/// Action run when a rule matches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    InitializeSettings,
    InitializePreferences,
    /// Delete settings; a missing record is not an error
    DeleteSettings,
    /// Delete preferences; a missing record is not an error
    DeletePreferences,
}

/// When `when` matches an event, run `then` for the event's progression
#[derive(Debug, Clone, Copy)]
pub struct SyncRule {
    pub name: &'static str,
    pub when: fn(&ActionEvent) -> bool,
    pub then: FollowUp,
}

/// Result of one rule firing
#[derive(Debug)]
pub struct SyncOutcome {
    pub rule: &'static str,
    pub progression_id: String,
    /// Event produced by the follow-up, if any
    pub result: Result<Option<ActionEvent>, ActionError>,
}

impl SyncOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

fn is_created(event: &ActionEvent) -> bool {
    matches!(event, ActionEvent::ProgressionCreated { .. })
}

fn is_deleted(event: &ActionEvent) -> bool {
    matches!(event, ActionEvent::ProgressionDeleted { .. })
}

/// Runs follow-ups against the playback and suggestion concepts
pub struct Synchronizer {
    rules: Vec<SyncRule>,
    playback: PlayBack,
    suggest: SuggestChord,
}

impl Synchronizer {
    /// Synchronizer with the built-in rules
    pub fn new(playback: PlayBack, suggest: SuggestChord) -> Self {
        Self::with_rules(playback, suggest, Self::default_rules())
    }

    pub fn with_rules(playback: PlayBack, suggest: SuggestChord, rules: Vec<SyncRule>) -> Self {
        debug!(rule_count = rules.len(), "Synchronizer::with_rules: called");
        Self {
            rules,
            playback,
            suggest,
        }
    }

    pub fn default_rules() -> Vec<SyncRule> {
        vec![
            SyncRule {
                name: "initialize-settings-on-create",
                when: is_created,
                then: FollowUp::InitializeSettings,
            },
            SyncRule {
                name: "initialize-preferences-on-create",
                when: is_created,
                then: FollowUp::InitializePreferences,
            },
            SyncRule {
                name: "delete-settings-on-delete",
                when: is_deleted,
                then: FollowUp::DeleteSettings,
            },
            SyncRule {
                name: "delete-preferences-on-delete",
                when: is_deleted,
                then: FollowUp::DeletePreferences,
            },
        ]
    }

    pub fn rules(&self) -> &[SyncRule] {
        &self.rules
    }

    /// Run every rule matching `event`, in rule order
    pub async fn dispatch(&self, event: &ActionEvent) -> Vec<SyncOutcome> {
        debug!(event_type = event.event_type(), "Synchronizer::dispatch: called");
        let progression_id = event.progression_id();
        let mut outcomes = Vec::new();

        for rule in self.rules.iter().filter(|r| (r.when)(event)) {
            debug!(rule = rule.name, %progression_id, "Synchronizer::dispatch: rule matched");
            let result = self.run(rule.then, progression_id).await;
            match &result {
                Ok(_) => info!(rule = rule.name, %progression_id, "Sync follow-up completed"),
                Err(e) => warn!(rule = rule.name, %progression_id, error = %e, "Sync follow-up failed"),
            }
            outcomes.push(SyncOutcome {
                rule: rule.name,
                progression_id: progression_id.to_string(),
                result,
            });
        }
        outcomes
    }

    async fn run(&self, follow_up: FollowUp, progression_id: &str) -> Result<Option<ActionEvent>, ActionError> {
        let produced = match follow_up {
            FollowUp::InitializeSettings => {
                self.playback.initialize_settings(progression_id).await?;
                Some(ActionEvent::SettingsInitialized {
                    progression_id: progression_id.to_string(),
                })
            }
            FollowUp::InitializePreferences => {
                self.suggest.initialize_preferences(progression_id).await?;
                Some(ActionEvent::PreferencesInitialized {
                    progression_id: progression_id.to_string(),
                })
            }
            FollowUp::DeleteSettings => match self.playback.delete_settings(progression_id).await {
                Ok(()) | Err(PlaybackError::NotFound(_)) => None,
                Err(e) => return Err(e.into()),
            },
            FollowUp::DeletePreferences => match self.suggest.delete_preferences(progression_id).await {
                Ok(()) | Err(SuggestError::NotFound(_)) => None,
                Err(e) => return Err(e.into()),
            },
        };
        Ok(produced)
    }
}
