//! Application facade
//!
//! Composes the store actor, the three concepts, the event bus and the
//! synchronizer. Every action returns `Result<T, ActionError>`; actions that
//! change state publish an [`ActionEvent`] and run the matching follow-ups
//! before returning.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::builder::ProgressionBuilder;
use crate::config::Config;
use crate::domain::{PlaybackSettings, Progression, ProgressionSummary, Slot, SuggestionPreferences};
use crate::error::ActionError;
use crate::events::{ActionEvent, EventBus};
use crate::llm::LlmClient;
use crate::playback::PlayBack;
use crate::prompts::PromptLoader;
use crate::state::StateManager;
use crate::suggest::{SuggestChord, SuggestOptions};
use crate::sync::{SyncOutcome, Synchronizer};
use crate::theory::{BuiltinTheory, ChordTheory};

pub type ActionResult<T> = Result<T, ActionError>;

pub struct App {
    state: StateManager,
    builder: ProgressionBuilder,
    playback: PlayBack,
    suggest: SuggestChord,
    bus: Arc<EventBus>,
    sync: Synchronizer,
}

impl App {
    pub fn new(
        state: StateManager,
        llm: Arc<dyn LlmClient>,
        theory: Arc<dyn ChordTheory>,
        prompts: PromptLoader,
        options: SuggestOptions,
    ) -> Self {
        debug!("App::new: called");
        let builder = ProgressionBuilder::new(state.clone());
        let playback = PlayBack::new(state.clone(), theory);
        let suggest = SuggestChord::new(state.clone(), llm, Arc::new(prompts), options);
        let sync = Synchronizer::new(playback.clone(), suggest.clone());
        Self {
            state,
            builder,
            playback,
            suggest,
            bus: Arc::new(EventBus::with_default_capacity()),
            sync,
        }
    }

    /// Open the configured on-disk store and wire everything up
    pub fn open(config: &Config, llm: Arc<dyn LlmClient>) -> eyre::Result<Self> {
        debug!(store_dir = %config.storage.store_dir.display(), "App::open: called");
        let state = StateManager::spawn(&config.storage.store_dir)?;
        let prompts = PromptLoader::new(config.suggestions.prompts_dir.as_deref());
        Ok(Self::new(
            state,
            llm,
            Arc::new(BuiltinTheory::new()),
            prompts,
            SuggestOptions::from_config(config),
        ))
    }

    /// Fresh in-memory store with default settings
    pub fn in_memory(llm: Arc<dyn LlmClient>) -> eyre::Result<Self> {
        debug!("App::in_memory: called");
        let state = StateManager::spawn_in_memory()?;
        Ok(Self::new(
            state,
            llm,
            Arc::new(BuiltinTheory::new()),
            PromptLoader::embedded_only(),
            SuggestOptions::default(),
        ))
    }

    pub fn events(&self) -> Arc<EventBus> {
        self.bus.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ActionEvent> {
        self.bus.subscribe()
    }

    /// Emit an event and run follow-ups, including those triggered by events
    /// the follow-ups themselves produce
    async fn publish(&self, event: ActionEvent) -> Vec<SyncOutcome> {
        debug!(event_type = event.event_type(), "App::publish: called");
        let mut pending = VecDeque::from([event]);
        let mut outcomes = Vec::new();

        while let Some(event) = pending.pop_front() {
            self.bus.emit(event.clone());
            for outcome in self.sync.dispatch(&event).await {
                if let Ok(Some(produced)) = &outcome.result {
                    pending.push_back(produced.clone());
                }
                outcomes.push(outcome);
            }
        }
        outcomes
    }

    async fn slots_changed(&self, progression: Progression) -> Progression {
        self.publish(ActionEvent::SlotsChanged {
            progression_id: progression.id.clone(),
            len: progression.len(),
        })
        .await;
        progression
    }

    // === ProgressionBuilder ===

    pub async fn create_progression(&self, name: &str) -> ActionResult<Progression> {
        let progression = self.builder.create_progression(name).await?;
        self.publish(ActionEvent::ProgressionCreated {
            progression_id: progression.id.clone(),
            name: progression.name.clone(),
        })
        .await;
        Ok(progression)
    }

    pub async fn add_slot(&self, id: &str) -> ActionResult<Progression> {
        let progression = self.builder.add_slot(id).await?;
        Ok(self.slots_changed(progression).await)
    }

    pub async fn set_chord(&self, id: &str, position: i64, chord: &str) -> ActionResult<Progression> {
        let progression = self.builder.set_chord(id, position, chord).await?;
        Ok(self.slots_changed(progression).await)
    }

    pub async fn delete_chord(&self, id: &str, position: i64) -> ActionResult<Progression> {
        let progression = self.builder.delete_chord(id, position).await?;
        Ok(self.slots_changed(progression).await)
    }

    pub async fn delete_slot(&self, id: &str, position: i64) -> ActionResult<Progression> {
        let progression = self.builder.delete_slot(id, position).await?;
        Ok(self.slots_changed(progression).await)
    }

    pub async fn reorder_slots(&self, id: &str, old_position: i64, new_position: i64) -> ActionResult<Progression> {
        let progression = self.builder.reorder_slots(id, old_position, new_position).await?;
        Ok(self.slots_changed(progression).await)
    }

    pub async fn replace_slots(&self, id: &str, slots: Vec<Slot>) -> ActionResult<Progression> {
        let progression = self.builder.replace_slots(id, slots).await?;
        Ok(self.slots_changed(progression).await)
    }

    pub async fn rename_progression(&self, id: &str, name: &str) -> ActionResult<Progression> {
        let progression = self.builder.rename_progression(id, name).await?;
        self.publish(ActionEvent::ProgressionRenamed {
            progression_id: progression.id.clone(),
            name: progression.name.clone(),
        })
        .await;
        Ok(progression)
    }

    pub async fn delete_progression(&self, id: &str) -> ActionResult<()> {
        self.builder.delete_progression(id).await?;
        self.publish(ActionEvent::ProgressionDeleted {
            progression_id: id.to_string(),
        })
        .await;
        Ok(())
    }

    pub async fn get_progression(&self, id: &str) -> ActionResult<Progression> {
        Ok(self.builder.get_progression(id).await?)
    }

    pub async fn list_progressions(&self) -> ActionResult<Vec<ProgressionSummary>> {
        Ok(self.builder.list_progressions().await?)
    }

    // === PlayBack ===

    pub async fn initialize_settings(&self, progression_id: &str) -> ActionResult<PlaybackSettings> {
        let settings = self.playback.initialize_settings(progression_id).await?;
        self.publish(ActionEvent::SettingsInitialized {
            progression_id: progression_id.to_string(),
        })
        .await;
        Ok(settings)
    }

    pub async fn set_instrument(&self, progression_id: &str, instrument: &str) -> ActionResult<PlaybackSettings> {
        Ok(self.playback.set_instrument(progression_id, instrument).await?)
    }

    pub async fn set_seconds_per_chord(&self, progression_id: &str, seconds: f64) -> ActionResult<PlaybackSettings> {
        Ok(self.playback.set_seconds_per_chord(progression_id, seconds).await?)
    }

    pub async fn get_playback_settings(&self, progression_id: &str) -> ActionResult<PlaybackSettings> {
        Ok(self.playback.get_playback_settings(progression_id).await?)
    }

    pub async fn delete_settings(&self, progression_id: &str) -> ActionResult<()> {
        Ok(self.playback.delete_settings(progression_id).await?)
    }

    pub fn get_chord_notes(&self, chord: &str) -> ActionResult<Vec<String>> {
        Ok(self.playback.get_chord_notes(chord)?)
    }

    pub fn get_progression_notes(&self, chords: &[String]) -> ActionResult<Vec<Vec<String>>> {
        Ok(self.playback.get_progression_notes(chords)?)
    }

    // === SuggestChord ===

    pub async fn initialize_preferences(&self, progression_id: &str) -> ActionResult<SuggestionPreferences> {
        let preferences = self.suggest.initialize_preferences(progression_id).await?;
        self.publish(ActionEvent::PreferencesInitialized {
            progression_id: progression_id.to_string(),
        })
        .await;
        Ok(preferences)
    }

    pub async fn get_suggestion_preferences(&self, progression_id: &str) -> ActionResult<SuggestionPreferences> {
        Ok(self.suggest.get_suggestion_preferences(progression_id).await?)
    }

    pub async fn set_genre(&self, progression_id: &str, genre: &str) -> ActionResult<SuggestionPreferences> {
        Ok(self.suggest.set_genre(progression_id, genre).await?)
    }

    pub async fn set_complexity(&self, progression_id: &str, complexity: &str) -> ActionResult<SuggestionPreferences> {
        Ok(self.suggest.set_complexity(progression_id, complexity).await?)
    }

    pub async fn set_key(&self, progression_id: &str, key: &str) -> ActionResult<SuggestionPreferences> {
        Ok(self.suggest.set_key(progression_id, key).await?)
    }

    pub async fn delete_preferences(&self, progression_id: &str) -> ActionResult<()> {
        Ok(self.suggest.delete_preferences(progression_id).await?)
    }

    pub async fn suggest_chord(
        &self,
        progression_id: &str,
        chords: &[Option<String>],
        position: i64,
    ) -> ActionResult<Vec<String>> {
        let suggestions = self.suggest.suggest_chord(progression_id, chords, position).await?;
        self.publish(ActionEvent::SuggestionsProduced {
            progression_id: progression_id.to_string(),
            kind: "chord".to_string(),
            count: suggestions.len(),
        })
        .await;
        Ok(suggestions)
    }

    pub async fn suggest_progression(&self, progression_id: &str, length: i64) -> ActionResult<Vec<Vec<String>>> {
        let progressions = self.suggest.suggest_progression(progression_id, length).await?;
        self.publish(ActionEvent::SuggestionsProduced {
            progression_id: progression_id.to_string(),
            kind: "progression".to_string(),
            count: progressions.len(),
        })
        .await;
        Ok(progressions)
    }

    /// Stop the store actor
    pub async fn shutdown(&self) -> ActionResult<()> {
        info!("App shutting down");
        Ok(self.state.shutdown().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::llm::client::mock::MockLlmClient;

    fn app_with(mock: MockLlmClient) -> App {
        App::in_memory(Arc::new(mock)).unwrap()
    }

    #[tokio::test]
    async fn test_create_runs_follow_ups() {
        let app = app_with(MockLlmClient::new(vec![]));
        let mut rx = app.subscribe();

        let progression = app.create_progression("P").await.unwrap();
        let settings = app.get_playback_settings(&progression.id).await.unwrap();
        assert_eq!(settings.seconds_per_chord, 1.0);
        let prefs = app.get_suggestion_preferences(&progression.id).await.unwrap();
        assert_eq!(prefs.genre, "Pop");

        let mut seen = Vec::new();
        while let Ok(event) = rx.try_recv() {
            seen.push(event.event_type());
        }
        assert_eq!(
            seen,
            vec!["ProgressionCreated", "SettingsInitialized", "PreferencesInitialized"]
        );
    }

    #[tokio::test]
    async fn test_manual_initialize_after_sync_fails() {
        let app = app_with(MockLlmClient::new(vec![]));
        let id = app.create_progression("P").await.unwrap().id;

        let err = app.initialize_settings(&id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::AlreadyExists);
        let err = app.initialize_preferences(&id).await.unwrap_err();
        assert_eq!(err.message, format!("Preferences for progression {} already exist.", id));
    }

    #[tokio::test]
    async fn test_delete_cleans_up() {
        let app = app_with(MockLlmClient::new(vec![]));
        let id = app.create_progression("P").await.unwrap().id;
        app.delete_progression(&id).await.unwrap();

        assert_eq!(app.get_progression(&id).await.unwrap_err().kind, ErrorKind::NotFound);
        assert_eq!(app.get_playback_settings(&id).await.unwrap_err().kind, ErrorKind::NotFound);
        assert_eq!(
            app.get_suggestion_preferences(&id).await.unwrap_err().kind,
            ErrorKind::NotFound
        );
    }

    #[tokio::test]
    async fn test_suggestions_through_facade() {
        let app = app_with(MockLlmClient::with_texts(&["Am, F"]));
        let id = app.create_progression("P").await.unwrap().id;
        let progression = app.add_slot(&id).await.unwrap();

        let result = app.suggest_chord(&id, &progression.chords(), 0).await.unwrap();
        assert_eq!(result, vec!["Am", "F"]);
    }

    #[tokio::test]
    async fn test_errors_serialize() {
        let app = app_with(MockLlmClient::new(vec![]));
        let err = app.add_slot("nope").await.unwrap_err();
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["error"], "Progression with ID nope not found.");
    }
}
