//! StateManager - actor that owns the document store
//!
//! Processes commands via channels for thread-safe access to persistent state.
//! Each command is handled to completion before the next is received, so every
//! edit is an atomic read-modify-write of a single document.

use std::path::Path;

use docstore::{Record, Store};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::domain::{
    PlaybackSettings, PreferencesChange, Progression, ProgressionEdit, SettingsChange, SuggestionPreferences,
};

use super::messages::{StateCommand, StateError, StateResponse};

/// Command channel depth
const CHANNEL_CAPACITY: usize = 256;

/// Handle to send commands to the StateManager
#[derive(Clone)]
pub struct StateManager {
    tx: mpsc::Sender<StateCommand>,
}

impl StateManager {
    /// Spawn a new StateManager actor over an on-disk store
    pub fn spawn(store_path: impl AsRef<Path>) -> eyre::Result<Self> {
        debug!(store_path = %store_path.as_ref().display(), "spawn: called");
        let store = Store::open(store_path.as_ref())?;
        Ok(Self::spawn_with_store(store))
    }

    /// Spawn a StateManager over a fresh in-memory store
    pub fn spawn_in_memory() -> eyre::Result<Self> {
        debug!("spawn_in_memory: called");
        let store = Store::open_in_memory()?;
        Ok(Self::spawn_with_store(store))
    }

    fn spawn_with_store(store: Store) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        tokio::spawn(actor_loop(store, rx));
        info!("StateManager spawned");
        Self { tx }
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<StateResponse<T>>) -> StateCommand) -> StateResponse<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(build(reply_tx))
            .await
            .map_err(|_| StateError::ChannelError)?;
        reply_rx.await.map_err(|_| StateError::ChannelError)?
    }

    // === Progression operations ===

    /// Store a new progression
    pub async fn create_progression(&self, progression: Progression) -> StateResponse<String> {
        debug!(id = %progression.id, name = %progression.name, "create_progression: called");
        self.request(|reply| StateCommand::CreateProgression { progression, reply })
            .await
    }

    /// Get a progression by ID
    pub async fn get_progression(&self, id: &str) -> StateResponse<Option<Progression>> {
        debug!(%id, "get_progression: called");
        self.request(|reply| StateCommand::GetProgression {
            id: id.to_string(),
            reply,
        })
        .await
    }

    /// Apply an edit to the stored progression and return the updated record
    pub async fn edit_progression(&self, id: &str, edit: ProgressionEdit) -> StateResponse<Progression> {
        debug!(%id, ?edit, "edit_progression: called");
        self.request(|reply| StateCommand::EditProgression {
            id: id.to_string(),
            edit,
            reply,
        })
        .await
    }

    /// Delete a progression; returns whether it existed
    pub async fn delete_progression(&self, id: &str) -> StateResponse<bool> {
        debug!(%id, "delete_progression: called");
        self.request(|reply| StateCommand::DeleteProgression {
            id: id.to_string(),
            reply,
        })
        .await
    }

    /// List all progressions
    pub async fn list_progressions(&self) -> StateResponse<Vec<Progression>> {
        debug!("list_progressions: called");
        self.request(|reply| StateCommand::ListProgressions { reply }).await
    }

    // === Playback settings operations ===

    /// Store new settings; fails if settings already exist for the progression
    pub async fn create_settings(&self, settings: PlaybackSettings) -> StateResponse<()> {
        debug!(progression_id = %settings.progression_id, "create_settings: called");
        self.request(|reply| StateCommand::CreateSettings { settings, reply })
            .await
    }

    pub async fn get_settings(&self, progression_id: &str) -> StateResponse<Option<PlaybackSettings>> {
        debug!(%progression_id, "get_settings: called");
        self.request(|reply| StateCommand::GetSettings {
            progression_id: progression_id.to_string(),
            reply,
        })
        .await
    }

    pub async fn update_settings(&self, progression_id: &str, change: SettingsChange) -> StateResponse<PlaybackSettings> {
        debug!(%progression_id, ?change, "update_settings: called");
        self.request(|reply| StateCommand::UpdateSettings {
            progression_id: progression_id.to_string(),
            change,
            reply,
        })
        .await
    }

    pub async fn delete_settings(&self, progression_id: &str) -> StateResponse<bool> {
        debug!(%progression_id, "delete_settings: called");
        self.request(|reply| StateCommand::DeleteSettings {
            progression_id: progression_id.to_string(),
            reply,
        })
        .await
    }

    // === Suggestion preferences operations ===

    /// Store new preferences; fails if preferences already exist for the progression
    pub async fn create_preferences(&self, preferences: SuggestionPreferences) -> StateResponse<()> {
        debug!(progression_id = %preferences.progression_id, "create_preferences: called");
        self.request(|reply| StateCommand::CreatePreferences { preferences, reply })
            .await
    }

    pub async fn get_preferences(&self, progression_id: &str) -> StateResponse<Option<SuggestionPreferences>> {
        debug!(%progression_id, "get_preferences: called");
        self.request(|reply| StateCommand::GetPreferences {
            progression_id: progression_id.to_string(),
            reply,
        })
        .await
    }

    pub async fn update_preferences(
        &self,
        progression_id: &str,
        change: PreferencesChange,
    ) -> StateResponse<SuggestionPreferences> {
        debug!(%progression_id, ?change, "update_preferences: called");
        self.request(|reply| StateCommand::UpdatePreferences {
            progression_id: progression_id.to_string(),
            change,
            reply,
        })
        .await
    }

    pub async fn delete_preferences(&self, progression_id: &str) -> StateResponse<bool> {
        debug!(%progression_id, "delete_preferences: called");
        self.request(|reply| StateCommand::DeletePreferences {
            progression_id: progression_id.to_string(),
            reply,
        })
        .await
    }

    /// Shutdown the StateManager actor
    pub async fn shutdown(&self) -> Result<(), StateError> {
        debug!("shutdown: called");
        self.tx
            .send(StateCommand::Shutdown)
            .await
            .map_err(|_| StateError::ChannelError)
    }
}

fn store_error(e: eyre::Report) -> StateError {
    StateError::StoreError(e.to_string())
}

/// Insert a record whose id must not already be taken
fn create_unique<T: Record>(store: &mut Store, record: T) -> StateResponse<String> {
    let id = record.id().to_string();
    if store.get::<T>(&id).map_err(store_error)?.is_some() {
        debug!(%id, collection = T::collection_name(), "create_unique: already exists");
        return Err(StateError::AlreadyExists(id));
    }
    store.create(record).map_err(store_error)
}

/// Load, mutate and write back a single record
fn modify<T, F>(store: &mut Store, id: &str, mutate: F) -> StateResponse<T>
where
    T: Record,
    F: FnOnce(&mut T) -> StateResponse<()>,
{
    let mut record: T = store
        .get(id)
        .map_err(store_error)?
        .ok_or_else(|| StateError::NotFound(id.to_string()))?;
    mutate(&mut record)?;
    store.update(record.clone()).map_err(store_error)?;
    Ok(record)
}

/// The actor loop that processes commands
async fn actor_loop(mut store: Store, mut rx: mpsc::Receiver<StateCommand>) {
    debug!("actor_loop: called");
    debug!("StateManager actor started");

    while let Some(cmd) = rx.recv().await {
        match cmd {
            StateCommand::CreateProgression { progression, reply } => {
                debug!(id = %progression.id, "actor_loop: CreateProgression command");
                let _ = reply.send(create_unique(&mut store, progression));
            }

            StateCommand::GetProgression { id, reply } => {
                debug!(%id, "actor_loop: GetProgression command");
                let result: StateResponse<Option<Progression>> = store.get(&id).map_err(store_error);
                let _ = reply.send(result);
            }

            StateCommand::EditProgression { id, edit, reply } => {
                debug!(%id, ?edit, "actor_loop: EditProgression command");
                let result = modify(&mut store, &id, |p: &mut Progression| {
                    edit.apply(p).map_err(StateError::from)
                });
                let _ = reply.send(result);
            }

            StateCommand::DeleteProgression { id, reply } => {
                debug!(%id, "actor_loop: DeleteProgression command");
                let _ = reply.send(store.delete::<Progression>(&id).map_err(store_error));
            }

            StateCommand::ListProgressions { reply } => {
                debug!("actor_loop: ListProgressions command");
                let _ = reply.send(store.list::<Progression>().map_err(store_error));
            }

            StateCommand::CreateSettings { settings, reply } => {
                debug!(progression_id = %settings.progression_id, "actor_loop: CreateSettings command");
                let _ = reply.send(create_unique(&mut store, settings).map(|_| ()));
            }

            StateCommand::GetSettings { progression_id, reply } => {
                debug!(%progression_id, "actor_loop: GetSettings command");
                let result: StateResponse<Option<PlaybackSettings>> = store.get(&progression_id).map_err(store_error);
                let _ = reply.send(result);
            }

            StateCommand::UpdateSettings {
                progression_id,
                change,
                reply,
            } => {
                debug!(%progression_id, ?change, "actor_loop: UpdateSettings command");
                let result = modify(&mut store, &progression_id, |s: &mut PlaybackSettings| {
                    s.apply(change);
                    Ok(())
                });
                let _ = reply.send(result);
            }

            StateCommand::DeleteSettings { progression_id, reply } => {
                debug!(%progression_id, "actor_loop: DeleteSettings command");
                let _ = reply.send(store.delete::<PlaybackSettings>(&progression_id).map_err(store_error));
            }

            StateCommand::CreatePreferences { preferences, reply } => {
                debug!(progression_id = %preferences.progression_id, "actor_loop: CreatePreferences command");
                let _ = reply.send(create_unique(&mut store, preferences).map(|_| ()));
            }

            StateCommand::GetPreferences { progression_id, reply } => {
                debug!(%progression_id, "actor_loop: GetPreferences command");
                let result: StateResponse<Option<SuggestionPreferences>> =
                    store.get(&progression_id).map_err(store_error);
                let _ = reply.send(result);
            }

            StateCommand::UpdatePreferences {
                progression_id,
                change,
                reply,
            } => {
                debug!(%progression_id, ?change, "actor_loop: UpdatePreferences command");
                let result = modify(&mut store, &progression_id, |p: &mut SuggestionPreferences| {
                    p.apply(change);
                    Ok(())
                });
                let _ = reply.send(result);
            }

            StateCommand::DeletePreferences { progression_id, reply } => {
                debug!(%progression_id, "actor_loop: DeletePreferences command");
                let _ = reply.send(
                    store
                        .delete::<SuggestionPreferences>(&progression_id)
                        .map_err(store_error),
                );
            }

            StateCommand::Shutdown => {
                debug!("actor_loop: Shutdown command");
                info!("StateManager shutting down");
                break;
            }
        }
    }

    debug!("StateManager actor stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Instrument, SlotError};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_state_manager_progression_crud() {
        let temp = tempdir().unwrap();
        let manager = StateManager::spawn(temp.path()).unwrap();

        // Create
        let progression = Progression::with_id("p1", "Test");
        let id = manager.create_progression(progression).await.unwrap();
        assert_eq!(id, "p1");

        // Edit
        manager.edit_progression("p1", ProgressionEdit::AddSlot).await.unwrap();
        let updated = manager
            .edit_progression(
                "p1",
                ProgressionEdit::SetChord {
                    position: 0,
                    chord: "Dm7".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.chords(), vec![Some("Dm7".to_string())]);

        // Get
        let retrieved = manager.get_progression("p1").await.unwrap().unwrap();
        assert_eq!(retrieved, updated);

        // List
        assert_eq!(manager.list_progressions().await.unwrap().len(), 1);

        // Delete
        assert!(manager.delete_progression("p1").await.unwrap());
        assert!(!manager.delete_progression("p1").await.unwrap());
        assert!(manager.get_progression("p1").await.unwrap().is_none());

        manager.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_edit_missing_progression() {
        let manager = StateManager::spawn_in_memory().unwrap();
        let result = manager.edit_progression("nope", ProgressionEdit::AddSlot).await;
        assert!(matches!(result, Err(StateError::NotFound(id)) if id == "nope"));
    }

    #[tokio::test]
    async fn test_failed_edit_is_not_persisted() {
        let manager = StateManager::spawn_in_memory().unwrap();
        manager
            .create_progression(Progression::with_id("p1", "Test"))
            .await
            .unwrap();
        manager.edit_progression("p1", ProgressionEdit::AddSlot).await.unwrap();

        let result = manager
            .edit_progression("p1", ProgressionEdit::DeleteSlot { position: 3 })
            .await;
        assert!(matches!(result, Err(StateError::Slot(SlotError::OutOfBounds(3)))));

        let stored = manager.get_progression("p1").await.unwrap().unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn test_settings_create_twice() {
        let manager = StateManager::spawn_in_memory().unwrap();
        manager.create_settings(PlaybackSettings::new("p1")).await.unwrap();
        manager
            .update_settings("p1", SettingsChange::Instrument(Instrument::Guitar))
            .await
            .unwrap();

        let second = manager.create_settings(PlaybackSettings::new("p1")).await;
        assert!(matches!(second, Err(StateError::AlreadyExists(_))));

        // The failed create did not reset the record
        let stored = manager.get_settings("p1").await.unwrap().unwrap();
        assert_eq!(stored.instrument, Instrument::Guitar);
    }

    #[tokio::test]
    async fn test_preferences_update_and_delete() {
        let manager = StateManager::spawn_in_memory().unwrap();
        assert!(matches!(
            manager
                .update_preferences("p1", PreferencesChange::Genre("Jazz".to_string()))
                .await,
            Err(StateError::NotFound(_))
        ));

        manager
            .create_preferences(SuggestionPreferences::new("p1"))
            .await
            .unwrap();
        let prefs = manager
            .update_preferences("p1", PreferencesChange::Genre("Jazz".to_string()))
            .await
            .unwrap();
        assert_eq!(prefs.genre, "Jazz");

        assert!(manager.delete_preferences("p1").await.unwrap());
        assert!(manager.get_preferences("p1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_shutdown_closes_channel() {
        let manager = StateManager::spawn_in_memory().unwrap();
        manager.shutdown().await.unwrap();
        tokio::task::yield_now().await;

        let result = manager.list_progressions().await;
        assert!(matches!(result, Err(StateError::ChannelError)));
    }
}
