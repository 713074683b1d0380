//! ProgressionBuilder concept
//!
//! CRUD and slot editing over stored progressions. Each edit is shipped to
//! the state actor as a [`ProgressionEdit`] and applied to the stored
//! document in a single step.

use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{Progression, ProgressionEdit, ProgressionSummary, Slot, SlotError};
use crate::error::{ActionError, ErrorKind};
use crate::state::{StateError, StateManager};

/// Errors from the progression builder
#[derive(Debug, Error)]
pub enum BuilderError {
    #[error("Progression with ID {0} not found.")]
    NotFound(String),

    #[error(transparent)]
    Slot(#[from] SlotError),

    #[error(transparent)]
    State(StateError),
}

impl BuilderError {
    fn from_state(id: &str, e: StateError) -> Self {
        match e {
            StateError::NotFound(_) => BuilderError::NotFound(id.to_string()),
            StateError::Slot(e) => BuilderError::Slot(e),
            other => BuilderError::State(other),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            BuilderError::NotFound(_) => ErrorKind::NotFound,
            BuilderError::Slot(_) => ErrorKind::OutOfRange,
            BuilderError::State(_) => ErrorKind::Internal,
        }
    }
}

impl From<BuilderError> for ActionError {
    fn from(e: BuilderError) -> Self {
        ActionError::from_error(e.kind(), &e)
    }
}

/// Progression store front-end
#[derive(Clone)]
pub struct ProgressionBuilder {
    state: StateManager,
}

impl ProgressionBuilder {
    pub fn new(state: StateManager) -> Self {
        debug!("ProgressionBuilder::new: called");
        Self { state }
    }

    /// Create an empty progression with a fresh id
    pub async fn create_progression(&self, name: &str) -> Result<Progression, BuilderError> {
        debug!(%name, "create_progression: called");
        let progression = Progression::new(name);
        self.state
            .create_progression(progression.clone())
            .await
            .map_err(|e| BuilderError::from_state(&progression.id, e))?;
        info!(id = %progression.id, %name, "Created progression");
        Ok(progression)
    }

    pub async fn add_slot(&self, id: &str) -> Result<Progression, BuilderError> {
        debug!(%id, "add_slot: called");
        self.edit(id, ProgressionEdit::AddSlot).await
    }

    pub async fn set_chord(&self, id: &str, position: i64, chord: &str) -> Result<Progression, BuilderError> {
        debug!(%id, %position, %chord, "set_chord: called");
        self.edit(
            id,
            ProgressionEdit::SetChord {
                position,
                chord: chord.to_string(),
            },
        )
        .await
    }

    pub async fn delete_chord(&self, id: &str, position: i64) -> Result<Progression, BuilderError> {
        debug!(%id, %position, "delete_chord: called");
        self.edit(id, ProgressionEdit::DeleteChord { position }).await
    }

    pub async fn delete_slot(&self, id: &str, position: i64) -> Result<Progression, BuilderError> {
        debug!(%id, %position, "delete_slot: called");
        self.edit(id, ProgressionEdit::DeleteSlot { position }).await
    }

    /// Move the slot at `old_position` so it lands at `new_position`
    pub async fn reorder_slots(&self, id: &str, old_position: i64, new_position: i64) -> Result<Progression, BuilderError> {
        debug!(%id, %old_position, %new_position, "reorder_slots: called");
        self.edit(
            id,
            ProgressionEdit::Reorder {
                old: old_position,
                new: new_position,
            },
        )
        .await
    }

    pub async fn rename_progression(&self, id: &str, name: &str) -> Result<Progression, BuilderError> {
        debug!(%id, %name, "rename_progression: called");
        self.edit(id, ProgressionEdit::Rename { name: name.to_string() })
            .await
    }

    /// Overwrite the whole slot sequence in one write
    pub async fn replace_slots(&self, id: &str, slots: Vec<Slot>) -> Result<Progression, BuilderError> {
        debug!(%id, len = slots.len(), "replace_slots: called");
        self.edit(id, ProgressionEdit::ReplaceSlots { slots }).await
    }

    pub async fn delete_progression(&self, id: &str) -> Result<(), BuilderError> {
        debug!(%id, "delete_progression: called");
        let removed = self
            .state
            .delete_progression(id)
            .await
            .map_err(|e| BuilderError::from_state(id, e))?;
        if !removed {
            return Err(BuilderError::NotFound(id.to_string()));
        }
        info!(%id, "Deleted progression");
        Ok(())
    }

    pub async fn get_progression(&self, id: &str) -> Result<Progression, BuilderError> {
        debug!(%id, "get_progression: called");
        self.state
            .get_progression(id)
            .await
            .map_err(|e| BuilderError::from_state(id, e))?
            .ok_or_else(|| BuilderError::NotFound(id.to_string()))
    }

    /// Id and name of every stored progression, in store order
    pub async fn list_progressions(&self) -> Result<Vec<ProgressionSummary>, BuilderError> {
        debug!("list_progressions: called");
        let progressions = self
            .state
            .list_progressions()
            .await
            .map_err(BuilderError::State)?;
        Ok(progressions.iter().map(Progression::summary).collect())
    }

    async fn edit(&self, id: &str, edit: ProgressionEdit) -> Result<Progression, BuilderError> {
        self.state
            .edit_progression(id, edit)
            .await
            .map_err(|e| BuilderError::from_state(id, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> ProgressionBuilder {
        ProgressionBuilder::new(StateManager::spawn_in_memory().unwrap())
    }

    fn some(chord: &str) -> Option<String> {
        Some(chord.to_string())
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let builder = setup();
        let created = builder.create_progression("My Song").await.unwrap();
        assert!(created.id.contains("-progression-my-song"));
        assert!(created.is_empty());

        let fetched = builder.get_progression(&created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_round_trip_scenario() {
        let builder = setup();
        let id = builder.create_progression("P").await.unwrap().id;
        for _ in 0..3 {
            builder.add_slot(&id).await.unwrap();
        }
        builder.set_chord(&id, 0, "Cmaj7").await.unwrap();
        builder.set_chord(&id, 2, "G7").await.unwrap();
        builder.reorder_slots(&id, 0, 1).await.unwrap();

        let progression = builder.get_progression(&id).await.unwrap();
        assert_eq!(progression.chords(), vec![None, some("Cmaj7"), some("G7")]);
    }

    #[tokio::test]
    async fn test_position_errors() {
        let builder = setup();
        let id = builder.create_progression("P").await.unwrap().id;
        builder.add_slot(&id).await.unwrap();

        let err = builder.set_chord(&id, -1, "C").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid position: -1. Index out of bounds.");
        assert_eq!(err.kind(), ErrorKind::OutOfRange);

        assert!(matches!(builder.delete_chord(&id, 1).await, Err(BuilderError::Slot(_))));
        assert!(matches!(builder.delete_slot(&id, 1).await, Err(BuilderError::Slot(_))));
        assert!(matches!(builder.reorder_slots(&id, 0, 1).await, Err(BuilderError::Slot(_))));
    }

    #[tokio::test]
    async fn test_not_found() {
        let builder = setup();
        let err = builder.add_slot("ghost").await.unwrap_err();
        assert_eq!(err.to_string(), "Progression with ID ghost not found.");
        assert_eq!(err.kind(), ErrorKind::NotFound);

        assert!(matches!(builder.rename_progression("ghost", "x").await, Err(BuilderError::NotFound(_))));
        assert!(matches!(builder.delete_progression("ghost").await, Err(BuilderError::NotFound(_))));
        assert!(matches!(builder.get_progression("ghost").await, Err(BuilderError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_chord_idempotent() {
        let builder = setup();
        let id = builder.create_progression("P").await.unwrap().id;
        builder.add_slot(&id).await.unwrap();
        builder.delete_chord(&id, 0).await.unwrap();
        let progression = builder.delete_chord(&id, 0).await.unwrap();
        assert_eq!(progression.chords(), vec![None]);
    }

    #[tokio::test]
    async fn test_delete_slot_shifts() {
        let builder = setup();
        let id = builder.create_progression("P").await.unwrap().id;
        builder
            .replace_slots(&id, vec![Slot::with_chord("C"), Slot::with_chord("F"), Slot::with_chord("G")])
            .await
            .unwrap();

        let progression = builder.delete_slot(&id, 0).await.unwrap();
        assert_eq!(progression.chords(), vec![some("F"), some("G")]);
    }

    #[tokio::test]
    async fn test_rename_list_delete() {
        let builder = setup();
        let a = builder.create_progression("A").await.unwrap().id;
        let b = builder.create_progression("B").await.unwrap().id;

        builder.rename_progression(&a, "Renamed").await.unwrap();
        let mut names: Vec<_> = builder
            .list_progressions()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["B", "Renamed"]);

        builder.delete_progression(&b).await.unwrap();
        let list = builder.list_progressions().await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, a);
    }
}
