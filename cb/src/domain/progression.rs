//! Progression domain type
//!
//! A progression is a named, ordered sequence of slots. Slot indices are
//! always contiguous `0..len`; every edit that removes or moves a slot
//! shifts the later slots so no gaps ever appear.

use docstore::{Record, now_ms};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::id::generate_id;

/// Positional error for slot operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotError {
    #[error("Invalid position: {0}. Index out of bounds.")]
    OutOfBounds(i64),
}

/// Validate `0 <= position < len`; negative positions are never wrapped
pub fn checked_index(position: i64, len: usize) -> Result<usize, SlotError> {
    if position < 0 {
        return Err(SlotError::OutOfBounds(position));
    }
    let index = position as usize;
    if index >= len {
        return Err(SlotError::OutOfBounds(position));
    }
    Ok(index)
}

/// One positional element of a progression
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// Chord symbol, or None for an empty slot
    pub chord: Option<String>,
}

impl Slot {
    /// An empty slot
    pub fn empty() -> Self {
        Self { chord: None }
    }

    /// A slot holding the given chord
    pub fn with_chord(chord: impl Into<String>) -> Self {
        Self {
            chord: Some(chord.into()),
        }
    }

    /// Whether a chord is assigned
    pub fn is_empty(&self) -> bool {
        self.chord.is_none()
    }
}

/// Id and name of a stored progression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionSummary {
    pub id: String,
    pub name: String,
}

/// A named chord progression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progression {
    pub id: String,
    pub name: String,
    pub chord_sequence: Vec<Slot>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Progression {
    /// Create a new empty progression with a generated id
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let id = generate_id("progression", &name);
        Self::with_id(id, name)
    }

    /// Create a new empty progression with a specific id
    pub fn with_id(id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = now_ms();
        Self {
            id: id.into(),
            name: name.into(),
            chord_sequence: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.chord_sequence.len()
    }

    /// Whether the progression has no slots
    pub fn is_empty(&self) -> bool {
        self.chord_sequence.is_empty()
    }

    /// Chord per slot, in order
    pub fn chords(&self) -> Vec<Option<String>> {
        self.chord_sequence.iter().map(|s| s.chord.clone()).collect()
    }

    pub fn summary(&self) -> ProgressionSummary {
        ProgressionSummary {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }

    /// Append an empty slot
    pub fn add_slot(&mut self) {
        debug!(id = %self.id, len = self.len(), "Progression::add_slot: called");
        self.chord_sequence.push(Slot::empty());
        self.touch();
    }

    /// Assign a chord to the slot at `position`
    pub fn set_chord(&mut self, position: i64, chord: impl Into<String>) -> Result<(), SlotError> {
        debug!(id = %self.id, %position, "Progression::set_chord: called");
        let index = checked_index(position, self.len())?;
        self.chord_sequence[index].chord = Some(chord.into());
        self.touch();
        Ok(())
    }

    /// Clear the chord at `position`; clearing an empty slot is a no-op
    pub fn delete_chord(&mut self, position: i64) -> Result<(), SlotError> {
        debug!(id = %self.id, %position, "Progression::delete_chord: called");
        let index = checked_index(position, self.len())?;
        self.chord_sequence[index].chord = None;
        self.touch();
        Ok(())
    }

    /// Remove the slot at `position`, shifting later slots down by one
    pub fn delete_slot(&mut self, position: i64) -> Result<(), SlotError> {
        debug!(id = %self.id, %position, "Progression::delete_slot: called");
        let index = checked_index(position, self.len())?;
        self.chord_sequence.remove(index);
        self.touch();
        Ok(())
    }

    /// Move the slot at `old` so it ends up at `new` in the resulting sequence
    pub fn reorder_slots(&mut self, old: i64, new: i64) -> Result<(), SlotError> {
        debug!(id = %self.id, %old, %new, "Progression::reorder_slots: called");
        let from = checked_index(old, self.len())?;
        let to = checked_index(new, self.len())?;
        let slot = self.chord_sequence.remove(from);
        self.chord_sequence.insert(to, slot);
        self.touch();
        Ok(())
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        debug!(id = %self.id, name = %self.name, "Progression::rename: called");
        self.touch();
    }

    /// Replace the whole slot sequence
    pub fn replace_slots(&mut self, slots: Vec<Slot>) {
        debug!(id = %self.id, len = slots.len(), "Progression::replace_slots: called");
        self.chord_sequence = slots;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = now_ms();
    }
}

impl Record for Progression {
    fn id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    fn collection_name() -> &'static str {
        "progressions"
    }
}

/// A single mutation applied to a stored progression
///
/// Edits are shipped to the state actor and applied to the current stored
/// document in one read-modify-write step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressionEdit {
    AddSlot,
    SetChord { position: i64, chord: String },
    DeleteChord { position: i64 },
    DeleteSlot { position: i64 },
    Reorder { old: i64, new: i64 },
    Rename { name: String },
    ReplaceSlots { slots: Vec<Slot> },
}

impl ProgressionEdit {
    /// Apply this edit in place
    pub fn apply(self, progression: &mut Progression) -> Result<(), SlotError> {
        match self {
            ProgressionEdit::AddSlot => {
                progression.add_slot();
                Ok(())
            }
            ProgressionEdit::SetChord { position, chord } => progression.set_chord(position, chord),
            ProgressionEdit::DeleteChord { position } => progression.delete_chord(position),
            ProgressionEdit::DeleteSlot { position } => progression.delete_slot(position),
            ProgressionEdit::Reorder { old, new } => progression.reorder_slots(old, new),
            ProgressionEdit::Rename { name } => {
                progression.rename(name);
                Ok(())
            }
            ProgressionEdit::ReplaceSlots { slots } => {
                progression.replace_slots(slots);
                Ok(())
            }
        }
    }

    /// Whether the edit touches the slot sequence (as opposed to metadata)
    pub fn changes_slots(&self) -> bool {
        !matches!(self, ProgressionEdit::Rename { .. })
    }
}
