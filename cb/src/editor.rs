//! Cursor-based slot editor
//!
//! In-memory editing of one progression's slots with a single optional
//! selection. Nothing is persisted until the caller writes [`SlotEditor::slots`]
//! back.
//!
//! Invariants:
//! - `selected`, when present, is always `< slots.len()`
//! - removing the selected slot clears the selection

use thiserror::Error;
use tracing::debug;

use crate::domain::{Progression, Slot, SlotError, checked_index};

/// Errors from cursor operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("No slot is selected.")]
    NoSelection,

    #[error("Cannot select a slot: the progression has no slots.")]
    NoSlots,

    #[error(transparent)]
    Slot(#[from] SlotError),
}

/// Slot sequence plus selection cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotEditor {
    slots: Vec<Slot>,
    selected: Option<usize>,
    dirty: bool,
}

impl SlotEditor {
    pub fn new(slots: Vec<Slot>) -> Self {
        Self {
            slots,
            selected: None,
            dirty: false,
        }
    }

    pub fn from_progression(progression: &Progression) -> Self {
        debug!(id = %progression.id, len = progression.len(), "SlotEditor::from_progression: called");
        Self::new(progression.chord_sequence.clone())
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn chords(&self) -> Vec<Option<String>> {
        self.slots.iter().map(|s| s.chord.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Chord in the selected slot, if both exist
    pub fn selected_chord(&self) -> Option<&str> {
        self.selected
            .and_then(|i| self.slots.get(i))
            .and_then(|s| s.chord.as_deref())
    }

    /// Whether edits were made since load or the last [`mark_saved`](Self::mark_saved)
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Toggle selection of `index`
    ///
    /// Selecting the selected slot clears the selection; any other valid
    /// index replaces it. Returns the new selection.
    pub fn select(&mut self, index: i64) -> Result<Option<usize>, EditorError> {
        debug!(%index, selected = ?self.selected, "SlotEditor::select: called");
        if self.slots.is_empty() {
            return Err(EditorError::NoSlots);
        }
        let index = checked_index(index, self.slots.len())?;
        self.selected = match self.selected {
            Some(current) if current == index => None,
            _ => Some(index),
        };
        Ok(self.selected)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn set_chord(&mut self, chord: impl Into<String>) -> Result<(), EditorError> {
        let index = self.require_selection()?;
        self.slots[index].chord = Some(chord.into());
        self.dirty = true;
        Ok(())
    }

    pub fn delete_chord(&mut self) -> Result<(), EditorError> {
        let index = self.require_selection()?;
        self.slots[index].chord = None;
        self.dirty = true;
        Ok(())
    }

    /// Append an empty slot and return its index
    pub fn add_slot(&mut self) -> usize {
        self.slots.push(Slot::empty());
        self.dirty = true;
        self.slots.len() - 1
    }

    /// Remove the selected slot; the selection is always cleared
    pub fn delete_slot(&mut self) -> Result<Slot, EditorError> {
        let index = self.require_selection()?;
        let removed = self.slots.remove(index);
        self.selected = None;
        self.dirty = true;
        Ok(removed)
    }

    /// Move the selected slot to `to`; the selection follows it
    pub fn move_selected(&mut self, to: i64) -> Result<usize, EditorError> {
        let from = self.require_selection()?;
        let to = checked_index(to, self.slots.len())?;
        let slot = self.slots.remove(from);
        self.slots.insert(to, slot);
        self.selected = Some(to);
        self.dirty = true;
        Ok(to)
    }

    fn require_selection(&self) -> Result<usize, EditorError> {
        self.selected
            .filter(|&i| i < self.slots.len())
            .ok_or(EditorError::NoSelection)
    }
}
