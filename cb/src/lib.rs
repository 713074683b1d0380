//! ChordBuilder - chord progressions with LLM suggestions
//!
//! Three concepts share one document store:
//! - [`builder::ProgressionBuilder`] - progressions and their slots
//! - [`playback::PlayBack`] - instrument, chord duration and note lookup
//! - [`suggest::SuggestChord`] - suggestion preferences and the LLM pipeline
//!
//! [`app::App`] wires them to the event bus and the synchronizer.

pub mod app;
pub mod builder;
pub mod cli;
pub mod config;
pub mod domain;
pub mod editor;
pub mod error;
pub mod events;
pub mod llm;
pub mod playback;
pub mod prompts;
pub mod repl;
pub mod state;
pub mod suggest;
pub mod sync;
pub mod theory;

pub use app::{ActionResult, App};
pub use config::Config;
pub use error::{ActionError, ErrorKind};
