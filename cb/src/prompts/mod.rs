//! Prompt Template System
//!
//! Loads and renders `.pmt` (prompt template) files for the suggestion pipeline.
//!
//! Template loading chain:
//! 1. `{suggestions.prompts-dir}/{name}.pmt` (user override)
//! 2. Embedded fallback in code
//!
//! Templates use Handlebars syntax for variable substitution.

pub mod embedded;
mod loader;

pub use loader::{ChordPromptContext, EMPTY_SLOT, ProgressionPromptContext, PromptLoader};
