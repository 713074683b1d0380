//! Prompt Loader
//!
//! Loads prompt templates from an override directory or falls back to
//! embedded defaults.

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::{debug, info};

use super::embedded;

/// Placeholder rendered for a slot with no chord
pub const EMPTY_SLOT: &str = "_";

/// Context for the chord suggestion template
#[derive(Debug, Clone, Serialize)]
pub struct ChordPromptContext {
    /// Space-separated chords, empty slots as `_`
    pub progression: String,
    pub position: usize,
    /// Chord currently at the target position (or `_`)
    pub current: String,
    pub genre: String,
    pub complexity: String,
    pub key: String,
    pub count: usize,
}

impl ChordPromptContext {
    /// Render a chord context line, empty slots as the placeholder
    pub fn render_chords(chords: &[Option<String>]) -> String {
        chords
            .iter()
            .map(|c| c.as_deref().unwrap_or(EMPTY_SLOT))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Context for the progression suggestion template
#[derive(Debug, Clone, Serialize)]
pub struct ProgressionPromptContext {
    pub genre: String,
    pub complexity: String,
    pub key: String,
    pub count: usize,
    pub length: usize,
}

/// Loads and renders prompt templates
pub struct PromptLoader {
    /// Handlebars template engine
    hbs: Handlebars<'static>,
    /// User override directory holding `{name}.pmt` files
    override_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a new prompt loader with an optional override directory
    pub fn new(override_dir: Option<&Path>) -> Self {
        debug!(?override_dir, "PromptLoader::new: called");
        let override_dir = override_dir.and_then(|dir| {
            if dir.is_dir() {
                debug!("PromptLoader::new: override directory found");
                Some(dir.to_path_buf())
            } else {
                debug!("PromptLoader::new: override directory missing, using embedded only");
                None
            }
        });

        Self {
            hbs: Self::engine(),
            override_dir,
        }
    }

    /// Create a loader that only uses embedded prompts
    pub fn embedded_only() -> Self {
        debug!("PromptLoader::embedded_only: called");
        Self {
            hbs: Self::engine(),
            override_dir: None,
        }
    }

    fn engine() -> Handlebars<'static> {
        let mut hbs = Handlebars::new();
        // Chord symbols like "F#m7/A" must reach the model verbatim
        hbs.register_escape_fn(handlebars::no_escape);
        hbs
    }

    /// Load a template by name
    ///
    /// Checks the override directory first, then the embedded fallback.
    fn load_template(&self, name: &str) -> Result<String> {
        debug!(%name, "PromptLoader::load_template: called");
        if let Some(ref dir) = self.override_dir {
            let path = dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!(?path, "PromptLoader::load_template: found in override directory");
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read prompt {}: {}", path.display(), e));
            }
            debug!(?path, "PromptLoader::load_template: not in override directory");
        }

        if let Some(content) = embedded::get_embedded(name) {
            debug!(%name, "PromptLoader::load_template: found in embedded");
            return Ok(content.to_string());
        }

        debug!(%name, "PromptLoader::load_template: not found anywhere");
        Err(eyre!("Prompt template not found: {}", name))
    }

    /// Render a template with the given context
    pub fn render<C: Serialize>(&self, template_name: &str, context: &C) -> Result<String> {
        debug!(%template_name, "PromptLoader::render: called");
        let template = self.load_template(template_name)?;
        info!("Rendering template '{}'", template_name);

        self.hbs
            .render_template(&template, context)
            .map_err(|e| eyre!("Failed to render template {}: {}", template_name, e))
    }
}
