//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// Chord suggestion prompt
pub const SUGGEST_CHORD: &str = include_str!("../../prompts/suggest-chord.pmt");

/// Progression suggestion prompt
pub const SUGGEST_PROGRESSION: &str = include_str!("../../prompts/suggest-progression.pmt");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "suggest-chord" => Some(SUGGEST_CHORD),
        "suggest-progression" => Some(SUGGEST_PROGRESSION),
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_embedded_suggest_chord() {
        let prompt = get_embedded("suggest-chord").unwrap();
        assert!(prompt.contains("Suggest {{count}} musically appropriate chords"));
        assert!(prompt.contains("{{progression}}"));
        assert!(prompt.contains("comma-separated"));
    }

    #[test]
    fn test_get_embedded_suggest_progression() {
        let prompt = get_embedded("suggest-progression").unwrap();
        assert!(prompt.contains("Generate {{count}} distinct, musically coherent chord progressions"));
        assert!(prompt.contains("{{length}}"));
    }

    #[test]
    fn test_get_embedded_unknown() {
        assert!(get_embedded("unknown-template").is_none());
    }
}
