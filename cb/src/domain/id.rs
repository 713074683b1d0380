//! Domain ID generation
//!
//! All IDs use the format: `{6-char-hex}-{type}-{slug}`
//! Example: `019a3f-progression-twelve-bar-blues`

/// Generate a domain ID from type and title
pub fn generate_id(domain_type: &str, title: &str) -> String {
    // Tail of a v7 uuid is random; the head is a coarse timestamp
    let hex = uuid::Uuid::now_v7().simple().to_string();
    let hex_prefix = &hex[hex.len() - 6..];
    let slug = slugify(title);
    if slug.is_empty() {
        format!("{}-{}", hex_prefix, domain_type)
    } else {
        format!("{}-{}-{}", hex_prefix, domain_type, slug)
    }
}

/// Slugify a title for use in IDs
fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        // Apostrophes vanish, everything else non-alphanumeric becomes a hyphen
        .filter_map(|c| {
            if c.is_ascii_alphanumeric() {
                Some(c)
            } else if c == '\'' || c == '\u{2019}' || c == '\u{2018}' {
                None
            } else {
                Some('-')
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_format() {
        let id = generate_id("progression", "Twelve Bar Blues");
        let parts: Vec<&str> = id.splitn(3, '-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), 6);
        assert!(parts[0].chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(parts[1], "progression");
        assert_eq!(parts[2], "twelve-bar-blues");
    }

    #[test]
    fn test_generate_id_unique() {
        let a = generate_id("progression", "Same");
        let b = generate_id("progression", "Same");
        assert!(a.ends_with("-progression-same"));
        assert!(b.ends_with("-progression-same"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_generate_id_empty_title() {
        let id = generate_id("progression", "!!!");
        assert!(id.ends_with("-progression"));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Don't Stop"), "dont-stop");
        assert_eq!(slugify("  I - V - vi - IV  "), "i-v-vi-iv");
        assert_eq!(slugify("Autumn Leaves (Bb)"), "autumn-leaves-bb");
    }
}
