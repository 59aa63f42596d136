use rand::{Rng, thread_rng};

pub const DEFAULT_FILE_NAME_PREFIX: &str = "dalle3";
pub const DEFAULT_SESSION_CODE_LENGTH: usize = 5;
pub const LABEL_COMPONENT_MAX_LEN: usize = 48;
const SESSION_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Slug used inside variant labels: lowercase with spaces turned into hyphens.
///
/// Only the space character is rewritten. Punctuation is kept so that the
/// label still reads like the option the user typed.
pub fn label_slug(input: &str) -> String {
    input.to_lowercase().replace(' ', "-")
}

/// Builds planned file names for one run of the CLI.
#[derive(Debug, Clone)]
pub struct ImageNameContext {
    base: String,
}

impl ImageNameContext {
    pub fn new(prefix: &str, session_code: &str) -> Self {
        let prefix = slugify(prefix).unwrap_or_else(|| DEFAULT_FILE_NAME_PREFIX.to_string());
        Self {
            base: format!("{prefix}-{session_code}"),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// `index` is 1-based, matching how variants are shown to the user.
    pub fn file_stem(&self, index: usize, label: &str) -> String {
        match component_token(label) {
            Some(token) => format!("{}_{index:03}_{token}", self.base),
            None => format!("{}_{index:03}", self.base),
        }
    }
}

pub fn component_token(input: &str) -> Option<String> {
    slugify(input).map(|slug| truncate_component(&slug, LABEL_COMPONENT_MAX_LEN))
}

/// File-safe slug. Underscores survive so label fragment boundaries stay visible.
pub fn slugify(input: &str) -> Option<String> {
    let mut slug = String::new();
    let mut last_was_separator = false;

    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            slug.push(ch.to_ascii_lowercase());
            last_was_separator = false;
        } else if !last_was_separator && !slug.is_empty() {
            slug.push('-');
            last_was_separator = true;
        }
    }

    let slug = slug.trim_matches(|c: char| c == '-' || c == '_').to_string();
    if slug.is_empty() { None } else { Some(slug) }
}

pub fn truncate_component(slug: &str, max_len: usize) -> String {
    if slug.len() <= max_len {
        return slug.to_string();
    }

    let truncated: String = slug.chars().take(max_len).collect();
    let trimmed = truncated
        .trim_end_matches(|c: char| c == '-' || c == '_')
        .to_string();
    if trimmed.is_empty() {
        truncated
    } else {
        trimmed
    }
}

/// Random identifier shared by every image planned in one run.
pub fn session_code(length: usize) -> String {
    let mut rng = thread_rng();
    (0..length)
        .map(|_| char::from(SESSION_ALPHABET[rng.gen_range(0..SESSION_ALPHABET.len())]))
        .collect()
}

pub fn trimmed_or_none(input: Option<&str>) -> Option<&str> {
    input.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_slug_only_rewrites_spaces() {
        assert_eq!(label_slug("Camera Angle"), "camera-angle");
        assert_eq!(label_slug("Low, Wide"), "low,-wide");
    }

    #[test]
    fn slugify_keeps_label_separators() {
        let slug = slugify("mood-sacred_camera-angle-low");
        assert_eq!(slug.as_deref(), Some("mood-sacred_camera-angle-low"));
    }

    #[test]
    fn slugify_collapses_unsafe_characters() {
        let slug = slugify("texture-rough/ish, really");
        assert_eq!(slug.as_deref(), Some("texture-rough-ish-really"));
    }

    #[test]
    fn truncate_component_drops_dangling_separator() {
        assert_eq!(truncate_component("abcd-efgh", 5), "abcd");
        assert_eq!(truncate_component("short", 10), "short");
    }

    #[test]
    fn file_stem_pads_index_and_appends_label() {
        let context = ImageNameContext::new(DEFAULT_FILE_NAME_PREFIX, "ab12c");
        assert_eq!(context.base(), "dalle3-ab12c");
        assert_eq!(context.file_stem(2, "single"), "dalle3-ab12c_002_single");
        assert_eq!(context.file_stem(12, "  "), "dalle3-ab12c_012");
    }

    #[test]
    fn blank_prefix_falls_back_to_default() {
        let context = ImageNameContext::new("   ", "zzzzz");
        assert_eq!(context.base(), "dalle3-zzzzz");
    }

    #[test]
    fn session_code_uses_lowercase_alphanumerics() {
        let code = session_code(DEFAULT_SESSION_CODE_LENGTH);
        assert_eq!(code.len(), DEFAULT_SESSION_CODE_LENGTH);
        assert!(
            code.chars()
                .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit())
        );
    }
}
