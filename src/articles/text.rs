//! Text helpers shared by the article and category services.

/// Number of content characters read per minute.
const CHARS_PER_MINUTE: usize = 600;

/// Maximum length of a single tag, in characters.
pub const MAX_TAG_LEN: usize = 50;

/// Derive a URL-safe slug: accents stripped, lowercase, words joined by `-`.
///
/// `"Développement Web"` becomes `"developpement-web"`.
pub fn slugify(text: &str) -> String {
    slug::slugify(text.trim())
}

/// A slug is one or more groups of `[a-z0-9]` joined by single hyphens.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.split('-').all(|part| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        })
}

/// Estimated reading time in minutes, `ceil(chars / 600)`.
pub fn reading_time(content: &str) -> i64 {
    let chars = content.chars().count();
    chars.div_ceil(CHARS_PER_MINUTE) as i64
}

/// Trim, drop empties, cap length and deduplicate case-insensitively,
/// keeping the first spelling and the original order.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = std::collections::HashSet::new();
    let mut normalized = Vec::new();

    for tag in tags {
        let tag: String = tag.as_ref().trim().chars().take(MAX_TAG_LEN).collect();
        let tag = tag.trim_end().to_string();
        if tag.is_empty() {
            continue;
        }
        if seen.insert(tag.to_lowercase()) {
            normalized.push(tag);
        }
    }

    normalized
}
