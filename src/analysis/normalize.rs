//! Normalization of values and keys to the index alphabet.

/// Lowercase letters and digits survive; every other run of characters
/// collapses to one space. Trailing space is trimmed.
///
/// ```
/// use quiver::analysis::normalize_string;
///
/// assert_eq!(normalize_string("Hello,  World!"), "hello world");
/// ```
pub fn normalize_string(value: &str) -> String {
    let mut result = String::with_capacity(value.len());

    for c in value.chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c.to_ascii_lowercase());
        } else if !result.is_empty() && !result.ends_with(' ') {
            result.push(' ');
        }
    }

    if result.ends_with(' ') {
        result.pop();
    }
    result
}

/// Canonical form of an index key: printable ASCII without whitespace,
/// lowercased.
pub fn build_index_string(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_ascii_graphic())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

pub fn contains_vowel(value: &str) -> bool {
    value
        .chars()
        .any(|c| matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u' | 'y'))
}

pub fn contains_alphabetic(value: &str) -> bool {
    value.chars().any(|c| c.is_ascii_alphabetic())
}
