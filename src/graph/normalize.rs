fn is_key_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-'
}

/// Map an entity name to its canonical graph key.
///
/// Lowercases, trims whitespace and any leading or trailing characters outside
/// `[a-z0-9_-]`, then replaces every remaining character outside that set with
/// `_`. Total and idempotent; insertion and seed lookup both go through here so
/// they always agree on identity.
pub fn normalize_identifier(text: &str) -> String {
    text.to_lowercase()
        .trim_matches(|c: char| !is_key_char(c))
        .chars()
        .map(|c| if is_key_char(c) { c } else { '_' })
        .collect()
}
