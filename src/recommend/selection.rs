use regex::Regex;
use std::sync::OnceLock;

use crate::llm::fenced_block;

/// Outcome of reading a place-name list out of free generation text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The response held a JSON array of names.
    Parsed(Vec<String>),
    /// Nothing usable; the caller keeps every candidate.
    Fallback,
}

impl Selection {
    /// Kept names, or all of `candidates` on fallback.
    pub fn resolve(self, candidates: &[String]) -> Vec<String> {
        match self {
            Selection::Parsed(names) => names,
            Selection::Fallback => candidates.to_vec(),
        }
    }
}

fn name_list_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"\[\s*"[^"]*"(?:\s*,\s*"[^"]*")*\s*\]"#).expect("Invalid regex pattern")
    })
}

/// Sniff a JSON list of names out of a generation response.
///
/// Tries the first fenced block (dropping a leading `json` tag); without a
/// fence, the first bracketed list of double-quoted strings; failing that,
/// the trimmed text itself. Anything that is not a JSON array of strings is
/// [`Selection::Fallback`].
pub fn parse_selection(response: &str) -> Selection {
    let candidate = match fenced_block(response, "json") {
        Some(block) => block,
        None => match name_list_pattern().find(response) {
            Some(found) => found.as_str().to_string(),
            None => response.trim().to_string(),
        },
    };

    match serde_json::from_str::<Vec<String>>(&candidate) {
        Ok(names) => Selection::Parsed(names),
        Err(e) => {
            log::warn!("Error parsing API response: {}", e);
            Selection::Fallback
        }
    }
}
