//! Parent-topic extraction from raw keyword phrases.

/// Words that never carry topical meaning in a search phrase.
pub(crate) const STOPWORDS: &[&str] = &[
    "near", "me", "best", "top", "how", "to", "what", "is", "the", "a", "an", "why", "when",
    "where",
];

/// Tokens this short or shorter are dropped along with the stopwords.
const MAX_DROPPED_TOKEN_LEN: usize = 2;

/// Derive a human-readable topic label from a keyword phrase.
///
/// Lower-cases and splits on whitespace, drops stopwords and tokens of two
/// characters or fewer, then title-cases and joins the first two survivors.
/// Returns the input unchanged when nothing survives.
#[must_use]
pub fn extract_parent_topic(keyword: &str) -> String {
    let lowered = keyword.to_lowercase();
    let meaningful: Vec<String> = lowered
        .split_whitespace()
        .filter(|t| t.chars().count() > MAX_DROPPED_TOKEN_LEN && !STOPWORDS.contains(t))
        .take(2)
        .map(title_case)
        .collect();

    if meaningful.is_empty() {
        keyword.to_string()
    } else {
        meaningful.join(" ")
    }
}

fn title_case(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
