//! Heuristic relevance scoring and snippet extraction.
//!
//! Scores are computed per record against the raw query string. Earlier
//! fields weigh more than later ones, so callers pass fields in order of
//! importance (title before body text).

use booktrack_core::defaults;

/// Score a record's fields against a query, in `[0, 1]`.
///
/// The query is lower-cased and split on whitespace. Field `i` carries weight
/// `1 / (i + 1)`; absent or empty fields are skipped but still occupy their
/// position. For every term found in a field the field earns its weight times
/// 1.0 on an exact match, 0.8 on a prefix match and 0.5 otherwise.
pub fn calculate_relevance(query: &str, fields: &[Option<&str>]) -> f64 {
    let query = query.to_lowercase();
    let terms: Vec<&str> = query.split_whitespace().collect();
    if terms.is_empty() {
        return 0.0;
    }

    let mut score = 0.0;
    let mut total_weight = 0.0;

    for (i, field) in fields.iter().enumerate() {
        let Some(text) = field.filter(|t| !t.is_empty()) else {
            continue;
        };
        let text = text.to_lowercase();
        let weight = 1.0 / (i as f64 + 1.0);
        total_weight += weight;

        for term in &terms {
            if !text.contains(term) {
                continue;
            }
            score += weight
                * if text == *term {
                    defaults::RELEVANCE_EXACT
                } else if text.starts_with(term) {
                    defaults::RELEVANCE_PREFIX
                } else {
                    defaults::RELEVANCE_CONTAINS
                };
        }
    }

    if total_weight == 0.0 {
        return 0.0;
    }
    (score / (total_weight * terms.len() as f64)).clamp(0.0, 1.0)
}

/// Cut a snippet of `text` around the first case-insensitive occurrence of
/// `query`.
///
/// Keeps 50 characters before the match and 100 after its end, marking each
/// truncated side with `...`. Without a match the snippet is the first
/// `max_length` characters. Positions are counted in characters, never bytes.
pub fn create_snippet(text: &str, query: &str, max_length: usize) -> String {
    if text.is_empty() {
        return String::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let Some(pos) = find_ci(&chars, query) else {
        let mut snippet: String = chars.iter().take(max_length).collect();
        if chars.len() > max_length {
            snippet.push_str(defaults::ELLIPSIS);
        }
        return snippet;
    };

    let query_len = query.chars().count();
    let start = pos.saturating_sub(defaults::SNIPPET_LEAD);
    let end = (pos + query_len + defaults::SNIPPET_TAIL).min(chars.len());

    let mut snippet = String::new();
    if start > 0 {
        snippet.push_str(defaults::ELLIPSIS);
    }
    snippet.extend(&chars[start..end]);
    if end < chars.len() {
        snippet.push_str(defaults::ELLIPSIS);
    }
    snippet
}

/// First `max_length` characters of `text`, without an ellipsis.
pub fn leading_chars(text: &str, max_length: usize) -> String {
    text.chars().take(max_length).collect()
}

/// Character index of the first case-insensitive occurrence of `needle`.
///
/// Characters fold one-to-one so indices stay aligned with `haystack`.
fn find_ci(haystack: &[char], needle: &str) -> Option<usize> {
    let needle: Vec<char> = needle.chars().map(fold).collect();
    if needle.is_empty() {
        return Some(0);
    }
    if needle.len() > haystack.len() {
        return None;
    }
    let folded: Vec<char> = haystack.iter().copied().map(fold).collect();
    folded.windows(needle.len()).position(|w| w == needle.as_slice())
}

fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}
