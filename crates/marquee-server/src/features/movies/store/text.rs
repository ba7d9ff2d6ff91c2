//! Token matching used by the in-memory store's title search
//!
//! Approximates `plainto_tsquery('english', ..)`: split on anything that is
//! not alphanumeric, lowercase, drop stop words, strip a common suffix. A
//! title matches when it contains every query token.

use std::collections::HashSet;

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "if", "in", "into",
    "is", "it", "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there",
    "these", "they", "this", "to", "was", "will", "with",
];

const SUFFIXES: &[&str] = &["ing", "ed", "es", "s"];

fn stem(word: &str) -> String {
    for suffix in SUFFIXES {
        if let Some(root) = word.strip_suffix(suffix) {
            if root.chars().count() >= 3 {
                return undouble(root).to_string();
            }
        }
    }
    word.to_string()
}

/// "runn" -> "run", "stopp" -> "stop"
fn undouble(root: &str) -> &str {
    let mut chars = root.chars().rev();
    match (chars.next(), chars.next()) {
        (Some(a), Some(b)) if a == b && !matches!(a, 'l' | 's' | 'z') && a.is_alphabetic() => {
            &root[..root.len() - a.len_utf8()]
        },
        _ => root,
    }
}

pub(super) fn tokens(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .filter(|word| !STOP_WORDS.contains(&word.as_str()))
        .map(|word| stem(&word))
        .collect()
}

/// True when `query` is empty or every token of it appears in `title`
///
/// A non-empty query with no searchable words (only stop words, spaces or
/// punctuation) matches nothing, like an empty `tsquery`.
pub(super) fn matches(title: &str, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let wanted = tokens(query);
    if wanted.is_empty() {
        return false;
    }
    let have = tokens(title);
    wanted.is_subset(&have)
}
