use std::collections::HashMap;

use agro_core::{normalize, CatalogEntry};

/// Threshold for callers that invoke the fuzzy matcher standalone. The
/// classifier passes a stricter 0.5.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.45;

/// Filler words dropped before building fuzzy candidates.
const STOP_WORDS: &[&str] = &[
    "necesito", "para", "mi", "tengo", "quiero", "favor", "por", "mas", "ayuda", "hola",
    "saludos",
];

/// First entry, in catalog order, whose normalized name appears as a
/// substring of the normalized input. First-match-wins, not best-match.
pub fn find_exact<'a>(entries: &'a [CatalogEntry], text: &str) -> Option<&'a CatalogEntry> {
    let haystack = normalize(text);
    entries
        .iter()
        .filter(|entry| !entry.name.is_empty())
        .find(|entry| haystack.contains(&normalize(&entry.name)))
}

/// Every entry one of whose normalized keywords appears in the normalized
/// input, in catalog order, at most one hit per entry.
pub fn find_by_keywords<'a>(entries: &'a [CatalogEntry], text: &str) -> Vec<&'a CatalogEntry> {
    let haystack = normalize(text);
    entries
        .iter()
        .filter(|entry| {
            entry
                .keywords
                .iter()
                .any(|keyword| haystack.contains(&normalize(keyword)))
        })
        .collect()
}

/// Similarity-based lookup: tokenizes the normalized input, builds unigram
/// and adjacent-bigram candidates, scores each candidate against every entry
/// name with the Dice coefficient over character bigrams, and returns the
/// best-scoring entry iff its score reaches `threshold` (inclusive). Ties
/// keep the first-encountered pair: only a strictly greater score replaces
/// the current best.
pub fn fuzzy_match<'a>(
    entries: &'a [CatalogEntry],
    text: &str,
    threshold: f64,
) -> Option<&'a CatalogEntry> {
    if entries.is_empty() {
        return None;
    }

    let normalized = normalize(text);
    let tokens = normalized
        .split_whitespace()
        .filter(|token| token.len() >= 2 && !STOP_WORDS.contains(token))
        .collect::<Vec<_>>();

    let mut candidates = Vec::with_capacity(tokens.len() * 2);
    for (idx, token) in tokens.iter().enumerate() {
        candidates.push(token.to_string());
        if let Some(next) = tokens.get(idx + 1) {
            candidates.push(format!("{token} {next}"));
        }
    }

    let names = entries
        .iter()
        .map(|entry| normalize(&entry.name))
        .collect::<Vec<_>>();

    let mut best_score = 0.0_f64;
    let mut best_index: Option<usize> = None;
    for candidate in &candidates {
        for (idx, name) in names.iter().enumerate() {
            let score = dice_similarity(candidate, name);
            if score > best_score {
                best_score = score;
                best_index = Some(idx);
            }
        }
    }

    match best_index {
        Some(idx) if best_score >= threshold => Some(&entries[idx]),
        _ => None,
    }
}

/// Dice coefficient over character bigrams, whitespace ignored. 1.0 for
/// identical strings, 0.0 when either side is shorter than one bigram.
fn dice_similarity(a: &str, b: &str) -> f64 {
    let a = a.split_whitespace().collect::<String>();
    let b = b.split_whitespace().collect::<String>();

    if a == b {
        return if a.is_empty() { 0.0 } else { 1.0 };
    }
    let a_chars = a.chars().collect::<Vec<_>>();
    let b_chars = b.chars().collect::<Vec<_>>();
    if a_chars.len() < 2 || b_chars.len() < 2 {
        return 0.0;
    }

    let mut counts: HashMap<(char, char), usize> = HashMap::new();
    for pair in a_chars.windows(2) {
        *counts.entry((pair[0], pair[1])).or_default() += 1;
    }

    let mut matches = 0usize;
    for pair in b_chars.windows(2) {
        if let Some(count) = counts.get_mut(&(pair[0], pair[1])) {
            if *count > 0 {
                *count -= 1;
                matches += 1;
            }
        }
    }

    (2 * matches) as f64 / ((a_chars.len() - 1) + (b_chars.len() - 1)) as f64
}
