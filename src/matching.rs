// src/matching.rs

use std::collections::HashSet;

use crate::reconcile::ReferenceEntry;

/// A reference entry paired with its normalized name.
#[derive(Debug, Clone)]
pub struct NormalizedEntry<'a> {
    pub normalized: String,
    pub entry: &'a ReferenceEntry,
}

/// Jaccard similarity of the two token sets, gated on the first token
/// (the fund house) being equal. Names without tokens never match.
pub fn similarity(a: &str, b: &str) -> f64 {
    let tokens_a: Vec<&str> = a.split_whitespace().collect();
    let tokens_b: Vec<&str> = b.split_whitespace().collect();

    match (tokens_a.first(), tokens_b.first()) {
        (Some(house_a), Some(house_b)) if house_a == house_b => {}
        _ => return 0.0,
    }

    let set_a: HashSet<&str> = tokens_a.into_iter().collect();
    let set_b: HashSet<&str> = tokens_b.into_iter().collect();
    let shared = set_a.intersection(&set_b).count();
    let total = set_a.union(&set_b).count();
    shared as f64 / total as f64
}

#[derive(Debug, Clone)]
pub struct BestMatch<'a> {
    pub score: f64,
    /// Every entry scoring `score`, in reference order. Empty when the
    /// best score is 0.
    pub matches: Vec<&'a ReferenceEntry>,
}

/// Scan `references` for the entries most similar to `target`.
pub fn best_matches<'a>(target: &str, references: &[NormalizedEntry<'a>]) -> BestMatch<'a> {
    let mut best = BestMatch {
        score: 0.0,
        matches: Vec::new(),
    };
    for candidate in references {
        let score = similarity(target, &candidate.normalized);
        if score == 0.0 {
            continue;
        }
        if score > best.score {
            best.score = score;
            best.matches.clear();
            best.matches.push(candidate.entry);
        } else if score == best.score {
            best.matches.push(candidate.entry);
        }
    }
    best
}
