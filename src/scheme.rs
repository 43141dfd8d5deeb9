// src/scheme.rs

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_\s]").expect("punctuation regex"));

static DEFAULT_STOP_WORDS: &[&str] = &["option", "plan", "regular", "direct"];

/// Words that carry no identity in a scheme name ("Direct Plan", ...).
#[derive(Debug, Clone)]
pub struct StopWords(HashSet<String>);

impl Default for StopWords {
    fn default() -> Self {
        Self::new(DEFAULT_STOP_WORDS.iter().copied())
    }
}

impl StopWords {
    pub fn new<'a>(words: impl IntoIterator<Item = &'a str>) -> Self {
        Self(words.into_iter().map(str::to_lowercase).collect())
    }

    pub fn contains(&self, word: &str) -> bool {
        self.0.contains(word)
    }
}

/// Reduce a scheme name to comparable lowercase tokens:
/// `"HDFC Direct Plan - Growth"` → `"hdfc growth"`.
pub fn normalize_scheme_name(name: &str, stop_words: &StopWords) -> String {
    let lowered = name.to_lowercase().replace('-', " ");
    let bare = PUNCTUATION.replace_all(&lowered, "");
    bare.split_whitespace()
        .filter(|w| !stop_words.contains(w))
        .collect::<Vec<_>>()
        .join(" ")
}

/// `normalize_scheme_name` over a possibly missing name.
pub fn normalize_opt(name: Option<&str>, stop_words: &StopWords) -> Option<String> {
    name.map(|n| normalize_scheme_name(n, stop_words))
}
