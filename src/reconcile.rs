// src/reconcile.rs

use serde::{ser::SerializeMap, Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

use crate::{
    matching::{best_matches, NormalizedEntry},
    record::Record,
    scheme::{normalize_scheme_name, StopWords},
};

/// One scheme in the reference registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceEntry {
    #[serde(deserialize_with = "code_from_string_or_number")]
    pub scheme_code: String,
    #[serde(default)]
    pub scheme_name: Option<String>,
}

/// Registries publish codes as either `"100027"` or `100027`.
fn code_from_string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Code {
        Text(String),
        Number(serde_json::Number),
    }
    Ok(match Code::deserialize(d)? {
        Code::Text(s) => s,
        Code::Number(n) => n.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    Confirmed {
        scheme_code: String,
        scheme_name: String,
    },
    Unconfirmed {
        possible_scheme_codes: Vec<String>,
        possible_scheme_names: Vec<String>,
    },
    NotFound,
}

impl MatchOutcome {
    pub fn is_matched(&self) -> bool {
        !matches!(self, MatchOutcome::NotFound)
    }
}

/// Keys written after a record's own fields to report its match.
pub const MATCH_KEYS: [&str; 4] = [
    "schemeCode",
    "schemeName",
    "possibleSchemeCode",
    "possibleSchemeName",
];

/// A candidate record annotated with how it matched.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedRecord {
    pub record: Record,
    pub outcome: MatchOutcome,
}

impl Serialize for MatchedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        self.record.serialize_entries(&mut map)?;
        match &self.outcome {
            MatchOutcome::Confirmed {
                scheme_code,
                scheme_name,
            } => {
                map.serialize_entry("schemeCode", scheme_code)?;
                map.serialize_entry("schemeName", scheme_name)?;
            }
            MatchOutcome::Unconfirmed {
                possible_scheme_codes,
                possible_scheme_names,
            } => {
                map.serialize_entry("possibleSchemeCode", possible_scheme_codes)?;
                map.serialize_entry("possibleSchemeName", possible_scheme_names)?;
            }
            MatchOutcome::NotFound => {}
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub confirmed: usize,
    pub unconfirmed: usize,
    pub not_found: usize,
}

/// Every candidate in input order, each tagged with exactly one outcome.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    records: Vec<MatchedRecord>,
}

impl Reconciliation {
    pub fn records(&self) -> &[MatchedRecord] {
        &self.records
    }

    pub fn confirmed(&self) -> impl Iterator<Item = &MatchedRecord> {
        self.records
            .iter()
            .filter(|r| matches!(r.outcome, MatchOutcome::Confirmed { .. }))
    }

    pub fn unconfirmed(&self) -> impl Iterator<Item = &MatchedRecord> {
        self.records
            .iter()
            .filter(|r| matches!(r.outcome, MatchOutcome::Unconfirmed { .. }))
    }

    pub fn not_found(&self) -> impl Iterator<Item = &MatchedRecord> {
        self.records
            .iter()
            .filter(|r| r.outcome == MatchOutcome::NotFound)
    }

    /// Confirmed and unconfirmed records, in input order.
    pub fn all_matched(&self) -> impl Iterator<Item = &MatchedRecord> {
        self.records.iter().filter(|r| r.outcome.is_matched())
    }

    pub fn summary(&self) -> Summary {
        let mut s = Summary {
            total: self.records.len(),
            ..Summary::default()
        };
        for r in &self.records {
            match r.outcome {
                MatchOutcome::Confirmed { .. } => s.confirmed += 1,
                MatchOutcome::Unconfirmed { .. } => s.unconfirmed += 1,
                MatchOutcome::NotFound => s.not_found += 1,
            }
        }
        s
    }
}

/// Matches scraped records against a reference registry.
pub struct Reconciler<'a> {
    stop_words: StopWords,
    /// Candidate field holding the scheme name.
    name_key: String,
    /// Exact lookup; on duplicate normalized names the last entry wins.
    exact: HashMap<String, &'a ReferenceEntry>,
    normalized: Vec<NormalizedEntry<'a>>,
}

impl<'a> Reconciler<'a> {
    pub fn new(references: &'a [ReferenceEntry], stop_words: StopWords) -> Self {
        let normalized: Vec<NormalizedEntry<'a>> = references
            .iter()
            .filter_map(|entry| {
                let name = entry.scheme_name.as_deref()?;
                let normalized = normalize_scheme_name(name, &stop_words);
                (!normalized.is_empty()).then_some(NormalizedEntry { normalized, entry })
            })
            .collect();

        let mut exact = HashMap::with_capacity(normalized.len());
        for n in &normalized {
            if let Some(prev) = exact.insert(n.normalized.clone(), n.entry) {
                debug!(
                    name = %n.normalized,
                    replaced = %prev.scheme_code,
                    by = %n.entry.scheme_code,
                    "duplicate normalized reference name"
                );
            }
        }
        debug!(
            references = references.len(),
            usable = normalized.len(),
            "reference lookup built"
        );

        Self {
            stop_words,
            name_key: "scheme_name".to_string(),
            exact,
            normalized,
        }
    }

    pub fn with_name_key(mut self, key: impl Into<String>) -> Self {
        self.name_key = key.into();
        self
    }

    /// Decide how a single scheme name matches.
    pub fn classify(&self, name: Option<&str>) -> MatchOutcome {
        let Some(normalized) = name.map(|n| normalize_scheme_name(n, &self.stop_words)) else {
            return MatchOutcome::NotFound;
        };
        if normalized.is_empty() {
            return MatchOutcome::NotFound;
        }

        if let Some(entry) = self.exact.get(&normalized) {
            return MatchOutcome::Confirmed {
                scheme_code: entry.scheme_code.clone(),
                scheme_name: entry.scheme_name.clone().unwrap_or_default(),
            };
        }

        let best = best_matches(&normalized, &self.normalized);
        if best.matches.is_empty() {
            return MatchOutcome::NotFound;
        }
        let mut possible_scheme_codes: Vec<String> = Vec::new();
        let mut possible_scheme_names: Vec<String> = Vec::new();
        for entry in best.matches {
            if !possible_scheme_codes.contains(&entry.scheme_code) {
                possible_scheme_codes.push(entry.scheme_code.clone());
            }
            if let Some(name) = &entry.scheme_name {
                if !possible_scheme_names.contains(name) {
                    possible_scheme_names.push(name.clone());
                }
            }
        }
        MatchOutcome::Unconfirmed {
            possible_scheme_codes,
            possible_scheme_names,
        }
    }

    #[instrument(level = "info", skip_all, fields(candidates = candidates.len()))]
    pub fn reconcile(&self, candidates: Vec<Record>) -> Reconciliation {
        let records: Vec<MatchedRecord> = candidates
            .into_iter()
            .map(|mut record| {
                let outcome = self.classify(record.text(&self.name_key));
                // annotations from an earlier run are replaced, never duplicated
                for key in MATCH_KEYS {
                    record.remove(key);
                }
                MatchedRecord { record, outcome }
            })
            .collect();
        let out = Reconciliation { records };
        let s = out.summary();
        info!(
            confirmed = s.confirmed,
            unconfirmed = s.unconfirmed,
            not_found = s.not_found,
            "reconciliation finished"
        );
        out
    }
}
