// src/text.rs

use once_cell::sync::Lazy;
use regex::Regex;

static LEADING_DASHES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\s*[-–—])+\s*").expect("leading dash regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]").expect("non-word regex"));

/// Clean text pulled out of a table cell.
///
/// Drops `#` and newlines, strips a leading run of dashes (with the
/// whitespace around it), collapses whitespace and trims. Cleaning an
/// already clean string returns it unchanged.
pub fn clean_text(raw: &str) -> String {
    let without_marks: String = raw.chars().filter(|&c| c != '#' && c != '\n').collect();
    let undashed = LEADING_DASHES.replace(&without_marks, "");
    WHITESPACE.replace_all(&undashed, " ").trim().to_string()
}

/// `"Returns % (1Y)"` → `"returns_percentage_1y"`.
pub fn to_snake_case(header: &str) -> String {
    let spelled = header.replace('%', "percentage");
    let underscored = WHITESPACE.replace_all(&spelled, "_");
    NON_WORD.replace_all(&underscored, "").to_lowercase()
}

/// Known header spellings and the key text they should become.
static DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("value(mn)", "value_mn"),
    ("1w", "week_one"),
    ("1m", "month_one"),
    ("3m", "month_three"),
    ("6m", "month_six"),
    ("1y", "year_one"),
    ("2y", "year_two"),
    ("3y", "year_three"),
    ("5y", "year_five"),
    ("10y", "year_ten"),
];

/// Immutable header alias table, matched case-insensitively after trimming.
#[derive(Debug, Clone)]
pub struct HeaderAliases {
    entries: Vec<(String, String)>,
}

impl Default for HeaderAliases {
    fn default() -> Self {
        Self {
            entries: DEFAULT_ALIASES
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        }
    }
}

impl HeaderAliases {
    /// An alias table with no entries; every header passes through.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add (or replace) an alias. `from` is matched case-insensitively.
    pub fn with_alias(mut self, from: &str, to: &str) -> Self {
        let from = from.trim().to_lowercase();
        self.entries.retain(|(k, _)| *k != from);
        self.entries.push((from, to.to_string()));
        self
    }

    /// Replace `header` by its alias, or return it untouched.
    pub fn replace<'a>(&'a self, header: &'a str) -> &'a str {
        let needle = header.trim().to_lowercase();
        self.entries
            .iter()
            .find(|(from, _)| *from == needle)
            .map(|(_, to)| to.as_str())
            .unwrap_or(header)
    }

    /// Column key for a raw header cell.
    pub fn header_key(&self, header: &str) -> String {
        to_snake_case(self.replace(header))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_strips_marks_and_dashes() {
        assert_eq!(clean_text("  # Large\n  Cap   Fund "), "Large Cap Fund");
        assert_eq!(clean_text(" – Equity"), "Equity");
        assert_eq!(clean_text("—\tDebt  Fund"), "Debt Fund");
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text("a-b"), "a-b");
    }

    #[test]
    fn clean_text_is_idempotent() {
        let samples = [
            "- - Nested dashes",
            "#-#- hashes between",
            "\n\t  —  spaced\r\nout  ",
            "-",
            "plain",
            "12.5%",
            "   ",
            "-12.40",
        ];
        for s in samples {
            let once = clean_text(s);
            assert_eq!(clean_text(&once), once, "input {:?}", s);
        }
    }

    #[test]
    fn snake_case_spells_out_percent() {
        assert_eq!(to_snake_case("Scheme Name"), "scheme_name");
        assert_eq!(to_snake_case("% Assets"), "percentage_assets");
        assert_eq!(to_snake_case("Expense  Ratio (%)"), "expense_ratio_percentage");
        assert_eq!(to_snake_case("AUM (Cr.)"), "aum_cr");
    }

    #[test]
    fn header_key_applies_aliases_first() {
        let aliases = HeaderAliases::default();
        assert_eq!(aliases.header_key("Value(Mn)"), "value_mn");
        assert_eq!(aliases.header_key(" 1Y "), "year_one");
        assert_eq!(aliases.header_key("10Y"), "year_ten");
        assert_eq!(aliases.header_key("Crisil Rank"), "crisil_rank");
    }

    #[test]
    fn custom_aliases_replace_defaults() {
        let aliases = HeaderAliases::empty().with_alias("NAV", "net asset value");
        assert_eq!(aliases.header_key("nav"), "net_asset_value");
        assert_eq!(aliases.header_key("1Y"), "1y");
    }
}
