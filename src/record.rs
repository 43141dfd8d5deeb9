// src/record.rs

use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};
use serde_json::Value;
use std::fmt;

/// Key the nested holdings are stored under.
pub const HOLDINGS_KEY: &str = "portfolio_holdings";

/// One page to scrape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub name: String,
    pub link: String,
}

/// A single cell value. Extraction only produces `Plain` and `Linked`;
/// `Other` keeps any other JSON found in records read back from disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Plain(String),
    Linked { text: String, link: String },
    Other(Value),
}

impl Cell {
    /// Readable text of the cell: the string, the link text, or a `text`
    /// member of an object.
    pub fn text(&self) -> Option<&str> {
        match self {
            Cell::Plain(text) | Cell::Linked { text, .. } => Some(text),
            Cell::Other(value) => value.get("text").and_then(Value::as_str),
        }
    }
}

/// Nested holdings attached to a row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Holdings {
    /// The row had nothing to follow.
    #[default]
    NotLinked,
    /// A fetch was attempted and produced nothing usable.
    Unavailable,
    Found(Vec<Record>),
}

/// One table row: cells in column order plus its holdings slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, Cell)>,
    pub holdings: Holdings,
}

pub type Table = Vec<Record>;

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, replacing an earlier value in place.
    pub fn insert(&mut self, key: impl Into<String>, cell: Cell) {
        let key = key.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = cell,
            None => self.fields.push((key, cell)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Cell> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, c)| c)
    }

    /// Text of the cell under `key`, linked or not.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Cell::text)
    }

    /// Remove `key`, returning its cell.
    pub fn remove(&mut self, key: &str) -> Option<Cell> {
        let idx = self.fields.iter().position(|(k, _)| k == key)?;
        Some(self.fields.remove(idx).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Write this record's entries into a map that is being serialized, so
    /// callers can append their own keys after it.
    pub(crate) fn serialize_entries<M: SerializeMap>(&self, map: &mut M) -> Result<(), M::Error> {
        for (key, cell) in &self.fields {
            map.serialize_entry(key, cell)?;
        }
        match &self.holdings {
            Holdings::NotLinked => {}
            Holdings::Unavailable => map.serialize_entry(HOLDINGS_KEY, &None::<Vec<Record>>)?,
            Holdings::Found(rows) => map.serialize_entry(HOLDINGS_KEY, rows)?,
        }
        Ok(())
    }

    fn entry_count(&self) -> usize {
        self.fields.len() + usize::from(self.holdings != Holdings::NotLinked)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entry_count()))?;
        self.serialize_entries(&mut map)?;
        map.end()
    }
}

struct RecordVisitor;

impl<'de> Visitor<'de> for RecordVisitor {
    type Value = Record;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of column keys to cells")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Record, A::Error> {
        let mut record = Record::new();
        while let Some(key) = access.next_key::<String>()? {
            if key != HOLDINGS_KEY {
                let cell = access.next_value::<Cell>()?;
                record.insert(key, cell);
                continue;
            }
            let holdings = match access.next_value::<Value>()? {
                Value::Null => Ok(Holdings::Unavailable),
                rows @ Value::Array(_) => serde_json::from_value(rows.clone())
                    .map(Holdings::Found)
                    .map_err(|_| rows),
                other => Err(other),
            };
            // a holdings key that is not `null` or a list of records is kept as a field
            match holdings {
                Ok(holdings) => {
                    record.remove(HOLDINGS_KEY);
                    record.holdings = holdings;
                }
                Err(value) => {
                    record.holdings = Holdings::NotLinked;
                    record.insert(key, Cell::Other(value));
                }
            }
        }
        Ok(record)
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RecordVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Record {
        let mut holding = Record::new();
        holding.insert("stock", Cell::Plain("Infosys".into()));
        holding.insert("percentage_of_total_holdings", Cell::Plain("8.1%".into()));

        let mut r = Record::new();
        r.insert("scheme_name", Cell::Plain("HDFC Top 100".into()));
        r.insert(
            "crisil_rank",
            Cell::Linked {
                text: "4".into(),
                link: "https://h/rank".into(),
            },
        );
        r.holdings = Holdings::Found(vec![holding]);
        r
    }

    #[test]
    fn serializes_in_column_order() {
        let value = serde_json::to_string(&sample()).unwrap();
        assert_eq!(
            value,
            concat!(
                r#"{"scheme_name":"HDFC Top 100","#,
                r#""crisil_rank":{"text":"4","link":"https://h/rank"},"#,
                r#""portfolio_holdings":[{"stock":"Infosys","percentage_of_total_holdings":"8.1%"}]}"#
            )
        );
    }

    #[test]
    fn holdings_states_serialize_distinctly() {
        let mut r = Record::new();
        r.insert("a", Cell::Plain("1".into()));
        assert_eq!(serde_json::to_value(&r).unwrap(), json!({"a": "1"}));

        r.holdings = Holdings::Unavailable;
        assert_eq!(
            serde_json::to_value(&r).unwrap(),
            json!({"a": "1", "portfolio_holdings": null})
        );
    }

    #[test]
    fn reads_back_what_it_writes() {
        let original = sample();
        let text = serde_json::to_string(&original).unwrap();
        let parsed: Record = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, original);
        assert_eq!(parsed.keys().collect::<Vec<_>>(), ["scheme_name", "crisil_rank"]);
    }

    #[test]
    fn reads_foreign_values_without_failing() {
        let rows: Vec<Record> = serde_json::from_value(json!([
            {"scheme_name": "SBI Contra", "possibleSchemeCode": ["301"]},
            {"scheme_name": {"text": "Axis Midcap"}, "aum": 12.5, "portfolio_holdings": "n/a"},
            {"scheme_name": "Quant", "portfolio_holdings": [1, 2]}
        ]))
        .unwrap();

        assert_eq!(rows[0].text("scheme_name"), Some("SBI Contra"));
        assert_eq!(rows[0].get("possibleSchemeCode"), Some(&Cell::Other(json!(["301"]))));
        assert_eq!(rows[1].text("scheme_name"), Some("Axis Midcap"));
        assert_eq!(rows[1].get("aum"), Some(&Cell::Other(json!(12.5))));
        assert_eq!(rows[1].text("aum"), None);
        assert_eq!(rows[1].holdings, Holdings::NotLinked);
        assert_eq!(rows[2].get(HOLDINGS_KEY), Some(&Cell::Other(json!([1, 2]))));

        // foreign values are written back unchanged
        assert_eq!(
            serde_json::to_value(&rows[1]).unwrap(),
            json!({
                "scheme_name": {"text": "Axis Midcap"},
                "aum": 12.5,
                "portfolio_holdings": "n/a"
            })
        );
    }

    #[test]
    fn remove_drops_the_key() {
        let mut r = sample();
        let removed = r.remove("crisil_rank").unwrap();
        assert_eq!(removed.text(), Some("4"));
        assert_eq!(r.remove("crisil_rank"), None);
        assert_eq!(r.keys().collect::<Vec<_>>(), ["scheme_name"]);
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut r = sample();
        r.insert("scheme_name", Cell::Plain("Renamed".into()));
        assert_eq!(r.len(), 2);
        assert_eq!(r.text("scheme_name"), Some("Renamed"));
        assert_eq!(r.text("crisil_rank"), Some("4"));
        assert_eq!(r.text("missing"), None);
    }
}
