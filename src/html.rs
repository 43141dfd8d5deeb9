// src/html.rs
//
// Everything that touches the DOM lives here. Pages are parsed into owned
// `RawTable`s so no `scraper::Html` is held across an await point.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

static TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").expect("table selector"));
static TR: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("tr selector"));
static TH: Lazy<Selector> = Lazy::new(|| Selector::parse("th").expect("th selector"));
static TD: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("td selector"));
static A: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("a selector"));
static WITH_ID: Lazy<Selector> = Lazy::new(|| Selector::parse("[id]").expect("id selector"));

/// The anchor found inside a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLink {
    /// `href` of the first anchor, if it has one.
    pub href: Option<String>,
    /// Text of every anchor in the cell, concatenated.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCell {
    pub text: String,
    pub link: Option<RawLink>,
}

/// A table as it appears in the markup, before any key derivation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    /// Trimmed `<th>` texts of the first row.
    pub headers: Vec<String>,
    /// `<td>` cells of every later row that has at least one.
    pub rows: Vec<Vec<RawCell>>,
}

/// All `<table>` elements of `html`, in document order.
pub fn tables(html: &str) -> Vec<RawTable> {
    let doc = Html::parse_document(html);
    doc.select(&TABLE).map(read_table).collect()
}

/// The element whose id is `id`, read as a table. `None` when absent.
pub fn table_by_id(html: &str, id: &str) -> Option<RawTable> {
    let doc = Html::parse_document(html);
    let found = doc
        .select(&WITH_ID)
        .find(|el| el.value().id() == Some(id))
        .map(read_table);
    found
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect()
}

fn read_table(table: ElementRef<'_>) -> RawTable {
    let mut rows = table.select(&TR);
    let headers = match rows.next() {
        Some(first) => first.select(&TH).map(|th| text_of(th).trim().to_string()).collect(),
        None => return RawTable::default(),
    };

    let rows = rows
        .map(|tr| tr.select(&TD).map(read_cell).collect::<Vec<_>>())
        .filter(|cells| !cells.is_empty())
        .collect();

    RawTable { headers, rows }
}

fn read_cell(td: ElementRef<'_>) -> RawCell {
    let mut anchors = td.select(&A).peekable();
    let link = anchors.peek().copied().map(|first| RawLink {
        href: first.value().attr("href").map(str::to_string),
        text: anchors.map(text_of).collect::<String>().trim().to_string(),
    });
    RawCell {
        text: text_of(td),
        link,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
        <table>
          <tr><th> Scheme Name </th><th>1Y</th></tr>
          <tr><td><a href="/mutual-funds/nav/a/X1">Fund A</a></td><td>12.1</td></tr>
          <tr class="spacer"></tr>
          <tr><td>Fund B</td><td>-3.2</td></tr>
        </table>
        <div id="other"></div>
        <table id="holdings"><tr><td>no header</td></tr><tr><td>x</td><td>y</td></tr></table>
        </body></html>"#;

    #[test]
    fn reads_tables_in_order() {
        let tables = tables(PAGE);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].headers, ["Scheme Name", "1Y"]);
        assert_eq!(tables[0].rows.len(), 2);

        let linked = &tables[0].rows[0][0];
        let link = linked.link.as_ref().unwrap();
        assert_eq!(link.href.as_deref(), Some("/mutual-funds/nav/a/X1"));
        assert_eq!(link.text, "Fund A");
        assert!(tables[0].rows[1][0].link.is_none());

        // first row is consumed as the header row even without <th>
        assert!(tables[1].headers.is_empty());
        assert_eq!(tables[1].rows.len(), 1);
    }

    #[test]
    fn finds_table_by_id() {
        let t = table_by_id(PAGE, "holdings").unwrap();
        assert_eq!(t.rows[0].len(), 2);
        assert!(table_by_id(PAGE, "missing").is_none());
    }
}
