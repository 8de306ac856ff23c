//! # Row Materializer
//!
//! Classifies and formats every row into the table body, and records which
//! cells carry a hyperlink.

use std::collections::HashMap;

use serde_json::Value;

use crate::classify::{classify_row, RowKind};
use crate::columns::PrintableColumn;
use crate::format::{format_value, is_truthy, safe_stringify};
use crate::model::Row;

const GROUP_LABEL_KEYS: [&str; 4] = ["__groupLabel", "__groupName", "groupLabel", "groupName"];
const GROUP_COUNT_KEYS: [&str; 3] = ["__groupCount", "count", "rows"];

/// Which columns pair up into a hyperlink: the text column shows the
/// label, the URL column supplies the target.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkColumns<'k> {
    pub text: Option<&'k str>,
    pub url: Option<&'k str>,
}

/// Formatted body cells plus per-row metadata, indexed in parallel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableBody {
    pub rows: Vec<Vec<String>>,
    pub kinds: Vec<RowKind>,
    /// Link targets keyed by `(row, column)`.
    pub links: HashMap<(usize, usize), String>,
}

impl TableBody {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The link on a cell, if any.
    pub fn link_at(&self, row: usize, column: usize) -> Option<&str> {
        self.links.get(&(row, column)).map(String::as_str)
    }
}

/// `label`, or `label (n)` when the row carries a truthy count.
fn group_label(row: &Row) -> Option<String> {
    let label = safe_stringify(row.first_of(&GROUP_LABEL_KEYS)?);
    if label.is_empty() {
        return None;
    }
    match row.first_of(&GROUP_COUNT_KEYS) {
        Some(count) if is_truthy(count) => Some(format!("{} ({})", label, safe_stringify(count))),
        _ => Some(label),
    }
}

fn link_target(row: &Row, url_key: &str) -> Option<String> {
    let url = match row.get(url_key)? {
        Value::String(s) => s.trim().to_string(),
        other => safe_stringify(other),
    };
    (!url.is_empty()).then_some(url)
}

/// Build the table body. Summary rows follow the data rows; both keep their
/// original order and are classified the same way.
pub fn materialize(
    columns: &[PrintableColumn<'_>],
    rows: &[Row],
    summary_rows: &[Row],
    links: LinkColumns<'_>,
) -> TableBody {
    let mut body = TableBody::default();

    for (row_index, row) in rows.iter().chain(summary_rows).enumerate() {
        let kind = classify_row(row);
        let mut cells = Vec::with_capacity(columns.len());

        for (column_index, column) in columns.iter().enumerate() {
            let cell = if kind == RowKind::GroupHeader {
                if column_index > 0 {
                    String::new()
                } else {
                    group_label(row).unwrap_or_else(|| {
                        format_value(row.get(&column.data_key), column.config)
                    })
                }
            } else {
                format_value(row.get(&column.data_key), column.config)
            };
            cells.push(cell);

            // Group headers show their label in the first cell, not the link text.
            if kind == RowKind::GroupHeader || links.text != Some(column.data_key.as_str()) {
                continue;
            }
            if let Some(url) = links.url.and_then(|key| link_target(row, key)) {
                body.links.insert((row_index, column_index), url);
            }
        }

        body.rows.push(cells);
        body.kinds.push(kind);
    }

    body
}
