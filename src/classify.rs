//! Row kind classification from the reserved row-type keys.

use serde_json::Value;

use crate::model::Row;

/// Reserved keys checked for a row-kind tag, highest priority first.
pub const ROW_TYPE_KEYS: [&str; 5] = ["__rowType", "__rowtype", "__type", "rowType", "rowtype"];

/// What a body row represents. Drives its styling and, for group headers,
/// which cells are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RowKind {
    #[default]
    Data,
    GroupHeader,
    Subtotal,
    Total,
}

impl RowKind {
    /// Map a raw tag to a kind; unknown tags are plain data.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "group" | "groupheader" => RowKind::GroupHeader,
            "grouptotal" | "subtotal" => RowKind::Subtotal,
            "total" | "grandtotal" => RowKind::Total,
            _ => RowKind::Data,
        }
    }
}

/// Classify a row by the first reserved key that is present.
pub fn classify_row(row: &Row) -> RowKind {
    match row.first_of(&ROW_TYPE_KEYS) {
        Some(Value::String(tag)) => RowKind::from_tag(tag),
        Some(other) => RowKind::from_tag(&other.to_string()),
        None => RowKind::Data,
    }
}
