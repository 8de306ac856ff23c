//! Group header rows.
//!
//! With a structure whose leaves sit under labeled groups, the table header
//! gets an extra row above the leaf labels in which adjacent columns of the
//! same group share one spanned cell.

use std::collections::HashMap;

use super::PrintableColumn;
use crate::model::StructuralColumnDef;

/// One header cell spanning `col_span` columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub content: String,
    pub col_span: usize,
}

impl HeaderCell {
    fn single(content: &str) -> Self {
        Self {
            content: content.to_string(),
            col_span: 1,
        }
    }
}

/// The header rows of the table, top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRows {
    pub rows: Vec<Vec<HeaderCell>>,
    pub has_group_row: bool,
}

/// Finds the label of the group directly containing a leaf, memoized per
/// data key.
struct GroupLabels<'d> {
    defs: &'d [StructuralColumnDef],
    cache: HashMap<String, Option<&'d str>>,
}

impl<'d> GroupLabels<'d> {
    fn new(defs: &'d [StructuralColumnDef]) -> Self {
        Self {
            defs,
            cache: HashMap::new(),
        }
    }

    fn label_for(&mut self, data_key: &str) -> Option<&'d str> {
        if let Some(cached) = self.cache.get(data_key) {
            return *cached;
        }
        let found = self.search(data_key);
        self.cache.insert(data_key.to_string(), found);
        found
    }

    /// Depth-first with an explicit stack. Unlabeled groups are transparent:
    /// their leaves report the nearest labeled ancestor.
    fn search(&self, data_key: &str) -> Option<&'d str> {
        let mut stack: Vec<(&'d StructuralColumnDef, Option<&'d str>)> =
            self.defs.iter().map(|d| (d, None)).collect();

        while let Some((def, parent)) = stack.pop() {
            let header = def.header_name.as_deref().filter(|h| !h.is_empty());
            if def.is_group() {
                let next = header.or(parent);
                stack.extend(def.children.iter().map(|child| (child, next)));
                continue;
            }
            let matches = match def.id() {
                Some(id) => id == data_key,
                None => header == Some(data_key),
            };
            if matches {
                return parent;
            }
        }
        None
    }
}

/// Build the header rows for the printable columns.
///
/// Without a structure, or when no printed column belongs to a labeled
/// group, the header is the single leaf-label row. Otherwise a group row
/// comes first: runs of adjacent columns with the same non-empty label merge
/// into one cell, and ungrouped columns get an empty cell of their own.
pub fn build_header_rows(
    columns: &[PrintableColumn<'_>],
    structure: Option<&[StructuralColumnDef]>,
) -> HeaderRows {
    let leaf_row: Vec<HeaderCell> = columns.iter().map(|c| HeaderCell::single(&c.header)).collect();

    let Some(defs) = structure.filter(|d| !d.is_empty()) else {
        return HeaderRows {
            rows: vec![leaf_row],
            has_group_row: false,
        };
    };

    let mut labels = GroupLabels::new(defs);
    let names: Vec<&str> = columns
        .iter()
        .map(|c| labels.label_for(&c.data_key).unwrap_or(""))
        .collect();

    if names.iter().all(|n| n.is_empty()) {
        return HeaderRows {
            rows: vec![leaf_row],
            has_group_row: false,
        };
    }

    HeaderRows {
        rows: vec![group_row(&names), leaf_row],
        has_group_row: true,
    }
}

/// Run-length encode group labels into spanned cells.
pub fn group_row(names: &[&str]) -> Vec<HeaderCell> {
    let mut cells = Vec::new();
    let mut index = 0;
    while index < names.len() {
        let name = names[index];
        if name.is_empty() {
            cells.push(HeaderCell::single(""));
            index += 1;
            continue;
        }
        let span = names[index..].iter().take_while(|n| **n == name).count();
        cells.push(HeaderCell {
            content: name.to_string(),
            col_span: span,
        });
        index += span;
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::resolve_printable_columns;
    use crate::model::{ColumnConfig, ColumnType};

    fn configs(names: &[&str]) -> Vec<ColumnConfig> {
        names.iter().map(|n| ColumnConfig::new(n, ColumnType::Text)).collect()
    }

    #[test]
    fn run_length_encodes_labels() {
        let cells = group_row(&["A", "A", "", "B", "B", "B"]);
        let spans: Vec<usize> = cells.iter().map(|c| c.col_span).collect();
        let labels: Vec<&str> = cells.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(spans, [2, 1, 3]);
        assert_eq!(labels, ["A", "", "B"]);
    }

    #[test]
    fn encoded_spans_sum_to_label_count() {
        for names in [
            vec!["A", "A", "", "B", "B", "B"],
            vec!["", "", ""],
            vec!["A", "", "", "A"],
            vec!["X"],
        ] {
            let total: usize = group_row(&names).iter().map(|c| c.col_span).sum();
            assert_eq!(total, names.len(), "{names:?}");
        }
    }

    #[test]
    fn empty_labels_are_never_merged() {
        let cells = group_row(&["", "", "B"]);
        assert_eq!(cells.len(), 3);
        assert_eq!(cells[2].col_span, 1);
    }

    #[test]
    fn continuity_is_positional() {
        let cells = group_row(&["A", "B", "A"]);
        assert_eq!(cells.len(), 3);
        assert!(cells.iter().all(|c| c.col_span == 1));
    }

    #[test]
    fn no_structure_means_single_row() {
        let cfg = configs(&["a", "b"]);
        let columns = resolve_printable_columns(&cfg, None);
        let header = build_header_rows(&columns, None);
        assert!(!header.has_group_row);
        assert_eq!(header.rows.len(), 1);
        assert_eq!(header.rows[0][1].content, "b");
    }

    #[test]
    fn top_level_leaves_only_means_single_row() {
        let cfg = configs(&["a", "b"]);
        let structure = vec![StructuralColumnDef::leaf("a", "A"), StructuralColumnDef::leaf("b", "B")];
        let columns = resolve_printable_columns(&cfg, Some(&structure));
        assert!(!build_header_rows(&columns, Some(&structure)).has_group_row);
    }

    #[test]
    fn groups_use_the_immediate_parent_label() {
        let cfg = configs(&["a", "b", "c", "d"]);
        let structure = vec![
            StructuralColumnDef::group(
                "Outer",
                vec![
                    StructuralColumnDef::leaf("a", "A"),
                    StructuralColumnDef::group("Inner", vec![StructuralColumnDef::leaf("b", "B")]),
                ],
            ),
            StructuralColumnDef::leaf("c", "C"),
            StructuralColumnDef::group("", vec![StructuralColumnDef::leaf("d", "D")]),
        ];
        let columns = resolve_printable_columns(&cfg, Some(&structure));
        let header = build_header_rows(&columns, Some(&structure));
        assert!(header.has_group_row);
        let labels: Vec<&str> = header.rows[0].iter().map(|c| c.content.as_str()).collect();
        assert_eq!(labels, ["Outer", "Inner", "", ""]);
        assert_eq!(header.rows[1].len(), 4);
    }

    #[test]
    fn leaves_without_id_match_by_header() {
        let cfg = configs(&["Total"]);
        let structure = vec![StructuralColumnDef::group(
            "Importes",
            vec![StructuralColumnDef {
                header_name: Some("Total".to_string()),
                ..Default::default()
            }],
        )];
        let columns = resolve_printable_columns(&cfg, Some(&structure));
        let header = build_header_rows(&columns, Some(&structure));
        assert_eq!(header.rows[0][0].content, "Importes");
    }

    #[test]
    fn spans_cover_every_column() {
        let cfg = configs(&["a", "b", "c"]);
        let structure = vec![StructuralColumnDef::group(
            "G",
            vec![StructuralColumnDef::leaf("a", "A"), StructuralColumnDef::leaf("b", "B")],
        )];
        let columns = resolve_printable_columns(&cfg, Some(&structure));
        let header = build_header_rows(&columns, Some(&structure));
        let total: usize = header.rows[0].iter().map(|c| c.col_span).sum();
        assert_eq!(total, columns.len());
        assert_eq!(header.rows[0][0].col_span, 2);
    }
}
