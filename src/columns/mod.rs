//! # Column Resolver
//!
//! Merges the flat column configuration and the optional structural tree
//! into the ordered list of columns that will actually be printed.
//!
//! The configuration decides visibility, headers and order; the structure
//! contributes leaf membership and, in [`groups`], the group header row.

pub mod groups;

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::model::{ColumnConfig, ColumnProperties, ColumnType, PrintConfig, Row, StructuralColumnDef};

/// A column that will be printed, in final order.
#[derive(Debug, Clone)]
pub struct PrintableColumn<'a> {
    pub header: String,
    pub data_key: String,
    pub config: Option<&'a ColumnConfig>,
}

impl<'a> PrintableColumn<'a> {
    fn from_config(config: &'a ColumnConfig) -> Self {
        Self {
            header: config.header().to_string(),
            data_key: config.name.clone(),
            config: Some(config),
        }
    }

    pub fn column_type(&self) -> ColumnType {
        self.config.map(|c| c.column_type).unwrap_or_default()
    }

    pub fn width_percentage(&self) -> Option<f64> {
        self.config.and_then(|c| c.width_percentage())
    }
}

/// Collect the leaves of a structural tree depth-first, in document order.
/// Group nodes are descended into and never returned themselves.
pub fn flatten_leaves(defs: &[StructuralColumnDef]) -> Vec<&StructuralColumnDef> {
    fn visit<'d>(defs: &'d [StructuralColumnDef], out: &mut Vec<&'d StructuralColumnDef>) {
        for def in defs {
            if def.is_group() {
                visit(&def.children, out);
            } else if def.is_leaf() {
                out.push(def);
            }
        }
    }
    let mut out = Vec::new();
    visit(defs, &mut out);
    out
}

/// Resolve the printable columns.
///
/// Leaves come from the structure when it yields any, otherwise one leaf is
/// synthesized per configuration entry. A leaf is dropped when it has no
/// configuration and is hidden in the structure, when it is hidden anywhere
/// and its configuration does not force printing, when its configuration
/// forbids printing, or when its key was already taken. Configuration
/// entries no leaf referred to are appended unless they forbid printing. The
/// result is stably ordered by configuration position; unconfigured keys go
/// last.
pub fn resolve_printable_columns<'a>(
    configs: &'a [ColumnConfig],
    structure: Option<&[StructuralColumnDef]>,
) -> Vec<PrintableColumn<'a>> {
    let order: HashMap<&str, usize> = configs
        .iter()
        .enumerate()
        .map(|(i, c)| (c.name.as_str(), i))
        .collect();
    let by_name: HashMap<&str, &'a ColumnConfig> =
        configs.iter().map(|c| (c.name.as_str(), c)).collect();

    let synthesized: Vec<StructuralColumnDef>;
    let mut leaves = structure.map(flatten_leaves).unwrap_or_default();
    if leaves.is_empty() {
        synthesized = configs
            .iter()
            .map(|c| StructuralColumnDef {
                header_name: Some(c.header().to_string()),
                field: Some(c.name.clone()),
                hide: c.properties.hidden,
                ..Default::default()
            })
            .collect();
        leaves = synthesized.iter().collect();
    }

    let mut seen: HashSet<String> = HashSet::new();
    // Configs a leaf referred to, printed or not.
    let mut consumed: HashSet<String> = HashSet::new();
    let mut columns: Vec<PrintableColumn<'a>> = Vec::new();

    for leaf in leaves {
        let Some(key) = leaf.key() else { continue };
        let config = by_name.get(key).copied();
        let hidden_in_def = leaf.is_hidden();
        let hidden_in_config = config.is_some_and(|c| c.is_hidden());
        let forced = config.is_some_and(|c| c.forces_print());
        if config.is_some() {
            consumed.insert(key.to_string());
        }

        if config.is_none() && hidden_in_def {
            continue;
        }
        if !forced && (hidden_in_config || hidden_in_def) {
            continue;
        }
        if config.is_some_and(|c| c.forbids_print()) {
            continue;
        }
        if !seen.insert(key.to_string()) {
            continue;
        }

        let header = config
            .and_then(|c| c.display_name.clone())
            .or_else(|| leaf.header_name.clone())
            .unwrap_or_else(|| key.to_string());
        columns.push(PrintableColumn {
            header,
            data_key: key.to_string(),
            config,
        });
    }

    for config in configs {
        if consumed.contains(&config.name) || seen.contains(&config.name) || config.forbids_print() {
            continue;
        }
        seen.insert(config.name.clone());
        columns.push(PrintableColumn::from_config(config));
    }

    columns.sort_by_key(|c| order.get(c.data_key.as_str()).copied().unwrap_or(usize::MAX));
    columns
}

/// Derive a column configuration from the rows themselves: one printable
/// column per key of the first row (reserved `__` keys skipped), sharing
/// the page width equally.
pub fn infer_column_configs(rows: &[Row]) -> Vec<ColumnConfig> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    let keys: Vec<&String> = first.keys().filter(|k| !k.starts_with("__")).collect();
    if keys.is_empty() {
        return Vec::new();
    }
    let share = ((100.0 / keys.len() as f64) * 100.0).round() / 100.0;

    keys.into_iter()
        .map(|key| ColumnConfig {
            name: key.clone(),
            display_name: None,
            column_type: infer_column_type(rows, key),
            properties: ColumnProperties {
                hidden: Some(false),
                ..Default::default()
            },
            print: PrintConfig {
                printable: Some(true),
                width_percentage: Some(share),
            },
        })
        .collect()
}

/// Type of the first non-null value under `key`.
fn infer_column_type(rows: &[Row], key: &str) -> ColumnType {
    let first = rows.iter().find_map(|r| r.get(key));
    match first {
        Some(Value::Number(_)) => ColumnType::Number,
        Some(Value::Bool(_)) => ColumnType::Boolean,
        Some(Value::String(s)) if contains_iso_date(s) => ColumnType::Date,
        _ => ColumnType::Text,
    }
}

/// True when `s` contains a `dddd-dd-dd` run.
fn contains_iso_date(s: &str) -> bool {
    const SHAPE: &[u8; 10] = b"dddd-dd-dd";
    s.as_bytes().windows(SHAPE.len()).any(|window| {
        window.iter().zip(SHAPE).all(|(b, shape)| match shape {
            b'd' => b.is_ascii_digit(),
            _ => *b == b'-',
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(name: &str) -> ColumnConfig {
        ColumnConfig::new(name, ColumnType::Text)
    }

    fn keys(columns: &[PrintableColumn]) -> Vec<String> {
        columns.iter().map(|c| c.data_key.clone()).collect()
    }

    #[test]
    fn without_structure_follows_config_order() {
        let mut configs = vec![config("a"), config("b"), config("c")];
        configs[1].display_name = Some("Bravo".to_string());
        let columns = resolve_printable_columns(&configs, None);
        assert_eq!(keys(&columns), ["a", "b", "c"]);
        assert_eq!(columns[1].header, "Bravo");
        assert!(columns[0].config.is_some());
    }

    #[test]
    fn order_follows_config_not_structure() {
        let configs = vec![config("a"), config("b"), config("c")];
        let structure = vec![
            StructuralColumnDef::group("G", vec![StructuralColumnDef::leaf("c", "C")]),
            StructuralColumnDef::leaf("a", "A"),
            StructuralColumnDef::leaf("b", "B"),
        ];
        let reversed: Vec<_> = structure.iter().rev().cloned().collect();
        let one = resolve_printable_columns(&configs, Some(&structure));
        let two = resolve_printable_columns(&configs, Some(&reversed));
        assert_eq!(keys(&one), ["a", "b", "c"]);
        assert_eq!(keys(&one), keys(&two));
    }

    #[test]
    fn hidden_columns_need_a_print_override() {
        let mut configs = vec![config("a"), config("b"), config("c")];
        configs[0].properties.hidden = Some(true);
        configs[1].properties.hidden = Some(true);
        configs[1].print.printable = Some(true);
        configs[2].print.printable = Some(false);
        let columns = resolve_printable_columns(&configs, None);
        assert_eq!(keys(&columns), ["b"]);
    }

    #[test]
    fn hidden_in_structure_without_config_is_dropped() {
        let configs = vec![config("a")];
        let structure = vec![
            StructuralColumnDef::leaf("a", "A"),
            StructuralColumnDef {
                field: Some("x".to_string()),
                hide: Some(true),
                ..Default::default()
            },
            StructuralColumnDef::leaf("extra", "Extra"),
        ];
        let columns = resolve_printable_columns(&configs, Some(&structure));
        assert_eq!(keys(&columns), ["a", "extra"]);
        assert!(columns[1].config.is_none());
        assert_eq!(columns[1].header, "Extra");
    }

    #[test]
    fn forbidden_config_beats_visible_leaf_and_is_not_appended() {
        let mut configs = vec![config("a"), config("b")];
        configs[1].print.printable = Some(false);
        let structure = vec![StructuralColumnDef::leaf("b", "B")];
        let columns = resolve_printable_columns(&configs, Some(&structure));
        assert_eq!(keys(&columns), ["a"]);
    }

    #[test]
    fn duplicate_leaves_keep_the_first() {
        let configs = vec![config("a")];
        let structure = vec![
            StructuralColumnDef::leaf("a", "First"),
            StructuralColumnDef::group("G", vec![StructuralColumnDef::leaf("a", "Second")]),
        ];
        let columns = resolve_printable_columns(&configs, Some(&structure));
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].header, "First");
    }

    #[test]
    fn empty_structure_falls_back_to_configs() {
        let configs = vec![config("a"), config("b")];
        let structure = vec![StructuralColumnDef::default()];
        let columns = resolve_printable_columns(&configs, Some(&structure));
        assert_eq!(keys(&columns), ["a", "b"]);
    }

    #[test]
    fn all_hidden_resolves_to_nothing() {
        let mut configs = vec![config("a")];
        configs[0].properties.hidden = Some(true);
        assert!(resolve_printable_columns(&configs, None).is_empty());
    }

    #[test]
    fn flatten_skips_anonymous_nodes() {
        let tree = vec![
            StructuralColumnDef::group(
                "G",
                vec![StructuralColumnDef::leaf("a", "A"), StructuralColumnDef::default()],
            ),
            StructuralColumnDef::leaf("b", "B"),
        ];
        let leaves: Vec<_> = flatten_leaves(&tree).iter().filter_map(|d| d.key()).collect();
        assert_eq!(leaves, ["a", "b"]);
    }

    #[test]
    fn infers_types_and_equal_widths() {
        let rows: Vec<Row> = serde_json::from_value(json!([
            { "n": null, "s": "hola", "d": "fecha 2024-01-05", "b": false, "__rowType": "data" },
            { "n": 4, "s": "x", "d": "x", "b": true }
        ]))
        .unwrap();
        let configs = infer_column_configs(&rows);
        let by_name: HashMap<_, _> = configs.iter().map(|c| (c.name.as_str(), c)).collect();
        assert_eq!(configs.len(), 4);
        assert_eq!(by_name["n"].column_type, ColumnType::Number);
        assert_eq!(by_name["s"].column_type, ColumnType::Text);
        assert_eq!(by_name["d"].column_type, ColumnType::Date);
        assert_eq!(by_name["b"].column_type, ColumnType::Boolean);
        assert_eq!(by_name["b"].width_percentage(), Some(25.0));
        assert!(infer_column_configs(&[]).is_empty());
    }
}
