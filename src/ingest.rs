//! # JSON Ingestion
//!
//! Parses the host's JSON strings into typed model values. The host often
//! hands over JSON that was itself serialized as a string, so every input
//! first passes through [`unwrap_quoted`]. Wrong shapes are rejected with an
//! [`ExportError`] rather than coerced.

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::columns::infer_column_configs;
use crate::error::ExportError;
use crate::model::{ColumnConfig, ExportOptions, ExportPayload, Row, StructuralColumnDef, StructureEntry};

/// Remove one layer of quoting around a JSON document.
///
/// A text wrapped in `"` that is a valid JSON string literal is decoded by
/// the JSON parser, which restores escaped quotes and newlines. Otherwise a
/// single matching pair of `"` or `'` is stripped and the inner text is kept
/// verbatim.
pub fn unwrap_quoted(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        if let Ok(decoded) = serde_json::from_str::<String>(trimmed) {
            return decoded.trim().to_string();
        }
    }
    let quoted = |q: char| trimmed.len() >= 2 && trimmed.starts_with(q) && trimmed.ends_with(q);
    if quoted('"') || quoted('\'') {
        return trimmed[1..trimmed.len() - 1].trim().to_string();
    }
    trimmed.to_string()
}

fn parse_value(input: &'static str, raw: &str) -> Result<Option<Value>, ExportError> {
    let text = unwrap_quoted(raw);
    if text.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|e| ExportError::json(input, e))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "un booleano",
        Value::Number(_) => "un número",
        Value::String(_) => "un texto",
        Value::Array(_) => "un arreglo",
        Value::Object(_) => "un objeto",
    }
}

fn expect_array(input: &'static str, value: Value) -> Result<Vec<Value>, ExportError> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(ExportError::InvalidShape {
            input,
            detail: format!("se esperaba un arreglo y se recibió {}", type_name(&other)),
        }),
    }
}

fn rows_from(input: &'static str, items: Vec<Value>) -> Result<Vec<Row>, ExportError> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(map) => Ok(Row(map)),
            other => Err(ExportError::InvalidShape {
                input,
                detail: format!("la fila {} es {}, no un objeto", i + 1, type_name(&other)),
            }),
        })
        .collect()
}

fn items_from<T: DeserializeOwned>(input: &'static str, items: Vec<Value>) -> Result<Vec<T>, ExportError> {
    items
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(|e| ExportError::json(input, e)))
        .collect()
}

fn check_unique(columns: &[ColumnConfig]) -> Result<(), ExportError> {
    let mut seen = HashSet::new();
    for column in columns {
        if !seen.insert(column.name.as_str()) {
            return Err(ExportError::DuplicateColumn(column.name.clone()));
        }
    }
    Ok(())
}

/// Parse the rows input: an array of objects. Blank input yields no rows.
pub fn parse_rows(raw: &str) -> Result<Vec<Row>, ExportError> {
    const INPUT: &str = "filas";
    match parse_value(INPUT, raw)? {
        None => Ok(Vec::new()),
        Some(value) => rows_from(INPUT, expect_array(INPUT, value)?),
    }
}

/// Parse the trailing summary rows; same shape as [`parse_rows`].
pub fn parse_summary_rows(raw: &str) -> Result<Vec<Row>, ExportError> {
    const INPUT: &str = "filas de resumen";
    match parse_value(INPUT, raw)? {
        None => Ok(Vec::new()),
        Some(value) => rows_from(INPUT, expect_array(INPUT, value)?),
    }
}

/// Parse the column configuration array. Column names must be unique.
pub fn parse_column_configs(raw: &str) -> Result<Vec<ColumnConfig>, ExportError> {
    const INPUT: &str = "configuración de columnas";
    let columns: Vec<ColumnConfig> = match parse_value(INPUT, raw)? {
        None => Vec::new(),
        Some(value) => items_from(INPUT, expect_array(INPUT, value)?)?,
    };
    check_unique(&columns)?;
    Ok(columns)
}

/// Parse the optional column structure: structural definitions or column
/// groups, in any mix. Blank input means no structure.
pub fn parse_structure(raw: &str) -> Result<Option<Vec<StructuralColumnDef>>, ExportError> {
    const INPUT: &str = "estructura de columnas";
    match parse_value(INPUT, raw)? {
        None => Ok(None),
        Some(value) => {
            let entries: Vec<StructureEntry> = items_from(INPUT, expect_array(INPUT, value)?)?;
            Ok(Some(entries.into_iter().map(Into::into).collect()))
        }
    }
}

/// Parse an options document. Blank input yields the defaults.
pub fn parse_options(raw: &str) -> Result<ExportOptions, ExportError> {
    const INPUT: &str = "opciones";
    match parse_value(INPUT, raw)? {
        None => Ok(ExportOptions::default()),
        Some(value) => serde_json::from_value(value).map_err(|e| ExportError::json(INPUT, e)),
    }
}

fn first_present<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| map.get(*k).filter(|v| !v.is_null()))
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Parse a combined table-data document.
///
/// The document is either a bare array of rows or an object carrying the
/// rows plus any of the column configuration, column structure, summary
/// rows, title, subtitle and logo. Without column configuration, one is
/// inferred from the rows.
pub fn parse_table_data(raw: &str) -> Result<ExportPayload, ExportError> {
    const INPUT: &str = "datos de tabla";
    let value = parse_value(INPUT, raw)?.ok_or(ExportError::NoRows)?;

    let mut payload = ExportPayload::default();
    match value {
        Value::Array(items) => {
            payload.rows = rows_from(INPUT, items)?;
        }
        Value::Object(map) => {
            let rows = first_present(&map, &["rows", "data", "items"]).ok_or_else(|| {
                ExportError::InvalidShape {
                    input: INPUT,
                    detail: "debe incluir una colección \"rows\", \"data\" o ser un arreglo de objetos".to_string(),
                }
            })?;
            payload.rows = rows_from(INPUT, expect_array(INPUT, rows.clone())?)?;

            if let Some(columns) = first_present(&map, &["columnConfigs", "columnConfig", "columns"]) {
                payload.columns = items_from(INPUT, expect_array(INPUT, columns.clone())?)?;
                check_unique(&payload.columns)?;
            }
            if let Some(defs) = first_present(&map, &["columnDefs", "columnDefinitions", "columnGroups"]) {
                let entries: Vec<StructureEntry> = items_from(INPUT, expect_array(INPUT, defs.clone())?)?;
                if !entries.is_empty() {
                    payload.structure = Some(entries.into_iter().map(Into::into).collect());
                }
            }
            if let Some(summary) = first_present(&map, &["summaryRows", "totals"]) {
                payload.summary_rows = rows_from(INPUT, expect_array(INPUT, summary.clone())?)?;
            }
            payload.options.title = string_field(&map, "title");
            payload.options.subtitle = string_field(&map, "subtitle");
            payload.options.logo = string_field(&map, "logoBase64");
        }
        other => {
            return Err(ExportError::InvalidShape {
                input: INPUT,
                detail: format!("formato no soportado: {}", type_name(&other)),
            })
        }
    }

    if payload.columns.is_empty() {
        payload.columns = infer_column_configs(&payload.rows);
        log::debug!("inferred {} column configs from the rows", payload.columns.len());
    }
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ColumnType;

    #[test]
    fn unwrap_decodes_json_string_literals() {
        let raw = r#""[{\"a\":1}]""#;
        assert_eq!(unwrap_quoted(raw), r#"[{"a":1}]"#);
        let rows = parse_rows(raw).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn unwrap_strips_single_quotes_verbatim() {
        assert_eq!(unwrap_quoted(" '[1, 2]' "), "[1, 2]");
        assert_eq!(unwrap_quoted("[1]"), "[1]");
        assert_eq!(unwrap_quoted("\""), "\"");
    }

    #[test]
    fn blank_rows_are_empty_not_an_error() {
        assert!(parse_rows("   ").unwrap().is_empty());
        assert!(parse_structure("").unwrap().is_none());
    }

    #[test]
    fn rejects_non_object_rows() {
        let err = parse_rows("[{\"a\":1}, 3]").unwrap_err();
        assert!(matches!(err, ExportError::InvalidShape { .. }));
        assert!(err.to_string().contains("fila 2"));
    }

    #[test]
    fn rejects_wrong_top_level_type() {
        assert!(matches!(parse_rows("{\"a\":1}"), Err(ExportError::InvalidShape { .. })));
        assert!(matches!(parse_column_configs("42"), Err(ExportError::InvalidShape { .. })));
        assert!(matches!(parse_rows("[1,"), Err(ExportError::InvalidJson { .. })));
    }

    #[test]
    fn rejects_duplicate_column_names() {
        let raw = r#"[{"NombreColumna":"a"},{"NombreColumna":"b"},{"NombreColumna":"a"}]"#;
        match parse_column_configs(raw) {
            Err(ExportError::DuplicateColumn(name)) => assert_eq!(name, "a"),
            other => panic!("expected duplicate error, got {:?}", other),
        }
    }

    #[test]
    fn structure_accepts_groups() {
        let defs = parse_structure(r#"[{"headerName":"G","children":["a","b"]}]"#)
            .unwrap()
            .unwrap();
        assert_eq!(defs[0].children.len(), 2);
        assert_eq!(defs[0].children[0].field.as_deref(), Some("a"));
    }

    #[test]
    fn table_data_as_bare_array_infers_columns() {
        let payload = parse_table_data(r#"[{"id":1,"fecha":"2024-01-02","ok":true,"__rowType":"data"}]"#).unwrap();
        assert_eq!(payload.rows.len(), 1);
        let names: Vec<_> = payload.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["fecha", "id", "ok"]);
        assert_eq!(payload.columns[0].column_type, ColumnType::Date);
    }

    #[test]
    fn table_data_object_reads_aliases() {
        let raw = r#"{
            "data": [{"a": 1}],
            "columns": [{"NombreColumna": "a", "TipoColumna": "number"}],
            "columnGroups": [{"headerName": "G", "children": ["a"]}],
            "totals": [{"a": 1, "__rowType": "total"}],
            "title": "Reporte",
            "logoBase64": "none"
        }"#;
        let payload = parse_table_data(raw).unwrap();
        assert_eq!(payload.columns[0].column_type, ColumnType::Number);
        assert!(payload.structure.is_some());
        assert_eq!(payload.summary_rows.len(), 1);
        assert_eq!(payload.options.title.as_deref(), Some("Reporte"));
        assert_eq!(payload.options.logo.as_deref(), Some("none"));
    }

    #[test]
    fn table_data_without_rows_is_rejected() {
        assert!(matches!(parse_table_data(r#"{"title":"x"}"#), Err(ExportError::InvalidShape { .. })));
        assert!(matches!(parse_table_data("true"), Err(ExportError::InvalidShape { .. })));
    }
}
