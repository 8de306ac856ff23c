//! # Value Formatter
//!
//! Turns a raw cell value into its display string using the column's type
//! and sub-format. Formatting never fails: a value that does not fit its
//! declared type is shown as plain text and a warning is logged.

pub mod date;
pub mod number;

use serde_json::Value;

use crate::model::{ColumnConfig, ColumnType, Format};
use number::Locale;

/// Fraction digits when a column does not configure any.
pub const DEFAULT_DECIMALS: u32 = 2;

/// Format a cell value for display. Absent and `null` values are empty.
pub fn format_value(value: Option<&Value>, config: Option<&ColumnConfig>) -> String {
    let value = match value {
        None | Some(Value::Null) => return String::new(),
        Some(v) => v,
    };
    let Some(config) = config else {
        return safe_stringify(value);
    };

    match config.column_type {
        ColumnType::Number => format_number(value, config),
        ColumnType::Date => format_date(value, config),
        ColumnType::Boolean => {
            if is_truthy(value) {
                "Sí".to_string()
            } else {
                "No".to_string()
            }
        }
        ColumnType::Text => safe_stringify(value),
    }
}

fn format_number(value: &Value, config: &ColumnConfig) -> String {
    let Some(n) = coerce_number(value).filter(|n| n.is_finite()) else {
        log::warn!(
            "column \"{}\": {} is not a number, shown as text",
            config.name,
            value
        );
        return safe_stringify(value);
    };

    let configured = config.properties.decimal_places;
    let decimals = configured.unwrap_or(DEFAULT_DECIMALS) as usize;
    match config.format() {
        Some(Format::Currency) => number::currency(n, Locale::EsMx, decimals),
        Some(Format::CurrencyUsd) => number::currency(n, Locale::EnUs, decimals),
        Some(Format::CurrencyEur) => number::currency(n, Locale::EsEs, decimals),
        Some(Format::Integer) => number::fixed(n, Locale::EsMx, 0),
        Some(Format::TwoDecimals) => number::fixed(n, Locale::EsMx, 2),
        // The value is already a percentage; dividing by 100 and formatting
        // as percent leaves the digits unchanged.
        Some(Format::Percentage) => {
            let decimals = configured.unwrap_or(0) as usize;
            format!("{}%", number::fixed(n, Locale::EsMx, decimals))
        }
        Some(Format::SimplePercentage) => {
            format!("{}%", number::fixed(n, Locale::EsMx, decimals))
        }
        _ => number::fixed(n, Locale::EsMx, decimals),
    }
}

fn format_date(value: &Value, config: &ColumnConfig) -> String {
    let Some(dt) = date::parse_date_value(value) else {
        log::warn!(
            "column \"{}\": {} is not a date, shown as text",
            config.name,
            value
        );
        return safe_stringify(value);
    };
    match config.format() {
        Some(Format::LongDate) => date::long_date(dt.date()),
        Some(Format::DateTime) => date::date_time(&dt),
        Some(Format::DetailedDateTime) => date::detailed_date_time(&dt),
        _ => date::short_date(dt.date()),
    }
}

/// Numbers as-is, numeric strings parsed, booleans as 1 / 0.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                s.parse::<f64>().ok()
            }
        }
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// JavaScript truthiness of a JSON value.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Plain-text fallback: JSON for arrays and objects, otherwise the value's
/// text with control characters removed and surrounding whitespace trimmed.
pub fn safe_stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
        Value::Number(n) => match n.as_i64() {
            Some(i) => i.to_string(),
            None => match n.as_u64() {
                Some(u) => u.to_string(),
                None => number::js_number_string(n.as_f64().unwrap_or(f64::NAN)),
            },
        },
        Value::Bool(b) => b.to_string(),
        Value::String(s) => strip_control(s),
    }
}

fn strip_control(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(*c as u32, 0x00..=0x1F | 0x7F..=0x9F))
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ColumnProperties;
    use serde_json::json;

    fn column(column_type: ColumnType, format: Option<&str>, decimals: Option<u32>) -> ColumnConfig {
        let mut config = ColumnConfig::new("c", column_type);
        config.properties = ColumnProperties {
            hidden: None,
            format: format.map(|f| Format::from(f.to_string())),
            decimal_places: decimals,
        };
        config
    }

    fn fmt(value: Value, config: &ColumnConfig) -> String {
        format_value(Some(&value), Some(config))
    }

    #[test]
    fn absent_and_null_are_empty_for_every_type() {
        for t in [ColumnType::Text, ColumnType::Number, ColumnType::Date, ColumnType::Boolean] {
            let c = column(t, None, None);
            assert_eq!(format_value(None, Some(&c)), "");
            assert_eq!(fmt(Value::Null, &c), "");
        }
    }

    #[test]
    fn percentage_formats() {
        assert_eq!(fmt(json!(50), &column(ColumnType::Number, Some("Porcentaje"), None)), "50%");
        assert_eq!(
            fmt(json!(12.345), &column(ColumnType::Number, Some("Porcentaje"), Some(1))),
            "12.3%"
        );
        assert_eq!(
            fmt(json!(50), &column(ColumnType::Number, Some("PorcentajeSimple"), None)),
            "50.00%"
        );
    }

    #[test]
    fn currency_formats() {
        let mxn = column(ColumnType::Number, Some("Dinero"), Some(2));
        assert_eq!(fmt(json!(1234.5), &mxn), "$1,234.50");
        assert_eq!(fmt(json!("1234.5"), &mxn), "$1,234.50");
        let usd = column(ColumnType::Number, Some("currencyUSD"), None);
        assert_eq!(fmt(json!(-3), &usd), "-$3.00");
        let eur = column(ColumnType::Number, Some("DineroEUR"), None);
        assert_eq!(fmt(json!(1234.5), &eur), "1234,50\u{a0}€");
    }

    #[test]
    fn plain_number_formats() {
        assert_eq!(fmt(json!(1234.567), &column(ColumnType::Number, Some("numero"), None)), "1,235");
        assert_eq!(
            fmt(json!(7), &column(ColumnType::Number, Some("numeroDosDecimales"), Some(4))),
            "7.00"
        );
        assert_eq!(fmt(json!(1234.5), &column(ColumnType::Number, None, Some(3))), "1,234.500");
        assert_eq!(fmt(json!(true), &column(ColumnType::Number, None, Some(0))), "1");
    }

    #[test]
    fn non_numeric_values_fall_back_to_text() {
        let c = column(ColumnType::Number, Some("Dinero"), None);
        assert_eq!(fmt(json!(" n/a\n"), &c), "n/a");
        assert_eq!(fmt(json!({ "a": 1 }), &c), r#"{"a":1}"#);
    }

    #[test]
    fn date_formats() {
        let c = column(ColumnType::Date, Some("FechaLarga"), None);
        assert_eq!(fmt(json!("2024-03-05"), &c), "martes, 5 de marzo de 2024");
        let c = column(ColumnType::Date, Some("FechaHora"), None);
        assert_eq!(fmt(json!("2024-03-05T14:30:00"), &c), "5/3/2024, 14:30:00");
        let c = column(ColumnType::Date, None, None);
        assert_eq!(fmt(json!("2024-03-05"), &c), "5/3/2024");
        assert_eq!(fmt(json!("not-a-date"), &c), "not-a-date");
    }

    #[test]
    fn booleans_use_truthiness() {
        let c = column(ColumnType::Boolean, None, None);
        assert_eq!(fmt(json!(true), &c), "Sí");
        assert_eq!(fmt(json!(0), &c), "No");
        assert_eq!(fmt(json!(""), &c), "No");
        assert_eq!(fmt(json!("false"), &c), "Sí");
    }

    #[test]
    fn safe_stringify_matches_host_rendering() {
        assert_eq!(safe_stringify(&json!(3.0)), "3");
        assert_eq!(safe_stringify(&json!(3)), "3");
        assert_eq!(safe_stringify(&json!(2.5)), "2.5");
        assert_eq!(safe_stringify(&json!("a\u{0007}b ")), "ab");
        assert_eq!(safe_stringify(&json!([1, "x"])), r#"[1,"x"]"#);
        assert_eq!(format_value(Some(&json!(false)), None), "false");
    }
}
