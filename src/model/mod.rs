//! # Report Model
//!
//! The typed input of one export: rows, the flat column configuration, the
//! optional hierarchical column structure and the scalar export options.
//!
//! Column configuration arrives in the host's wire format (Spanish field
//! names such as `NombreColumna` and `PropiedadesColumna`); every field also
//! accepts an English alias so hand-written payloads stay readable.

use chrono::NaiveDate;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How a column's values are formatted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum ColumnType {
    #[default]
    Text,
    Number,
    Date,
    Boolean,
}

impl From<String> for ColumnType {
    fn from(raw: String) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "number" | "numero" | "número" | "numeric" => ColumnType::Number,
            "fecha" | "date" | "datetime" => ColumnType::Date,
            "boolean" | "bool" | "booleano" => ColumnType::Boolean,
            _ => ColumnType::Text,
        }
    }
}

/// Sub-format selected by a column's `Formato`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum Format {
    /// MXN currency, es-MX.
    Currency,
    /// USD currency, en-US.
    CurrencyUsd,
    /// EUR currency, es-ES.
    CurrencyEur,
    /// Grouped integer.
    Integer,
    /// Grouped number with exactly two decimals.
    TwoDecimals,
    /// Value is already scaled by 100; divided before percent formatting.
    Percentage,
    /// Fixed decimals plus a literal `%`, no division.
    SimplePercentage,
    ShortDate,
    LongDate,
    DateTime,
    DetailedDateTime,
    /// Anything else; formatted with the type's default.
    Other(String),
}

impl From<String> for Format {
    fn from(raw: String) -> Self {
        match raw.trim() {
            "Dinero" | "currency" | "currencyMXN" => Format::Currency,
            "DineroUSD" | "currencyUSD" => Format::CurrencyUsd,
            "DineroEUR" | "currencyEUR" => Format::CurrencyEur,
            "numero" | "integer" => Format::Integer,
            "numeroDosDecimales" | "twoDecimals" => Format::TwoDecimals,
            "Porcentaje" | "percentage" => Format::Percentage,
            "PorcentajeSimple" | "simplePercentage" => Format::SimplePercentage,
            "FechaCorta" | "shortDate" => Format::ShortDate,
            "FechaLarga" | "longDate" => Format::LongDate,
            "FechaHora" | "dateTime" => Format::DateTime,
            "FechaHoraDetallada" | "detailedDateTime" => Format::DetailedDateTime,
            _ => Format::Other(raw),
        }
    }
}

/// Display properties of a column (`PropiedadesColumna`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnProperties {
    #[serde(rename = "EstaOculta", alias = "hidden", default)]
    pub hidden: Option<bool>,

    #[serde(rename = "Formato", alias = "format", default)]
    pub format: Option<Format>,

    #[serde(
        rename = "DecimalesdeRedondeo",
        alias = "decimalPlaces",
        default,
        deserialize_with = "de_decimal_places"
    )]
    pub decimal_places: Option<u32>,
}

/// Print settings of a column (`Print`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrintConfig {
    /// `Some(true)` forces printing even when the column is hidden;
    /// `Some(false)` always excludes it.
    #[serde(rename = "Printable", alias = "printable", default)]
    pub printable: Option<bool>,

    /// Share of the printable page width, 0 - 100.
    #[serde(
        rename = "WidthPercentage",
        alias = "widthPercentage",
        default,
        deserialize_with = "de_number_or_string"
    )]
    pub width_percentage: Option<f64>,
}

/// One logical field as declared by the data owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnConfig {
    /// Unique key into row objects.
    #[serde(rename = "NombreColumna", alias = "name")]
    pub name: String,

    #[serde(rename = "NombreMostrar", alias = "displayName", default)]
    pub display_name: Option<String>,

    #[serde(rename = "TipoColumna", alias = "type", default)]
    pub column_type: ColumnType,

    #[serde(rename = "PropiedadesColumna", alias = "properties", default)]
    pub properties: ColumnProperties,

    #[serde(rename = "Print", alias = "print", default)]
    pub print: PrintConfig,
}

impl ColumnConfig {
    pub fn new(name: &str, column_type: ColumnType) -> Self {
        Self {
            name: name.to_string(),
            display_name: None,
            column_type,
            properties: ColumnProperties::default(),
            print: PrintConfig::default(),
        }
    }

    /// Label shown in the leaf header row.
    pub fn header(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    pub fn is_hidden(&self) -> bool {
        self.properties.hidden == Some(true)
    }

    pub fn forces_print(&self) -> bool {
        self.print.printable == Some(true)
    }

    pub fn forbids_print(&self) -> bool {
        self.print.printable == Some(false)
    }

    pub fn format(&self) -> Option<&Format> {
        self.properties.format.as_ref()
    }

    pub fn width_percentage(&self) -> Option<f64> {
        self.print.width_percentage
    }
}

/// A node of the hierarchical column structure. Nodes with children are
/// groups; only leaves can be printed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralColumnDef {
    #[serde(default)]
    pub header_name: Option<String>,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default, alias = "id")]
    pub col_id: Option<String>,
    #[serde(default, alias = "hidden")]
    pub hide: Option<bool>,
    #[serde(default)]
    pub children: Vec<StructuralColumnDef>,
}

impl StructuralColumnDef {
    pub fn leaf(field: &str, header_name: &str) -> Self {
        Self {
            header_name: Some(header_name.to_string()),
            field: Some(field.to_string()),
            ..Default::default()
        }
    }

    pub fn group(header_name: &str, children: Vec<StructuralColumnDef>) -> Self {
        Self {
            header_name: Some(header_name.to_string()),
            children,
            ..Default::default()
        }
    }

    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn is_hidden(&self) -> bool {
        self.hide == Some(true)
    }

    /// `field`, else `colId`, without falling back to the header.
    pub fn id(&self) -> Option<&str> {
        self.field.as_deref().or(self.col_id.as_deref())
    }

    /// The key a leaf resolves to: `field`, else `colId`, else `headerName`.
    pub fn key(&self) -> Option<&str> {
        self.id()
            .or(self.header_name.as_deref())
            .filter(|k| !k.is_empty())
    }

    /// A leaf has no children and at least one identifying attribute.
    pub fn is_leaf(&self) -> bool {
        !self.is_group()
            && (self.field.is_some() || self.col_id.is_some() || self.header_name.is_some())
    }
}

/// A named set of column keys, the flat alternative to a structural tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnGroup {
    pub header_name: String,
    pub children: Vec<String>,
}

impl From<ColumnGroup> for StructuralColumnDef {
    fn from(group: ColumnGroup) -> Self {
        let children = group
            .children
            .iter()
            .map(|name| StructuralColumnDef::leaf(name, name))
            .collect();
        StructuralColumnDef::group(&group.header_name, children)
    }
}

/// One entry of the structure input, which may hold either shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StructureEntry {
    Def(StructuralColumnDef),
    Group(ColumnGroup),
}

impl From<StructureEntry> for StructuralColumnDef {
    fn from(entry: StructureEntry) -> Self {
        match entry {
            StructureEntry::Def(def) => def,
            StructureEntry::Group(group) => group.into(),
        }
    }
}

/// One row of grid data: field values plus optional reserved metadata keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(pub Map<String, Value>);

impl Row {
    /// The value at `key`; JSON `null` counts as absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// The value of the first key in `keys` that is present.
    pub fn first_of(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter().find_map(|k| self.get(k))
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }
}

impl From<Map<String, Value>> for Row {
    fn from(map: Map<String, Value>) -> Self {
        Row(map)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Landscape,
    Portrait,
}

/// Edge values (top, right, bottom, left) used for margins and padding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// Page size and margins in points (1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageConfig {
    pub width: f64,
    pub height: f64,
    pub margin: Edges,
}

impl PageConfig {
    /// US Letter, portrait.
    pub const LETTER: (f64, f64) = (612.0, 792.0);

    /// The report margins: a tall top margin reserves room for the title
    /// block, the bottom one for the page footer.
    pub const MARGIN: Edges = Edges {
        top: 100.0,
        right: 30.0,
        bottom: 50.0,
        left: 30.0,
    };

    pub fn for_orientation(orientation: Orientation) -> Self {
        let (w, h) = Self::LETTER;
        let (width, height) = match orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        };
        Self {
            width,
            height,
            margin: Self::MARGIN,
        }
    }

    /// Width between the left and right margins.
    pub fn content_width(&self) -> f64 {
        self.width - self.margin.horizontal()
    }

    /// Y coordinate where body content must stop.
    pub fn content_bottom(&self) -> f64 {
        self.height - self.margin.bottom
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self::for_orientation(Orientation::default())
    }
}

/// Scalar export settings, as the host passes them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportOptions {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub file_name: Option<String>,
    /// Data URI, raw base64, file path, or `none`.
    #[serde(alias = "logoBase64")]
    pub logo: Option<String>,
    pub orientation: Orientation,
    /// Header row fill as hex.
    pub header_fill: Option<String>,
    /// Header row text color as hex.
    pub header_color: Option<String>,
    /// Base font size; headers use it as-is, body cells two points less.
    pub font_size: Option<f64>,
    pub link_text_column: Option<String>,
    pub link_url_column: Option<String>,
    /// Date printed in the page header; today when absent.
    pub generated_on: Option<NaiveDate>,
}

/// Document metadata embedded in the PDF.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub subject: Option<String>,
}

/// Everything one export needs.
#[derive(Debug, Clone, Default)]
pub struct ExportPayload {
    pub rows: Vec<Row>,
    pub columns: Vec<ColumnConfig>,
    /// `None` when no structure was supplied; no group header row is drawn.
    pub structure: Option<Vec<StructuralColumnDef>>,
    /// Appended after `rows` and classified the same way.
    pub summary_rows: Vec<Row>,
    pub options: ExportOptions,
}

fn de_number_or_string<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .trim_end_matches('%')
            .parse::<f64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("expected a number, got \"{}\"", s))),
        Some(other) => Err(de::Error::custom(format!("expected a number, got {}", other))),
    }
}

fn de_decimal_places<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = de_number_or_string(deserializer)?;
    match value {
        None => Ok(None),
        Some(v) if v.is_finite() && v >= 0.0 => Ok(Some((v.round() as u32).min(20))),
        Some(v) => Err(de::Error::custom(format!("invalid decimal places {}", v))),
    }
}
