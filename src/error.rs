//! Structured error types for the report exporter.
//!
//! Messages are written for the people who press the export button, so they
//! are in Spanish. Input-shape and resolution errors abort the export before
//! any document exists; per-cell formatting problems never reach this type.

use thiserror::Error;

/// The unified error type returned by all public exporter functions.
#[derive(Debug, Error)]
pub enum ExportError {
    /// A JSON input failed to parse.
    #[error("El JSON de {input} no es válido: {source}{}", hint_suffix(.hint))]
    InvalidJson {
        input: &'static str,
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    /// A JSON input parsed but does not have the expected shape.
    #[error("El JSON de {input} tiene un formato no soportado: {detail}")]
    InvalidShape { input: &'static str, detail: String },

    /// Two column configurations share the same name.
    #[error("La columna \"{0}\" está configurada más de una vez.")]
    DuplicateColumn(String),

    /// A header color is not a hex color.
    #[error("El color \"{0}\" no es un color hexadecimal válido.")]
    InvalidColor(String),

    /// The base font size cannot produce a readable table.
    #[error("El tamaño de letra {0} no es válido; debe ser mayor que 2.")]
    InvalidFontSize(f64),

    #[error("No se proporcionaron datos para exportar. Verifique la entrada.")]
    NoRows,

    #[error("No se proporcionó la configuración de columnas. Verifique la entrada.")]
    NoColumnConfig,

    #[error("No hay columnas visibles para exportar. Ajusta la configuración de impresión.")]
    NoPrintableColumns,

    /// Writing the finished document to disk failed.
    #[error("No se pudo guardar el PDF: {0}")]
    Io(#[from] std::io::Error),
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Sugerencia: {}", hint)
    }
}

impl ExportError {
    /// Wrap a serde_json error for the named input, attaching a hint.
    pub fn json(input: &'static str, source: serde_json::Error) -> Self {
        let hint = match source.classify() {
            serde_json::error::Category::Syntax => {
                "Revise comas sobrantes, comillas faltantes o caracteres sin escapar.".to_string()
            }
            serde_json::error::Category::Data => {
                "El JSON es válido pero sus campos no coinciden con el formato esperado.".to_string()
            }
            serde_json::error::Category::Eof => {
                "El JSON termina antes de tiempo; ¿está truncado?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        ExportError::InvalidJson {
            input,
            source,
            hint,
        }
    }

    /// True for errors caused by the caller's input rather than the environment.
    pub fn is_input_error(&self) -> bool {
        !matches!(self, ExportError::Io(_))
    }
}
