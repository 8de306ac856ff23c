//! # pdf-reporter
//!
//! Turns grid data described as JSON into a paginated, printable PDF report.
//!
//! The input is three independent descriptions of the same table: the rows,
//! a flat per-column display configuration, and an optional hierarchical
//! column structure used for grouping. They are merged into one ordered list
//! of printable columns, every value is formatted for its column, and the
//! table is paged onto US Letter with a repeating title block, logo, grouped
//! headers and a `Página X de Y` footer.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON strings / typed payload)
//!       ↓
//!   [ingest]    Parse and validate into typed structures
//!       ↓
//!   [columns]   Resolve printable columns, build grouped header rows
//!       ↓
//!   [body]      Classify rows, format every cell, index links
//!       ↓
//!   [layout]    Page the table, paint the page template, resolve totals
//!       ↓
//!   [pdf]       Serialize to PDF bytes
//! ```

pub mod body;
pub mod classify;
pub mod columns;
pub mod document;
pub mod error;
pub mod font;
pub mod format;
pub mod image_loader;
pub mod ingest;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod style;
pub mod text;

#[cfg(feature = "wasm")]
pub mod wasm;

use body::LinkColumns;
use columns::groups::build_header_rows;
use columns::resolve_printable_columns;
use layout::{LayoutEngine, PageTemplate, TableInput, TableStyle};
use model::{ExportOptions, ExportPayload, Metadata, PageConfig};
use pdf::PdfWriter;

pub use document::PdfDocument;
pub use error::ExportError;

/// Render a typed payload to a PDF document.
///
/// This is the primary entry point. Fails before producing anything when
/// there are no rows, no column configuration, no printable column, or an
/// invalid header color or font size.
pub fn export(payload: &ExportPayload) -> Result<PdfDocument, ExportError> {
    if payload.rows.is_empty() {
        return Err(ExportError::NoRows);
    }
    if payload.columns.is_empty() {
        return Err(ExportError::NoColumnConfig);
    }

    let options = &payload.options;
    let style = TableStyle::from_options(options)?;

    let structure = payload.structure.as_deref();
    let columns = resolve_printable_columns(&payload.columns, structure);
    if columns.is_empty() {
        return Err(ExportError::NoPrintableColumns);
    }
    log::debug!(
        "{} of {} configured columns are printable",
        columns.len(),
        payload.columns.len()
    );

    let header = build_header_rows(&columns, structure);
    let links = LinkColumns {
        text: options.link_text_column.as_deref(),
        url: options.link_url_column.as_deref(),
    };
    let body = body::materialize(&columns, &payload.rows, &payload.summary_rows, links);

    let page = PageConfig::for_orientation(options.orientation);
    let table = TableInput::new(&columns, &header, &body, &style, &page);
    let template = PageTemplate::from_options(options);
    let logo = image_loader::resolve_logo(options.logo.as_deref());

    let layout = LayoutEngine::new().layout(&page, &template, &table, logo);

    let metadata = Metadata {
        title: Some(template.title.clone()),
        subject: template.subtitle.clone(),
    };
    let bytes = PdfWriter::new().write(&layout, &metadata);
    log::debug!("wrote {} bytes over {} page(s)", bytes.len(), layout.pages.len());

    Ok(PdfDocument::new(
        layout,
        metadata,
        document::file_name_for(options),
        bytes,
    ))
}

/// Render from the JSON strings a host hands over: rows, column
/// configuration, and the optional column structure and summary rows.
/// Each string may carry one extra layer of quoting.
pub fn export_json(
    rows: &str,
    columns: &str,
    structure: Option<&str>,
    summary_rows: Option<&str>,
    options: ExportOptions,
) -> Result<PdfDocument, ExportError> {
    let payload = ExportPayload {
        rows: ingest::parse_rows(rows)?,
        columns: ingest::parse_column_configs(columns)?,
        structure: structure.map(ingest::parse_structure).transpose()?.flatten(),
        summary_rows: summary_rows
            .map(ingest::parse_summary_rows)
            .transpose()?
            .unwrap_or_default(),
        options,
    };
    export(&payload)
}

/// Render a combined table-data document (see [`ingest::parse_table_data`]).
/// Scalar options in `overrides` win over the title, subtitle and logo the
/// document carries.
pub fn export_table_data(raw: &str, overrides: ExportOptions) -> Result<PdfDocument, ExportError> {
    let mut payload = ingest::parse_table_data(raw)?;
    payload.options = merge_options(payload.options, overrides);
    export(&payload)
}

/// Fields set in `overrides` replace those in `base`.
pub fn merge_options(base: ExportOptions, overrides: ExportOptions) -> ExportOptions {
    ExportOptions {
        title: overrides.title.or(base.title),
        subtitle: overrides.subtitle.or(base.subtitle),
        file_name: overrides.file_name.or(base.file_name),
        logo: overrides.logo.or(base.logo),
        orientation: overrides.orientation,
        header_fill: overrides.header_fill.or(base.header_fill),
        header_color: overrides.header_color.or(base.header_color),
        font_size: overrides.font_size.or(base.font_size),
        link_text_column: overrides.link_text_column.or(base.link_text_column),
        link_url_column: overrides.link_url_column.or(base.link_url_column),
        generated_on: overrides.generated_on.or(base.generated_on),
    }
}
