//! The finished export: PDF bytes plus what it takes to hand them over.

use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;

use crate::error::ExportError;
use crate::layout::{LayoutPage, ReportLayout};
use crate::model::{ExportOptions, Metadata};

pub const DEFAULT_FILE_NAME: &str = "grid-export.pdf";

/// A rendered report.
#[derive(Debug, Clone)]
pub struct PdfDocument {
    layout: ReportLayout,
    metadata: Metadata,
    file_name: String,
    bytes: Vec<u8>,
}

impl PdfDocument {
    pub(crate) fn new(layout: ReportLayout, metadata: Metadata, file_name: String, bytes: Vec<u8>) -> Self {
        Self {
            layout,
            metadata,
            file_name,
            bytes,
        }
    }

    /// The laid-out pages the bytes were written from.
    pub fn pages(&self) -> &[LayoutPage] {
        &self.layout.pages
    }

    pub fn page_count(&self) -> usize {
        self.layout.pages.len()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Download name, always ending in `.pdf`.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ExportError> {
        fs::write(path, &self.bytes)?;
        Ok(())
    }

    /// Save under [`file_name`](Self::file_name) inside `dir`.
    pub fn save_in(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ExportError> {
        let path = dir.as_ref().join(&self.file_name);
        self.save(&path)?;
        log::debug!("saved {} bytes to {}", self.bytes.len(), path.display());
        Ok(path)
    }

    /// A `data:` URL for inline preview.
    pub fn blob_url(&self) -> String {
        format!(
            "data:application/pdf;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

/// The download name: the caller's, or the slugified title. `.pdf` is
/// appended when missing.
pub fn file_name_for(options: &ExportOptions) -> String {
    let supplied = options
        .file_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());
    if let Some(name) = supplied {
        return if name.to_ascii_lowercase().ends_with(".pdf") {
            name.to_string()
        } else {
            format!("{}.pdf", name)
        };
    }

    let title = options
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(crate::layout::template::DEFAULT_TITLE);
    let slug = slug::slugify(title);
    if slug.is_empty() {
        DEFAULT_FILE_NAME.to_string()
    } else {
        format!("{}.pdf", slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(title: Option<&str>, file_name: Option<&str>) -> String {
        file_name_for(&ExportOptions {
            title: title.map(str::to_string),
            file_name: file_name.map(str::to_string),
            ..Default::default()
        })
    }

    fn document(bytes: &[u8]) -> PdfDocument {
        PdfDocument::new(
            ReportLayout::default(),
            Metadata::default(),
            "reporte.pdf".to_string(),
            bytes.to_vec(),
        )
    }

    #[test]
    fn file_name_from_title() {
        assert_eq!(named(Some("Ventas de Marzo"), None), "ventas-de-marzo.pdf");
        assert_eq!(named(None, None), DEFAULT_FILE_NAME);
        assert_eq!(named(Some("***"), None), DEFAULT_FILE_NAME);
    }

    #[test]
    fn supplied_file_name_gets_extension() {
        assert_eq!(named(Some("x"), Some("informe")), "informe.pdf");
        assert_eq!(named(None, Some("informe.PDF")), "informe.PDF");
    }

    #[test]
    fn blob_url_is_base64_data_url() {
        assert_eq!(document(b"%PDF").blob_url(), "data:application/pdf;base64,JVBERg==");
    }

    #[test]
    fn save_in_uses_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = document(b"%PDF-1.7").save_in(dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "reporte.pdf");
        assert_eq!(std::fs::read(path).unwrap(), b"%PDF-1.7");
    }
}
