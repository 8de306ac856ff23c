use wasm_bindgen::prelude::*;

use crate::model::ExportOptions;
use crate::PdfDocument;

fn options_from(value: JsValue) -> Result<ExportOptions, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(ExportOptions::default());
    }
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsValue::from_str(&format!("Opciones no válidas: {}", e)))
}

fn render(
    rows: &str,
    columns: &str,
    groups: Option<String>,
    summary_rows: Option<String>,
    options: JsValue,
) -> Result<PdfDocument, JsValue> {
    crate::export_json(
        rows,
        columns,
        groups.as_deref(),
        summary_rows.as_deref(),
        options_from(options)?,
    )
    .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// PDF bytes for the given JSON inputs.
#[wasm_bindgen]
pub fn export_pdf(
    rows: &str,
    columns: &str,
    groups: Option<String>,
    options: JsValue,
) -> Result<Vec<u8>, JsValue> {
    render(rows, columns, groups, None, options).map(PdfDocument::into_bytes)
}

/// `{ bytes, fileName, blobUrl, pageCount }` for download or inline preview.
#[wasm_bindgen(js_name = exportPdfDocument)]
pub fn export_pdf_document(
    rows: &str,
    columns: &str,
    groups: Option<String>,
    summary_rows: Option<String>,
    options: JsValue,
) -> Result<js_sys::Object, JsValue> {
    let document = render(rows, columns, groups, summary_rows, options)?;
    let result = js_sys::Object::new();
    js_sys::Reflect::set(
        &result,
        &"bytes".into(),
        &js_sys::Uint8Array::from(document.bytes()).into(),
    )?;
    js_sys::Reflect::set(&result, &"fileName".into(), &document.file_name().into())?;
    js_sys::Reflect::set(&result, &"blobUrl".into(), &document.blob_url().into())?;
    js_sys::Reflect::set(
        &result,
        &"pageCount".into(),
        &JsValue::from_f64(document.page_count() as f64),
    )?;
    Ok(result)
}
