//! WebAssembly tests for the browser binding.
//!
//! Run with: wasm-pack test --headless --chrome -- --features wasm

#![cfg(all(target_arch = "wasm32", feature = "wasm"))]

use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

const ROWS: &str = r#"[{ "cliente": "Ana", "monto": 10 }]"#;
const COLUMNS: &str = r#"[
    { "NombreColumna": "cliente", "TipoColumna": "text" },
    { "NombreColumna": "monto", "TipoColumna": "number" }
]"#;

#[wasm_bindgen_test]
fn export_without_options_uses_todays_date() {
    let bytes = pdf_reporter::wasm::export_pdf(ROWS, COLUMNS, None, JsValue::UNDEFINED).unwrap();
    assert!(bytes.starts_with(b"%PDF-1.7"));
}

#[wasm_bindgen_test]
fn document_export_reports_page_count() {
    let doc =
        pdf_reporter::wasm::export_pdf_document(ROWS, COLUMNS, None, None, JsValue::NULL).unwrap();
    let pages = js_sys::Reflect::get(&doc, &"pageCount".into()).unwrap();
    assert_eq!(pages.as_f64(), Some(1.0));
    let name = js_sys::Reflect::get(&doc, &"fileName".into()).unwrap();
    assert_eq!(name.as_string().as_deref(), Some("grid-export.pdf"));
}
