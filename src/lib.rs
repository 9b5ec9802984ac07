//! Library crate for plc_st_ast.
//!
//! Structured Text source is parsed by the pest grammar in [`parser`],
//! turned into the typed tree of [`ast`] by [`transform`], and has its
//! comments put back by [`merge`]. Every node renders back to source text
//! through `Display`.

pub mod ast;
pub mod batch;
pub mod comments;
pub mod error;
pub mod merge;
pub mod parser;
pub mod settings;
pub mod transform;

pub use ast::SourceCode;
pub use batch::{parse_batch, BatchEntry, BatchResult, SourceItem};
pub use error::{ConstructionError, Error, Result};
pub use parser::{parse_source_code, SourceParser};
pub use settings::{parse_settings_from_text, Settings};

use serde::Serialize;
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct FormatResult {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    formatted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<usize>,
}

impl FormatResult {
    fn failed(err: &Error) -> Self {
        Self {
            status: "ERROR",
            formatted: None,
            error: Some(err.to_string()),
            kind: Some(err.kind()),
            line: err.line(),
        }
    }
}

// Called from JavaScript with the editor contents.
#[wasm_bindgen]
pub fn format_plc_code(source_code: &str, settings_json: &str, file_name: &str) -> String {
    let result = match parse_settings_from_text(settings_json) {
        Err(err) => FormatResult::failed(&err),
        Ok(settings) => match SourceParser::new(settings).parse(source_code, file_name) {
            Ok(code) => FormatResult {
                status: "OK",
                formatted: Some(code.to_string()),
                error: None,
                kind: None,
                line: None,
            },
            Err(err) => FormatResult::failed(&err),
        },
    };
    serde_json::to_string(&result).unwrap_or_else(|_| "{}".into())
}
