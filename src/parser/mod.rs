//! Structured Text front end: the pest grammar and the parser handle.
//!
//! [`SourceParser`] runs the grammar over a file, turns the resulting pairs
//! into a [`SourceCode`] tree and, unless disabled, re-attaches the comments
//! the grammar skipped.

use pest::error::LineColLocation;
use pest::Parser;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::ast::SourceCode;
use crate::comments::{extract_comments, LineIndex};
use crate::error::{Error, Result};
use crate::merge::merge_comments;
use crate::settings::Settings;
use crate::transform::Transformer;

#[derive(pest_derive::Parser)]
#[grammar = "parser/iec61131.pest"]
pub struct IecParser;

/// Keyword rules only mark structure; their text never reaches a node.
pub fn is_keyword(rule: Rule) -> bool {
    use Rule::*;
    matches!(
        rule,
        EOI | FUNCTION_BLOCK
            | END_FUNCTION_BLOCK
            | FUNCTION
            | END_FUNCTION
            | PROGRAM
            | END_PROGRAM
            | METHOD
            | END_METHOD
            | ACTION
            | ENTRY_ACTION
            | EXIT_ACTION
            | END_ACTION
            | INTERFACE
            | END_INTERFACE
            | TYPE
            | END_TYPE
            | STRUCT
            | END_STRUCT
            | ARRAY
            | OF
            | VAR
            | VAR_INPUT
            | VAR_OUTPUT
            | VAR_IN_OUT
            | VAR_TEMP
            | VAR_INST
            | VAR_GLOBAL
            | VAR_EXTERNAL
            | VAR_ACCESS
            | END_VAR
            | AT
            | EXTENDS
            | IMPLEMENTS
            | IF
            | THEN
            | ELSIF
            | ELSE
            | END_IF
            | CASE
            | END_CASE
            | FOR
            | TO
            | BY
            | DO
            | END_FOR
            | WHILE
            | END_WHILE
            | REPEAT
            | UNTIL
            | END_REPEAT
            | EXIT
            | CONTINUE
            | RETURN
    )
}

/// One parser for a whole run. It holds no mutable state, so a single
/// handle can be shared by reference between callers and threads.
#[derive(Debug, Clone, Default)]
pub struct SourceParser {
    settings: Settings,
}

impl SourceParser {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Parse one file. `filename` only labels diagnostics.
    pub fn parse(&self, source: &str, filename: &str) -> Result<SourceCode> {
        let mut pairs = IecParser::parse(Rule::iec_source, source).map_err(|e| {
            let line = match e.line_col {
                LineColLocation::Pos((line, _)) | LineColLocation::Span((line, _), _) => line,
            };
            Error::Syntax {
                filename: filename.to_string(),
                line,
                message: e.with_path(filename).to_string(),
            }
        })?;
        let Some(root) = pairs.next() else {
            return Ok(SourceCode::default());
        };

        let lines = LineIndex::new(source);
        let mut code = Transformer::new(&lines)
            .transform_source(root)
            .map_err(|source| Error::Construction {
                filename: filename.to_string(),
                source,
            })?;

        if self.settings.attach_comments {
            let comments = extract_comments(source, &lines);
            let found = comments.len();
            let orphans = merge_comments(&mut code, comments);
            debug!(filename, found, orphans, "attached comments");
        }
        debug!(filename, items = code.items.len(), "parsed");
        Ok(code)
    }

    pub fn parse_file(&self, path: &Path) -> Result<SourceCode> {
        let source = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse(&source, &path.display().to_string())
    }
}

/// Parse with default settings.
pub fn parse_source_code(source: &str, filename: &str) -> Result<SourceCode> {
    SourceParser::default().parse(source, filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_recognized() {
        assert!(is_keyword(Rule::END_VAR));
        assert!(is_keyword(Rule::EOI));
        assert!(!is_keyword(Rule::identifier));
        assert!(!is_keyword(Rule::variable_attribute));
    }

    #[test]
    fn syntax_error_names_file_and_line() {
        let err = parse_source_code("PROGRAM P\nx := ;\nEND_PROGRAM", "main.st").unwrap_err();
        assert_eq!(err.kind(), "SyntaxError");
        assert_eq!(err.line(), Some(2));
        assert!(err.to_string().contains("main.st"));
    }

    #[test]
    fn empty_source_has_no_items() {
        let code = parse_source_code("  // nothing here\n", "empty.st").unwrap();
        assert!(code.items().is_empty());
    }

    #[test]
    fn keyword_prefix_is_not_a_keyword() {
        let code = parse_source_code("PROGRAM P\nVAR ifx : INT; END_VAR\nifx := 1;\nEND_PROGRAM", "p.st")
            .unwrap();
        assert_eq!(code.items().len(), 1);
    }

    #[test]
    fn parser_handle_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SourceParser>();
    }
}
