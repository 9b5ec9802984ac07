//! Parsing many files in one run.
//!
//! Every item is parsed on its own; a failing item is recorded and the run
//! moves on to the next one.

use tracing::{debug, warn};

use crate::ast::SourceCode;
use crate::error::Error;
use crate::parser::SourceParser;

/// One unit of input: a name to report it under, the filename used in
/// diagnostics and the source text itself.
#[derive(Debug, Clone)]
pub struct SourceItem {
    pub name: String,
    pub filename: String,
    pub text: String,
}

impl SourceItem {
    pub fn new(name: impl Into<String>, filename: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filename: filename.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug)]
pub struct BatchEntry {
    pub name: String,
    pub filename: String,
    pub result: Result<SourceCode, Error>,
}

impl BatchEntry {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcome of a batch, one entry per input item in input order.
#[derive(Debug)]
pub struct BatchResult {
    pub success: bool,
    pub entries: Vec<BatchEntry>,
}

impl BatchResult {
    pub fn get(&self, name: &str) -> Option<&BatchEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// Record an item that failed before it could be parsed, such as a file
    /// that could not be read. The batch counts as failed from then on.
    pub fn push_failure(
        &mut self,
        name: impl Into<String>,
        filename: impl Into<String>,
        error: Error,
    ) {
        let name = name.into();
        warn!(name = %name, kind = error.kind(), "failed: {error}");
        self.success = false;
        self.entries.push(BatchEntry {
            name,
            filename: filename.into(),
            result: Err(error),
        });
    }

    /// The failing entries with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&BatchEntry, &Error)> {
        self.entries
            .iter()
            .filter_map(|entry| entry.result.as_ref().err().map(|err| (entry, err)))
    }

    /// Successful trees by name. A failed batch yields `None` unless
    /// `keep_partial` asks for whatever did succeed.
    pub fn into_sources(self, keep_partial: bool) -> Option<Vec<(String, SourceCode)>> {
        if !self.success && !keep_partial {
            return None;
        }
        Some(
            self.entries
                .into_iter()
                .filter_map(|entry| entry.result.ok().map(|code| (entry.name, code)))
                .collect(),
        )
    }
}

pub fn parse_batch<I>(parser: &SourceParser, items: I) -> BatchResult
where
    I: IntoIterator<Item = SourceItem>,
{
    let mut success = true;
    let mut entries = Vec::new();
    for item in items {
        let result = parser.parse(&item.text, &item.filename);
        match &result {
            Ok(code) => debug!(name = %item.name, items = code.items().len(), "parsed"),
            Err(err) => {
                warn!(name = %item.name, kind = err.kind(), "failed: {err}");
                success = false;
            }
        }
        entries.push(BatchEntry {
            name: item.name,
            filename: item.filename,
            result,
        });
    }
    debug!(entries = entries.len(), success, "batch finished");
    BatchResult { success, entries }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<SourceItem> {
        vec![
            SourceItem::new("a", "a.st", "PROGRAM A\nx := 1;\nEND_PROGRAM"),
            SourceItem::new("b", "b.st", "PROGRAM B\nx := ;\nEND_PROGRAM"),
        ]
    }

    #[test]
    fn failure_does_not_stop_the_batch() {
        let result = parse_batch(&SourceParser::default(), items());
        assert!(!result.success);
        assert_eq!(result.entries.len(), 2);
        let failed: Vec<&str> = result.failures().map(|(entry, _)| entry.name.as_str()).collect();
        assert_eq!(failed, ["b"]);
    }

    #[test]
    fn partial_results_only_on_request() {
        let result = parse_batch(&SourceParser::default(), items());
        assert!(result.into_sources(false).is_none());
        let result = parse_batch(&SourceParser::default(), items());
        let kept = result.into_sources(true).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].0, "a");
    }

    #[test]
    fn pushed_failure_withholds_the_parsed_trees() {
        let items = vec![SourceItem::new("a", "a.st", "PROGRAM A\nx := 1;\nEND_PROGRAM")];
        let mut result = parse_batch(&SourceParser::default(), items);
        assert!(result.success);
        let missing = Error::Io {
            path: "gone.st".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        result.push_failure("gone.st", "gone.st", missing);

        assert!(!result.success);
        let failed: Vec<&str> = result.failures().map(|(entry, _)| entry.name.as_str()).collect();
        assert_eq!(failed, ["gone.st"]);
        assert!(result.into_sources(false).is_none());
    }

    #[test]
    fn empty_batch_succeeds() {
        let result = parse_batch(&SourceParser::default(), Vec::new());
        assert!(result.success);
        assert_eq!(result.into_sources(false).map(|v| v.len()), Some(0));
    }
}
