//! Comment and pragma extraction.
//!
//! The grammar skips comments as trivia, so they are recovered here with a
//! separate pass over the raw text and merged into the tree afterwards (see
//! [`crate::merge`]).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::ops::Range;

/// Matches string literals as well as comments so that comment markers inside
/// strings are never mistaken for comments. String matches are discarded.
static RE_TRIVIA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?s)'(?:\$.|[^'$])*'|"(?:\$.|[^"$])*"|//[^\r\n]*|\(\*.*?\*\)|\{[^}]*\}"#,
    )
    .expect("trivia pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentKind {
    /// `// ...` or `(* ... *)`
    Comment,
    /// `{ ... }`
    Pragma,
}

/// A comment or pragma exactly as written, minus the indentation of its first
/// line on continuation lines.
#[derive(Debug, Clone, Eq, Serialize)]
pub struct Comment {
    pub kind: CommentKind,
    pub text: String,
    pub line: usize,
    pub span: Range<usize>,
}

impl Comment {
    pub fn is_pragma(&self) -> bool {
        self.kind == CommentKind::Pragma
    }
}

// Positions are bookkeeping; two comments are the same if they say the same.
impl PartialEq for Comment {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.text == other.text
    }
}

/// Byte offsets of every line start, for offset -> 1-based line lookups.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { starts }
    }

    pub fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset)
    }

    /// Zero-based column of `offset`, counted in bytes.
    pub fn column_of(&self, offset: usize) -> usize {
        let line = self.line_of(offset);
        offset - self.starts[line - 1]
    }

    pub fn line_count(&self) -> usize {
        self.starts.len()
    }
}

/// Find every comment and pragma in `source`, in source order.
pub fn extract_comments(source: &str, lines: &LineIndex) -> Vec<Comment> {
    RE_TRIVIA
        .find_iter(source)
        .filter_map(|m| {
            let text = m.as_str();
            let kind = match text.as_bytes().first()? {
                b'\'' | b'"' => return None,
                b'{' => CommentKind::Pragma,
                _ => CommentKind::Comment,
            };
            Some(Comment {
                kind,
                text: dedent(text, lines.column_of(m.start())),
                line: lines.line_of(m.start()),
                span: m.range(),
            })
        })
        .collect()
}

/// Strip up to `column` leading blanks from every line after the first.
fn dedent(text: &str, column: usize) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
            let blanks = line
                .bytes()
                .take(column)
                .take_while(|b| *b == b' ' || *b == b'\t')
                .count();
            out.push_str(line[blanks..].trim_end_matches('\r'));
        } else {
            out.push_str(line.trim_end_matches('\r'));
        }
    }
    out
}
