//! Typed syntax tree for IEC 61131-3 Structured Text.
//!
//! Every node renders back to source text through `Display`, so a parsed file
//! can be printed, reparsed and compared. Nodes that may own the comments and
//! pragmas written above them (declarations, statements, blocks and units)
//! carry a [`Meta`]; everything else is positional data only.
//!
//! Equality ignores positions: two trees are equal when they say the same
//! thing, wherever it was written.

use serde::Serialize;
use std::fmt::{self, Display};
use std::ops::Range;

use crate::comments::Comment;

mod declaration;
mod expression;
mod literal;
mod statement;
mod types;
mod unit;

pub use declaration::*;
pub use expression::*;
pub use literal::*;
pub use statement::*;
pub use types::*;
pub use unit::*;

pub(crate) const INDENT: &str = "    ";

/// A terminal from the source: its text and the line it starts on.
#[derive(Debug, Clone, Eq, Serialize)]
pub struct Token {
    pub text: String,
    pub line: usize,
}

impl Token {
    pub fn new(text: impl Into<String>, line: usize) -> Self {
        Self {
            text: text.into(),
            line,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Case-insensitive comparison, as IEC identifiers and keywords are.
    pub fn is(&self, text: &str) -> bool {
        self.text.eq_ignore_ascii_case(text)
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Position and attached comments of a comment-owning node.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Meta {
    /// 1-based line of the first character of the node.
    pub line: usize,
    /// Byte range of the node in the original text.
    pub span: Range<usize>,
    /// Comments and pragmas written before the node, in source order.
    pub comments: Vec<Comment>,
}

impl Meta {
    pub fn new(line: usize, span: Range<usize>) -> Self {
        Self {
            line,
            span,
            comments: Vec::new(),
        }
    }

    /// The exact text the node was parsed from.
    pub fn source_text<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.span.clone()).unwrap_or_default()
    }

    pub fn pragmas(&self) -> impl Iterator<Item = &Comment> {
        self.comments.iter().filter(|c| c.is_pragma())
    }
}

impl PartialEq for Meta {
    fn eq(&self, other: &Self) -> bool {
        self.comments == other.comments
    }
}

/// Prefix every non-empty line with one indentation level.
pub(crate) fn indent(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{INDENT}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render `body` below the comments owned by `meta`.
pub(crate) fn commented(meta: &Meta, body: impl Display) -> String {
    let body = body.to_string();
    let mut parts: Vec<&str> = meta.comments.iter().map(|c| c.text.as_str()).collect();
    if !body.is_empty() {
        parts.push(&body);
    }
    parts.join("\n")
}

pub(crate) fn join<T: Display>(items: &[T], separator: &str) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}

/// Append `body` one level in, unless it renders to nothing.
pub(crate) fn push_indented(lines: &mut Vec<String>, body: Option<&impl Display>) {
    if let Some(body) = body {
        let text = body.to_string();
        if !text.is_empty() {
            lines.push(indent(&text));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comments::CommentKind;

    #[test]
    fn indent_skips_blank_lines() {
        assert_eq!(indent("a\n\nb"), "    a\n\n    b");
    }

    #[test]
    fn commented_puts_comments_first() {
        let mut meta = Meta::new(3, 10..20);
        meta.comments.push(Comment {
            kind: CommentKind::Comment,
            text: "// note".into(),
            line: 2,
            span: 0..7,
        });
        assert_eq!(commented(&meta, "x := 1;"), "// note\nx := 1;");
        assert_eq!(commented(&Meta::default(), "x := 1;"), "x := 1;");
    }

    #[test]
    fn source_text_slices_the_original() {
        let meta = Meta::new(1, 4..10);
        assert_eq!(meta.source_text("abc x := 1; def"), "x := 1");
        assert_eq!(Meta::new(1, 40..50).source_text("short"), "");
    }

    #[test]
    fn token_equality_ignores_line() {
        assert_eq!(Token::new("abc", 1), Token::new("abc", 7));
        assert!(Token::new("Abc", 1).is("ABC"));
    }
}
