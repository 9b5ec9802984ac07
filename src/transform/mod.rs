//! Bottom-up construction of the typed tree from pest pairs.
//!
//! Children are transformed before their parent, so every handler receives
//! already typed values and only has to decide how they fit together. The
//! rule-to-handler table is assembled once from the per-area tables below.

use once_cell::sync::Lazy;
use pest::iterators::Pair;
use std::collections::HashMap;
use tracing::trace;

use crate::ast::{SourceCode, Token};
use crate::comments::LineIndex;
use crate::error::ConstructionError;
use crate::parser::{is_keyword, Rule};

mod args;
mod declarations;
mod element;
mod expressions;
mod literals;
mod statements;
mod types;
mod units;

pub use args::Args;
pub use element::{Element, FromElement, GenericNode};

pub type HandlerResult = Result<Element, ConstructionError>;
pub type Handler = fn(Args) -> HandlerResult;

static HANDLERS: Lazy<HashMap<Rule, Handler>> = Lazy::new(|| {
    let tables: [&[(Rule, Handler)]; 6] = [
        literals::HANDLERS,
        expressions::HANDLERS,
        types::HANDLERS,
        declarations::HANDLERS,
        statements::HANDLERS,
        units::HANDLERS,
    ];
    let mut map = HashMap::new();
    for &(rule, handler) in tables.iter().flat_map(|table| table.iter()) {
        let previous = map.insert(rule, handler);
        assert!(previous.is_none(), "rule {rule:?} has two handlers");
    }
    map
});

/// Returns the handler registered for `rule`, if any.
pub fn handler_for(rule: Rule) -> Option<Handler> {
    HANDLERS.get(&rule).copied()
}

/// Shared by productions that only wrap one already typed child.
pub(crate) fn pass_through(args: Args) -> HandlerResult {
    args.single()
}

/// Where a pass-through node's own text stops: after its last inner pair and a
/// directly following `;`. Blanks and comments the grammar skipped past that
/// point belong to whatever comes next.
fn own_end(text: &str, start: usize, last_inner_end: usize) -> usize {
    let rest = text.get(last_inner_end - start..).unwrap_or_default();
    let gap = rest.len() - rest.trim_start().len();
    if rest[gap..].starts_with(';') {
        last_inner_end + gap + 1
    } else {
        last_inner_end
    }
}

pub struct Transformer<'a> {
    lines: &'a LineIndex,
}

impl<'a> Transformer<'a> {
    pub fn new(lines: &'a LineIndex) -> Self {
        Self { lines }
    }

    pub fn transform(&self, pair: Pair<'_, Rule>) -> HandlerResult {
        let rule = pair.as_rule();
        let span = pair.as_span();
        let range = span.start()..span.end();
        let line = self.lines.line_of(span.start());
        let text = pair.as_str();

        let inner: Vec<Pair<'_, Rule>> = pair.into_inner().collect();
        let Some(last_end) = inner.last().map(|last| last.as_span().end()) else {
            let token = Element::Token(rule, Token::new(text, line));
            return match handler_for(rule) {
                Some(handler) => handler(Args::new(rule, line, range, vec![token])),
                None => Ok(token),
            };
        };

        let children = inner
            .into_iter()
            .filter(|child| !is_keyword(child.as_rule()))
            .map(|child| self.transform(child))
            .collect::<Result<Vec<_>, _>>()?;

        match handler_for(rule) {
            Some(handler) => handler(Args::new(rule, line, range, children)),
            None => {
                trace!(?rule, line, "no handler, keeping pass-through node");
                let end = own_end(text, range.start, last_end);
                Ok(Element::Generic(GenericNode {
                    rule,
                    line,
                    span: range.start..end,
                    text: text[..end - range.start].to_string(),
                    children,
                }))
            }
        }
    }

    /// Transform the root pair of a file.
    pub fn transform_source(&self, pair: Pair<'_, Rule>) -> Result<SourceCode, ConstructionError> {
        let rule = pair.as_rule();
        let line = self.lines.line_of(pair.as_span().start());
        let element = self.transform(pair)?;
        SourceCode::from_element(element).map_err(|other| ConstructionError {
            rule: format!("{rule:?}"),
            line,
            received: 1,
            expected: format!("expected SourceCode, found {}", other.kind()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_table_builds_without_duplicates() {
        Lazy::force(&HANDLERS);
        assert!(handler_for(Rule::iec_source).is_some());
        assert!(handler_for(Rule::expression).is_some());
    }

    #[test]
    fn interface_and_case_list_have_no_handler() {
        assert!(handler_for(Rule::interface_declaration).is_none());
        assert!(handler_for(Rule::case_list).is_none());
    }

    #[test]
    fn pass_through_text_stops_at_its_own_end() {
        let text = "INTERFACE I\nEND_INTERFACE\n\n// next\n";
        assert_eq!(own_end(text, 10, 10 + 25), 10 + 25);
        let text = "INTERFACE I\nEND_INTERFACE ;\n\n";
        assert_eq!(own_end(text, 0, 25), 27);
    }

    #[test]
    fn handler_rejects_malformed_children() {
        let handler = handler_for(Rule::if_statement).unwrap();
        let args = Args::new(Rule::if_statement, 7, 0..5, vec![]);
        let err = handler(args).unwrap_err();
        assert_eq!(err.rule, "if_statement");
        assert_eq!(err.line, 7);
        assert_eq!(err.received, 0);
    }
}
