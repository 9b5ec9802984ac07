use std::collections::VecDeque;
use std::ops::Range;

use super::element::{Element, FromElement};
use crate::ast::{Meta, Token};
use crate::error::ConstructionError;
use crate::parser::Rule;

/// The transformed children of one production, consumed front to back by its
/// handler.
#[derive(Debug)]
pub struct Args {
    rule: Rule,
    line: usize,
    span: Range<usize>,
    received: usize,
    children: VecDeque<Element>,
}

impl Args {
    pub fn new(rule: Rule, line: usize, span: Range<usize>, children: Vec<Element>) -> Self {
        Self {
            rule,
            line,
            span,
            received: children.len(),
            children: children.into(),
        }
    }

    pub fn rule(&self) -> Rule {
        self.rule
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Fresh metadata for a comment-owning node built from these children.
    pub fn meta(&self) -> Meta {
        Meta::new(self.line, self.span.clone())
    }

    pub fn error(&self, expected: impl Into<String>) -> ConstructionError {
        ConstructionError {
            rule: format!("{:?}", self.rule),
            line: self.line,
            received: self.received,
            expected: expected.into(),
        }
    }

    fn mismatch(&self, expected: &str, found: Option<&Element>) -> ConstructionError {
        match found {
            Some(found) => self.error(format!("expected {expected}, found {}", found.kind())),
            None => self.error(format!("expected {expected}, found nothing")),
        }
    }

    /// The next child, which must be a `T`.
    pub fn take<T: FromElement>(&mut self) -> Result<T, ConstructionError> {
        match self.children.pop_front() {
            Some(element) => T::from_element(element).map_err(|e| self.mismatch(T::EXPECTED, Some(&e))),
            None => Err(self.mismatch(T::EXPECTED, None)),
        }
    }

    /// The next child if it is a `T`; otherwise nothing is consumed.
    pub fn take_if<T: FromElement>(&mut self) -> Option<T> {
        let element = self.children.pop_front()?;
        match T::from_element(element) {
            Ok(value) => Some(value),
            Err(element) => {
                self.children.push_front(element);
                None
            }
        }
    }

    /// Consume children for as long as they are `T`s.
    pub fn take_while<T: FromElement>(&mut self) -> Vec<T> {
        let mut out = Vec::new();
        while let Some(value) = self.take_if() {
            out.push(value);
        }
        out
    }

    /// The last child, which must be a `T`.
    pub fn take_last<T: FromElement>(&mut self) -> Result<T, ConstructionError> {
        match self.children.pop_back() {
            Some(element) => T::from_element(element).map_err(|e| self.mismatch(T::EXPECTED, Some(&e))),
            None => Err(self.mismatch(T::EXPECTED, None)),
        }
    }

    /// The last child if there is one and it is a `T`.
    pub fn take_last_if<T: FromElement>(&mut self) -> Option<T> {
        let element = self.children.pop_back()?;
        match T::from_element(element) {
            Ok(value) => Some(value),
            Err(element) => {
                self.children.push_back(element);
                None
            }
        }
    }

    /// The next child, which must be a terminal of `rule`.
    pub fn token(&mut self, rule: Rule) -> Result<Token, ConstructionError> {
        self.token_if(rule).ok_or_else(|| {
            let expected = format!("{rule:?}");
            self.mismatch(&expected, self.children.front())
        })
    }

    pub fn token_if(&mut self, rule: Rule) -> Option<Token> {
        match self.children.front() {
            Some(Element::Token(r, _)) if *r == rule => match self.children.pop_front() {
                Some(Element::Token(_, token)) => Some(token),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn token_list_if(&mut self, rule: Rule) -> Option<Vec<Token>> {
        match self.children.front() {
            Some(Element::TokenList(r, _)) if *r == rule => match self.children.pop_front() {
                Some(Element::TokenList(_, tokens)) => Some(tokens),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn token_list(&mut self, rule: Rule) -> Result<Vec<Token>, ConstructionError> {
        self.token_list_if(rule).ok_or_else(|| {
            let expected = format!("{rule:?}");
            self.mismatch(&expected, self.children.front())
        })
    }

    /// The only child, untouched. Used by productions that merely wrap an
    /// already typed value.
    pub fn single(mut self) -> Result<Element, ConstructionError> {
        match (self.children.pop_front(), self.children.is_empty()) {
            (Some(element), true) => Ok(element),
            _ => Err(self.error("exactly one child")),
        }
    }

    /// Every child must have been consumed.
    pub fn finish(self) -> Result<(), ConstructionError> {
        match self.children.front() {
            None => Ok(()),
            Some(extra) => Err(self.error(format!("nothing more, found {}", extra.kind()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Expression;

    fn ident(text: &str) -> Element {
        Element::Token(Rule::identifier, Token::new(text, 4))
    }

    fn args(children: Vec<Element>) -> Args {
        Args::new(Rule::var1, 4, 0..10, children)
    }

    #[test]
    fn token_if_leaves_other_rules_alone() {
        let mut a = args(vec![ident("x")]);
        assert!(a.token_if(Rule::type_name).is_none());
        assert_eq!(a.token(Rule::identifier).unwrap().text, "x");
        assert!(a.finish().is_ok());
    }

    #[test]
    fn leftovers_are_a_construction_error() {
        let a = args(vec![ident("x"), ident("y")]);
        let err = a.finish().unwrap_err();
        assert_eq!(err.rule, "var1");
        assert_eq!(err.received, 2);
        assert_eq!(err.line, 4);
        assert!(err.expected.contains("Token"));
    }

    #[test]
    fn take_reports_what_it_found() {
        let mut a = args(vec![ident("x")]);
        let err = a.take::<Expression>().unwrap_err();
        assert_eq!(err.expected, "expected Expression, found Token");
        let err = a.take::<Expression>().unwrap_err();
        assert_eq!(err.expected, "expected Expression, found nothing");
    }

    #[test]
    fn take_last_if_on_empty_is_none() {
        let mut a = args(vec![]);
        assert!(a.take_last_if::<Token>().is_none());
        assert!(a.single().is_err());
    }
}
