//! Re-attaches extracted comments to the tree.
//!
//! The tree is walked in document order. Each node that owns a [`Meta`]
//! takes every pending comment that starts on or before its own line, so a
//! comment ends up on the first node written after it. Comments after the
//! last such node are left over and reported as orphans.

use std::collections::VecDeque;
use std::ops::Range;

use crate::ast::*;
use crate::comments::Comment;

struct Pending {
    comments: VecDeque<Comment>,
}

impl Pending {
    fn attach(&mut self, meta: &mut Meta) {
        while let Some(comment) = self.comments.front() {
            if comment.line > meta.line {
                break;
            }
            if let Some(comment) = self.comments.pop_front() {
                meta.comments.push(comment);
            }
        }
    }

    /// Attach what comes before `meta`'s span and drop what lies inside it.
    fn attach_verbatim(&mut self, meta: &mut Meta) {
        while let Some(comment) = self.comments.front() {
            if comment.span.start >= meta.span.start {
                break;
            }
            if let Some(comment) = self.comments.pop_front() {
                meta.comments.push(comment);
            }
        }
        self.skip_within(&meta.span);
    }

    fn skip_within(&mut self, span: &Range<usize>) {
        while self
            .comments
            .front()
            .is_some_and(|comment| comment.span.start < span.end)
        {
            self.comments.pop_front();
        }
    }
}

/// Attach `comments` (in source order) to `code`. Returns how many were left
/// without an owner.
pub fn merge_comments(code: &mut SourceCode, comments: Vec<Comment>) -> usize {
    let mut pending = Pending {
        comments: comments.into(),
    };
    for item in &mut code.items {
        item.merge(&mut pending);
    }
    pending.comments.len()
}

trait Merge {
    fn merge(&mut self, pending: &mut Pending);
}

impl<T: Merge> Merge for Vec<T> {
    fn merge(&mut self, pending: &mut Pending) {
        for item in self {
            item.merge(pending);
        }
    }
}

impl<T: Merge> Merge for Option<T> {
    fn merge(&mut self, pending: &mut Pending) {
        if let Some(inner) = self {
            inner.merge(pending);
        }
    }
}

impl Merge for SourceCodeItem {
    fn merge(&mut self, pending: &mut Pending) {
        match self {
            SourceCodeItem::DataType(data_type) => {
                pending.attach(&mut data_type.meta);
                data_type.items.merge(pending);
            }
            SourceCodeItem::Function(unit) => {
                pending.attach(&mut unit.meta);
                unit.declarations.merge(pending);
                unit.body.merge(pending);
            }
            SourceCodeItem::FunctionBlock(unit) => {
                pending.attach(&mut unit.meta);
                unit.declarations.merge(pending);
                unit.body.merge(pending);
            }
            SourceCodeItem::Program(unit) => {
                pending.attach(&mut unit.meta);
                unit.declarations.merge(pending);
                unit.body.merge(pending);
            }
            SourceCodeItem::Method(unit) => {
                pending.attach(&mut unit.meta);
                unit.declarations.merge(pending);
                unit.body.merge(pending);
            }
            SourceCodeItem::Action(unit) => {
                pending.attach(&mut unit.meta);
                unit.body.merge(pending);
            }
            SourceCodeItem::GlobalVariables(block) => block.merge(pending),
            SourceCodeItem::Unknown(item) => pending.attach_verbatim(&mut item.meta),
        }
    }
}

impl Merge for TypeDeclaration {
    fn merge(&mut self, pending: &mut Pending) {
        match self {
            TypeDeclaration::Simple(t) => pending.attach(&mut t.meta),
            TypeDeclaration::String(t) => pending.attach(&mut t.meta),
            TypeDeclaration::Subrange(t) => pending.attach(&mut t.meta),
            TypeDeclaration::Enumerated(t) => pending.attach(&mut t.meta),
            TypeDeclaration::Array(t) => pending.attach(&mut t.meta),
            TypeDeclaration::InitializedStructure(t) => pending.attach(&mut t.meta),
            TypeDeclaration::Structure(t) => {
                pending.attach(&mut t.meta);
                for element in &mut t.elements {
                    pending.attach(&mut element.meta);
                }
            }
        }
    }
}

impl<T: Merge> Merge for DeclarationBlock<T> {
    fn merge(&mut self, pending: &mut Pending) {
        pending.attach(&mut self.meta);
        self.items.merge(pending);
    }
}

impl Merge for VariableDeclarationBlock {
    fn merge(&mut self, pending: &mut Pending) {
        match self {
            VariableDeclarationBlock::Var(b)
            | VariableDeclarationBlock::Temp(b)
            | VariableDeclarationBlock::Input(b)
            | VariableDeclarationBlock::Output(b)
            | VariableDeclarationBlock::InOut(b)
            | VariableDeclarationBlock::Instance(b) => b.merge(pending),
            VariableDeclarationBlock::Located(b) => b.merge(pending),
            VariableDeclarationBlock::Global(b) => b.merge(pending),
            VariableDeclarationBlock::External(b) => b.merge(pending),
            VariableDeclarationBlock::Access(b) => b.merge(pending),
        }
    }
}

impl Merge for VariableDeclaration {
    fn merge(&mut self, pending: &mut Pending) {
        let meta = match self {
            VariableDeclaration::Init(d) => &mut d.meta,
            VariableDeclaration::Edge(d) => &mut d.meta,
            VariableDeclaration::Instance(d) => &mut d.meta,
            VariableDeclaration::Invocation(d) => &mut d.meta,
        };
        pending.attach(meta);
    }
}

macro_rules! merge_meta {
    ($($ty:ty),* $(,)?) => {$(
        impl Merge for $ty {
            fn merge(&mut self, pending: &mut Pending) {
                pending.attach(&mut self.meta);
            }
        }
    )*};
}

merge_meta!(
    LocatedVariableDeclaration,
    GlobalVariableDeclaration,
    ExternalVariableDeclaration,
    AccessDeclaration,
);

impl Merge for FunctionBlockBody {
    fn merge(&mut self, pending: &mut Pending) {
        pending.attach(&mut self.meta);
        self.statements.merge(pending);
    }
}

impl Merge for StatementList {
    fn merge(&mut self, pending: &mut Pending) {
        self.statements.merge(pending);
    }
}

impl Merge for Statement {
    fn merge(&mut self, pending: &mut Pending) {
        match self {
            Statement::If(s) => {
                pending.attach(&mut s.meta);
                s.statements.merge(pending);
                for clause in &mut s.else_ifs {
                    pending.attach(&mut clause.meta);
                    clause.statements.merge(pending);
                }
                s.else_clause.merge(pending);
            }
            Statement::Case(s) => {
                pending.attach(&mut s.meta);
                for case in &mut s.cases {
                    pending.attach(&mut case.meta);
                    case.statements.merge(pending);
                }
                s.else_clause.merge(pending);
            }
            Statement::For(s) => {
                pending.attach(&mut s.meta);
                s.statements.merge(pending);
            }
            Statement::While(s) => {
                pending.attach(&mut s.meta);
                s.statements.merge(pending);
            }
            Statement::Repeat(s) => {
                pending.attach(&mut s.meta);
                s.statements.merge(pending);
            }
            Statement::Assignment(s) => pending.attach(&mut s.meta),
            Statement::Set(s) | Statement::Reset(s) | Statement::ReferenceAssignment(s) => {
                pending.attach(&mut s.meta)
            }
            Statement::MethodCall(s) => pending.attach(&mut s.meta),
            Statement::Invocation(s) => pending.attach(&mut s.meta),
            Statement::NoOp(s) => pending.attach(&mut s.meta),
            Statement::Exit(meta) | Statement::Continue(meta) | Statement::Return(meta) => {
                pending.attach(meta)
            }
        }
    }
}

impl Merge for ElseClause {
    fn merge(&mut self, pending: &mut Pending) {
        pending.attach(&mut self.meta);
        self.statements.merge(pending);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comments::CommentKind;

    fn comment(text: &str, line: usize, start: usize) -> Comment {
        Comment {
            kind: CommentKind::Comment,
            text: text.to_string(),
            line,
            span: start..start + text.len(),
        }
    }

    fn no_op(name: &str, line: usize) -> Statement {
        Statement::NoOp(NoOpStatement {
            meta: Meta::new(line, 0..0),
            variable: Variable::Symbolic(SymbolicVariable {
                name: Token::new(name, line),
                dereferenced: false,
            }),
        })
    }

    fn program(statements: Vec<Statement>) -> SourceCode {
        SourceCode {
            items: vec![SourceCodeItem::Program(Program {
                meta: Meta::new(1, 0..100),
                name: Token::new("P", 1),
                declarations: Vec::new(),
                body: Some(FunctionBlockBody {
                    meta: Meta::new(2, 10..90),
                    statements: StatementList { statements },
                }),
            })],
        }
    }

    fn statement_comments(code: &SourceCode, index: usize) -> Vec<String> {
        let SourceCodeItem::Program(program) = &code.items[0] else {
            panic!("expected a program");
        };
        let body = program.body.as_ref().unwrap();
        body.statements.statements[index]
            .meta()
            .comments
            .iter()
            .map(|c| c.text.clone())
            .collect()
    }

    #[test]
    fn first_consumer_in_document_order_wins() {
        let mut code = program(vec![no_op("a", 2), no_op("b", 4)]);
        let orphans = merge_comments(
            &mut code,
            vec![comment("// one", 3, 20), comment("// two", 3, 30), comment("// tail", 9, 95)],
        );
        assert_eq!(orphans, 1);
        assert!(statement_comments(&code, 0).is_empty());
        assert_eq!(statement_comments(&code, 1), ["// one", "// two"]);
    }

    #[test]
    fn comment_before_unit_goes_to_the_unit() {
        let mut code = program(vec![no_op("a", 2)]);
        merge_comments(&mut code, vec![comment("(* header *)", 1, 0)]);
        assert_eq!(code.items[0].meta().comments.len(), 1);
        assert!(statement_comments(&code, 0).is_empty());
    }

    #[test]
    fn comments_inside_verbatim_items_are_dropped() {
        let mut code = SourceCode {
            items: vec![SourceCodeItem::Unknown(UnknownItem {
                meta: Meta::new(2, 10..60),
                rule: "interface_declaration".into(),
                text: "INTERFACE I (* inner *)\nEND_INTERFACE".into(),
            })],
        };
        let orphans = merge_comments(
            &mut code,
            vec![comment("// before", 1, 0), comment("(* inner *)", 2, 22)],
        );
        assert_eq!(orphans, 0);
        assert_eq!(code.items[0].meta().comments.len(), 1);
    }
}
