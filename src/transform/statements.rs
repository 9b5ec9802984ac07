use super::{Args, FromElement, GenericNode, Handler, HandlerResult};
use crate::ast::*;
use crate::error::ConstructionError;
use crate::parser::Rule;

pub(super) const HANDLERS: &[(Rule, Handler)] = &[
    (Rule::assignment_statement, assignment_statement),
    (Rule::set_statement, set_statement),
    (Rule::reset_statement, reset_statement),
    (Rule::reference_assignment_statement, reference_assignment_statement),
    (Rule::else_if_clause, else_if_clause),
    (Rule::else_clause, else_clause),
    (Rule::if_statement, if_statement),
    (Rule::case_element, case_element),
    (Rule::case_statement, case_statement),
    (Rule::for_statement, for_statement),
    (Rule::while_statement, while_statement),
    (Rule::repeat_statement, repeat_statement),
    (Rule::exit_statement, exit_statement),
    (Rule::continue_statement, continue_statement),
    (Rule::return_statement, return_statement),
    (Rule::method_statement, method_statement),
    (Rule::fb_invocation_statement, fb_invocation_statement),
    (Rule::no_op_statement, no_op_statement),
    (Rule::statement_list, statement_list),
];

/// `a := b := value;` arrives as targets followed by the value. The value is
/// taken from the back since a plain variable would also pass as a target.
fn assignment_statement(mut args: Args) -> HandlerResult {
    let meta = args.meta();
    let value: Expression = args.take_last()?;
    let targets: Vec<Variable> = args.take_while();
    if targets.is_empty() {
        return Err(args.error("at least one assignment target"));
    }
    args.finish()?;
    Ok(Statement::Assignment(AssignmentStatement {
        meta,
        targets,
        value,
    })
    .into())
}

fn targeted(mut args: Args) -> Result<TargetedStatement, ConstructionError> {
    let meta = args.meta();
    let target: Variable = args.take()?;
    let value: Expression = args.take()?;
    args.finish()?;
    Ok(TargetedStatement {
        meta,
        target,
        value,
    })
}

fn set_statement(args: Args) -> HandlerResult {
    Ok(Statement::Set(targeted(args)?).into())
}

fn reset_statement(args: Args) -> HandlerResult {
    Ok(Statement::Reset(targeted(args)?).into())
}

fn reference_assignment_statement(args: Args) -> HandlerResult {
    Ok(Statement::ReferenceAssignment(targeted(args)?).into())
}

fn else_if_clause(mut args: Args) -> HandlerResult {
    let meta = args.meta();
    let condition: Expression = args.take()?;
    let statements = take_body(&mut args);
    args.finish()?;
    Ok(ElseIfClause {
        meta,
        condition,
        statements,
    }
    .into())
}

fn else_clause(mut args: Args) -> HandlerResult {
    let meta = args.meta();
    let statements = take_body(&mut args);
    args.finish()?;
    Ok(ElseClause { meta, statements }.into())
}

/// The else clause, when written, is the last child. An empty child list
/// simply has none.
fn if_statement(mut args: Args) -> HandlerResult {
    let meta = args.meta();
    let else_clause = args.take_last_if::<ElseClause>();
    let condition: Expression = args.take()?;
    let statements = take_body(&mut args);
    let else_ifs = args.take_while();
    args.finish()?;
    Ok(Statement::If(IfStatement {
        meta,
        condition,
        statements,
        else_ifs,
        else_clause,
    })
    .into())
}

/// The labels of a case arrive as one pass-through `case_list` node.
fn case_element(mut args: Args) -> HandlerResult {
    let meta = args.meta();
    let list: GenericNode = args.take()?;
    if list.rule != Rule::case_list {
        return Err(args.error(format!("a case list, found {:?}", list.rule)));
    }
    let mut matches = Vec::with_capacity(list.children.len());
    for label in list.children {
        match CaseMatch::from_element(label) {
            Ok(label) => matches.push(label),
            Err(other) => return Err(args.error(format!("a case label, found {}", other.kind()))),
        }
    }
    let statements = take_body(&mut args);
    args.finish()?;
    Ok(CaseElement {
        meta,
        matches,
        statements,
    }
    .into())
}

fn case_statement(mut args: Args) -> HandlerResult {
    let meta = args.meta();
    let else_clause = args.take_last_if::<ElseClause>();
    let expression: Expression = args.take()?;
    let cases = args.take_while();
    args.finish()?;
    Ok(Statement::Case(CaseStatement {
        meta,
        expression,
        cases,
        else_clause,
    })
    .into())
}

fn for_statement(mut args: Args) -> HandlerResult {
    let meta = args.meta();
    let control: SymbolicVariable = args.take()?;
    let from: Expression = args.take()?;
    let to: Expression = args.take()?;
    let step = args.take_if::<Expression>();
    let statements = take_body(&mut args);
    args.finish()?;
    Ok(Statement::For(ForStatement {
        meta,
        control,
        from,
        to,
        step,
        statements,
    })
    .into())
}

fn while_statement(mut args: Args) -> HandlerResult {
    let meta = args.meta();
    let condition: Expression = args.take()?;
    let statements = take_body(&mut args);
    args.finish()?;
    Ok(Statement::While(WhileStatement {
        meta,
        condition,
        statements,
    })
    .into())
}

fn repeat_statement(mut args: Args) -> HandlerResult {
    let meta = args.meta();
    let statements = take_body(&mut args);
    let until: Expression = args.take()?;
    args.finish()?;
    Ok(Statement::Repeat(RepeatStatement {
        meta,
        statements,
        until,
    })
    .into())
}

fn exit_statement(args: Args) -> HandlerResult {
    let meta = args.meta();
    args.finish()?;
    Ok(Statement::Exit(meta).into())
}

fn continue_statement(args: Args) -> HandlerResult {
    let meta = args.meta();
    args.finish()?;
    Ok(Statement::Continue(meta).into())
}

fn return_statement(args: Args) -> HandlerResult {
    let meta = args.meta();
    args.finish()?;
    Ok(Statement::Return(meta).into())
}

fn method_statement(mut args: Args) -> HandlerResult {
    let meta = args.meta();
    let method: Variable = args.take()?;
    args.finish()?;
    Ok(Statement::MethodCall(MethodCallStatement { meta, method }).into())
}

fn fb_invocation_statement(mut args: Args) -> HandlerResult {
    let meta = args.meta();
    let invocation: FunctionBlockInvocation = args.take()?;
    args.finish()?;
    Ok(Statement::Invocation(InvocationStatement { meta, invocation }).into())
}

fn no_op_statement(mut args: Args) -> HandlerResult {
    let meta = args.meta();
    let variable: Variable = args.take()?;
    args.finish()?;
    Ok(Statement::NoOp(NoOpStatement { meta, variable }).into())
}

/// Bare `;` statements leave no trace, so a list may end up empty. A list
/// of nothing but `;` has no inner pairs and arrives as its own token.
fn statement_list(mut args: Args) -> HandlerResult {
    args.token_if(Rule::statement_list);
    let statements: Vec<Statement> = args.take_while();
    args.finish()?;
    Ok(StatementList { statements }.into())
}

/// An empty list renders as nothing, so it is dropped here to keep the tree
/// identical after a round trip.
pub(super) fn take_body(args: &mut Args) -> Option<StatementList> {
    args.take_if::<StatementList>().filter(|list| !list.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Element;

    fn symbol(name: &str) -> Element {
        Variable::Symbolic(SymbolicVariable {
            name: Token::new(name, 1),
            dereferenced: false,
        })
        .into()
    }

    fn statements(text: &str) -> Element {
        let statement = Statement::NoOp(NoOpStatement {
            meta: Meta::default(),
            variable: Variable::Symbolic(SymbolicVariable {
                name: Token::new(text, 1),
                dereferenced: false,
            }),
        });
        StatementList {
            statements: vec![statement],
        }
        .into()
    }

    fn else_(body: &str) -> Element {
        else_clause(Args::new(Rule::else_clause, 3, 0..4, vec![statements(body)])).unwrap()
    }

    fn if_(children: Vec<Element>) -> IfStatement {
        match if_statement(Args::new(Rule::if_statement, 1, 0..20, children)) {
            Ok(Element::Statement(Statement::If(statement))) => statement,
            Ok(other) => panic!("unexpected {}", other.kind()),
            Err(err) => panic!("{err}"),
        }
    }

    #[test]
    fn trailing_else_is_recognized_by_kind() {
        let statement = if_(vec![symbol("c"), statements("a"), else_("b")]);
        assert!(statement.else_clause.is_some());
        assert!(statement.else_ifs.is_empty());
    }

    #[test]
    fn no_else_when_last_child_is_something_else() {
        let statement = if_(vec![symbol("c"), statements("a")]);
        assert!(statement.else_clause.is_none());
        assert!(statement.statements.is_some());
    }

    #[test]
    fn empty_children_are_an_error_not_a_panic() {
        let err = if_statement(Args::new(Rule::if_statement, 4, 0..0, vec![])).unwrap_err();
        assert_eq!(err.rule, "if_statement");
        assert_eq!(err.received, 0);
        let err = case_statement(Args::new(Rule::case_statement, 4, 0..0, vec![])).unwrap_err();
        assert_eq!(err.rule, "case_statement");
    }

    #[test]
    fn assignment_value_is_taken_from_the_back() {
        let args = Args::new(
            Rule::assignment_statement,
            1,
            0..12,
            vec![symbol("a"), symbol("b"), symbol("c")],
        );
        let Element::Statement(statement) = assignment_statement(args).unwrap() else {
            panic!("expected a statement");
        };
        assert_eq!(statement.to_string(), "a := b := c;");
    }

    #[test]
    fn case_labels_come_from_the_case_list() {
        let list = Element::Generic(GenericNode {
            rule: Rule::case_list,
            line: 2,
            span: 0..4,
            text: "1, x".into(),
            children: vec![
                Literal::Integer(Integer::new(Token::new("1", 2), IntegerBase::Decimal)).into(),
                symbol("x"),
            ],
        });
        let args = Args::new(Rule::case_element, 2, 0..10, vec![list, statements("y")]);
        let Element::CaseElement(case) = case_element(args).unwrap() else {
            panic!("expected a case element");
        };
        assert_eq!(case.matches.len(), 2);
        assert!(case.statements.is_some());
    }
}
