use serde::Serialize;
use std::fmt::{self, Display};

use super::{
    commented, indent, join, push_indented, Expression, Meta, ParameterAssignment, Subrange,
    SymbolicVariable, Variable,
};

/// `fb(IN := x, Q => y)` as a statement or declaration initializer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionBlockInvocation {
    pub name: Variable,
    pub parameters: Vec<ParameterAssignment>,
}

impl Display for FunctionBlockInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, join(&self.parameters, ", "))
    }
}

/// Statements in source order. Renders one per line.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatementList {
    pub statements: Vec<Statement>,
}

impl StatementList {
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl Display for StatementList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join(&self.statements, "\n"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElseIfClause {
    pub meta: Meta,
    pub condition: Expression,
    pub statements: Option<StatementList>,
}

impl Display for ElseIfClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = vec![format!("ELSIF {} THEN", self.condition)];
        push_indented(&mut lines, self.statements.as_ref());
        f.write_str(&commented(&self.meta, lines.join("\n")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElseClause {
    pub meta: Meta,
    pub statements: Option<StatementList>,
}

impl Display for ElseClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = vec!["ELSE".to_string()];
        push_indented(&mut lines, self.statements.as_ref());
        f.write_str(&commented(&self.meta, lines.join("\n")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IfStatement {
    pub meta: Meta,
    pub condition: Expression,
    pub statements: Option<StatementList>,
    pub else_ifs: Vec<ElseIfClause>,
    pub else_clause: Option<ElseClause>,
}

/// One label of a `CASE` element: a value or a range.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseMatch {
    Value(Expression),
    Subrange(Subrange),
}

impl Display for CaseMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseMatch::Value(v) => v.fmt(f),
            CaseMatch::Subrange(v) => v.fmt(f),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseElement {
    pub meta: Meta,
    pub matches: Vec<CaseMatch>,
    pub statements: Option<StatementList>,
}

impl Display for CaseElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = vec![format!("{}:", join(&self.matches, ", "))];
        push_indented(&mut lines, self.statements.as_ref());
        f.write_str(&commented(&self.meta, lines.join("\n")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseStatement {
    pub meta: Meta,
    pub expression: Expression,
    pub cases: Vec<CaseElement>,
    pub else_clause: Option<ElseClause>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForStatement {
    pub meta: Meta,
    pub control: SymbolicVariable,
    pub from: Expression,
    pub to: Expression,
    pub step: Option<Expression>,
    pub statements: Option<StatementList>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhileStatement {
    pub meta: Meta,
    pub condition: Expression,
    pub statements: Option<StatementList>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepeatStatement {
    pub meta: Meta,
    pub statements: Option<StatementList>,
    pub until: Expression,
}

/// `a := b := expr;` assigns right to left.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentStatement {
    pub meta: Meta,
    pub targets: Vec<Variable>,
    pub value: Expression,
}

/// `x S= cond;`, `x R= cond;` and `ref REF= target;`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetedStatement {
    pub meta: Meta,
    pub target: Variable,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodCallStatement {
    pub meta: Meta,
    pub method: Variable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvocationStatement {
    pub meta: Meta,
    pub invocation: FunctionBlockInvocation,
}

/// A variable on its own: `x;`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoOpStatement {
    pub meta: Meta,
    pub variable: Variable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Statement {
    If(IfStatement),
    Case(CaseStatement),
    For(ForStatement),
    While(WhileStatement),
    Repeat(RepeatStatement),
    Assignment(AssignmentStatement),
    Set(TargetedStatement),
    Reset(TargetedStatement),
    ReferenceAssignment(TargetedStatement),
    MethodCall(MethodCallStatement),
    Invocation(InvocationStatement),
    NoOp(NoOpStatement),
    Exit(Meta),
    Continue(Meta),
    Return(Meta),
}

impl Statement {
    pub fn meta(&self) -> &Meta {
        match self {
            Statement::If(s) => &s.meta,
            Statement::Case(s) => &s.meta,
            Statement::For(s) => &s.meta,
            Statement::While(s) => &s.meta,
            Statement::Repeat(s) => &s.meta,
            Statement::Assignment(s) => &s.meta,
            Statement::Set(s) | Statement::Reset(s) | Statement::ReferenceAssignment(s) => &s.meta,
            Statement::MethodCall(s) => &s.meta,
            Statement::Invocation(s) => &s.meta,
            Statement::NoOp(s) => &s.meta,
            Statement::Exit(meta) | Statement::Continue(meta) | Statement::Return(meta) => meta,
        }
    }

    fn render(&self) -> String {
        match self {
            Statement::If(s) => {
                let mut lines = vec![format!("IF {} THEN", s.condition)];
                push_indented(&mut lines, s.statements.as_ref());
                lines.extend(s.else_ifs.iter().map(ToString::to_string));
                lines.extend(s.else_clause.iter().map(ToString::to_string));
                lines.push("END_IF".to_string());
                lines.join("\n")
            }
            Statement::Case(s) => {
                let mut lines = vec![format!("CASE {} OF", s.expression)];
                lines.extend(s.cases.iter().map(|case| indent(&case.to_string())));
                lines.extend(s.else_clause.iter().map(ToString::to_string));
                lines.push("END_CASE".to_string());
                lines.join("\n")
            }
            Statement::For(s) => {
                let mut head = format!("FOR {} := {} TO {}", s.control, s.from, s.to);
                if let Some(step) = &s.step {
                    head.push_str(&format!(" BY {step}"));
                }
                head.push_str(" DO");
                let mut lines = vec![head];
                push_indented(&mut lines, s.statements.as_ref());
                lines.push("END_FOR".to_string());
                lines.join("\n")
            }
            Statement::While(s) => {
                let mut lines = vec![format!("WHILE {} DO", s.condition)];
                push_indented(&mut lines, s.statements.as_ref());
                lines.push("END_WHILE".to_string());
                lines.join("\n")
            }
            Statement::Repeat(s) => {
                let mut lines = vec!["REPEAT".to_string()];
                push_indented(&mut lines, s.statements.as_ref());
                lines.push(format!("UNTIL {}", s.until));
                lines.push("END_REPEAT".to_string());
                lines.join("\n")
            }
            Statement::Assignment(s) => {
                format!("{} := {};", join(&s.targets, " := "), s.value)
            }
            Statement::Set(s) => format!("{} S= {};", s.target, s.value),
            Statement::Reset(s) => format!("{} R= {};", s.target, s.value),
            Statement::ReferenceAssignment(s) => format!("{} REF= {};", s.target, s.value),
            Statement::MethodCall(s) => format!("{}();", s.method),
            Statement::Invocation(s) => format!("{};", s.invocation),
            Statement::NoOp(s) => format!("{};", s.variable),
            Statement::Exit(_) => "EXIT;".to_string(),
            Statement::Continue(_) => "CONTINUE;".to_string(),
            Statement::Return(_) => "RETURN;".to_string(),
        }
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&commented(self.meta(), self.render()))
    }
}
