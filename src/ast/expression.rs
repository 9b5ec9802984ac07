use serde::Serialize;
use std::fmt::{self, Display};

use super::{join, Literal, Token};

/// `x` or `ptr^`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolicVariable {
    pub name: Token,
    pub dereferenced: bool,
}

impl Display for SymbolicVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.dereferenced {
            f.write_str("^")?;
        }
        Ok(())
    }
}

/// `[i, j + 1]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptList {
    pub subscripts: Vec<Expression>,
    pub dereferenced: bool,
}

impl Display for SubscriptList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", join(&self.subscripts, ", "))?;
        if self.dereferenced {
            f.write_str("^")?;
        }
        Ok(())
    }
}

/// `.field`, or `^.field` when the owner is a pointer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSelector {
    pub field: Token,
    pub dereferenced: bool,
}

impl Display for FieldSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dereferenced {
            f.write_str("^")?;
        }
        write!(f, ".{}", self.field)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableElement {
    Subscript(SubscriptList),
    Field(FieldSelector),
}

impl Display for VariableElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableElement::Subscript(v) => v.fmt(f),
            VariableElement::Field(v) => v.fmt(f),
        }
    }
}

/// `a.b[1]^.c`; always has at least one element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiElementVariable {
    pub name: SymbolicVariable,
    pub elements: Vec<VariableElement>,
}

impl Display for MultiElementVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for element in &self.elements {
            write!(f, "{element}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LocationPrefix {
    I,
    Q,
    M,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SizePrefix {
    X,
    B,
    W,
    D,
    L,
}

/// `%IX1.0`, `%QW4`. A missing size prefix means bit access.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectVariable {
    pub location_prefix: LocationPrefix,
    pub size_prefix: SizePrefix,
    pub location: Token,
    pub bits: Vec<Token>,
}

impl Display for DirectVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "%{:?}{:?}{}",
            self.location_prefix, self.size_prefix, self.location
        )?;
        for bit in &self.bits {
            write!(f, ".{bit}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Variable {
    Symbolic(SymbolicVariable),
    MultiElement(MultiElementVariable),
    Direct(DirectVariable),
}

impl Variable {
    /// The leading identifier; `None` for hardware addresses.
    pub fn root_name(&self) -> Option<&Token> {
        match self {
            Variable::Symbolic(v) => Some(&v.name),
            Variable::MultiElement(v) => Some(&v.name.name),
            Variable::Direct(_) => None,
        }
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variable::Symbolic(v) => v.fmt(f),
            Variable::MultiElement(v) => v.fmt(f),
            Variable::Direct(v) => v.fmt(f),
        }
    }
}

/// `AT %IX0.0`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub variable: DirectVariable,
}

impl Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AT {}", self.variable)
    }
}

/// `AT %I*`, resolved later by the configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncompleteLocation {
    pub address: Token,
}

impl Display for IncompleteLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AT {}", self.address)
    }
}

/// `Color#Red`, or a bare `Red` inside an enumeration, optionally with a value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumeratedValue {
    pub type_name: Option<Token>,
    pub name: Token,
    pub value: Option<Box<Expression>>,
}

impl Display for EnumeratedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(type_name) = &self.type_name {
            write!(f, "{type_name}#")?;
        }
        write!(f, "{}", self.name)?;
        if let Some(value) = &self.value {
            write!(f, " := {value}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnaryOperation {
    pub op: Token,
    pub expr: Box<Expression>,
}

impl Display for UnaryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.op.text.starts_with(|c: char| c.is_ascii_alphabetic()) {
            write!(f, "{} {}", self.op, self.expr)
        } else {
            write!(f, "{}{}", self.op, self.expr)
        }
    }
}

/// One link of a left-folded operator chain: `a + b - c` is `(a + b) - c`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinaryOperation {
    pub left: Box<Expression>,
    pub op: Token,
    pub right: Box<Expression>,
}

impl Display for BinaryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.op, self.right)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterAssignment {
    /// `name := value`, or a positional `value`
    Input {
        name: Option<Token>,
        value: Expression,
    },
    /// `name => target`, `NOT name => target`
    Output {
        inverted: bool,
        name: Token,
        target: Option<Variable>,
    },
}

impl Display for ParameterAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterAssignment::Input { name: Some(name), value } => {
                write!(f, "{name} := {value}")
            }
            ParameterAssignment::Input { name: None, value } => write!(f, "{value}"),
            ParameterAssignment::Output {
                inverted,
                name,
                target,
            } => {
                if *inverted {
                    f.write_str("NOT ")?;
                }
                write!(f, "{name} =>")?;
                if let Some(target) = target {
                    write!(f, " {target}")?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionCall {
    pub name: Variable,
    pub parameters: Vec<ParameterAssignment>,
}

impl Display for FunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, join(&self.parameters, ", "))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Expression {
    Literal(Literal),
    Variable(Variable),
    EnumeratedValue(EnumeratedValue),
    Unary(UnaryOperation),
    Binary(BinaryOperation),
    Parenthesized(Box<Expression>),
    FunctionCall(FunctionCall),
}

impl Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(v) => v.fmt(f),
            Expression::Variable(v) => v.fmt(f),
            Expression::EnumeratedValue(v) => v.fmt(f),
            Expression::Unary(v) => v.fmt(f),
            Expression::Binary(v) => v.fmt(f),
            Expression::Parenthesized(v) => write!(f, "({v})"),
            Expression::FunctionCall(v) => v.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Integer, IntegerBase};

    fn var(name: &str) -> Expression {
        Expression::Variable(Variable::Symbolic(SymbolicVariable {
            name: Token::new(name, 1),
            dereferenced: false,
        }))
    }

    fn int(value: &str) -> Expression {
        Expression::Literal(Literal::Integer(Integer::new(
            Token::new(value, 1),
            IntegerBase::Decimal,
        )))
    }

    #[test]
    fn word_operators_get_a_space_and_signs_do_not() {
        let not = UnaryOperation {
            op: Token::new("NOT", 1),
            expr: Box::new(var("a")),
        };
        let neg = UnaryOperation {
            op: Token::new("-", 1),
            expr: Box::new(int("1")),
        };
        assert_eq!(not.to_string(), "NOT a");
        assert_eq!(neg.to_string(), "-1");
    }

    #[test]
    fn output_parameter_without_target() {
        let param = ParameterAssignment::Output {
            inverted: true,
            name: Token::new("Q", 1),
            target: None,
        };
        assert_eq!(param.to_string(), "NOT Q =>");
    }

    #[test]
    fn direct_variable_renders_bits() {
        let direct = DirectVariable {
            location_prefix: LocationPrefix::I,
            size_prefix: SizePrefix::X,
            location: Token::new("1", 1),
            bits: vec![Token::new("7", 1)],
        };
        assert_eq!(direct.to_string(), "%IX1.7");
        assert_eq!(Location { variable: direct }.to_string(), "AT %IX1.7");
    }

    #[test]
    fn call_renders_named_and_positional_parameters() {
        let call = FunctionCall {
            name: Variable::Symbolic(SymbolicVariable {
                name: Token::new("LIMIT", 1),
                dereferenced: false,
            }),
            parameters: vec![
                ParameterAssignment::Input {
                    name: None,
                    value: int("0"),
                },
                ParameterAssignment::Input {
                    name: Some(Token::new("IN", 1)),
                    value: var("x"),
                },
            ],
        };
        assert_eq!(call.to_string(), "LIMIT(0, IN := x)");
    }
}
