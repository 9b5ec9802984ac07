use serde::Serialize;
use std::fmt::{self, Display};

use super::{join, EnumeratedValue, Expression, Integer, StringLiteral, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndirectionType {
    Pointer,
    Reference,
    RefTo,
}

impl Display for IndirectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IndirectionType::Pointer => "POINTER TO",
            IndirectionType::Reference => "REFERENCE TO",
            IndirectionType::RefTo => "REF_TO",
        })
    }
}

fn write_indirection(f: &mut fmt::Formatter<'_>, indirection: Option<IndirectionType>) -> fmt::Result {
    match indirection {
        Some(indirection) => write!(f, "{indirection} "),
        None => Ok(()),
    }
}

fn write_value(f: &mut fmt::Formatter<'_>, value: Option<&impl Display>) -> fmt::Result {
    match value {
        Some(value) => write!(f, " := {value}"),
        None => Ok(()),
    }
}

/// A named type, possibly behind a pointer: `INT`, `POINTER TO ST_Data`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataType {
    pub indirection: Option<IndirectionType>,
    pub type_name: Token,
}

impl Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_indirection(f, self.indirection)?;
        write!(f, "{}", self.type_name)
    }
}

/// `STRING`, `WSTRING(80)`, `STRING[Len]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StringTypeSpecification {
    pub string_type: Token,
    pub length: Option<Token>,
}

impl StringTypeSpecification {
    pub fn is_wide(&self) -> bool {
        self.string_type.is("WSTRING")
    }
}

impl Display for StringTypeSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.string_type)?;
        if let Some(length) = &self.length {
            write!(f, "{length}")?;
        }
        Ok(())
    }
}

/// `1..10` or the open bound `*`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Subrange {
    Full,
    Partial { start: Expression, stop: Expression },
}

impl Display for Subrange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subrange::Full => f.write_str("*"),
            Subrange::Partial { start, stop } => write!(f, "{start}..{stop}"),
        }
    }
}

/// `INT (0..100)`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubrangeSpecification {
    pub type_name: Token,
    pub subrange: Subrange,
}

impl Display for SubrangeSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.type_name, self.subrange)
    }
}

/// `(Idle, Busy := 5) DINT`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumeratedSpecification {
    pub values: Vec<EnumeratedValue>,
    pub base_type: Option<Token>,
}

impl Display for EnumeratedSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", join(&self.values, ", "))?;
        if let Some(base_type) = &self.base_type {
            write!(f, " {base_type}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArraySpecification {
    pub subranges: Vec<Subrange>,
    pub element_type: TypeSpecification,
}

impl Display for ArraySpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ARRAY[{}] OF {}",
            join(&self.subranges, ", "),
            self.element_type
        )
    }
}

/// Anything that names a type without initializing it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeSpecification {
    Data(DataType),
    String(StringTypeSpecification),
    Array(Box<ArraySpecification>),
    Subrange(SubrangeSpecification),
    Enumerated(EnumeratedSpecification),
}

impl TypeSpecification {
    /// The base type name, when the specification has one.
    pub fn type_name(&self) -> Option<&Token> {
        match self {
            TypeSpecification::Data(v) => Some(&v.type_name),
            TypeSpecification::String(v) => Some(&v.string_type),
            TypeSpecification::Array(v) => v.element_type.type_name(),
            TypeSpecification::Subrange(v) => Some(&v.type_name),
            TypeSpecification::Enumerated(v) => v.base_type.as_ref(),
        }
    }
}

impl Display for TypeSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSpecification::Data(v) => v.fmt(f),
            TypeSpecification::String(v) => v.fmt(f),
            TypeSpecification::Array(v) => v.fmt(f),
            TypeSpecification::Subrange(v) => v.fmt(f),
            TypeSpecification::Enumerated(v) => v.fmt(f),
        }
    }
}

/// `name := value`, or a positional `value`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureElementInitialization {
    pub name: Option<Token>,
    pub value: Initializer,
}

impl Display for StructureElementInitialization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name} := {}", self.value),
            None => write!(f, "{}", self.value),
        }
    }
}

/// `(a := 1, b := [1, 2])`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureInitialization {
    pub elements: Vec<StructureElementInitialization>,
}

impl Display for StructureInitialization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", join(&self.elements, ", "))
    }
}

/// `ST_Point := (x := 1, y := 2)`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitializedStructure {
    pub type_name: Token,
    pub value: StructureInitialization,
}

impl Display for InitializedStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} := {}", self.type_name, self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrayInitialElement {
    Single(Initializer),
    /// `3(0)` repeats the element; `3()` leaves three defaults.
    Repeated {
        count: Integer,
        element: Option<Initializer>,
    },
}

impl Display for ArrayInitialElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayInitialElement::Single(v) => v.fmt(f),
            ArrayInitialElement::Repeated { count, element } => {
                write!(f, "{count}(")?;
                if let Some(element) = element {
                    write!(f, "{element}")?;
                }
                f.write_str(")")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrayInitialization {
    pub elements: Vec<ArrayInitialElement>,
}

impl Display for ArrayInitialization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", join(&self.elements, ", "))
    }
}

/// The right-hand side of `:=` in a declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Initializer {
    Expression(Expression),
    Array(ArrayInitialization),
    Structure(StructureInitialization),
}

impl Display for Initializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Initializer::Expression(v) => v.fmt(f),
            Initializer::Array(v) => v.fmt(f),
            Initializer::Structure(v) => v.fmt(f),
        }
    }
}

/// `INT := 5`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimpleSpecInit {
    pub spec: DataType,
    pub value: Option<Expression>,
}

/// `INT (0..10) := 1`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubrangeSpecInit {
    pub indirection: Option<IndirectionType>,
    pub spec: SubrangeSpecification,
    pub value: Option<Expression>,
}

/// `(A, B) := A`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumeratedSpecInit {
    pub indirection: Option<IndirectionType>,
    pub spec: EnumeratedSpecification,
    pub value: Option<Expression>,
}

/// `ARRAY[1..2] OF INT := [1, 2]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArraySpecInit {
    pub indirection: Option<IndirectionType>,
    pub spec: ArraySpecification,
    pub value: Option<ArrayInitialization>,
}

/// `STRING(10) := 'abc'`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StringSpecInit {
    pub spec: StringTypeSpecification,
    pub value: Option<StringLiteral>,
}

/// A type specification together with its optional initial value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecInit {
    Simple(SimpleSpecInit),
    Subrange(SubrangeSpecInit),
    Enumerated(EnumeratedSpecInit),
    Array(Box<ArraySpecInit>),
    String(StringSpecInit),
    Structure(InitializedStructure),
}

impl SpecInit {
    pub fn type_name(&self) -> Option<&Token> {
        match self {
            SpecInit::Simple(v) => Some(&v.spec.type_name),
            SpecInit::Subrange(v) => Some(&v.spec.type_name),
            SpecInit::Enumerated(v) => v.spec.base_type.as_ref(),
            SpecInit::Array(v) => v.spec.element_type.type_name(),
            SpecInit::String(v) => Some(&v.spec.string_type),
            SpecInit::Structure(v) => Some(&v.type_name),
        }
    }
}

impl Display for SimpleSpecInit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.spec)?;
        write_value(f, self.value.as_ref())
    }
}

impl Display for SubrangeSpecInit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_indirection(f, self.indirection)?;
        write!(f, "{}", self.spec)?;
        write_value(f, self.value.as_ref())
    }
}

impl Display for EnumeratedSpecInit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_indirection(f, self.indirection)?;
        write!(f, "{}", self.spec)?;
        write_value(f, self.value.as_ref())
    }
}

impl Display for ArraySpecInit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_indirection(f, self.indirection)?;
        write!(f, "{}", self.spec)?;
        write_value(f, self.value.as_ref())
    }
}

impl Display for StringSpecInit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.spec)?;
        write_value(f, self.value.as_ref())
    }
}

impl Display for SpecInit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecInit::Simple(v) => v.fmt(f),
            SpecInit::Subrange(v) => v.fmt(f),
            SpecInit::Enumerated(v) => v.fmt(f),
            SpecInit::Array(v) => v.fmt(f),
            SpecInit::String(v) => v.fmt(f),
            SpecInit::Structure(v) => v.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{IntegerBase, Literal};

    fn int(value: &str) -> Expression {
        Expression::Literal(Literal::Integer(Integer::new(
            Token::new(value, 1),
            IntegerBase::Decimal,
        )))
    }

    #[test]
    fn array_specification_nests() {
        let inner = ArraySpecification {
            subranges: vec![Subrange::Full],
            element_type: TypeSpecification::Data(DataType {
                indirection: Some(IndirectionType::Pointer),
                type_name: Token::new("INT", 1),
            }),
        };
        let outer = ArraySpecification {
            subranges: vec![Subrange::Partial {
                start: int("0"),
                stop: int("9"),
            }],
            element_type: TypeSpecification::Array(Box::new(inner)),
        };
        assert_eq!(
            outer.to_string(),
            "ARRAY[0..9] OF ARRAY[*] OF POINTER TO INT"
        );
        assert_eq!(outer.element_type.type_name(), Some(&Token::new("INT", 1)));
    }

    #[test]
    fn repeated_array_elements() {
        let init = ArrayInitialization {
            elements: vec![
                ArrayInitialElement::Repeated {
                    count: Integer::new(Token::new("3", 1), IntegerBase::Decimal),
                    element: Some(Initializer::Expression(int("0"))),
                },
                ArrayInitialElement::Repeated {
                    count: Integer::new(Token::new("2", 1), IntegerBase::Decimal),
                    element: None,
                },
            ],
        };
        assert_eq!(init.to_string(), "[3(0), 2()]");
    }

    #[test]
    fn spec_init_with_value() {
        let spec = SpecInit::Simple(SimpleSpecInit {
            spec: DataType {
                indirection: None,
                type_name: Token::new("DINT", 1),
            },
            value: Some(int("7")),
        });
        assert_eq!(spec.to_string(), "DINT := 7");
    }
}
