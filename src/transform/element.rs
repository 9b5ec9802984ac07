//! The values passed between handlers during the bottom-up walk.

use std::ops::Range;

use crate::ast::*;
use crate::parser::Rule;

/// A production without a handler, kept with everything it matched.
#[derive(Debug, Clone)]
pub struct GenericNode {
    pub rule: Rule,
    pub line: usize,
    pub span: Range<usize>,
    pub text: String,
    pub children: Vec<Element>,
}

impl GenericNode {
    /// The token of a node that wraps exactly one terminal.
    pub fn into_token(self) -> Option<Token> {
        match <[Element; 1]>::try_from(self.children) {
            Ok([Element::Token(_, token)]) => Some(token),
            _ => None,
        }
    }
}

macro_rules! elements {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        /// A transformed child: a terminal, a pass-through node, or a typed node.
        #[derive(Debug, Clone)]
        pub enum Element {
            Token(Rule, Token),
            TokenList(Rule, Vec<Token>),
            Generic(GenericNode),
            $($variant($ty),)*
        }

        impl Element {
            pub fn kind(&self) -> &'static str {
                match self {
                    Element::Token(..) => "Token",
                    Element::TokenList(..) => "TokenList",
                    Element::Generic(..) => "Generic",
                    $(Element::$variant(_) => stringify!($variant),)*
                }
            }
        }

        $(
            impl From<$ty> for Element {
                fn from(value: $ty) -> Self {
                    Element::$variant(value)
                }
            }
        )*
    };
}

elements! {
    Literal(Literal),
    Expression(Expression),
    Variable(Variable),
    VariableElement(VariableElement),
    Location(Location),
    IncompleteLocation(IncompleteLocation),
    EnumeratedValue(EnumeratedValue),
    ParameterAssignment(ParameterAssignment),
    Invocation(FunctionBlockInvocation),
    IndirectionType(IndirectionType),
    DataType(DataType),
    StringTypeSpecification(StringTypeSpecification),
    Subrange(Subrange),
    SubrangeSpecification(SubrangeSpecification),
    EnumeratedSpecification(EnumeratedSpecification),
    ArraySpecification(ArraySpecification),
    ArrayInitialElement(ArrayInitialElement),
    ArrayInitialization(ArrayInitialization),
    StructureElementInitialization(StructureElementInitialization),
    StructureInitialization(StructureInitialization),
    InitializedStructure(InitializedStructure),
    SpecInit(SpecInit),
    DeclaredVariable(DeclaredVariable),
    DeclaredVariables(Vec<DeclaredVariable>),
    VariableAttributes(VariableAttributes),
    MethodAccess(MethodAccess),
    Edge(Edge),
    AccessDirection(AccessDirection),
    VariableDeclaration(VariableDeclaration),
    GlobalVariableSpec(GlobalVariableSpec),
    GlobalVariableDeclaration(GlobalVariableDeclaration),
    LocatedVariableDeclaration(LocatedVariableDeclaration),
    ExternalVariableDeclaration(ExternalVariableDeclaration),
    AccessDeclaration(AccessDeclaration),
    StructureElementDeclaration(StructureElementDeclaration),
    TypeDeclaration(TypeDeclaration),
    VariableDeclarationBlock(VariableDeclarationBlock),
    Statement(Statement),
    StatementList(StatementList),
    ElseIfClause(ElseIfClause),
    ElseClause(ElseClause),
    CaseElement(CaseElement),
    FunctionBlockBody(FunctionBlockBody),
    SourceCodeItem(SourceCodeItem),
    SourceCode(SourceCode),
}

/// Conversion from a transformed child into the type a handler expects.
///
/// On mismatch the element is handed back so the caller can keep it.
pub trait FromElement: Sized {
    const EXPECTED: &'static str;

    fn from_element(element: Element) -> Result<Self, Element>;
}

macro_rules! from_element {
    ($($variant:ident => $ty:ty),* $(,)?) => {$(
        impl FromElement for $ty {
            const EXPECTED: &'static str = stringify!($variant);

            fn from_element(element: Element) -> Result<Self, Element> {
                match element {
                    Element::$variant(value) => Ok(value),
                    other => Err(other),
                }
            }
        }
    )*};
}

from_element! {
    Literal => Literal,
    VariableElement => VariableElement,
    Location => Location,
    IncompleteLocation => IncompleteLocation,
    EnumeratedValue => EnumeratedValue,
    ParameterAssignment => ParameterAssignment,
    Invocation => FunctionBlockInvocation,
    IndirectionType => IndirectionType,
    DataType => DataType,
    StringTypeSpecification => StringTypeSpecification,
    Subrange => Subrange,
    SubrangeSpecification => SubrangeSpecification,
    EnumeratedSpecification => EnumeratedSpecification,
    ArraySpecification => ArraySpecification,
    ArrayInitialElement => ArrayInitialElement,
    ArrayInitialization => ArrayInitialization,
    StructureElementInitialization => StructureElementInitialization,
    StructureInitialization => StructureInitialization,
    InitializedStructure => InitializedStructure,
    DeclaredVariable => DeclaredVariable,
    DeclaredVariables => Vec<DeclaredVariable>,
    VariableAttributes => VariableAttributes,
    MethodAccess => MethodAccess,
    Edge => Edge,
    AccessDirection => AccessDirection,
    VariableDeclaration => VariableDeclaration,
    GlobalVariableSpec => GlobalVariableSpec,
    GlobalVariableDeclaration => GlobalVariableDeclaration,
    LocatedVariableDeclaration => LocatedVariableDeclaration,
    ExternalVariableDeclaration => ExternalVariableDeclaration,
    AccessDeclaration => AccessDeclaration,
    StructureElementDeclaration => StructureElementDeclaration,
    TypeDeclaration => TypeDeclaration,
    VariableDeclarationBlock => VariableDeclarationBlock,
    Statement => Statement,
    StatementList => StatementList,
    ElseIfClause => ElseIfClause,
    ElseClause => ElseClause,
    CaseElement => CaseElement,
    FunctionBlockBody => FunctionBlockBody,
    SourceCode => SourceCode,
    Generic => GenericNode,
}

/// Any terminal, whatever its rule.
impl FromElement for Token {
    const EXPECTED: &'static str = "Token";

    fn from_element(element: Element) -> Result<Self, Element> {
        match element {
            Element::Token(_, token) => Ok(token),
            other => Err(other),
        }
    }
}

/// Literals, variables and qualified enumeration values are expressions too.
impl FromElement for Expression {
    const EXPECTED: &'static str = "Expression";

    fn from_element(element: Element) -> Result<Self, Element> {
        match element {
            Element::Expression(value) => Ok(value),
            Element::Literal(value) => Ok(Expression::Literal(value)),
            Element::Variable(value) => Ok(Expression::Variable(value)),
            Element::EnumeratedValue(value) => Ok(Expression::EnumeratedValue(value)),
            other => Err(other),
        }
    }
}

impl FromElement for Variable {
    const EXPECTED: &'static str = "Variable";

    fn from_element(element: Element) -> Result<Self, Element> {
        match element {
            Element::Variable(value) | Element::Expression(Expression::Variable(value)) => {
                Ok(value)
            }
            other => Err(other),
        }
    }
}

impl FromElement for SymbolicVariable {
    const EXPECTED: &'static str = "SymbolicVariable";

    fn from_element(element: Element) -> Result<Self, Element> {
        match element {
            Element::Variable(Variable::Symbolic(value)) => Ok(value),
            other => Err(other),
        }
    }
}

impl FromElement for DirectVariable {
    const EXPECTED: &'static str = "DirectVariable";

    fn from_element(element: Element) -> Result<Self, Element> {
        match element {
            Element::Variable(Variable::Direct(value)) => Ok(value),
            other => Err(other),
        }
    }
}

impl FromElement for Integer {
    const EXPECTED: &'static str = "Integer";

    fn from_element(element: Element) -> Result<Self, Element> {
        match element {
            Element::Literal(Literal::Integer(value)) => Ok(value),
            other => Err(other),
        }
    }
}

impl FromElement for StringLiteral {
    const EXPECTED: &'static str = "StringLiteral";

    fn from_element(element: Element) -> Result<Self, Element> {
        match element {
            Element::Literal(Literal::String(value)) => Ok(value),
            other => Err(other),
        }
    }
}

impl FromElement for Initializer {
    const EXPECTED: &'static str = "Initializer";

    fn from_element(element: Element) -> Result<Self, Element> {
        match element {
            Element::ArrayInitialization(value) => Ok(Initializer::Array(value)),
            Element::StructureInitialization(value) => Ok(Initializer::Structure(value)),
            other => Expression::from_element(other).map(Initializer::Expression),
        }
    }
}

impl FromElement for CaseMatch {
    const EXPECTED: &'static str = "CaseMatch";

    fn from_element(element: Element) -> Result<Self, Element> {
        match element {
            Element::Subrange(value) => Ok(CaseMatch::Subrange(value)),
            other => Expression::from_element(other).map(CaseMatch::Value),
        }
    }
}

impl FromElement for TypeSpecification {
    const EXPECTED: &'static str = "TypeSpecification";

    fn from_element(element: Element) -> Result<Self, Element> {
        match element {
            Element::DataType(value) => Ok(TypeSpecification::Data(value)),
            Element::StringTypeSpecification(value) => Ok(TypeSpecification::String(value)),
            Element::ArraySpecification(value) => Ok(TypeSpecification::Array(Box::new(value))),
            Element::SubrangeSpecification(value) => Ok(TypeSpecification::Subrange(value)),
            Element::EnumeratedSpecification(value) => Ok(TypeSpecification::Enumerated(value)),
            other => Err(other),
        }
    }
}

impl FromElement for SpecInit {
    const EXPECTED: &'static str = "SpecInit";

    fn from_element(element: Element) -> Result<Self, Element> {
        match element {
            Element::SpecInit(value) => Ok(value),
            Element::InitializedStructure(value) => Ok(SpecInit::Structure(value)),
            other => Err(other),
        }
    }
}

/// Top-level items; pass-through nodes are kept verbatim.
impl FromElement for SourceCodeItem {
    const EXPECTED: &'static str = "SourceCodeItem";

    fn from_element(element: Element) -> Result<Self, Element> {
        match element {
            Element::SourceCodeItem(value) => Ok(value),
            Element::VariableDeclarationBlock(block @ VariableDeclarationBlock::Global(_)) => {
                Ok(SourceCodeItem::GlobalVariables(block))
            }
            Element::Generic(node) => Ok(SourceCodeItem::Unknown(UnknownItem {
                meta: Meta::new(node.line, node.span),
                rule: format!("{:?}", node.rule),
                text: node.text,
            })),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(text: &str) -> Element {
        Element::Token(Rule::identifier, Token::new(text, 1))
    }

    #[test]
    fn variables_are_expressions() {
        let element = Element::Variable(Variable::Symbolic(SymbolicVariable {
            name: Token::new("x", 1),
            dereferenced: false,
        }));
        let expr = Expression::from_element(element).unwrap();
        assert_eq!(expr.to_string(), "x");
    }

    #[test]
    fn mismatch_hands_the_element_back() {
        let back = Expression::from_element(token("x")).unwrap_err();
        assert_eq!(back.kind(), "Token");
    }

    #[test]
    fn generic_node_with_one_token() {
        let node = GenericNode {
            rule: Rule::days,
            line: 1,
            span: 0..2,
            text: "1d".into(),
            children: vec![token("1")],
        };
        assert_eq!(node.into_token(), Some(Token::new("1", 1)));
    }

    #[test]
    fn generic_top_level_item_is_kept_verbatim() {
        let node = GenericNode {
            rule: Rule::interface_declaration,
            line: 3,
            span: 10..40,
            text: "INTERFACE I\nEND_INTERFACE".into(),
            children: vec![token("I")],
        };
        let item = SourceCodeItem::from_element(Element::Generic(node)).unwrap();
        assert_eq!(item.to_string(), "INTERFACE I\nEND_INTERFACE");
        assert_eq!(item.meta().line, 3);
    }
}
