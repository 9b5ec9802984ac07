//! Variable declarations, declaration blocks and data type declarations.

use bitflags::bitflags;
use serde::Serialize;
use std::fmt::{self, Display};

use super::{
    commented, indent, join, ArraySpecInit, DataType, EnumeratedSpecInit, FunctionBlockInvocation,
    IncompleteLocation, IndirectionType, InitializedStructure, Location, Meta, SimpleSpecInit,
    SpecInit, StringSpecInit, StructureInitialization, SubrangeSpecInit, Token,
    TypeSpecification, Variable,
};

bitflags! {
    /// Qualifiers written after a `VAR*` keyword.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
    pub struct VariableAttributes: u8 {
        const CONSTANT = 1 << 0;
        const RETAIN = 1 << 1;
        const NON_RETAIN = 1 << 2;
        const PERSISTENT = 1 << 3;
    }
}

impl VariableAttributes {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::from_name(&keyword.to_ascii_uppercase())
    }
}

impl Display for VariableAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter_names().map(|(name, _)| name).collect();
        f.write_str(&names.join(" "))
    }
}

/// One declared name, with an optional `AT %I*` placeholder address.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeclaredVariable {
    pub name: Token,
    pub location: Option<IncompleteLocation>,
}

impl Display for DeclaredVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(location) = &self.location {
            write!(f, " {location}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    Rising,
    Falling,
}

impl Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Edge::Rising => "R_EDGE",
            Edge::Falling => "F_EDGE",
        })
    }
}

/// `a, b : INT := 1`, `arr : ARRAY[1..2] OF INT`, `s : STRING(8)`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitDeclaration {
    pub meta: Meta,
    pub variables: Vec<DeclaredVariable>,
    pub init: SpecInit,
}

/// `start : BOOL R_EDGE`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeDeclaration {
    pub meta: Meta,
    pub variables: Vec<DeclaredVariable>,
    pub edge: Edge,
}

/// A named function block instance with a structured initializer:
/// `fb : FB_Motor := (Speed := 10)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceDeclaration {
    pub meta: Meta,
    pub names: Vec<Token>,
    pub type_name: Token,
    pub init: StructureInitialization,
}

/// `timer : TON(PT := T#1S)`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvocationDeclaration {
    pub meta: Meta,
    pub names: Vec<Token>,
    pub invocation: FunctionBlockInvocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableDeclaration {
    Init(InitDeclaration),
    Edge(EdgeDeclaration),
    Instance(InstanceDeclaration),
    Invocation(InvocationDeclaration),
}

impl Display for VariableDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            VariableDeclaration::Init(v) => {
                commented(&v.meta, format!("{} : {}", join(&v.variables, ", "), v.init))
            }
            VariableDeclaration::Edge(v) => commented(
                &v.meta,
                format!("{} : BOOL {}", join(&v.variables, ", "), v.edge),
            ),
            VariableDeclaration::Instance(v) => commented(
                &v.meta,
                format!("{} : {} := {}", join(&v.names, ", "), v.type_name, v.init),
            ),
            VariableDeclaration::Invocation(v) => commented(
                &v.meta,
                format!("{} : {}", join(&v.names, ", "), v.invocation),
            ),
        };
        f.write_str(&text)
    }
}

/// `x AT %IX0.0` or an unplaced `x AT %I*` in a global list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GlobalVariableSpec {
    Located {
        name: Token,
        location: Location,
    },
    Incomplete {
        name: Token,
        location: IncompleteLocation,
    },
    Names(Vec<Token>),
}

impl GlobalVariableSpec {
    pub fn names(&self) -> Vec<&Token> {
        match self {
            GlobalVariableSpec::Located { name, .. } | GlobalVariableSpec::Incomplete { name, .. } => {
                vec![name]
            }
            GlobalVariableSpec::Names(names) => names.iter().collect(),
        }
    }
}

impl Display for GlobalVariableSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlobalVariableSpec::Located { name, location } => write!(f, "{name} {location}"),
            GlobalVariableSpec::Incomplete { name, location } => write!(f, "{name} {location}"),
            GlobalVariableSpec::Names(names) => f.write_str(&join(names, ", ")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GlobalInit {
    Spec(SpecInit),
    Invocation(FunctionBlockInvocation),
}

impl Display for GlobalInit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlobalInit::Spec(v) => v.fmt(f),
            GlobalInit::Invocation(v) => v.fmt(f),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalVariableDeclaration {
    pub meta: Meta,
    pub spec: GlobalVariableSpec,
    pub init: GlobalInit,
}

impl Display for GlobalVariableDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&commented(&self.meta, format!("{} : {}", self.spec, self.init)))
    }
}

/// `x AT %QX0.1 : BOOL`; the name may be omitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocatedVariableDeclaration {
    pub meta: Meta,
    pub name: Option<Token>,
    pub location: Location,
    pub init: SpecInit,
}

impl Display for LocatedVariableDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head = match &self.name {
            Some(name) => format!("{name} {}", self.location),
            None => self.location.to_string(),
        };
        f.write_str(&commented(&self.meta, format!("{head} : {}", self.init)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExternalVariableDeclaration {
    pub meta: Meta,
    pub name: Token,
    pub spec: TypeSpecification,
}

impl Display for ExternalVariableDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&commented(&self.meta, format!("{} : {}", self.name, self.spec)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessDirection {
    ReadWrite,
    ReadOnly,
}

impl Display for AccessDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AccessDirection::ReadWrite => "READ_WRITE",
            AccessDirection::ReadOnly => "READ_ONLY",
        })
    }
}

/// `Alias : Prog.Var : INT READ_ONLY`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccessDeclaration {
    pub meta: Meta,
    pub name: Token,
    pub variable: Variable,
    pub data_type: DataType,
    pub direction: Option<AccessDirection>,
}

impl Display for AccessDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut text = format!("{} : {} : {}", self.name, self.variable, self.data_type);
        if let Some(direction) = self.direction {
            text.push_str(&format!(" {direction}"));
        }
        f.write_str(&commented(&self.meta, text))
    }
}

/// Something a declaration block holds: it names variables and owns comments.
pub trait Declared {
    fn declared_names(&self) -> Vec<&Token>;
    fn meta(&self) -> &Meta;
}

impl Declared for VariableDeclaration {
    fn declared_names(&self) -> Vec<&Token> {
        match self {
            VariableDeclaration::Init(v) => v.variables.iter().map(|v| &v.name).collect(),
            VariableDeclaration::Edge(v) => v.variables.iter().map(|v| &v.name).collect(),
            VariableDeclaration::Instance(v) => v.names.iter().collect(),
            VariableDeclaration::Invocation(v) => v.names.iter().collect(),
        }
    }

    fn meta(&self) -> &Meta {
        match self {
            VariableDeclaration::Init(v) => &v.meta,
            VariableDeclaration::Edge(v) => &v.meta,
            VariableDeclaration::Instance(v) => &v.meta,
            VariableDeclaration::Invocation(v) => &v.meta,
        }
    }
}

impl Declared for GlobalVariableDeclaration {
    fn declared_names(&self) -> Vec<&Token> {
        self.spec.names()
    }

    fn meta(&self) -> &Meta {
        &self.meta
    }
}

impl Declared for LocatedVariableDeclaration {
    fn declared_names(&self) -> Vec<&Token> {
        self.name.iter().collect()
    }

    fn meta(&self) -> &Meta {
        &self.meta
    }
}

impl Declared for ExternalVariableDeclaration {
    fn declared_names(&self) -> Vec<&Token> {
        vec![&self.name]
    }

    fn meta(&self) -> &Meta {
        &self.meta
    }
}

impl Declared for AccessDeclaration {
    fn declared_names(&self) -> Vec<&Token> {
        vec![&self.name]
    }

    fn meta(&self) -> &Meta {
        &self.meta
    }
}

/// The kind of a `VAR* ... END_VAR` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Var,
    Temp,
    Input,
    Output,
    InOut,
    Global,
    External,
    Located,
    Access,
    Instance,
}

impl BlockKind {
    pub fn keyword(self) -> &'static str {
        match self {
            BlockKind::Var | BlockKind::Located => "VAR",
            BlockKind::Temp => "VAR_TEMP",
            BlockKind::Input => "VAR_INPUT",
            BlockKind::Output => "VAR_OUTPUT",
            BlockKind::InOut => "VAR_IN_OUT",
            BlockKind::Global => "VAR_GLOBAL",
            BlockKind::External => "VAR_EXTERNAL",
            BlockKind::Access => "VAR_ACCESS",
            BlockKind::Instance => "VAR_INST",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeclarationBlock<T> {
    pub meta: Meta,
    pub attributes: VariableAttributes,
    pub items: Vec<T>,
}

impl<T: Display> DeclarationBlock<T> {
    fn render(&self, keyword: &str) -> String {
        let mut lines = vec![if self.attributes.is_empty() {
            keyword.to_string()
        } else {
            format!("{keyword} {}", self.attributes)
        }];
        for item in &self.items {
            lines.push(indent(&format!("{item};")));
        }
        lines.push("END_VAR".to_string());
        commented(&self.meta, lines.join("\n"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableDeclarationBlock {
    Var(DeclarationBlock<VariableDeclaration>),
    Temp(DeclarationBlock<VariableDeclaration>),
    Input(DeclarationBlock<VariableDeclaration>),
    Output(DeclarationBlock<VariableDeclaration>),
    InOut(DeclarationBlock<VariableDeclaration>),
    Instance(DeclarationBlock<VariableDeclaration>),
    Located(DeclarationBlock<LocatedVariableDeclaration>),
    Global(DeclarationBlock<GlobalVariableDeclaration>),
    External(DeclarationBlock<ExternalVariableDeclaration>),
    Access(DeclarationBlock<AccessDeclaration>),
}

fn declared<T: Declared>(items: &[T]) -> Vec<(&Token, &Meta)> {
    items
        .iter()
        .flat_map(|item| {
            let meta = item.meta();
            item.declared_names().into_iter().map(move |name| (name, meta))
        })
        .collect()
}

impl VariableDeclarationBlock {
    pub fn kind(&self) -> BlockKind {
        match self {
            VariableDeclarationBlock::Var(_) => BlockKind::Var,
            VariableDeclarationBlock::Temp(_) => BlockKind::Temp,
            VariableDeclarationBlock::Input(_) => BlockKind::Input,
            VariableDeclarationBlock::Output(_) => BlockKind::Output,
            VariableDeclarationBlock::InOut(_) => BlockKind::InOut,
            VariableDeclarationBlock::Instance(_) => BlockKind::Instance,
            VariableDeclarationBlock::Located(_) => BlockKind::Located,
            VariableDeclarationBlock::Global(_) => BlockKind::Global,
            VariableDeclarationBlock::External(_) => BlockKind::External,
            VariableDeclarationBlock::Access(_) => BlockKind::Access,
        }
    }

    pub fn meta(&self) -> &Meta {
        match self {
            VariableDeclarationBlock::Var(b)
            | VariableDeclarationBlock::Temp(b)
            | VariableDeclarationBlock::Input(b)
            | VariableDeclarationBlock::Output(b)
            | VariableDeclarationBlock::InOut(b)
            | VariableDeclarationBlock::Instance(b) => &b.meta,
            VariableDeclarationBlock::Located(b) => &b.meta,
            VariableDeclarationBlock::Global(b) => &b.meta,
            VariableDeclarationBlock::External(b) => &b.meta,
            VariableDeclarationBlock::Access(b) => &b.meta,
        }
    }

    pub fn attributes(&self) -> VariableAttributes {
        match self {
            VariableDeclarationBlock::Var(b)
            | VariableDeclarationBlock::Temp(b)
            | VariableDeclarationBlock::Input(b)
            | VariableDeclarationBlock::Output(b)
            | VariableDeclarationBlock::InOut(b)
            | VariableDeclarationBlock::Instance(b) => b.attributes,
            VariableDeclarationBlock::Located(b) => b.attributes,
            VariableDeclarationBlock::Global(b) => b.attributes,
            VariableDeclarationBlock::External(b) => b.attributes,
            VariableDeclarationBlock::Access(b) => b.attributes,
        }
    }

    /// Every declared name with the metadata of the declaration naming it.
    pub fn declarations(&self) -> Vec<(&Token, &Meta)> {
        match self {
            VariableDeclarationBlock::Var(b)
            | VariableDeclarationBlock::Temp(b)
            | VariableDeclarationBlock::Input(b)
            | VariableDeclarationBlock::Output(b)
            | VariableDeclarationBlock::InOut(b)
            | VariableDeclarationBlock::Instance(b) => declared(&b.items),
            VariableDeclarationBlock::Located(b) => declared(&b.items),
            VariableDeclarationBlock::Global(b) => declared(&b.items),
            VariableDeclarationBlock::External(b) => declared(&b.items),
            VariableDeclarationBlock::Access(b) => declared(&b.items),
        }
    }
}

impl Display for VariableDeclarationBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = self.kind().keyword();
        let text = match self {
            VariableDeclarationBlock::Var(b)
            | VariableDeclarationBlock::Temp(b)
            | VariableDeclarationBlock::Input(b)
            | VariableDeclarationBlock::Output(b)
            | VariableDeclarationBlock::InOut(b)
            | VariableDeclarationBlock::Instance(b) => b.render(keyword),
            VariableDeclarationBlock::Located(b) => b.render(keyword),
            VariableDeclarationBlock::Global(b) => b.render(keyword),
            VariableDeclarationBlock::External(b) => b.render(keyword),
            VariableDeclarationBlock::Access(b) => b.render(keyword),
        };
        f.write_str(&text)
    }
}

/// One member of a `STRUCT`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureElementDeclaration {
    pub meta: Meta,
    pub name: Token,
    pub location: Option<IncompleteLocation>,
    pub init: SpecInit,
}

impl Display for StructureElementDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut head = self.name.to_string();
        if let Some(location) = &self.location {
            head.push_str(&format!(" {location}"));
        }
        f.write_str(&commented(&self.meta, format!("{head} : {}", self.init)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureTypeDeclaration {
    pub meta: Meta,
    pub name: Token,
    pub extends: Option<Token>,
    pub indirection: Option<IndirectionType>,
    pub elements: Vec<StructureElementDeclaration>,
}

impl Display for StructureTypeDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut head = self.name.to_string();
        if let Some(extends) = &self.extends {
            head.push_str(&format!(" EXTENDS {extends}"));
        }
        head.push_str(" :");
        if let Some(indirection) = self.indirection {
            head.push_str(&format!(" {indirection}"));
        }
        let mut lines = vec![head, "STRUCT".to_string()];
        for element in &self.elements {
            lines.push(indent(&format!("{element};")));
        }
        lines.push("END_STRUCT".to_string());
        f.write_str(&commented(&self.meta, lines.join("\n")))
    }
}

/// `name [EXTENDS base] : <specification>` for every non-`STRUCT` type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedType<T> {
    pub meta: Meta,
    pub name: Token,
    pub extends: Option<Token>,
    pub init: T,
}

impl<T: Display> Display for NamedType<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut head = self.name.to_string();
        if let Some(extends) = &self.extends {
            head.push_str(&format!(" EXTENDS {extends}"));
        }
        f.write_str(&commented(&self.meta, format!("{head} : {}", self.init)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeDeclaration {
    Simple(NamedType<SimpleSpecInit>),
    String(NamedType<StringSpecInit>),
    Subrange(NamedType<SubrangeSpecInit>),
    Enumerated(NamedType<EnumeratedSpecInit>),
    Array(NamedType<ArraySpecInit>),
    InitializedStructure(NamedType<InitializedStructure>),
    Structure(StructureTypeDeclaration),
}

impl TypeDeclaration {
    pub fn name(&self) -> &Token {
        match self {
            TypeDeclaration::Simple(v) => &v.name,
            TypeDeclaration::String(v) => &v.name,
            TypeDeclaration::Subrange(v) => &v.name,
            TypeDeclaration::Enumerated(v) => &v.name,
            TypeDeclaration::Array(v) => &v.name,
            TypeDeclaration::InitializedStructure(v) => &v.name,
            TypeDeclaration::Structure(v) => &v.name,
        }
    }

    pub fn meta(&self) -> &Meta {
        match self {
            TypeDeclaration::Simple(v) => &v.meta,
            TypeDeclaration::String(v) => &v.meta,
            TypeDeclaration::Subrange(v) => &v.meta,
            TypeDeclaration::Enumerated(v) => &v.meta,
            TypeDeclaration::Array(v) => &v.meta,
            TypeDeclaration::InitializedStructure(v) => &v.meta,
            TypeDeclaration::Structure(v) => &v.meta,
        }
    }

    /// `STRUCT ... END_STRUCT` closes itself; everything else needs a `;`.
    fn terminated(&self) -> String {
        match self {
            TypeDeclaration::Structure(v) => v.to_string(),
            other => format!("{other};"),
        }
    }
}

impl Display for TypeDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDeclaration::Simple(v) => v.fmt(f),
            TypeDeclaration::String(v) => v.fmt(f),
            TypeDeclaration::Subrange(v) => v.fmt(f),
            TypeDeclaration::Enumerated(v) => v.fmt(f),
            TypeDeclaration::Array(v) => v.fmt(f),
            TypeDeclaration::InitializedStructure(v) => v.fmt(f),
            TypeDeclaration::Structure(v) => v.fmt(f),
        }
    }
}

/// `TYPE ... END_TYPE`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataTypeDeclaration {
    pub meta: Meta,
    pub items: Vec<TypeDeclaration>,
}

impl Display for DataTypeDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self.items.as_slice() {
            // A lone uncommented type shares the TYPE line.
            [single] if single.meta().comments.is_empty() => {
                format!("TYPE {}\nEND_TYPE", single.terminated())
            }
            items => {
                let mut lines = vec!["TYPE".to_string()];
                for item in items {
                    lines.push(indent(&item.terminated()));
                }
                lines.push("END_TYPE".to_string());
                lines.join("\n")
            }
        };
        f.write_str(&commented(&self.meta, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_render_in_fixed_order() {
        let attrs = VariableAttributes::PERSISTENT | VariableAttributes::CONSTANT;
        assert_eq!(attrs.to_string(), "CONSTANT PERSISTENT");
        assert_eq!(
            VariableAttributes::from_keyword("non_retain"),
            Some(VariableAttributes::NON_RETAIN)
        );
        assert_eq!(VariableAttributes::from_keyword("VOLATILE"), None);
    }

    #[test]
    fn block_kind_keywords() {
        assert_eq!(BlockKind::InOut.keyword(), "VAR_IN_OUT");
        assert_eq!(BlockKind::Located.keyword(), "VAR");
        assert_eq!(BlockKind::Instance.keyword(), "VAR_INST");
    }

    #[test]
    fn empty_block_has_header_and_footer_only() {
        let block = VariableDeclarationBlock::Temp(DeclarationBlock::<VariableDeclaration> {
            meta: Meta::default(),
            attributes: VariableAttributes::empty(),
            items: vec![],
        });
        assert_eq!(block.to_string(), "VAR_TEMP\nEND_VAR");
    }
}
