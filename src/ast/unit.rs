//! Program organization units and the source file root.

use bitflags::bitflags;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{self, Display};

use super::{
    commented, indent, join, push_indented, BlockKind, DataTypeDeclaration, Meta, StatementList, Token,
    TypeSpecification, VariableDeclarationBlock,
};

bitflags! {
    /// Access and inheritance qualifiers of a method.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
    pub struct MethodAccess: u8 {
        const PUBLIC = 1 << 0;
        const PRIVATE = 1 << 1;
        const ABSTRACT = 1 << 2;
        const PROTECTED = 1 << 3;
        const INTERNAL = 1 << 4;
        const FINAL = 1 << 5;
    }
}

impl MethodAccess {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::from_name(&keyword.to_ascii_uppercase())
    }
}

impl Display for MethodAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter_names().map(|(name, _)| name).collect();
        f.write_str(&names.join(" "))
    }
}

/// The statements of a unit. Owns the comments written right above them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionBlockBody {
    pub meta: Meta,
    pub statements: StatementList,
}

impl Display for FunctionBlockBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&commented(&self.meta, &self.statements))
    }
}

fn render_unit(
    meta: &Meta,
    header: String,
    declarations: &[VariableDeclarationBlock],
    body: Option<&FunctionBlockBody>,
    footer: &str,
) -> String {
    let mut lines = vec![header];
    lines.extend(declarations.iter().map(|block| indent(&block.to_string())));
    push_indented(&mut lines, body);
    lines.push(footer.to_string());
    commented(meta, lines.join("\n"))
}

fn with_return_type(mut header: String, return_type: Option<&TypeSpecification>) -> String {
    if let Some(return_type) = return_type {
        header.push_str(&format!(" : {return_type}"));
    }
    header
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Function {
    pub meta: Meta,
    pub name: Token,
    pub return_type: Option<TypeSpecification>,
    pub declarations: Vec<VariableDeclarationBlock>,
    pub body: Option<FunctionBlockBody>,
}

impl Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = with_return_type(format!("FUNCTION {}", self.name), self.return_type.as_ref());
        f.write_str(&render_unit(
            &self.meta,
            header,
            &self.declarations,
            self.body.as_ref(),
            "END_FUNCTION",
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionBlock {
    pub meta: Meta,
    pub name: Token,
    pub is_abstract: bool,
    pub extends: Option<Token>,
    pub implements: Vec<Token>,
    pub declarations: Vec<VariableDeclarationBlock>,
    pub body: Option<FunctionBlockBody>,
}

impl Display for FunctionBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut header = String::from("FUNCTION_BLOCK ");
        if self.is_abstract {
            header.push_str("ABSTRACT ");
        }
        header.push_str(&self.name.text);
        if let Some(extends) = &self.extends {
            header.push_str(&format!(" EXTENDS {extends}"));
        }
        if !self.implements.is_empty() {
            header.push_str(&format!(" IMPLEMENTS {}", join(&self.implements, ", ")));
        }
        f.write_str(&render_unit(
            &self.meta,
            header,
            &self.declarations,
            self.body.as_ref(),
            "END_FUNCTION_BLOCK",
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    pub meta: Meta,
    pub name: Token,
    pub declarations: Vec<VariableDeclarationBlock>,
    pub body: Option<FunctionBlockBody>,
}

impl Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_unit(
            &self.meta,
            format!("PROGRAM {}", self.name),
            &self.declarations,
            self.body.as_ref(),
            "END_PROGRAM",
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Method {
    pub meta: Meta,
    pub access: MethodAccess,
    pub name: Token,
    pub return_type: Option<TypeSpecification>,
    pub declarations: Vec<VariableDeclarationBlock>,
    pub body: Option<FunctionBlockBody>,
}

impl Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = if self.access.is_empty() {
            format!("METHOD {}", self.name)
        } else {
            format!("METHOD {} {}", self.access, self.name)
        };
        let header = with_return_type(header, self.return_type.as_ref());
        f.write_str(&render_unit(
            &self.meta,
            header,
            &self.declarations,
            self.body.as_ref(),
            "END_METHOD",
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Named(Token),
    Entry,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Action {
    pub meta: Meta,
    pub kind: ActionKind,
    pub body: Option<FunctionBlockBody>,
}

impl Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = match &self.kind {
            ActionKind::Named(name) => format!("ACTION {name}:"),
            ActionKind::Entry => "ENTRY_ACTION".to_string(),
            ActionKind::Exit => "EXIT_ACTION".to_string(),
        };
        f.write_str(&render_unit(
            &self.meta,
            header,
            &[],
            self.body.as_ref(),
            "END_ACTION",
        ))
    }
}

/// A top-level construct without a typed node, kept exactly as written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnknownItem {
    pub meta: Meta,
    pub rule: String,
    pub text: String,
}

impl Display for UnknownItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&commented(&self.meta, &self.text))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceCodeItem {
    DataType(DataTypeDeclaration),
    Function(Function),
    FunctionBlock(FunctionBlock),
    Program(Program),
    Method(Method),
    Action(Action),
    /// Always a [`VariableDeclarationBlock::Global`].
    GlobalVariables(VariableDeclarationBlock),
    Unknown(UnknownItem),
}

/// Where a declared name lives.
#[derive(Debug, Clone, Copy)]
pub struct DeclarationRef<'a> {
    pub kind: BlockKind,
    pub name: &'a Token,
    pub meta: &'a Meta,
    pub block: &'a VariableDeclarationBlock,
}

/// Index declarations by name. The first declaration of a name wins.
pub fn declarations_by_name(
    blocks: &[VariableDeclarationBlock],
) -> BTreeMap<String, DeclarationRef<'_>> {
    let mut index = BTreeMap::new();
    for block in blocks {
        for (name, meta) in block.declarations() {
            index
                .entry(name.text.clone())
                .or_insert(DeclarationRef {
                    kind: block.kind(),
                    name,
                    meta,
                    block,
                });
        }
    }
    index
}

impl SourceCodeItem {
    pub fn name(&self) -> Option<&Token> {
        match self {
            SourceCodeItem::Function(v) => Some(&v.name),
            SourceCodeItem::FunctionBlock(v) => Some(&v.name),
            SourceCodeItem::Program(v) => Some(&v.name),
            SourceCodeItem::Method(v) => Some(&v.name),
            SourceCodeItem::Action(Action {
                kind: ActionKind::Named(name),
                ..
            }) => Some(name),
            SourceCodeItem::Action(_)
            | SourceCodeItem::DataType(_)
            | SourceCodeItem::GlobalVariables(_)
            | SourceCodeItem::Unknown(_) => None,
        }
    }

    pub fn meta(&self) -> &Meta {
        match self {
            SourceCodeItem::DataType(v) => &v.meta,
            SourceCodeItem::Function(v) => &v.meta,
            SourceCodeItem::FunctionBlock(v) => &v.meta,
            SourceCodeItem::Program(v) => &v.meta,
            SourceCodeItem::Method(v) => &v.meta,
            SourceCodeItem::Action(v) => &v.meta,
            SourceCodeItem::GlobalVariables(v) => v.meta(),
            SourceCodeItem::Unknown(v) => &v.meta,
        }
    }

    /// Declaration blocks in source order; empty for items without any.
    pub fn variable_blocks(&self) -> &[VariableDeclarationBlock] {
        match self {
            SourceCodeItem::Function(v) => &v.declarations,
            SourceCodeItem::FunctionBlock(v) => &v.declarations,
            SourceCodeItem::Program(v) => &v.declarations,
            SourceCodeItem::Method(v) => &v.declarations,
            SourceCodeItem::GlobalVariables(block) => std::slice::from_ref(block),
            SourceCodeItem::DataType(_) | SourceCodeItem::Action(_) | SourceCodeItem::Unknown(_) => {
                &[]
            }
        }
    }

    pub fn declarations_by_name(&self) -> BTreeMap<String, DeclarationRef<'_>> {
        declarations_by_name(self.variable_blocks())
    }
}

impl Display for SourceCodeItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceCodeItem::DataType(v) => v.fmt(f),
            SourceCodeItem::Function(v) => v.fmt(f),
            SourceCodeItem::FunctionBlock(v) => v.fmt(f),
            SourceCodeItem::Program(v) => v.fmt(f),
            SourceCodeItem::Method(v) => v.fmt(f),
            SourceCodeItem::Action(v) => v.fmt(f),
            SourceCodeItem::GlobalVariables(v) => v.fmt(f),
            SourceCodeItem::Unknown(v) => v.fmt(f),
        }
    }
}

/// A whole source file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceCode {
    pub items: Vec<SourceCodeItem>,
}

impl SourceCode {
    pub fn items(&self) -> &[SourceCodeItem] {
        &self.items
    }

    /// Look an item up by name, ignoring case.
    pub fn find(&self, name: &str) -> Option<&SourceCodeItem> {
        self.items
            .iter()
            .find(|item| item.name().is_some_and(|n| n.is(name)))
    }
}

impl Display for SourceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join(&self.items, "\n\n"))
    }
}
