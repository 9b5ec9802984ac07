use super::{Args, Element, FromElement, Handler, HandlerResult};
use crate::ast::*;
use crate::error::ConstructionError;
use crate::parser::Rule;

pub(super) const HANDLERS: &[(Rule, Handler)] = &[
    (Rule::extends, extends),
    (Rule::implements, token_list),
    (Rule::fb_decl_name_list, token_list),
    (Rule::global_var_list, token_list),
    (Rule::var1, var1),
    (Rule::var1_list, var1_list),
    (Rule::var1_init_decl, init_declaration),
    (Rule::array_var_init_decl, init_declaration),
    (Rule::string_var_declaration, init_declaration),
    (Rule::edge, edge),
    (Rule::edge_declaration, edge_declaration),
    (Rule::fb_name_decl, fb_name_decl),
    (Rule::fb_invocation_decl, fb_invocation_decl),
    (Rule::variable_attribute, variable_attribute),
    (Rule::var_declarations, var_declarations),
    (Rule::temp_var_decls, temp_var_decls),
    (Rule::var_inst_declaration, var_inst_declaration),
    (Rule::input_declarations, input_declarations),
    (Rule::output_declarations, output_declarations),
    (Rule::input_output_declarations, input_output_declarations),
    (Rule::located_var_decl, located_var_decl),
    (Rule::located_var_declarations, located_var_declarations),
    (Rule::external_declaration, external_declaration),
    (Rule::external_var_declarations, external_var_declarations),
    (Rule::access_direction, access_direction),
    (Rule::program_access_decl, program_access_decl),
    (Rule::program_access_decls, program_access_decls),
    (Rule::global_var_spec, global_var_spec),
    (Rule::global_var_decl, global_var_decl),
    (Rule::global_var_declarations, global_var_declarations),
    (Rule::structure_element_declaration, structure_element_declaration),
    (Rule::structure_type_declaration, structure_type_declaration),
    (Rule::array_type_declaration, array_type_declaration),
    (Rule::string_type_declaration, string_type_declaration),
    (Rule::subrange_type_declaration, subrange_type_declaration),
    (Rule::enumerated_type_declaration, enumerated_type_declaration),
    (Rule::initialized_structure_type_declaration, initialized_structure_type_declaration),
    (Rule::simple_type_declaration, simple_type_declaration),
    (Rule::data_type_declaration, data_type_declaration),
];

/// Kept as a token tagged with `extends`, so the owner can tell it apart
/// from its own name.
fn extends(mut args: Args) -> HandlerResult {
    let base = args.token(Rule::type_name)?;
    args.finish()?;
    Ok(Element::Token(Rule::extends, base))
}

/// Comma separated names, tagged with the rule that listed them.
fn token_list(mut args: Args) -> HandlerResult {
    let rule = args.rule();
    let tokens: Vec<Token> = args.take_while();
    if tokens.is_empty() {
        return Err(args.error("at least one name"));
    }
    args.finish()?;
    Ok(Element::TokenList(rule, tokens))
}

// Variables

fn var1(mut args: Args) -> HandlerResult {
    let name = args.token(Rule::identifier)?;
    let location = args.take_if::<IncompleteLocation>();
    args.finish()?;
    Ok(DeclaredVariable { name, location }.into())
}

fn var1_list(mut args: Args) -> HandlerResult {
    let variables: Vec<DeclaredVariable> = args.take_while();
    if variables.is_empty() {
        return Err(args.error("at least one variable"));
    }
    args.finish()?;
    Ok(variables.into())
}

/// `a, b : INT := 1`, `arr : ARRAY[..] OF T`, `s : STRING[10]`.
fn init_declaration(mut args: Args) -> HandlerResult {
    let meta = args.meta();
    let variables: Vec<DeclaredVariable> = args.take()?;
    let init: SpecInit = args.take()?;
    args.finish()?;
    Ok(VariableDeclaration::Init(InitDeclaration {
        meta,
        variables,
        init,
    })
    .into())
}

fn edge(mut args: Args) -> HandlerResult {
    let token = args.token(Rule::edge)?;
    let edge = if token.is("R_EDGE") {
        Edge::Rising
    } else if token.is("F_EDGE") {
        Edge::Falling
    } else {
        return Err(args.error(format!("R_EDGE or F_EDGE, found {token}")));
    };
    args.finish()?;
    Ok(edge.into())
}

fn edge_declaration(mut args: Args) -> HandlerResult {
    let meta = args.meta();
    let variables: Vec<DeclaredVariable> = args.take()?;
    let edge: Edge = args.take()?;
    args.finish()?;
    Ok(VariableDeclaration::Edge(EdgeDeclaration {
        meta,
        variables,
        edge,
    })
    .into())
}

fn fb_name_decl(mut args: Args) -> HandlerResult {
    let meta = args.meta();
    let names = args.token_list(Rule::fb_decl_name_list)?;
    let type_name = args.token(Rule::type_name)?;
    let init: StructureInitialization = args.take()?;
    args.finish()?;
    Ok(VariableDeclaration::Instance(InstanceDeclaration {
        meta,
        names,
        type_name,
        init,
    })
    .into())
}

fn fb_invocation_decl(mut args: Args) -> HandlerResult {
    let meta = args.meta();
    let names = args.token_list(Rule::fb_decl_name_list)?;
    let invocation: FunctionBlockInvocation = args.take()?;
    args.finish()?;
    Ok(VariableDeclaration::Invocation(InvocationDeclaration {
        meta,
        names,
        invocation,
    })
    .into())
}

// Declaration blocks

fn variable_attribute(mut args: Args) -> HandlerResult {
    let token = args.token(Rule::variable_attribute)?;
    let Some(attribute) = VariableAttributes::from_keyword(token.as_str()) else {
        return Err(args.error(format!("a variable attribute, found {token}")));
    };
    args.finish()?;
    Ok(attribute.into())
}

fn block<T: FromElement>(mut args: Args) -> Result<DeclarationBlock<T>, ConstructionError> {
    let meta = args.meta();
    let attributes = args
        .take_while::<VariableAttributes>()
        .into_iter()
        .fold(VariableAttributes::empty(), |all, one| all | one);
    let items = args.take_while();
    args.finish()?;
    Ok(DeclarationBlock {
        meta,
        attributes,
        items,
    })
}

fn var_declarations(args: Args) -> HandlerResult {
    Ok(VariableDeclarationBlock::Var(block(args)?).into())
}

fn temp_var_decls(args: Args) -> HandlerResult {
    Ok(VariableDeclarationBlock::Temp(block(args)?).into())
}

fn var_inst_declaration(args: Args) -> HandlerResult {
    Ok(VariableDeclarationBlock::Instance(block(args)?).into())
}

fn input_declarations(args: Args) -> HandlerResult {
    Ok(VariableDeclarationBlock::Input(block(args)?).into())
}

fn output_declarations(args: Args) -> HandlerResult {
    Ok(VariableDeclarationBlock::Output(block(args)?).into())
}

fn input_output_declarations(args: Args) -> HandlerResult {
    Ok(VariableDeclarationBlock::InOut(block(args)?).into())
}

fn located_var_declarations(args: Args) -> HandlerResult {
    Ok(VariableDeclarationBlock::Located(block(args)?).into())
}

fn external_var_declarations(args: Args) -> HandlerResult {
    Ok(VariableDeclarationBlock::External(block(args)?).into())
}

fn program_access_decls(args: Args) -> HandlerResult {
    Ok(VariableDeclarationBlock::Access(block(args)?).into())
}

fn global_var_declarations(args: Args) -> HandlerResult {
    Ok(VariableDeclarationBlock::Global(block(args)?).into())
}

fn located_var_decl(mut args: Args) -> HandlerResult {
    let meta = args.meta();
    let name = args.token_if(Rule::identifier);
    let location: Location = args.take()?;
    let init: SpecInit = args.take()?;
    args.finish()?;
    Ok(LocatedVariableDeclaration {
        meta,
        name,
        location,
        init,
    }
    .into())
}

fn external_declaration(mut args: Args) -> HandlerResult {
    let meta = args.meta();
    let name = args.token(Rule::identifier)?;
    let spec: TypeSpecification = args.take()?;
    args.finish()?;
    Ok(ExternalVariableDeclaration { meta, name, spec }.into())
}

fn access_direction(mut args: Args) -> HandlerResult {
    let token = args.token(Rule::access_direction)?;
    let direction = if token.is("READ_WRITE") {
        AccessDirection::ReadWrite
    } else if token.is("READ_ONLY") {
        AccessDirection::ReadOnly
    } else {
        return Err(args.error(format!("READ_WRITE or READ_ONLY, found {token}")));
    };
    args.finish()?;
    Ok(direction.into())
}

fn program_access_decl(mut args: Args) -> HandlerResult {
    let meta = args.meta();
    let name = args.token(Rule::identifier)?;
    let variable: Variable = args.take()?;
    let data_type: DataType = args.take()?;
    let direction = args.take_if::<AccessDirection>();
    args.finish()?;
    Ok(AccessDeclaration {
        meta,
        name,
        variable,
        data_type,
        direction,
    }
    .into())
}

fn global_var_spec(mut args: Args) -> HandlerResult {
    if let Some(names) = args.token_list_if(Rule::global_var_list) {
        args.finish()?;
        return Ok(GlobalVariableSpec::Names(names).into());
    }
    let name = args.token(Rule::identifier)?;
    let spec = match args.take_if::<Location>() {
        Some(location) => GlobalVariableSpec::Located { name, location },
        None => GlobalVariableSpec::Incomplete {
            name,
            location: args.take()?,
        },
    };
    args.finish()?;
    Ok(spec.into())
}

fn global_var_decl(mut args: Args) -> HandlerResult {
    let meta = args.meta();
    let spec: GlobalVariableSpec = args.take()?;
    let init = match args.take_if::<FunctionBlockInvocation>() {
        Some(invocation) => GlobalInit::Invocation(invocation),
        None => GlobalInit::Spec(args.take()?),
    };
    args.finish()?;
    Ok(GlobalVariableDeclaration { meta, spec, init }.into())
}

// Data types

fn structure_element_declaration(mut args: Args) -> HandlerResult {
    let meta = args.meta();
    let name = args.token(Rule::identifier)?;
    let location = args.take_if::<IncompleteLocation>();
    let init: SpecInit = args.take()?;
    args.finish()?;
    Ok(StructureElementDeclaration {
        meta,
        name,
        location,
        init,
    }
    .into())
}

fn structure_type_declaration(mut args: Args) -> HandlerResult {
    let meta = args.meta();
    let name = args.token(Rule::identifier)?;
    let extends = args.token_if(Rule::extends);
    let indirection = args.take_if::<IndirectionType>();
    let elements = args.take_while();
    args.finish()?;
    Ok(TypeDeclaration::Structure(StructureTypeDeclaration {
        meta,
        name,
        extends,
        indirection,
        elements,
    })
    .into())
}

/// `Name [EXTENDS Base] : <init>`, where the init must be of the kind the
/// production promises.
fn named_type<T>(
    mut args: Args,
    expected: &str,
    pick: fn(SpecInit) -> Option<T>,
) -> Result<NamedType<T>, ConstructionError> {
    let meta = args.meta();
    let name = args.token(Rule::identifier)?;
    let extends = args.token_if(Rule::extends);
    let init = pick(args.take()?).ok_or_else(|| args.error(format!("{expected} initialization")))?;
    args.finish()?;
    Ok(NamedType {
        meta,
        name,
        extends,
        init,
    })
}

fn array_type_declaration(args: Args) -> HandlerResult {
    let named = named_type(args, "an array", |init| match init {
        SpecInit::Array(init) => Some(*init),
        _ => None,
    })?;
    Ok(TypeDeclaration::Array(named).into())
}

fn string_type_declaration(args: Args) -> HandlerResult {
    let named = named_type(args, "a string", |init| match init {
        SpecInit::String(init) => Some(init),
        _ => None,
    })?;
    Ok(TypeDeclaration::String(named).into())
}

fn subrange_type_declaration(args: Args) -> HandlerResult {
    let named = named_type(args, "a subrange", |init| match init {
        SpecInit::Subrange(init) => Some(init),
        _ => None,
    })?;
    Ok(TypeDeclaration::Subrange(named).into())
}

fn enumerated_type_declaration(args: Args) -> HandlerResult {
    let named = named_type(args, "an enumerated", |init| match init {
        SpecInit::Enumerated(init) => Some(init),
        _ => None,
    })?;
    Ok(TypeDeclaration::Enumerated(named).into())
}

fn initialized_structure_type_declaration(args: Args) -> HandlerResult {
    let named = named_type(args, "a structure", |init| match init {
        SpecInit::Structure(init) => Some(init),
        _ => None,
    })?;
    Ok(TypeDeclaration::InitializedStructure(named).into())
}

fn simple_type_declaration(args: Args) -> HandlerResult {
    let named = named_type(args, "a simple", |init| match init {
        SpecInit::Simple(init) => Some(init),
        _ => None,
    })?;
    Ok(TypeDeclaration::Simple(named).into())
}

fn data_type_declaration(mut args: Args) -> HandlerResult {
    let meta = args.meta();
    let items: Vec<TypeDeclaration> = args.take_while();
    if items.is_empty() {
        return Err(args.error("at least one type declaration"));
    }
    args.finish()?;
    Ok(SourceCodeItem::DataType(DataTypeDeclaration { meta, items }).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(rule: Rule, text: &str) -> Element {
        Element::Token(rule, Token::new(text, 2))
    }

    fn declared(name: &str) -> DeclaredVariable {
        DeclaredVariable {
            name: Token::new(name, 2),
            location: None,
        }
    }

    fn int_spec() -> Element {
        SpecInit::Simple(SimpleSpecInit {
            spec: DataType {
                indirection: None,
                type_name: Token::new("INT", 2),
            },
            value: None,
        })
        .into()
    }

    #[test]
    fn attributes_are_merged_and_items_kept_in_order() {
        let decl = |name: &str| {
            init_declaration(Args::new(
                Rule::var1_init_decl,
                2,
                0..8,
                vec![vec![declared(name)].into(), int_spec()],
            ))
            .unwrap()
        };
        let args = Args::new(
            Rule::var_declarations,
            1,
            0..40,
            vec![
                VariableAttributes::CONSTANT.into(),
                VariableAttributes::RETAIN.into(),
                decl("a"),
                decl("b"),
            ],
        );
        let Element::VariableDeclarationBlock(block) = var_declarations(args).unwrap() else {
            panic!("expected a declaration block");
        };
        assert_eq!(block.kind(), BlockKind::Var);
        assert_eq!(block.attributes(), VariableAttributes::CONSTANT | VariableAttributes::RETAIN);
        let names: Vec<String> = block
            .declarations()
            .iter()
            .map(|(name, _)| name.text.clone())
            .collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(block.to_string(), "VAR CONSTANT RETAIN\n    a : INT;\n    b : INT;\nEND_VAR");
    }

    #[test]
    fn type_declaration_checks_the_init_kind() {
        let args = Args::new(
            Rule::array_type_declaration,
            9,
            0..10,
            vec![token(Rule::identifier, "T"), int_spec()],
        );
        let err = array_type_declaration(args).unwrap_err();
        assert_eq!(err.rule, "array_type_declaration");
        assert!(err.expected.contains("an array"));
    }

    #[test]
    fn global_spec_with_incomplete_location() {
        let args = Args::new(
            Rule::global_var_spec,
            1,
            0..10,
            vec![
                token(Rule::identifier, "x"),
                IncompleteLocation {
                    address: Token::new("%I*", 1),
                }
                .into(),
            ],
        );
        let Element::GlobalVariableSpec(spec) = global_var_spec(args).unwrap() else {
            panic!("expected a global variable spec");
        };
        assert_eq!(spec.to_string(), "x AT %I*");
    }

    #[test]
    fn edge_keywords_are_case_insensitive() {
        let args = Args::new(Rule::edge, 1, 0..6, vec![token(Rule::edge, "f_edge")]);
        assert!(matches!(edge(args).unwrap(), Element::Edge(Edge::Falling)));
    }
}
