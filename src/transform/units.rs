use super::{Args, Handler, HandlerResult};
use crate::ast::*;
use crate::parser::Rule;

pub(super) const HANDLERS: &[(Rule, Handler)] = &[
    (Rule::function_block_body, function_block_body),
    (Rule::function_block_type_declaration, function_block_type_declaration),
    (Rule::function_declaration, function_declaration),
    (Rule::program_declaration, program_declaration),
    (Rule::method_access, method_access),
    (Rule::function_block_method_declaration, function_block_method_declaration),
    (Rule::action, action),
    (Rule::entry_action, entry_action),
    (Rule::exit_action, exit_action),
    (Rule::iec_source, iec_source),
];

fn function_block_body(mut args: Args) -> HandlerResult {
    let meta = args.meta();
    let statements: StatementList = args.take()?;
    args.finish()?;
    Ok(FunctionBlockBody { meta, statements }.into())
}

/// A body made only of empty statements renders as nothing and is dropped.
fn take_body(args: &mut Args) -> Option<FunctionBlockBody> {
    args.take_if::<FunctionBlockBody>()
        .filter(|body| !body.statements.is_empty())
}

fn function_block_type_declaration(mut args: Args) -> HandlerResult {
    let meta = args.meta();
    let is_abstract = args.token_if(Rule::abstract_qualifier).is_some();
    let name = args.token(Rule::identifier)?;
    let extends = args.token_if(Rule::extends);
    let implements = args.token_list_if(Rule::implements).unwrap_or_default();
    let declarations = args.take_while();
    let body = take_body(&mut args);
    args.finish()?;
    Ok(SourceCodeItem::FunctionBlock(FunctionBlock {
        meta,
        name,
        is_abstract,
        extends,
        implements,
        declarations,
        body,
    })
    .into())
}

fn function_declaration(mut args: Args) -> HandlerResult {
    let meta = args.meta();
    let name = args.token(Rule::identifier)?;
    let return_type = args.take_if::<TypeSpecification>();
    let declarations = args.take_while();
    let body = take_body(&mut args);
    args.finish()?;
    Ok(SourceCodeItem::Function(Function {
        meta,
        name,
        return_type,
        declarations,
        body,
    })
    .into())
}

fn program_declaration(mut args: Args) -> HandlerResult {
    let meta = args.meta();
    let name = args.token(Rule::identifier)?;
    let declarations = args.take_while();
    let body = take_body(&mut args);
    args.finish()?;
    Ok(SourceCodeItem::Program(Program {
        meta,
        name,
        declarations,
        body,
    })
    .into())
}

fn method_access(mut args: Args) -> HandlerResult {
    let mut access = MethodAccess::empty();
    for specifier in args.take_while::<Token>() {
        match MethodAccess::from_keyword(specifier.as_str()) {
            Some(flag) => access |= flag,
            None => return Err(args.error(format!("an access specifier, found {specifier}"))),
        }
    }
    args.finish()?;
    Ok(access.into())
}

fn function_block_method_declaration(mut args: Args) -> HandlerResult {
    let meta = args.meta();
    let access = args.take_if::<MethodAccess>().unwrap_or_default();
    let name = args.token(Rule::identifier)?;
    let return_type = args.take_if::<TypeSpecification>();
    let declarations = args.take_while();
    let body = take_body(&mut args);
    args.finish()?;
    Ok(SourceCodeItem::Method(Method {
        meta,
        access,
        name,
        return_type,
        declarations,
        body,
    })
    .into())
}

fn build_action(mut args: Args, kind: Option<ActionKind>) -> HandlerResult {
    let meta = args.meta();
    let kind = match kind {
        Some(kind) => kind,
        None => ActionKind::Named(args.token(Rule::identifier)?),
    };
    let body = take_body(&mut args);
    args.finish()?;
    Ok(SourceCodeItem::Action(Action { meta, kind, body }).into())
}

fn action(args: Args) -> HandlerResult {
    build_action(args, None)
}

fn entry_action(args: Args) -> HandlerResult {
    build_action(args, Some(ActionKind::Entry))
}

fn exit_action(args: Args) -> HandlerResult {
    build_action(args, Some(ActionKind::Exit))
}

fn iec_source(mut args: Args) -> HandlerResult {
    let items = args.take_while();
    args.finish()?;
    Ok(SourceCode { items }.into())
}
