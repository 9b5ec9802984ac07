use super::{pass_through, Args, Handler, HandlerResult};
use crate::ast::*;
use crate::parser::Rule;

pub(super) const HANDLERS: &[(Rule, Handler)] = &[
    (Rule::indirection_type, indirection_type),
    (Rule::non_generic_type_name, non_generic_type_name),
    (Rule::string_type_specification, string_type_specification),
    (Rule::string_spec_init, string_spec_init),
    (Rule::full_subrange, full_subrange),
    (Rule::subrange, subrange),
    (Rule::array_specification, array_specification),
    (Rule::array_initial_element, pass_through),
    (Rule::array_initial_element_count, array_initial_element_count),
    (Rule::array_initialization, array_initialization),
    (Rule::array_spec_init, array_spec_init),
    (Rule::subrange_specification, subrange_specification),
    (Rule::subrange_spec_init, subrange_spec_init),
    (Rule::enumerated_value, enumerated_value),
    (Rule::enumerated_specification, enumerated_specification),
    (Rule::enumerated_spec_init, enumerated_spec_init),
    (Rule::simple_spec_init, simple_spec_init),
    (Rule::structure_element_initialization, structure_element_initialization),
    (Rule::structure_initialization, structure_initialization),
    (Rule::initialized_structure, initialized_structure),
];

/// `POINTER TO` and `REFERENCE TO` may be written with any run of blanks.
fn indirection_type(mut args: Args) -> HandlerResult {
    let token = args.token(Rule::indirection_type)?;
    let words: Vec<String> = token
        .text
        .split_whitespace()
        .map(str::to_ascii_uppercase)
        .collect();
    let indirection = match words.join(" ").as_str() {
        "POINTER TO" => IndirectionType::Pointer,
        "REFERENCE TO" => IndirectionType::Reference,
        "REF_TO" => IndirectionType::RefTo,
        other => return Err(args.error(format!("an indirection, found {other}"))),
    };
    args.finish()?;
    Ok(indirection.into())
}

fn non_generic_type_name(mut args: Args) -> HandlerResult {
    let indirection = args.take_if::<IndirectionType>();
    let type_name = args.token(Rule::type_name)?;
    args.finish()?;
    Ok(DataType {
        indirection,
        type_name,
    }
    .into())
}

fn string_type_specification(mut args: Args) -> HandlerResult {
    let string_type = args.token(Rule::string_type)?;
    let length = args.token_if(Rule::string_length);
    args.finish()?;
    Ok(StringTypeSpecification {
        string_type,
        length,
    }
    .into())
}

fn string_spec_init(mut args: Args) -> HandlerResult {
    let spec: StringTypeSpecification = args.take()?;
    let value = args.take_if::<StringLiteral>();
    args.finish()?;
    Ok(SpecInit::String(StringSpecInit { spec, value }).into())
}

fn full_subrange(mut args: Args) -> HandlerResult {
    args.token(Rule::full_subrange)?;
    args.finish()?;
    Ok(Subrange::Full.into())
}

fn subrange(mut args: Args) -> HandlerResult {
    let start: Expression = args.take()?;
    let stop: Expression = args.take()?;
    args.finish()?;
    Ok(Subrange::Partial { start, stop }.into())
}

fn array_specification(mut args: Args) -> HandlerResult {
    let subranges: Vec<Subrange> = args.take_while();
    if subranges.is_empty() {
        return Err(args.error("at least one array dimension"));
    }
    let element_type: TypeSpecification = args.take()?;
    args.finish()?;
    Ok(ArraySpecification {
        subranges,
        element_type,
    }
    .into())
}

/// `n(value)` or `n()`; the count is always a plain integer literal.
fn array_initial_element_count(mut args: Args) -> HandlerResult {
    let count: Integer = args.take()?;
    let element = args.take_if::<Initializer>();
    args.finish()?;
    Ok(ArrayInitialElement::Repeated { count, element }.into())
}

fn array_initialization(mut args: Args) -> HandlerResult {
    let mut elements = Vec::new();
    while !args.is_empty() {
        match args.take_if::<ArrayInitialElement>() {
            Some(element) => elements.push(element),
            None => elements.push(ArrayInitialElement::Single(args.take()?)),
        }
    }
    if elements.is_empty() {
        return Err(args.error("at least one array element"));
    }
    Ok(ArrayInitialization { elements }.into())
}

fn array_spec_init(mut args: Args) -> HandlerResult {
    let indirection = args.take_if::<IndirectionType>();
    let spec: ArraySpecification = args.take()?;
    let value = args.take_if::<ArrayInitialization>();
    args.finish()?;
    Ok(SpecInit::Array(Box::new(ArraySpecInit {
        indirection,
        spec,
        value,
    }))
    .into())
}

fn subrange_specification(mut args: Args) -> HandlerResult {
    let type_name = args.token(Rule::type_name)?;
    let subrange: Subrange = args.take()?;
    args.finish()?;
    Ok(SubrangeSpecification {
        type_name,
        subrange,
    }
    .into())
}

fn subrange_spec_init(mut args: Args) -> HandlerResult {
    let indirection = args.take_if::<IndirectionType>();
    let spec: SubrangeSpecification = args.take()?;
    let value = args.take_if::<Expression>();
    args.finish()?;
    Ok(SpecInit::Subrange(SubrangeSpecInit {
        indirection,
        spec,
        value,
    })
    .into())
}

fn enumerated_value(mut args: Args) -> HandlerResult {
    let type_name = args.token_if(Rule::type_name);
    let name = args.token(Rule::identifier)?;
    let value = args.take_if::<Expression>().map(Box::new);
    args.finish()?;
    Ok(EnumeratedValue {
        type_name,
        name,
        value,
    }
    .into())
}

fn enumerated_specification(mut args: Args) -> HandlerResult {
    let values: Vec<EnumeratedValue> = args.take_while();
    if values.is_empty() {
        return Err(args.error("at least one enumerated value"));
    }
    let base_type = args.token_if(Rule::type_name);
    args.finish()?;
    Ok(EnumeratedSpecification { values, base_type }.into())
}

fn enumerated_spec_init(mut args: Args) -> HandlerResult {
    let indirection = args.take_if::<IndirectionType>();
    let spec: EnumeratedSpecification = args.take()?;
    let value = args.take_if::<Expression>();
    args.finish()?;
    Ok(SpecInit::Enumerated(EnumeratedSpecInit {
        indirection,
        spec,
        value,
    })
    .into())
}

fn simple_spec_init(mut args: Args) -> HandlerResult {
    let indirection = args.take_if::<IndirectionType>();
    let type_name = args.token(Rule::type_name)?;
    let value = args.take_if::<Expression>();
    args.finish()?;
    Ok(SpecInit::Simple(SimpleSpecInit {
        spec: DataType {
            indirection,
            type_name,
        },
        value,
    })
    .into())
}

fn structure_element_initialization(mut args: Args) -> HandlerResult {
    let name = args.token_if(Rule::identifier);
    let value: Initializer = args.take()?;
    args.finish()?;
    Ok(StructureElementInitialization { name, value }.into())
}

fn structure_initialization(mut args: Args) -> HandlerResult {
    let elements: Vec<StructureElementInitialization> = args.take_while();
    if elements.is_empty() {
        return Err(args.error("at least one structure element"));
    }
    args.finish()?;
    Ok(StructureInitialization { elements }.into())
}

fn initialized_structure(mut args: Args) -> HandlerResult {
    let type_name = args.token(Rule::type_name)?;
    let value: StructureInitialization = args.take()?;
    args.finish()?;
    Ok(InitializedStructure { type_name, value }.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Element;

    fn token(rule: Rule, text: &str) -> Element {
        Element::Token(rule, Token::new(text, 1))
    }

    #[test]
    fn indirection_tolerates_extra_blanks() {
        let args = Args::new(
            Rule::indirection_type,
            1,
            0..12,
            vec![token(Rule::indirection_type, "pointer \t to")],
        );
        match indirection_type(args).unwrap() {
            Element::IndirectionType(kind) => assert_eq!(kind, IndirectionType::Pointer),
            other => panic!("unexpected {}", other.kind()),
        }
    }

    #[test]
    fn simple_spec_without_value() {
        let args = Args::new(
            Rule::simple_spec_init,
            1,
            0..3,
            vec![token(Rule::type_name, "INT")],
        );
        match simple_spec_init(args).unwrap() {
            Element::SpecInit(spec) => {
                assert_eq!(spec.to_string(), "INT");
                assert_eq!(spec.type_name().map(Token::as_str), Some("INT"));
            }
            other => panic!("unexpected {}", other.kind()),
        }
    }

    #[test]
    fn empty_array_dimensions_are_rejected() {
        let args = Args::new(
            Rule::array_specification,
            5,
            0..10,
            vec![Element::DataType(DataType {
                indirection: None,
                type_name: Token::new("INT", 5),
            })],
        );
        let err = array_specification(args).unwrap_err();
        assert_eq!(err.rule, "array_specification");
        assert_eq!(err.line, 5);
    }
}
