use super::{Args, Element, Handler, HandlerResult};
use crate::ast::*;
use crate::error::ConstructionError;
use crate::parser::Rule;

pub(super) const HANDLERS: &[(Rule, Handler)] = &[
    (Rule::variable_name, variable_name),
    (Rule::field_selector, field_selector),
    (Rule::subscript_list, subscript_list),
    (Rule::multi_element_variable, multi_element_variable),
    (Rule::direct_variable, direct_variable),
    (Rule::location, location),
    (Rule::incomplete_location, incomplete_location),
    (Rule::expression, binary_chain),
    (Rule::xor_expression, binary_chain),
    (Rule::and_expression, binary_chain),
    (Rule::comparison_expression, binary_chain),
    (Rule::equality_expression, binary_chain),
    (Rule::add_expression, binary_chain),
    (Rule::expression_term, binary_chain),
    (Rule::power_expression, binary_chain),
    (Rule::unary_expression, unary_expression),
    (Rule::parenthesized_expression, parenthesized_expression),
    (Rule::qualified_enumerated_value, qualified_enumerated_value),
    (Rule::param_assignment, param_assignment),
    (Rule::output_parameter_assignment, output_parameter_assignment),
    (Rule::function_call, function_call),
    (Rule::fb_invocation, fb_invocation),
];

fn variable_name(mut args: Args) -> HandlerResult {
    let name = args.token(Rule::identifier)?;
    let dereferenced = args.token_if(Rule::deref).is_some();
    args.finish()?;
    Ok(Variable::Symbolic(SymbolicVariable { name, dereferenced }).into())
}

fn field_selector(mut args: Args) -> HandlerResult {
    let dereferenced = args.token_if(Rule::deref).is_some();
    let field: Token = args.take()?;
    args.finish()?;
    Ok(VariableElement::Field(FieldSelector {
        field,
        dereferenced,
    })
    .into())
}

fn subscript_list(mut args: Args) -> HandlerResult {
    let subscripts: Vec<Expression> = args.take_while();
    let dereferenced = args.token_if(Rule::deref).is_some();
    if subscripts.is_empty() {
        return Err(args.error("at least one subscript"));
    }
    args.finish()?;
    Ok(VariableElement::Subscript(SubscriptList {
        subscripts,
        dereferenced,
    })
    .into())
}

/// A name without selectors stays a plain symbolic variable.
fn multi_element_variable(mut args: Args) -> HandlerResult {
    let name: SymbolicVariable = args.take()?;
    let elements: Vec<VariableElement> = args.take_while();
    args.finish()?;
    if elements.is_empty() {
        return Ok(Variable::Symbolic(name).into());
    }
    Ok(Variable::MultiElement(MultiElementVariable { name, elements }).into())
}

fn direct_variable(mut args: Args) -> HandlerResult {
    let location_prefix = match args.token(Rule::location_prefix)?.text.to_ascii_uppercase().as_str() {
        "I" => LocationPrefix::I,
        "Q" => LocationPrefix::Q,
        "M" => LocationPrefix::M,
        other => return Err(args.error(format!("a location prefix, found {other}"))),
    };
    let size_prefix = match args.token_if(Rule::size_prefix) {
        None => SizePrefix::X,
        Some(token) => match token.text.to_ascii_uppercase().as_str() {
            "X" => SizePrefix::X,
            "B" => SizePrefix::B,
            "W" => SizePrefix::W,
            "D" => SizePrefix::D,
            "L" => SizePrefix::L,
            other => return Err(args.error(format!("a size prefix, found {other}"))),
        },
    };
    let location = args.token(Rule::direct_location)?;
    let mut bits = Vec::new();
    while let Some(bit) = args.token_if(Rule::direct_bit) {
        bits.push(bit);
    }
    args.finish()?;
    Ok(Variable::Direct(DirectVariable {
        location_prefix,
        size_prefix,
        location,
        bits,
    })
    .into())
}

fn location(mut args: Args) -> HandlerResult {
    let variable: DirectVariable = args.take()?;
    args.finish()?;
    Ok(Location { variable }.into())
}

fn incomplete_location(mut args: Args) -> HandlerResult {
    let address = args.token(Rule::incomplete_address)?;
    args.finish()?;
    Ok(IncompleteLocation { address }.into())
}

/// `a OP b OP c` arrives flat and is folded to the left. A single operand
/// passes through untouched.
fn binary_chain(mut args: Args) -> HandlerResult {
    if args.len() == 1 {
        return args.single();
    }
    let mut left: Expression = args.take()?;
    while !args.is_empty() {
        let op: Token = args.take()?;
        let right: Expression = args.take()?;
        left = Expression::Binary(BinaryOperation {
            left: Box::new(left),
            op,
            right: Box::new(right),
        });
    }
    Ok(left.into())
}

fn unary_expression(mut args: Args) -> HandlerResult {
    let Some(op) = args.token_if(Rule::unary_operator) else {
        return args.single();
    };
    let expr: Expression = args.take()?;
    args.finish()?;
    Ok(Expression::Unary(UnaryOperation {
        op,
        expr: Box::new(expr),
    })
    .into())
}

fn parenthesized_expression(mut args: Args) -> HandlerResult {
    let inner: Expression = args.take()?;
    args.finish()?;
    Ok(Expression::Parenthesized(Box::new(inner)).into())
}

fn qualified_enumerated_value(mut args: Args) -> HandlerResult {
    let type_name = args.token(Rule::type_name)?;
    let name = args.token(Rule::identifier)?;
    args.finish()?;
    Ok(EnumeratedValue {
        type_name: Some(type_name),
        name,
        value: None,
    }
    .into())
}

fn param_assignment(mut args: Args) -> HandlerResult {
    let name = args.token_if(Rule::identifier);
    let value: Expression = args.take()?;
    args.finish()?;
    Ok(ParameterAssignment::Input { name, value }.into())
}

fn output_parameter_assignment(mut args: Args) -> HandlerResult {
    let inverted = args.token_if(Rule::output_inverter).is_some();
    let name = args.token(Rule::identifier)?;
    let target = args.take_if::<Variable>();
    args.finish()?;
    Ok(ParameterAssignment::Output {
        inverted,
        name,
        target,
    }
    .into())
}

fn take_call(args: &mut Args) -> Result<(Variable, Vec<ParameterAssignment>), ConstructionError> {
    let name: Variable = args.take()?;
    let parameters = args.take_while();
    Ok((name, parameters))
}

fn function_call(mut args: Args) -> HandlerResult {
    let (name, parameters) = take_call(&mut args)?;
    args.finish()?;
    Ok(Expression::FunctionCall(FunctionCall { name, parameters }).into())
}

fn fb_invocation(mut args: Args) -> HandlerResult {
    let (name, parameters) = take_call(&mut args)?;
    args.finish()?;
    Ok(Element::Invocation(FunctionBlockInvocation { name, parameters }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::FromElement;

    fn symbol(name: &str) -> Element {
        Variable::Symbolic(SymbolicVariable {
            name: Token::new(name, 1),
            dereferenced: false,
        })
        .into()
    }

    fn op(text: &str) -> Element {
        Element::Token(Rule::add_operator, Token::new(text, 1))
    }

    fn expression(element: Element) -> Expression {
        match Expression::from_element(element) {
            Ok(expr) => expr,
            Err(other) => panic!("expected an expression, got {}", other.kind()),
        }
    }

    #[test]
    fn chains_fold_to_the_left() {
        let args = Args::new(
            Rule::add_expression,
            1,
            0..9,
            vec![symbol("a"), op("+"), symbol("b"), op("-"), symbol("c")],
        );
        let expr = expression(binary_chain(args).unwrap());
        let Expression::Binary(outer) = &expr else {
            panic!("expected a binary operation");
        };
        assert_eq!(outer.op.text, "-");
        assert!(matches!(*outer.left, Expression::Binary(_)));
        assert_eq!(expr.to_string(), "a + b - c");
    }

    #[test]
    fn single_operand_passes_through() {
        let args = Args::new(Rule::expression, 1, 0..1, vec![symbol("a")]);
        assert_eq!(binary_chain(args).unwrap().kind(), "Variable");
    }

    #[test]
    fn dangling_operator_is_an_error() {
        let args = Args::new(Rule::add_expression, 2, 0..3, vec![symbol("a"), op("+")]);
        let err = binary_chain(args).unwrap_err();
        assert_eq!(err.rule, "add_expression");
        assert_eq!(err.received, 2);
    }

    #[test]
    fn direct_variable_defaults_to_bit_access() {
        let args = Args::new(
            Rule::direct_variable,
            1,
            0..5,
            vec![
                Element::Token(Rule::location_prefix, Token::new("i", 1)),
                Element::Token(Rule::direct_location, Token::new("0", 1)),
                Element::Token(Rule::direct_bit, Token::new("3", 1)),
            ],
        );
        let variable = direct_variable(args).unwrap();
        assert_eq!(expression(variable).to_string(), "%IX0.3");
    }
}
