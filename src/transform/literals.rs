use super::{Args, GenericNode, Handler, HandlerResult};
use crate::ast::*;
use crate::error::ConstructionError;
use crate::parser::Rule;

pub(super) const HANDLERS: &[(Rule, Handler)] = &[
    (Rule::binary_integer, binary_integer),
    (Rule::octal_integer, octal_integer),
    (Rule::hex_integer, hex_integer),
    (Rule::signed_integer, signed_integer),
    (Rule::integer_literal, integer_literal),
    (Rule::real_literal, real_literal),
    (Rule::binary_bit_string_literal, binary_bit_string_literal),
    (Rule::octal_bit_string_literal, octal_bit_string_literal),
    (Rule::hex_bit_string_literal, hex_bit_string_literal),
    (Rule::bit_string_literal, bit_string_literal),
    (Rule::true_value, true_value),
    (Rule::false_value, false_value),
    (Rule::duration, duration),
    (Rule::time_of_day, time_of_day),
    (Rule::date, date),
    (Rule::date_and_time, date_and_time),
    (Rule::string_literal, string_literal),
];

fn based_integer(mut args: Args, digits_rule: Rule, base: IntegerBase) -> HandlerResult {
    let value = args.token(digits_rule)?;
    args.finish()?;
    Ok(Literal::Integer(Integer::new(value, base)).into())
}

fn binary_integer(args: Args) -> HandlerResult {
    based_integer(args, Rule::binary_digits, IntegerBase::Binary)
}

fn octal_integer(args: Args) -> HandlerResult {
    based_integer(args, Rule::octal_digits, IntegerBase::Octal)
}

fn hex_integer(args: Args) -> HandlerResult {
    based_integer(args, Rule::hex_digits, IntegerBase::Hexadecimal)
}

fn signed_integer(args: Args) -> HandlerResult {
    based_integer(args, Rule::integer_value, IntegerBase::Decimal)
}

/// The optional `TYPE#` prefix arrives as a token before the already built
/// integer; a bare integer arrives alone.
fn integer_literal(mut args: Args) -> HandlerResult {
    let type_name = args.token_if(Rule::integer_type_name);
    let mut integer: Integer = args.take()?;
    args.finish()?;
    integer.type_name = type_name;
    Ok(Literal::Integer(integer).into())
}

fn real_literal(mut args: Args) -> HandlerResult {
    let type_name = args.token_if(Rule::real_type_name);
    let value = args.token(Rule::real_value)?;
    args.finish()?;
    Ok(Literal::Real(Real { value, type_name }).into())
}

fn bit_string(mut args: Args, digits_rule: Rule, base: IntegerBase) -> HandlerResult {
    let type_name = args.token(Rule::bit_string_type_name)?;
    let value = args.token(digits_rule)?;
    args.finish()?;
    Ok(Literal::BitString(BitString {
        type_name,
        value,
        base,
    })
    .into())
}

fn binary_bit_string_literal(args: Args) -> HandlerResult {
    bit_string(args, Rule::binary_digits, IntegerBase::Binary)
}

fn octal_bit_string_literal(args: Args) -> HandlerResult {
    bit_string(args, Rule::octal_digits, IntegerBase::Octal)
}

fn hex_bit_string_literal(args: Args) -> HandlerResult {
    bit_string(args, Rule::hex_digits, IntegerBase::Hexadecimal)
}

fn bit_string_literal(args: Args) -> HandlerResult {
    bit_string(args, Rule::decimal_digits, IntegerBase::Decimal)
}

fn boolean(mut args: Args, rule: Rule, value: bool) -> HandlerResult {
    args.token(rule)?;
    args.finish()?;
    Ok(Literal::Boolean(Boolean { value }).into())
}

fn true_value(args: Args) -> HandlerResult {
    boolean(args, Rule::true_value, true)
}

fn false_value(args: Args) -> HandlerResult {
    boolean(args, Rule::false_value, false)
}

/// Each present part (`1d`, `2h`, ...) is a node wrapping its number.
fn duration(mut args: Args) -> HandlerResult {
    let parts: Vec<GenericNode> = args.take_while();
    if !args.is_empty() || parts.is_empty() {
        return Err(args.error("one or more duration parts"));
    }
    let mut value = Duration::default();
    for part in parts {
        let rule = part.rule;
        let number = part
            .into_token()
            .ok_or_else(|| args.error(format!("a number in {rule:?}")))?;
        let slot = match rule {
            Rule::days => &mut value.days,
            Rule::hours => &mut value.hours,
            Rule::minutes => &mut value.minutes,
            Rule::seconds => &mut value.seconds,
            Rule::milliseconds => &mut value.milliseconds,
            other => return Err(args.error(format!("a duration part, found {other:?}"))),
        };
        *slot = Some(number);
    }
    Ok(Literal::Duration(value).into())
}

fn take_time(args: &mut Args) -> Result<TimeOfDay, ConstructionError> {
    Ok(TimeOfDay {
        hour: args.token(Rule::day_hour)?,
        minute: args.token(Rule::day_minute)?,
        second: args.token(Rule::day_second)?,
    })
}

fn take_date(args: &mut Args) -> Result<Date, ConstructionError> {
    Ok(Date {
        year: args.token(Rule::year)?,
        month: args.token(Rule::month)?,
        day: args.token(Rule::day)?,
    })
}

fn time_of_day(mut args: Args) -> HandlerResult {
    let time = take_time(&mut args)?;
    args.finish()?;
    Ok(Literal::TimeOfDay(time).into())
}

fn date(mut args: Args) -> HandlerResult {
    let date = take_date(&mut args)?;
    args.finish()?;
    Ok(Literal::Date(date).into())
}

fn date_and_time(mut args: Args) -> HandlerResult {
    let date = take_date(&mut args)?;
    let time = take_time(&mut args)?;
    args.finish()?;
    Ok(Literal::DateTime(DateTime { date, time }).into())
}

fn string_literal(mut args: Args) -> HandlerResult {
    let value = args.token(Rule::string_literal)?;
    args.finish()?;
    Ok(Literal::String(StringLiteral { value }).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Element;

    fn token(rule: Rule, text: &str) -> Element {
        Element::Token(rule, Token::new(text, 1))
    }

    fn literal(element: Element) -> Literal {
        match element {
            Element::Literal(literal) => literal,
            other => panic!("expected a literal, got {}", other.kind()),
        }
    }

    #[test]
    fn typed_hex_integer() {
        let hex = hex_integer(Args::new(
            Rule::hex_integer,
            1,
            0..5,
            vec![token(Rule::hex_digits, "2A")],
        ))
        .unwrap();
        let typed = integer_literal(Args::new(
            Rule::integer_literal,
            1,
            0..9,
            vec![token(Rule::integer_type_name, "INT"), hex],
        ))
        .unwrap();
        assert_eq!(literal(typed).to_string(), "INT#16#2A");
    }

    #[test]
    fn binary_bit_string_keeps_its_digits() {
        let word = binary_bit_string_literal(Args::new(
            Rule::binary_bit_string_literal,
            1,
            0..16,
            vec![
                token(Rule::bit_string_type_name, "WORD"),
                token(Rule::binary_digits, "1010_0101"),
            ],
        ))
        .unwrap();
        assert_eq!(literal(word).to_string(), "WORD#2#1010_0101");
    }

    #[test]
    fn bare_decimal_integer() {
        let value = signed_integer(Args::new(
            Rule::signed_integer,
            1,
            0..2,
            vec![token(Rule::integer_value, "42")],
        ))
        .unwrap();
        let bare = integer_literal(Args::new(Rule::integer_literal, 1, 0..2, vec![value])).unwrap();
        assert_eq!(literal(bare).to_string(), "42");
    }

    #[test]
    fn duration_parts_in_fixed_order() {
        let part = |rule, number: &str| {
            Element::Generic(GenericNode {
                rule,
                line: 1,
                span: 0..2,
                text: String::new(),
                children: vec![token(Rule::duration_number, number)],
            })
        };
        let value = duration(Args::new(
            Rule::duration,
            1,
            0..9,
            vec![part(Rule::days, "1"), part(Rule::hours, "2")],
        ))
        .unwrap();
        assert_eq!(literal(value).to_string(), "TIME#1D2H");
    }

    #[test]
    fn duration_without_parts_is_rejected() {
        let err = duration(Args::new(Rule::duration, 3, 0..5, vec![])).unwrap_err();
        assert_eq!(err.rule, "duration");
        assert_eq!(err.line, 3);
    }
}
