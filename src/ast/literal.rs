use serde::Serialize;
use std::fmt::{self, Display};

use super::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegerBase {
    Binary,
    Octal,
    Decimal,
    Hexadecimal,
}

impl IntegerBase {
    pub fn radix(self) -> u32 {
        match self {
            IntegerBase::Binary => 2,
            IntegerBase::Octal => 8,
            IntegerBase::Decimal => 10,
            IntegerBase::Hexadecimal => 16,
        }
    }
}

fn write_based(
    f: &mut fmt::Formatter<'_>,
    type_name: Option<&Token>,
    base: IntegerBase,
    value: &Token,
) -> fmt::Result {
    if let Some(type_name) = type_name {
        write!(f, "{type_name}#")?;
    }
    if base != IntegerBase::Decimal {
        write!(f, "{}#", base.radix())?;
    }
    write!(f, "{value}")
}

/// `16#FF`, `INT#-5`, `42`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Integer {
    pub value: Token,
    pub type_name: Option<Token>,
    pub base: IntegerBase,
}

impl Integer {
    pub fn new(value: Token, base: IntegerBase) -> Self {
        Self {
            value,
            type_name: None,
            base,
        }
    }

    /// Numeric value with `_` separators removed. `None` on overflow.
    pub fn to_i128(&self) -> Option<i128> {
        let digits: String = self.value.text.chars().filter(|c| *c != '_').collect();
        i128::from_str_radix(&digits, self.base.radix()).ok()
    }
}

impl Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_based(f, self.type_name.as_ref(), self.base, &self.value)
    }
}

/// `1.5`, `LREAL#1E-3`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Real {
    pub value: Token,
    pub type_name: Option<Token>,
}

impl Display for Real {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(type_name) = &self.type_name {
            write!(f, "{type_name}#")?;
        }
        write!(f, "{}", self.value)
    }
}

/// `WORD#16#FFFF`; unlike integers the type name is mandatory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BitString {
    pub type_name: Token,
    pub value: Token,
    pub base: IntegerBase,
}

impl Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_based(f, Some(&self.type_name), self.base, &self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Boolean {
    pub value: bool,
}

impl Display for Boolean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.value { "TRUE" } else { "FALSE" })
    }
}

/// `T#1d2h3m4s5ms`. Each part keeps its number as written; units render
/// upper case.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Duration {
    pub days: Option<Token>,
    pub hours: Option<Token>,
    pub minutes: Option<Token>,
    pub seconds: Option<Token>,
    pub milliseconds: Option<Token>,
}

impl Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TIME#")?;
        let parts = [
            (&self.days, "D"),
            (&self.hours, "H"),
            (&self.minutes, "M"),
            (&self.seconds, "S"),
            (&self.milliseconds, "MS"),
        ];
        for (value, unit) in parts {
            if let Some(value) = value {
                write!(f, "{value}{unit}")?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeOfDay {
    pub hour: Token,
    pub minute: Token,
    pub second: Token,
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TIME_OF_DAY#{}:{}:{}", self.hour, self.minute, self.second)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Date {
    pub year: Token,
    pub month: Token,
    pub day: Token,
}

impl Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DATE#{}-{}-{}", self.year, self.month, self.day)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateTime {
    pub date: Date,
    pub time: TimeOfDay,
}

impl Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DT#{}-{}-{}-{}:{}:{}",
            self.date.year,
            self.date.month,
            self.date.day,
            self.time.hour,
            self.time.minute,
            self.time.second
        )
    }
}

/// A quoted string, quotes and `$` escapes included.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StringLiteral {
    pub value: Token,
}

impl StringLiteral {
    pub fn is_wide(&self) -> bool {
        self.value.text.starts_with('"')
    }
}

impl Display for StringLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    Integer(Integer),
    Real(Real),
    BitString(BitString),
    Boolean(Boolean),
    Duration(Duration),
    TimeOfDay(TimeOfDay),
    Date(Date),
    DateTime(DateTime),
    String(StringLiteral),
}

impl Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(v) => v.fmt(f),
            Literal::Real(v) => v.fmt(f),
            Literal::BitString(v) => v.fmt(f),
            Literal::Boolean(v) => v.fmt(f),
            Literal::Duration(v) => v.fmt(f),
            Literal::TimeOfDay(v) => v.fmt(f),
            Literal::Date(v) => v.fmt(f),
            Literal::DateTime(v) => v.fmt(f),
            Literal::String(v) => v.fmt(f),
        }
    }
}
