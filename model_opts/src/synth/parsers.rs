//! Value parsers turning raw arguments into `serde_json::Value`s.

use std::ffi::OsStr;
use std::fmt;
use std::net::IpAddr;
use std::ops::{Bound, RangeBounds};

use clap::builder::TypedValueParser;
use clap::error::ErrorKind;
use clap::{Arg, Command};
use serde_json::{Number, Value};

use crate::{Email, JsonSpec, TextKind};

fn rejected(
    kind: ErrorKind,
    cmd: &Command,
    arg: Option<&Arg>,
    value: &str,
    reason: impl fmt::Display,
) -> clap::Error {
    let flag = arg.map_or_else(|| String::from("..."), ToString::to_string);
    clap::Error::raw(kind, format!("invalid value '{value}' for '{flag}': {reason}\n"))
        .with_cmd(cmd)
}

fn invalid(cmd: &Command, arg: Option<&Arg>, value: &str, reason: impl fmt::Display) -> clap::Error {
    rejected(ErrorKind::ValueValidation, cmd, arg, value, reason)
}

fn utf8<'v>(cmd: &Command, arg: Option<&Arg>, value: &'v OsStr) -> Result<&'v str, clap::Error> {
    value.to_str().ok_or_else(|| {
        invalid(
            cmd,
            arg,
            &value.to_string_lossy(),
            "value is not valid UTF-8",
        )
    })
}

/// Open or closed interval checked against parsed numbers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Range<N> {
    lower: Bound<N>,
    upper: Bound<N>,
}

impl<N> Range<N> {
    pub(crate) const fn new(lower: Bound<N>, upper: Bound<N>) -> Self {
        Self { lower, upper }
    }
}

impl<N> RangeBounds<N> for Range<N> {
    fn start_bound(&self) -> Bound<&N> {
        self.lower.as_ref()
    }

    fn end_bound(&self) -> Bound<&N> {
        self.upper.as_ref()
    }
}

impl<N: fmt::Display> fmt::Display for Range<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.lower {
            Bound::Included(low) => write!(f, "{low}<=")?,
            Bound::Excluded(low) => write!(f, "{low}<")?,
            Bound::Unbounded => {}
        }
        f.write_str("x")?;
        match &self.upper {
            Bound::Included(high) => write!(f, "<={high}"),
            Bound::Excluded(high) => write!(f, "<{high}"),
            Bound::Unbounded => Ok(()),
        }
    }
}

/// Parser for whole and fractional numbers with optional bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum NumberParser {
    Integer(Range<i64>),
    Float(Range<f64>),
}

impl NumberParser {
    fn parse_integer(range: &Range<i64>, text: &str) -> Result<Number, String> {
        match text.parse::<i64>() {
            Ok(number) if range.contains(&number) => Ok(Number::from(number)),
            Ok(_) => Err(format!("{text} is not in the range {range}")),
            Err(signed) => match text.parse::<u64>() {
                Ok(number) if matches!(range.upper, Bound::Unbounded) => Ok(Number::from(number)),
                Ok(_) => Err(format!("{text} is not in the range {range}")),
                Err(_) => Err(format!("not an integer: {signed}")),
            },
        }
    }

    fn parse_float(range: &Range<f64>, text: &str) -> Result<Number, String> {
        let number = text
            .parse::<f64>()
            .map_err(|err| format!("not a number: {err}"))?;
        let finite = Number::from_f64(number).ok_or_else(|| String::from("must be a finite number"))?;
        if range.contains(&number) {
            Ok(finite)
        } else {
            Err(format!("{text} is not in the range {range}"))
        }
    }
}

impl TypedValueParser for NumberParser {
    type Value = Value;

    fn parse_ref(&self, cmd: &Command, arg: Option<&Arg>, value: &OsStr) -> Result<Value, clap::Error> {
        let text = utf8(cmd, arg, value)?;
        let parsed = match self {
            Self::Integer(range) => Self::parse_integer(range, text),
            Self::Float(range) => Self::parse_float(range, text),
        };
        parsed
            .map(Value::Number)
            .map_err(|reason| invalid(cmd, arg, text, reason))
    }
}

/// Parser for string-like values, validating the known domain types.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TextParser {
    kind: TextKind,
}

impl TextParser {
    pub(crate) const fn new(kind: TextKind) -> Self {
        Self { kind }
    }

    fn check(self, text: &str) -> Result<(), String> {
        match self.kind {
            TextKind::Url => url::Url::parse(text).map(drop).map_err(|err| err.to_string()),
            TextKind::Email => text.parse::<Email>().map(drop).map_err(|err| err.to_string()),
            TextKind::IpAddr => text.parse::<IpAddr>().map(drop).map_err(|err| err.to_string()),
            _ => Ok(()),
        }
    }
}

impl TypedValueParser for TextParser {
    type Value = Value;

    fn parse_ref(&self, cmd: &Command, arg: Option<&Arg>, value: &OsStr) -> Result<Value, clap::Error> {
        let text = utf8(cmd, arg, value)?;
        self.check(text)
            .map_err(|reason| invalid(cmd, arg, text, reason))?;
        Ok(Value::String(text.to_owned()))
    }
}

/// Parser for complex values passed as JSON text.
///
/// The text must be valid JSON and must decode into the field's type.
#[derive(Clone, Copy, Debug)]
pub(crate) struct JsonParser {
    spec: JsonSpec,
}

impl JsonParser {
    pub(crate) const fn new(spec: JsonSpec) -> Self {
        Self { spec }
    }
}

impl TypedValueParser for JsonParser {
    type Value = Value;

    fn parse_ref(&self, cmd: &Command, arg: Option<&Arg>, value: &OsStr) -> Result<Value, clap::Error> {
        let text = utf8(cmd, arg, value)?;
        let decoded: Value = serde_json::from_str(text).map_err(|err| {
            rejected(ErrorKind::InvalidValue, cmd, arg, text, format_args!("invalid JSON: {err}"))
        })?;
        self.spec.decode(&decoded).map_err(|reason| {
            rejected(
                ErrorKind::InvalidValue,
                cmd,
                arg,
                text,
                format_args!("expected {}: {reason}", self.spec.type_name()),
            )
        })?;
        Ok(decoded)
    }
}
