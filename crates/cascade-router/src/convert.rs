/// Typed conversion of path tokens
///
/// A converter is picked per dynamic segment from its indicator character:
/// `$` string, `+` number, `!` boolean. Segments without a recognized
/// indicator use the factory's default (string) converter.
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::constraint::SegmentArgs;
use crate::error::TemplateError;
use crate::value::RouteValue;

static FLOAT_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:Infinity|(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)")
        .expect("float prefix regex is valid")
});

/// Parses the longest numeric prefix of a token (`"12px"` → `12.0`)
///
/// Leading whitespace is skipped. Returns `None` when no digits lead the token.
///
/// # Examples
///
/// ```
/// use cascade_router::convert::parse_float_prefix;
///
/// assert_eq!(parse_float_prefix("42"), Some(42.0));
/// assert_eq!(parse_float_prefix("-1.5e2x"), Some(-150.0));
/// assert_eq!(parse_float_prefix("abc"), None);
/// ```
pub fn parse_float_prefix(token: &str) -> Option<f64> {
    let token = token.trim_start();
    let matched = FLOAT_PREFIX.find(token)?.as_str();
    match matched.trim_start_matches(['+', '-']) {
        "Infinity" if matched.starts_with('-') => Some(f64::NEG_INFINITY),
        "Infinity" => Some(f64::INFINITY),
        _ => matched.parse().ok(),
    }
}

/// Converts raw path tokens to typed values and back
pub trait Converter: fmt::Debug + Send + Sync {
    fn can_convert(&self, token: &str) -> bool;

    /// Only called after `can_convert` accepted the token
    fn convert(&self, token: &str) -> Option<RouteValue>;

    fn convert_back(&self, value: &RouteValue) -> String;
}

/// Always convertible; URI-decodes the token
#[derive(Debug, Clone, Copy, Default)]
pub struct StringConverter;

impl Converter for StringConverter {
    fn can_convert(&self, _token: &str) -> bool {
        true
    }

    fn convert(&self, token: &str) -> Option<RouteValue> {
        let decoded = urlencoding::decode(token).unwrap_or(Cow::Borrowed(token));
        Some(RouteValue::Str(decoded.into_owned()))
    }

    fn convert_back(&self, value: &RouteValue) -> String {
        urlencoding::encode(&value.to_string()).into_owned()
    }
}

/// Convertible when the token starts with a number
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberConverter;

impl Converter for NumberConverter {
    fn can_convert(&self, token: &str) -> bool {
        parse_float_prefix(token).is_some()
    }

    fn convert(&self, token: &str) -> Option<RouteValue> {
        parse_float_prefix(token).map(RouteValue::Number)
    }

    fn convert_back(&self, value: &RouteValue) -> String {
        value.to_string()
    }
}

/// Convertible when the token equals one of two configured literals
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanConverter {
    true_literal: String,
    false_literal: String,
}

impl BooleanConverter {
    pub fn new(true_literal: impl Into<String>, false_literal: impl Into<String>) -> Self {
        Self {
            true_literal: true_literal.into(),
            false_literal: false_literal.into(),
        }
    }

    /// Takes the literals from an `<yes|no>` clause; other args keep the defaults
    pub fn from_args(name: &str, args: &SegmentArgs) -> Result<Self, TemplateError> {
        match args {
            SegmentArgs::Enum(values) => match values.as_slice() {
                [true_literal, false_literal] => Ok(Self::new(true_literal, false_literal)),
                _ => Err(TemplateError::BooleanEnumArity {
                    name: name.to_string(),
                    found: values.len(),
                }),
            },
            _ => Ok(Self::default()),
        }
    }
}

impl Default for BooleanConverter {
    fn default() -> Self {
        Self::new("true", "false")
    }
}

impl Converter for BooleanConverter {
    fn can_convert(&self, token: &str) -> bool {
        token == self.true_literal || token == self.false_literal
    }

    fn convert(&self, token: &str) -> Option<RouteValue> {
        if token == self.true_literal {
            Some(RouteValue::Bool(true))
        } else if token == self.false_literal {
            Some(RouteValue::Bool(false))
        } else {
            None
        }
    }

    fn convert_back(&self, value: &RouteValue) -> String {
        let truthy = match value {
            RouteValue::Bool(b) => *b,
            RouteValue::Str(s) => *s == self.true_literal,
            RouteValue::Number(n) => *n != 0.0,
        };
        if truthy {
            self.true_literal.clone()
        } else {
            self.false_literal.clone()
        }
    }
}

/// Picks a converter for a dynamic segment
pub trait ConverterFactory: Send + Sync {
    /// `Ok(None)` when `indicator` is not a converter indicator; the parser then
    /// keeps the character as part of the segment name.
    fn create(
        &self,
        indicator: char,
        name: &str,
        args: &SegmentArgs,
    ) -> Result<Option<Arc<dyn Converter>>, TemplateError>;

    fn default_converter(&self) -> Arc<dyn Converter>;
}

/// Recognizes `$` (string), `+` (number) and `!` (boolean)
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConverterFactory;

impl ConverterFactory for DefaultConverterFactory {
    fn create(
        &self,
        indicator: char,
        name: &str,
        args: &SegmentArgs,
    ) -> Result<Option<Arc<dyn Converter>>, TemplateError> {
        let converter: Arc<dyn Converter> = match indicator {
            '$' => Arc::new(StringConverter),
            '+' => Arc::new(NumberConverter),
            '!' => Arc::new(BooleanConverter::from_args(name, args)?),
            _ => return Ok(None),
        };
        Ok(Some(converter))
    }

    fn default_converter(&self) -> Arc<dyn Converter> {
        Arc::new(StringConverter)
    }
}
