/// Argument clauses and validators for dynamic segments
///
/// The `<...>` clause of a template segment is parsed into [`SegmentArgs`]; a
/// [`ValidatorFactory`] turns that into a [`Validator`] checked against the
/// raw token before conversion.
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::convert::parse_float_prefix;
use crate::error::TemplateError;

/// Parsed `<...>` clause of a dynamic segment
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentArgs {
    /// No clause, or an empty one (`<>`)
    None,
    /// `<min..max>`; either side may be open
    Range { min: Option<f64>, max: Option<f64> },
    /// `<^pattern$>`
    Regex(String),
    /// `<a|b|c>`
    Enum(Vec<String>),
}

impl SegmentArgs {
    /// Parses the text between `<` and `>`
    ///
    /// Evaluated in order: empty → `None`, `^...$` → `Regex`,
    /// contains `..` → `Range`, otherwise `Enum`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cascade_router::SegmentArgs;
    ///
    /// assert_eq!(SegmentArgs::parse("").unwrap(), SegmentArgs::None);
    /// assert_eq!(
    ///     SegmentArgs::parse("1..").unwrap(),
    ///     SegmentArgs::Range { min: Some(1.0), max: None }
    /// );
    /// assert_eq!(
    ///     SegmentArgs::parse("get|set").unwrap(),
    ///     SegmentArgs::Enum(vec!["get".into(), "set".into()])
    /// );
    /// assert!(matches!(SegmentArgs::parse("^\\d+$").unwrap(), SegmentArgs::Regex(_)));
    /// ```
    pub fn parse(args: &str) -> Result<Self, TemplateError> {
        if args.is_empty() {
            return Ok(SegmentArgs::None);
        }

        if args.len() > 1 && args.starts_with('^') && args.ends_with('$') {
            return Ok(SegmentArgs::Regex(args.to_string()));
        }

        if args.contains("..") {
            return parse_range(args);
        }

        Ok(SegmentArgs::Enum(
            args.split('|').map(str::to_string).collect(),
        ))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, SegmentArgs::None)
    }
}

fn parse_range(args: &str) -> Result<SegmentArgs, TemplateError> {
    let bounds: Vec<&str> = args.split("..").collect();
    let [min, max] = bounds.as_slice() else {
        return Err(TemplateError::InvalidRange(args.to_string()));
    };

    let parse_bound = |bound: &str| -> Result<Option<f64>, TemplateError> {
        let bound = bound.trim();
        if bound.is_empty() {
            return Ok(None);
        }
        bound
            .parse::<f64>()
            .map(Some)
            .map_err(|_| TemplateError::InvalidRange(args.to_string()))
    };

    Ok(SegmentArgs::Range {
        min: parse_bound(*min)?,
        max: parse_bound(*max)?,
    })
}

/// Checks a raw path token against a segment constraint
pub trait Validator: fmt::Debug + Send + Sync {
    fn validate(&self, token: &str) -> bool;
}

/// Numeric bounds, inclusive on both sides
#[derive(Debug, Clone, PartialEq)]
pub struct RangeValidator {
    min: f64,
    max: f64,
}

impl RangeValidator {
    /// Open bounds fall back to the extremes of `f64`
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            min: min.unwrap_or(f64::MIN),
            max: max.unwrap_or(f64::MAX),
        }
    }
}

impl Validator for RangeValidator {
    fn validate(&self, token: &str) -> bool {
        parse_float_prefix(token)
            .map(|n| n >= self.min && n <= self.max)
            .unwrap_or(false)
    }
}

/// Regex compiled once at template-parse time
#[derive(Debug, Clone)]
pub struct RegexValidator {
    regex: Regex,
}

impl RegexValidator {
    pub fn new(pattern: &str) -> Result<Self, TemplateError> {
        let regex = Regex::new(pattern).map_err(|source| TemplateError::InvalidRegex {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { regex })
    }
}

impl Validator for RegexValidator {
    fn validate(&self, token: &str) -> bool {
        self.regex.is_match(token)
    }
}

/// Set membership
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValidator {
    values: HashSet<String>,
}

impl EnumValidator {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

impl Validator for EnumValidator {
    fn validate(&self, token: &str) -> bool {
        self.values.contains(token)
    }
}

/// Builds a validator from a segment's args clause
pub trait ValidatorFactory: Send + Sync {
    /// `Ok(None)` when the args carry no constraint
    fn create(&self, args: &SegmentArgs) -> Result<Option<Arc<dyn Validator>>, TemplateError>;
}

/// Selects a validator purely by args kind
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultValidatorFactory;

impl ValidatorFactory for DefaultValidatorFactory {
    fn create(&self, args: &SegmentArgs) -> Result<Option<Arc<dyn Validator>>, TemplateError> {
        let validator: Arc<dyn Validator> = match args {
            SegmentArgs::None => return Ok(None),
            SegmentArgs::Range { min, max } => Arc::new(RangeValidator::new(*min, *max)),
            SegmentArgs::Regex(pattern) => Arc::new(RegexValidator::new(pattern)?),
            SegmentArgs::Enum(values) => Arc::new(EnumValidator::new(values.iter().cloned())),
        };
        Ok(Some(validator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1..", Some(1.0), None)]
    #[case("..2", None, Some(2.0))]
    #[case("-5..5", Some(-5.0), Some(5.0))]
    #[case("..", None, None)]
    fn test_parse_range(#[case] args: &str, #[case] min: Option<f64>, #[case] max: Option<f64>) {
        assert_eq!(SegmentArgs::parse(args).unwrap(), SegmentArgs::Range { min, max });
    }

    #[rstest]
    #[case("1..2..3")]
    #[case("a..b")]
    fn test_parse_range_errors(#[case] args: &str) {
        assert!(matches!(
            SegmentArgs::parse(args),
            Err(TemplateError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_parse_regex_before_range() {
        assert_eq!(
            SegmentArgs::parse("^a..b$").unwrap(),
            SegmentArgs::Regex("^a..b$".to_string())
        );
    }

    #[test]
    fn test_parse_enum_single_value() {
        assert_eq!(
            SegmentArgs::parse("only").unwrap(),
            SegmentArgs::Enum(vec!["only".to_string()])
        );
    }

    #[test]
    fn test_range_open_upper_bound() {
        let validator = RangeValidator::new(Some(1.0), None);
        assert!(validator.validate("666"));
        assert!(!validator.validate("0"));
        assert!(!validator.validate("abc"));
    }

    #[test]
    fn test_range_open_lower_bound() {
        let validator = RangeValidator::new(None, Some(2.0));
        assert!(validator.validate("-555522"));
        assert!(validator.validate("2"));
        assert!(!validator.validate("2.5"));
    }

    #[test]
    fn test_regex_validator() {
        let validator = RegexValidator::new(r"^\d{3}$").unwrap();
        assert!(validator.validate("123"));
        assert!(!validator.validate("1234"));
    }

    #[test]
    fn test_invalid_regex() {
        assert!(matches!(
            RegexValidator::new("^(unclosed$"),
            Err(TemplateError::InvalidRegex { .. })
        ));
    }

    #[test]
    fn test_enum_validator() {
        let validator = EnumValidator::new(["get", "set"]);
        assert!(validator.validate("get"));
        assert!(!validator.validate("bob"));
    }

    #[test]
    fn test_factory_by_args_kind() {
        let factory = DefaultValidatorFactory;
        assert!(factory.create(&SegmentArgs::None).unwrap().is_none());

        let validator = factory
            .create(&SegmentArgs::Enum(vec!["a".into()]))
            .unwrap()
            .unwrap();
        assert!(validator.validate("a"));
        assert!(!validator.validate("b"));
    }
}
