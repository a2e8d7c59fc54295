/// Compiled route segments
///
/// Each segment implements the same three-part contract:
/// - `matches`: pure predicate over one peeked token
/// - `read`: consumes the tokens it owns and records extracted values
/// - `resolve`: the inverse, producing a path token from a value map
use std::fmt;
use std::sync::Arc;

use crate::constraint::Validator;
use crate::convert::Converter;
use crate::cursor::RouteResolutionCursor;
use crate::error::{Result, RouterError};
use crate::value::{RouteValue, RouteValues};

/// One compiled unit of a route template
#[derive(Debug, Clone)]
pub enum Segment {
    /// Literal text, matched by exact equality
    Static(String),
    /// Typed dynamic placeholder (`:name`)
    Value(ValueSegment),
    /// Trailing `*`: accepts whatever remains
    Wildcard,
    /// Leading `~`: the route only matches mid-path
    Relative,
}

impl Segment {
    pub fn matches(&self, token: Option<&str>) -> bool {
        match self {
            Segment::Static(literal) => token == Some(literal.as_str()),
            Segment::Value(value) => value.matches(token),
            Segment::Wildcard | Segment::Relative => true,
        }
    }

    pub fn read(&self, cursor: &mut RouteResolutionCursor, values: &mut RouteValues) -> Result<()> {
        match self {
            Segment::Static(literal) => {
                if cursor.peek(0) != Some(literal.as_str()) {
                    return Err(RouterError::UnexpectedToken {
                        expected: literal.clone(),
                        found: cursor.peek(0).map(str::to_string),
                    });
                }
                cursor.shift();
                Ok(())
            }
            Segment::Value(value) => value.read(cursor, values),
            Segment::Wildcard | Segment::Relative => Ok(()),
        }
    }

    pub fn resolve(&self, values: &mut RouteValues, consume: bool) -> Result<Option<String>> {
        match self {
            Segment::Static(literal) => Ok(Some(literal.clone())),
            Segment::Value(value) => value.resolve(values, consume),
            Segment::Wildcard | Segment::Relative => Ok(None),
        }
    }

    pub fn as_value(&self) -> Option<&ValueSegment> {
        match self {
            Segment::Value(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Static(literal) => f.write_str(literal),
            Segment::Value(value) => write!(f, ":{}", value.name),
            Segment::Wildcard => f.write_str("*"),
            Segment::Relative => f.write_str("~"),
        }
    }
}

/// Dynamic segment: name, optional default, converter and validator
#[derive(Clone)]
pub struct ValueSegment {
    name: String,
    optional: bool,
    default: Option<RouteValue>,
    converter: Arc<dyn Converter>,
    validator: Option<Arc<dyn Validator>>,
}

impl ValueSegment {
    pub fn new(
        name: impl Into<String>,
        converter: Arc<dyn Converter>,
        validator: Option<Arc<dyn Validator>>,
    ) -> Self {
        Self {
            name: name.into(),
            optional: false,
            default: None,
            converter,
            validator,
        }
    }

    /// Marks the segment optional, with an already-converted default
    pub fn with_default(mut self, default: Option<RouteValue>) -> Self {
        self.optional = true;
        self.default = default;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn default_value(&self) -> Option<&RouteValue> {
        self.default.as_ref()
    }

    pub fn has_validator(&self) -> bool {
        self.validator.is_some()
    }

    /// Absent tokens match only optional segments; present tokens must be
    /// convertible and pass the validator
    pub fn matches(&self, token: Option<&str>) -> bool {
        match token {
            None => self.optional,
            Some(token) => {
                self.converter.can_convert(token)
                    && self
                        .validator
                        .as_ref()
                        .map(|validator| validator.validate(token))
                        .unwrap_or(true)
            }
        }
    }

    fn read(&self, cursor: &mut RouteResolutionCursor, values: &mut RouteValues) -> Result<()> {
        match cursor.shift() {
            Some(token) => {
                let value = self
                    .converter
                    .convert(&token)
                    .ok_or_else(|| RouterError::Conversion {
                        name: self.name.clone(),
                        token: token.clone(),
                    })?;
                values.insert(self.name.clone(), value);
            }
            None => {
                if let Some(default) = &self.default {
                    values.insert(self.name.clone(), default.clone());
                }
            }
        }
        Ok(())
    }

    fn resolve(&self, values: &mut RouteValues, consume: bool) -> Result<Option<String>> {
        let value = if consume {
            values.remove(&self.name)
        } else {
            values.get(&self.name).cloned()
        };

        match value.as_ref().or(self.default.as_ref()) {
            Some(value) => Ok(Some(self.converter.convert_back(value))),
            None if self.optional => Ok(None),
            None => Err(RouterError::MissingValue(self.name.clone())),
        }
    }
}

impl fmt::Debug for ValueSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueSegment")
            .field("name", &self.name)
            .field("optional", &self.optional)
            .field("default", &self.default)
            .field("converter", &self.converter)
            .field("validator", &self.validator)
            .finish()
    }
}
