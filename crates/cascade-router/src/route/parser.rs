/// Route template compilation
///
/// Turns template strings such as `/items/:item/:+id?` into compiled
/// [`Route`]s. Parsing is a fold over the template tokens: every token is
/// classified, position-checked and compiled into a [`Segment`].
use std::sync::Arc;

use super::pattern::{classify_segment, PatternSegmentType, ValueClause};
use super::segment::{Segment, ValueSegment};
use super::Route;
use crate::constraint::{DefaultValidatorFactory, ValidatorFactory};
use crate::convert::{ConverterFactory, DefaultConverterFactory};
use crate::error::TemplateError;

/// Template parser with pluggable converter and validator factories
///
/// One parser is shared by every routing table built from the same
/// configuration.
///
/// # Examples
///
/// ```
/// use cascade_router::RouteTemplateParser;
///
/// let parser = RouteTemplateParser::default();
/// let route = parser.parse("/items/:item/:+id?").unwrap();
/// assert_eq!(route.segments().len(), 3);
/// assert!(!route.is_relative());
///
/// assert!(parser.parse("/a/*/b").is_err());
/// ```
#[derive(Clone)]
pub struct RouteTemplateParser {
    converters: Arc<dyn ConverterFactory>,
    validators: Arc<dyn ValidatorFactory>,
}

impl Default for RouteTemplateParser {
    fn default() -> Self {
        Self::new(Arc::new(DefaultConverterFactory), Arc::new(DefaultValidatorFactory))
    }
}

/// Fold accumulator: compiled segments plus position bookkeeping
struct ParseState<'t> {
    template: &'t str,
    count: usize,
    segments: Vec<Segment>,
}

impl<'t> ParseState<'t> {
    fn new(template: &'t str, count: usize) -> Self {
        Self {
            template,
            count,
            segments: Vec::with_capacity(count),
        }
    }

    fn with_segment(mut self, segment: Segment) -> Self {
        self.segments.push(segment);
        self
    }

    fn into_route(self) -> Route {
        Route::new(self.template, self.segments)
    }
}

impl RouteTemplateParser {
    pub fn new(
        converters: Arc<dyn ConverterFactory>,
        validators: Arc<dyn ValidatorFactory>,
    ) -> Self {
        Self {
            converters,
            validators,
        }
    }

    /// Compiles a template into a route
    ///
    /// Fails on the first malformed token: unbalanced `<...>`, `~` not first,
    /// `*` not last, boolean enum arity, unparseable range/regex/default.
    pub fn parse(&self, template: &str) -> Result<Route, TemplateError> {
        let tokens: Vec<&str> = template.split('/').filter(|s| !s.is_empty()).collect();

        tokens
            .iter()
            .enumerate()
            .try_fold(ParseState::new(template, tokens.len()), |state, (index, token)| {
                self.process_segment(state, index, token)
            })
            .map(ParseState::into_route)
    }

    fn process_segment<'t>(
        &self,
        state: ParseState<'t>,
        index: usize,
        token: &str,
    ) -> Result<ParseState<'t>, TemplateError> {
        let segment = match classify_segment(token)? {
            PatternSegmentType::Relative if index != 0 => {
                return Err(TemplateError::RelativeNotFirst(state.template.to_string()));
            }
            PatternSegmentType::Relative => Segment::Relative,
            PatternSegmentType::Wildcard if index + 1 != state.count => {
                return Err(TemplateError::WildcardNotLast(state.template.to_string()));
            }
            PatternSegmentType::Wildcard => Segment::Wildcard,
            PatternSegmentType::Value(clause) => Segment::Value(self.compile_value(clause)?),
            PatternSegmentType::Static(literal) => Segment::Static(literal.to_string()),
        };
        Ok(state.with_segment(segment))
    }

    fn compile_value(&self, clause: ValueClause<'_>) -> Result<ValueSegment, TemplateError> {
        let indicator = clause
            .name
            .chars()
            .next()
            .ok_or_else(|| TemplateError::MissingName(format!(":{}", clause.name)))?;
        let stripped = &clause.name[indicator.len_utf8()..];

        let (name, converter) = match self.converters.create(indicator, stripped, &clause.args)? {
            Some(converter) => (stripped, converter),
            None => (clause.name, self.converters.default_converter()),
        };

        if name.is_empty() {
            return Err(TemplateError::MissingName(format!(":{}", clause.name)));
        }

        let validator = self.validators.create(&clause.args)?;
        let segment = ValueSegment::new(name, converter.clone(), validator);

        Ok(match clause.default {
            None => segment,
            Some(None) => segment.with_default(None),
            // Converted only: the default is not re-checked by the validator
            Some(Some(literal)) => {
                let default = converter
                    .can_convert(literal)
                    .then(|| converter.convert(literal))
                    .flatten()
                    .ok_or_else(|| TemplateError::InvalidDefault {
                        name: name.to_string(),
                        value: literal.to_string(),
                    })?;
                segment.with_default(Some(default))
            }
        })
    }
}
