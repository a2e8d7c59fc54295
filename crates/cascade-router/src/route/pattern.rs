/// Pattern parsing for route template segments
///
/// Pure functional classification of template tokens into typed segments.
/// All functions are **pure**: same input → same output, no side effects.
use crate::constraint::SegmentArgs;
use crate::error::TemplateError;

/// Leading relative marker
pub const RELATIVE_MARKER: &str = "~";

/// Trailing wildcard marker
pub const WILDCARD_MARKER: &str = "*";

/// Prefix of dynamic segments
pub const VALUE_PREFIX: char = ':';

/// Represents the different kinds of template segments before compilation
///
/// # Examples
///
/// ```
/// use cascade_router::route::pattern::{classify_segment, PatternSegmentType};
///
/// assert!(matches!(classify_segment("items").unwrap(), PatternSegmentType::Static("items")));
/// assert!(matches!(classify_segment("~").unwrap(), PatternSegmentType::Relative));
/// assert!(matches!(classify_segment("*").unwrap(), PatternSegmentType::Wildcard));
/// assert!(matches!(classify_segment(":+id?").unwrap(), PatternSegmentType::Value(_)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum PatternSegmentType<'a> {
    /// `~`
    Relative,
    /// `*`
    Wildcard,
    /// `:[indicator]name[<args>][?[default]]`
    Value(ValueClause<'a>),
    /// Any other text
    Static(&'a str),
}

/// Decomposed `:[indicator]name[<args>][?[default]]` clause
///
/// `name` still carries the indicator character: only the converter factory
/// knows whether it is one.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueClause<'a> {
    pub name: &'a str,
    pub args: SegmentArgs,
    /// `None`: required. `Some(None)`: bare `?`. `Some(Some(lit))`: `?lit`
    pub default: Option<Option<&'a str>>,
}

impl ValueClause<'_> {
    pub fn is_optional(&self) -> bool {
        self.default.is_some()
    }
}

/// Classifies a template token (pure function)
///
/// # Parsing Rules (evaluated in order)
///
/// 1. **Relative marker**: `~`
/// 2. **Wildcard**: `*`
/// 3. **Dynamic value**: `:` followed by a value clause
/// 4. **Static**: any other text
///
/// Position rules (`~` first, `*` last) are enforced by the template parser.
pub fn classify_segment(segment: &str) -> Result<PatternSegmentType<'_>, TemplateError> {
    match segment {
        RELATIVE_MARKER => Ok(PatternSegmentType::Relative),
        WILDCARD_MARKER => Ok(PatternSegmentType::Wildcard),
        _ => match segment.strip_prefix(VALUE_PREFIX) {
            Some(clause) => parse_value_clause(clause).map(PatternSegmentType::Value),
            None => Ok(PatternSegmentType::Static(segment)),
        },
    }
}

/// Splits a value clause into name, args and default (pure function)
///
/// # Examples
///
/// ```
/// use cascade_router::route::pattern::parse_value_clause;
/// use cascade_router::SegmentArgs;
///
/// let clause = parse_value_clause("!required<yes|no>?yes").unwrap();
/// assert_eq!(clause.name, "!required");
/// assert_eq!(clause.args, SegmentArgs::Enum(vec!["yes".into(), "no".into()]));
/// assert_eq!(clause.default, Some(Some("yes")));
///
/// let clause = parse_value_clause("+id?").unwrap();
/// assert_eq!(clause.default, Some(None));
///
/// assert!(parse_value_clause("id<1..").is_err());
/// ```
pub fn parse_value_clause(clause: &str) -> Result<ValueClause<'_>, TemplateError> {
    let name_end = clause.find(['<', '?']).unwrap_or(clause.len());
    let (name, rest) = clause.split_at(name_end);

    if name.contains('>') {
        return Err(TemplateError::UnbalancedArgs(clause.to_string()));
    }

    let (args, after) = match rest.strip_prefix('<') {
        Some(inner) => {
            let close = inner
                .rfind('>')
                .ok_or_else(|| TemplateError::UnterminatedArgs(clause.to_string()))?;
            (SegmentArgs::parse(&inner[..close])?, &inner[close + 1..])
        }
        None => (SegmentArgs::None, rest),
    };

    let default = match after {
        "" => None,
        _ => match after.strip_prefix('?') {
            Some("") => Some(None),
            Some(literal) => Some(Some(literal)),
            None => return Err(TemplateError::TrailingCharacters(clause.to_string())),
        },
    };

    Ok(ValueClause {
        name,
        args,
        default,
    })
}
