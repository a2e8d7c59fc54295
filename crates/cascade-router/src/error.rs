//! Error types for template compilation and route resolution
//!
//! Navigation misses are not errors: they surface as
//! [`RoutingResult::Failure`](crate::RoutingResult). The types here cover the
//! two fatal classes: broken templates (raised while a routing table is built)
//! and programming errors while reading or resolving a route.

use thiserror::Error;

/// Errors raised while compiling a route template
#[derive(Debug, Error)]
pub enum TemplateError {
    /// `<` without a matching `>`
    #[error("unterminated argument list in segment `{0}`")]
    UnterminatedArgs(String),

    /// `>` without a preceding `<`
    #[error("unbalanced argument list in segment `{0}`")]
    UnbalancedArgs(String),

    /// Characters between the closing `>` and the default clause
    #[error("unexpected characters after argument list in segment `{0}`")]
    TrailingCharacters(String),

    /// `~` anywhere but the first segment
    #[error("relative marker `~` must be the first segment of `{0}`")]
    RelativeNotFirst(String),

    /// `*` anywhere but the last segment
    #[error("wildcard `*` must be the last segment of `{0}`")]
    WildcardNotLast(String),

    /// Dynamic segment without a name
    #[error("dynamic segment `{0}` has no name")]
    MissingName(String),

    /// Boolean segments take their literals from a two-value enum
    #[error("boolean segment `{name}` needs exactly 2 enum values, found {found}")]
    BooleanEnumArity { name: String, found: usize },

    #[error("invalid range `{0}`: expected `min..max` with numeric bounds")]
    InvalidRange(String),

    #[error("invalid regex `{pattern}`: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The `?literal` default cannot be converted by the segment's converter
    #[error("default value `{value}` cannot be converted for segment `{name}`")]
    InvalidDefault { name: String, value: String },
}

/// Errors raised while reading or resolving compiled routes
#[derive(Debug, Error)]
pub enum RouterError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// `read` found a token that does not belong to the segment
    #[error("expected `{expected}` but found `{}`", found.as_deref().unwrap_or("<end of path>"))]
    UnexpectedToken {
        expected: String,
        found: Option<String>,
    },

    /// Token could not be converted by the segment's converter
    #[error("cannot convert `{token}` for segment `{name}`")]
    Conversion { name: String, token: String },

    /// Href generation without a required value
    #[error("missing value for required segment `{0}`")]
    MissingValue(String),

    /// Href generation against a template the scope does not declare
    #[error("no route declared for template `{0}`")]
    UnknownTemplate(String),
}

pub type Result<T, E = RouterError> = std::result::Result<T, E>;
