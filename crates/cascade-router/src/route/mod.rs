/// Compiled route templates
///
/// Contains the template grammar (`pattern`), the fold-based compiler
/// (`parser`), the segment variants (`segment`) and the compiled [`Route`].
use std::fmt;

use crate::cursor::RouteResolutionCursor;
use crate::error::Result;
use crate::path::{self, SEPARATOR};
use crate::value::RouteValues;

pub mod parser;
pub mod pattern;
pub mod segment;

pub use parser::RouteTemplateParser;
pub use pattern::{classify_segment, parse_value_clause, PatternSegmentType, ValueClause};
pub use segment::{Segment, ValueSegment};

/// Immutable compiled matcher for one route template
///
/// The leading `~` and trailing `*` markers are lifted into the `relative`
/// and `wildcard` flags, so `segments[i]` lines up with the `i`-th unconsumed
/// path token.
#[derive(Debug, Clone)]
pub struct Route {
    template: String,
    segments: Vec<Segment>,
    relative: bool,
    wildcard: bool,
}

impl Route {
    pub fn new(template: impl Into<String>, mut segments: Vec<Segment>) -> Self {
        let wildcard = matches!(segments.last(), Some(Segment::Wildcard));
        if wildcard {
            segments.pop();
        }

        let relative = matches!(segments.first(), Some(Segment::Relative));
        if relative {
            segments.remove(0);
        }

        Self {
            template: template.into(),
            segments,
            relative,
            wildcard,
        }
    }

    /// The raw template this route was compiled from
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_relative(&self) -> bool {
        self.relative
    }

    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }

    /// Tests the cursor's peeked window without consuming anything
    ///
    /// - Without a wildcard, extra tokens reject the route.
    /// - A relative route never matches before an ancestor consumed a token.
    /// - Every segment must accept the token at its offset.
    pub fn matches(&self, cursor: &RouteResolutionCursor) -> bool {
        if !self.wildcard && cursor.remaining() > self.segments.len() {
            return false;
        }

        if self.relative && cursor.remaining() == cursor.initial_size() {
            return false;
        }

        self.segments
            .iter()
            .enumerate()
            .all(|(offset, segment)| segment.matches(cursor.peek(offset)))
    }

    /// Consumes this route's tokens and returns the extracted values
    ///
    /// Call only after [`matches`](Self::matches) accepted the cursor.
    pub fn route_values(&self, cursor: &mut RouteResolutionCursor) -> Result<RouteValues> {
        let mut values = RouteValues::new();
        for segment in &self.segments {
            segment.read(cursor, &mut values)?;
        }
        Ok(values)
    }

    /// Builds a path from a value map (href generation)
    ///
    /// With `consume`, used values are removed from the map so the leftovers
    /// can be handed to a nested route.
    ///
    /// # Examples
    ///
    /// ```
    /// use cascade_router::{RouteTemplateParser, RouteValue, RouteValues};
    ///
    /// let route = RouteTemplateParser::default().parse("/items/:item/:+id?").unwrap();
    /// let mut values = RouteValues::from([("item".to_string(), RouteValue::from("robots"))]);
    /// assert_eq!(route.resolve(&mut values, false).unwrap(), "/items/robots/");
    /// ```
    pub fn resolve(&self, values: &mut RouteValues, consume: bool) -> Result<String> {
        let mut parts = Vec::with_capacity(self.segments.len());
        for segment in &self.segments {
            if let Some(part) = segment.resolve(values, consume)? {
                parts.push(part);
            }
        }
        Ok(path::join(&parts, SEPARATOR))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}
