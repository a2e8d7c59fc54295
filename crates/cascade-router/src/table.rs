//! Per-scope ordered collection of compiled routes and their handlers

use std::sync::Arc;

use crate::cursor::RouteResolutionCursor;
use crate::error::TemplateError;
use crate::route::{Route, RouteTemplateParser};

/// A compiled route paired with its handler
#[derive(Debug)]
pub struct RouteEntry<H> {
    pub route: Arc<Route>,
    pub handler: H,
}

impl<H: Clone> Clone for RouteEntry<H> {
    fn clone(&self) -> Self {
        Self {
            route: Arc::clone(&self.route),
            handler: self.handler.clone(),
        }
    }
}

/// Routing table built once from a scope's declarations
///
/// Declaration order is preserved and is the tie-break order: the first
/// matching entry wins. Redeclaring a template does not replace the earlier
/// entry, it is simply shadowed by it.
///
/// # Examples
///
/// ```
/// use cascade_router::{Path, RouteResolutionCursor, RouteTemplateParser, RoutingTable};
///
/// let parser = RouteTemplateParser::default();
/// let table = RoutingTable::build([("/items/:item", "item"), ("/", "home")], &parser).unwrap();
/// assert_eq!(table.paths(), vec!["/items/:item", "/"]);
///
/// let cursor = RouteResolutionCursor::new(&Path::parse("/items/robots"));
/// assert_eq!(table.find(&cursor).map(|entry| entry.handler), Some("item"));
/// ```
#[derive(Debug)]
pub struct RoutingTable<H> {
    entries: Vec<RouteEntry<H>>,
}

impl<H> RoutingTable<H> {
    /// Compiles every declared template; fails on the first broken one
    pub fn build<I, S>(declarations: I, parser: &RouteTemplateParser) -> Result<Self, TemplateError>
    where
        I: IntoIterator<Item = (S, H)>,
        S: AsRef<str>,
    {
        let entries = declarations
            .into_iter()
            .map(|(template, handler)| {
                parser.parse(template.as_ref()).map(|route| RouteEntry {
                    route: Arc::new(route),
                    handler,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { entries })
    }

    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Ordered `(route, handler)` pairs
    pub fn handlers(&self) -> &[RouteEntry<H>] {
        &self.entries
    }

    /// Raw templates in declaration order
    pub fn paths(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|entry| entry.route.template())
            .collect()
    }

    /// First entry whose route matches the cursor
    pub fn find(&self, cursor: &RouteResolutionCursor) -> Option<&RouteEntry<H>> {
        self.entries.iter().find(|entry| entry.route.matches(cursor))
    }

    /// First entry declared with exactly this template
    pub fn by_template(&self, template: &str) -> Option<&RouteEntry<H>> {
        self.entries
            .iter()
            .find(|entry| entry.route.template() == template)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Path;

    fn cursor(path: &str) -> RouteResolutionCursor {
        RouteResolutionCursor::new(&Path::parse(path))
    }

    #[test]
    fn test_first_match_wins() {
        let parser = RouteTemplateParser::default();
        let table = RoutingTable::build(
            [("/items/:item", 1), ("/items/special", 2), ("/items/:item", 3)],
            &parser,
        )
        .unwrap();

        let found = table.find(&cursor("/items/special")).unwrap();
        assert_eq!(found.handler, 1);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_build_fails_on_broken_template() {
        let parser = RouteTemplateParser::default();
        let result = RoutingTable::build([("/ok", 1), ("/a/*/b", 2)], &parser);
        assert!(matches!(result, Err(TemplateError::WildcardNotLast(_))));
    }

    #[test]
    fn test_no_match() {
        let parser = RouteTemplateParser::default();
        let table = RoutingTable::build([("/a", ())], &parser).unwrap();
        assert!(table.find(&cursor("/b")).is_none());
        assert!(RoutingTable::<()>::empty().find(&cursor("/")).is_none());
    }

    #[test]
    fn test_by_template() {
        let parser = RouteTemplateParser::default();
        let table = RoutingTable::build([("/a", 'a'), ("/b", 'b')], &parser).unwrap();
        assert_eq!(table.by_template("/b").map(|entry| entry.handler), Some('b'));
        assert!(table.by_template("/c").is_none());
    }
}
