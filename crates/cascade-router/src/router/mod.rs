/// Hierarchical router
///
/// A tree of [`RoutingScope`]s evaluates URLs top-down. Each scope matches
/// the first route in its table, invokes the handler and hands the remaining
/// path tokens to the one active child mounted under that route.
use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::query::SearchValues;
use crate::value::RouteValues;

pub mod cascade;
pub mod handler;
pub mod scope;

pub use cascade::{plan_cascade, ActiveChild, CascadePlan};
pub use handler::{
    handler_fn, AmbientValues, DirectInvoker, FnHandler, HandlerContext, HandlerInvoker,
    RouteHandler,
};
pub use scope::{RoutingScope, ScopeBuilder, ScopeId, ScopeState};

/// Snapshot of one successful route match
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RouteData {
    /// Template of the matched route
    pub template: String,
    /// Tokens consumed by the route, in `/a/b/` form
    pub path: String,
    /// Inherited values overlaid with the values this route extracted
    pub values: RouteValues,
    /// Query values, overlaid with ambient values
    pub query: SearchValues,
}

/// Outcome of an evaluation step
#[derive(Debug, Clone, PartialEq)]
pub enum RoutingResult {
    Success {
        relative_url: String,
        query: SearchValues,
    },
    Failure {
        reason: String,
    },
}

impl RoutingResult {
    pub fn success(relative_url: impl Into<String>, query: SearchValues) -> Self {
        RoutingResult::Success {
            relative_url: relative_url.into(),
            query,
        }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        RoutingResult::Failure {
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RoutingResult::Success { .. })
    }

    pub fn relative_url(&self) -> Option<&str> {
        match self {
            RoutingResult::Success { relative_url, .. } => Some(relative_url),
            RoutingResult::Failure { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            RoutingResult::Failure { reason } => Some(reason),
            RoutingResult::Success { .. } => None,
        }
    }
}

/// `{ success: true, relativeUrl, query }` or `{ success: false, reason }`
impl Serialize for RoutingResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RoutingResult::Success {
                relative_url,
                query,
            } => {
                let mut state = serializer.serialize_struct("RoutingResult", 3)?;
                state.serialize_field("success", &true)?;
                state.serialize_field("relativeUrl", relative_url)?;
                state.serialize_field("query", query)?;
                state.end()
            }
            RoutingResult::Failure { reason } => {
                let mut state = serializer.serialize_struct("RoutingResult", 2)?;
                state.serialize_field("success", &false)?;
                state.serialize_field("reason", reason)?;
                state.end()
            }
        }
    }
}
