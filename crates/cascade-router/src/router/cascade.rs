//! Child selection for cascading evaluation
//!
//! Given the scope's currently active children and the route that just
//! matched, decide which child continues the cascade and which ones are
//! stale. Side effects (deactivation, recursive handling) are left to the
//! caller.

use std::sync::Arc;

use super::scope::ScopeId;
use crate::route::Route;

/// An active child scope and the parent route it is mounted under
#[derive(Debug, Clone)]
pub struct ActiveChild {
    pub id: ScopeId,
    pub mounted_on: Option<Arc<Route>>,
}

/// Outcome of [`plan_cascade`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadePlan {
    /// The first child mounted on the matched route
    pub continue_with: Option<ScopeId>,
    /// Children mounted on any other route
    pub deactivate: Vec<ScopeId>,
}

/// Pure child selection: first mounted-on-match child continues, children
/// mounted elsewhere are deactivated
///
/// At most one child continues per level. A second child mounted on the
/// same route is left active but idle.
pub fn plan_cascade(children: &[ActiveChild], matched: &Arc<Route>) -> CascadePlan {
    fn step(children: &[ActiveChild], matched: &Arc<Route>, mut plan: CascadePlan) -> CascadePlan {
        let Some((child, rest)) = children.split_first() else {
            return plan;
        };

        let on_matched = child
            .mounted_on
            .as_ref()
            .map(|route| Arc::ptr_eq(route, matched))
            .unwrap_or(false);

        if !on_matched {
            plan.deactivate.push(child.id);
        } else if plan.continue_with.is_none() {
            plan.continue_with = Some(child.id);
        }

        step(rest, matched, plan)
    }

    step(children, matched, CascadePlan::default())
}
