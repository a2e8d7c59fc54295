//! Collaborator contracts consumed by the router
//!
//! Each capability is its own trait: handling a matched route, invoking a
//! handler, and supplying ambient query overrides.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use super::scope::RoutingScope;
use super::RouteData;
use crate::query::SearchValues;
use crate::route::Route;
use crate::value::RouteValue;

/// Handler bound to a route template
#[async_trait]
pub trait RouteHandler: Send + Sync {
    async fn handle(&self, ctx: HandlerContext) -> anyhow::Result<()>;
}

/// Adapter turning an async closure into a [`RouteHandler`]
pub struct FnHandler<F>(F);

#[async_trait]
impl<F, Fut> RouteHandler for FnHandler<F>
where
    F: Fn(HandlerContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn handle(&self, ctx: HandlerContext) -> anyhow::Result<()> {
        (self.0)(ctx).await
    }
}

/// Wraps an async closure as a shareable handler
///
/// # Examples
///
/// ```
/// use cascade_router::handler_fn;
///
/// let handler = handler_fn(|ctx| async move {
///     println!("matched {}", ctx.data().path);
///     Ok(())
/// });
/// ```
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn RouteHandler>
where
    F: Fn(HandlerContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(FnHandler(f))
}

/// Invocation boundary between the router and handlers
///
/// A hosting container can wrap invocation (argument binding, scoping of
/// services); the router only sees success or failure.
#[async_trait]
pub trait HandlerInvoker: Send + Sync {
    async fn invoke(&self, handler: Arc<dyn RouteHandler>, ctx: HandlerContext) -> anyhow::Result<()>;
}

/// Calls the handler directly
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectInvoker;

#[async_trait]
impl HandlerInvoker for DirectInvoker {
    async fn invoke(&self, handler: Arc<dyn RouteHandler>, ctx: HandlerContext) -> anyhow::Result<()> {
        handler.handle(ctx).await
    }
}

/// External source of values that override query values after a match
pub trait AmbientValues: Send + Sync {
    fn values(&self) -> SearchValues;
}

/// What a handler sees: the owning scope, the matched route and the data
#[derive(Clone)]
pub struct HandlerContext {
    scope: Arc<RoutingScope>,
    route: Arc<Route>,
    data: Arc<RouteData>,
}

impl HandlerContext {
    pub(crate) fn new(scope: Arc<RoutingScope>, route: Arc<Route>, data: Arc<RouteData>) -> Self {
        Self { scope, route, data }
    }

    pub fn scope(&self) -> &Arc<RoutingScope> {
        &self.scope
    }

    pub fn route(&self) -> &Arc<Route> {
        &self.route
    }

    pub fn data(&self) -> &RouteData {
        &self.data
    }

    pub fn value(&self, name: &str) -> Option<&RouteValue> {
        self.data.values.get(name)
    }

    pub fn query(&self, key: &str) -> Option<&str> {
        self.data.query.get(key)
    }

    /// Mounts `child` under the route that just matched
    pub async fn activate_child(&self, child: Arc<RoutingScope>) -> anyhow::Result<()> {
        self.scope.activate_child(child, self.route.clone()).await
    }
}
