//! Routing scopes and the cascading evaluation algorithm

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use super::cascade::{plan_cascade, ActiveChild};
use super::handler::{AmbientValues, DirectInvoker, HandlerContext, HandlerInvoker, RouteHandler};
use super::{RouteData, RoutingResult};
use crate::config::RouterConfig;
use crate::cursor::RouteResolutionCursor;
use crate::error::{Result, RouterError, TemplateError};
use crate::lifecycle::{run_hooks, LifecycleHook, LifecyclePhase};
use crate::path::{self, Path};
use crate::query::SearchValues;
use crate::route::{Route, RouteTemplateParser};
use crate::table::{RouteEntry, RoutingTable};
use crate::value::RouteValues;

type Entry = RouteEntry<Arc<dyn RouteHandler>>;

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique scope identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u64);

impl ScopeId {
    fn next() -> Self {
        ScopeId(NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn from_raw(raw: u64) -> Self {
        ScopeId(raw)
    }

    pub fn as_raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Committed per-scope routing state
///
/// Replaced as a whole once an evaluation step and the cascade beneath it
/// have completed; never mutated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeState {
    /// Last successfully matched data
    pub current: Option<Arc<RouteData>>,
    /// Route that produced `current`
    pub current_template: Option<String>,
    /// Prefix accumulated from ancestor matches
    pub root_path: String,
}

impl Default for ScopeState {
    fn default() -> Self {
        Self {
            current: None,
            current_template: None,
            root_path: "/".to_string(),
        }
    }
}

/// Builder for [`RoutingScope`]
///
/// # Examples
///
/// ```
/// use cascade_router::{handler_fn, RoutingScope};
///
/// let scope = RoutingScope::builder("app")
///     .with_route("/", handler_fn(|_| async { Ok(()) }))
///     .with_route("/items/:item", handler_fn(|_| async { Ok(()) }))
///     .build()
///     .unwrap();
/// assert_eq!(scope.table().paths(), vec!["/", "/items/:item"]);
/// ```
pub struct ScopeBuilder {
    name: String,
    config: Arc<RouterConfig>,
    parser: RouteTemplateParser,
    routes: Vec<(String, Arc<dyn RouteHandler>)>,
    invoker: Arc<dyn HandlerInvoker>,
    hooks: Vec<Arc<dyn LifecycleHook>>,
    ambient: Option<Arc<dyn AmbientValues>>,
}

impl ScopeBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: Arc::new(RouterConfig::default()),
            parser: RouteTemplateParser::default(),
            routes: Vec::new(),
            invoker: Arc::new(DirectInvoker),
            hooks: Vec::new(),
            ambient: None,
        }
    }

    pub fn with_config(mut self, config: Arc<RouterConfig>) -> Self {
        self.config = config;
        self
    }

    pub fn with_parser(mut self, parser: RouteTemplateParser) -> Self {
        self.parser = parser;
        self
    }

    /// Declares a route; declaration order is match order
    pub fn with_route(mut self, template: impl Into<String>, handler: Arc<dyn RouteHandler>) -> Self {
        self.routes.push((template.into(), handler));
        self
    }

    pub fn with_invoker(mut self, invoker: Arc<dyn HandlerInvoker>) -> Self {
        self.invoker = invoker;
        self
    }

    pub fn with_hook(mut self, hook: Arc<dyn LifecycleHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn with_ambient(mut self, ambient: Arc<dyn AmbientValues>) -> Self {
        self.ambient = Some(ambient);
        self
    }

    /// Compiles the routing table; a broken template fails the whole scope
    pub fn build(self) -> std::result::Result<Arc<RoutingScope>, TemplateError> {
        let table = RoutingTable::build(self.routes, &self.parser)?;

        Ok(Arc::new(RoutingScope {
            id: ScopeId::next(),
            name: self.name,
            config: self.config,
            table,
            invoker: self.invoker,
            hooks: self.hooks,
            ambient: self.ambient,
            parent: RwLock::new(Weak::new()),
            mounted_on: RwLock::new(None),
            children: RwLock::new(Vec::new()),
            state: RwLock::new(Arc::new(ScopeState::default())),
        }))
    }
}

/// One node of the routing tree
///
/// Owns a routing table, the committed [`ScopeState`] and the list of
/// currently active children. Children are mounted by handlers through
/// [`HandlerContext::activate_child`].
pub struct RoutingScope {
    id: ScopeId,
    name: String,
    config: Arc<RouterConfig>,
    table: RoutingTable<Arc<dyn RouteHandler>>,
    invoker: Arc<dyn HandlerInvoker>,
    hooks: Vec<Arc<dyn LifecycleHook>>,
    ambient: Option<Arc<dyn AmbientValues>>,
    parent: RwLock<Weak<RoutingScope>>,
    mounted_on: RwLock<Option<Arc<Route>>>,
    children: RwLock<Vec<Arc<RoutingScope>>>,
    state: RwLock<Arc<ScopeState>>,
}

impl fmt::Debug for RoutingScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutingScope")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("routes", &self.table.paths())
            .finish()
    }
}

impl RoutingScope {
    pub fn builder(name: impl Into<String>) -> ScopeBuilder {
        ScopeBuilder::new(name)
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn table(&self) -> &RoutingTable<Arc<dyn RouteHandler>> {
        &self.table
    }

    /// Snapshot of the committed state
    pub async fn state(&self) -> Arc<ScopeState> {
        self.state.read().await.clone()
    }

    pub async fn current(&self) -> Option<Arc<RouteData>> {
        self.state.read().await.current.clone()
    }

    pub async fn root_path(&self) -> String {
        self.state.read().await.root_path.clone()
    }

    pub async fn parent(&self) -> Option<Arc<RoutingScope>> {
        self.parent.read().await.upgrade()
    }

    pub async fn active_children(&self) -> Vec<Arc<RoutingScope>> {
        self.children.read().await.clone()
    }

    /// Route of the parent this scope is mounted under, if active
    pub async fn mounted_on(&self) -> Option<Arc<Route>> {
        self.mounted_on.read().await.clone()
    }

    /// Walks parent links up to the top of the tree
    pub async fn root(self: &Arc<Self>) -> Arc<RoutingScope> {
        let mut current = Arc::clone(self);
        while let Some(parent) = current.parent().await {
            current = parent;
        }
        current
    }

    /// Evaluates `url` with no default values
    pub async fn navigate(self: &Arc<Self>, url: &str) -> RoutingResult {
        self.eval(url, &RouteValues::new()).await
    }

    /// Evaluates a URL
    ///
    /// URLs starting with the relative indicator (`./x`) resolve inside this
    /// scope only, below its root path. Anything else is absolute and always
    /// resolves from the top of the tree, whichever scope it was called on.
    #[tracing::instrument(skip_all, fields(scope = %self.name, url = %url))]
    pub async fn eval(self: &Arc<Self>, url: &str, defaults: &RouteValues) -> RoutingResult {
        let url = path::coerce(url);
        let options = self.config.path_options();

        let (pathname, query) = match url.split_once(self.config.query_separator) {
            Some((pathname, query)) => (pathname, Some(query)),
            None => (url.as_ref(), None),
        };
        let relative = Path::parse_with(pathname, &options);

        if relative.is_relative() {
            let search = query.map(SearchValues::parse).unwrap_or_default();
            return self.eval_relative(relative, search, defaults).await;
        }

        let root = self.root().await;
        if !Arc::ptr_eq(&root, self) {
            debug!(root = %root.name, "delegating absolute evaluation to root scope");
        }
        root.eval_absolute(&url, defaults).await
    }

    async fn eval_relative(
        self: &Arc<Self>,
        relative: Path,
        search: SearchValues,
        defaults: &RouteValues,
    ) -> RoutingResult {
        let state = self.state().await;
        let root = Path::parse_with(&state.root_path, &self.config.path_options());
        let consumed = root.len();
        let tokens = root.combine(&relative).into_segments();

        let cursor = RouteResolutionCursor::resumed(tokens, consumed);
        self.handle(state.root_path.clone(), cursor, defaults.clone(), search)
            .await
    }

    async fn eval_absolute(self: &Arc<Self>, url: &str, defaults: &RouteValues) -> RoutingResult {
        let (pathname, query) = path::split_url(url, &self.config.base_url);
        let path = Path::parse_with(&pathname, &self.config.path_options());
        let search = query.as_deref().map(SearchValues::parse).unwrap_or_default();

        self.eval_core(path, search, defaults).await
    }

    async fn eval_core(
        self: &Arc<Self>,
        path: Path,
        search: SearchValues,
        defaults: &RouteValues,
    ) -> RoutingResult {
        let cursor = RouteResolutionCursor::new(&path);
        self.handle("/".to_string(), cursor, defaults.clone(), search)
            .await
    }

    /// One evaluation step: match, invoke, cascade
    ///
    /// `root` becomes this scope's root path. `inherited` are the values of
    /// the ancestors' matches (or the caller's defaults at the top).
    pub fn handle(
        self: &Arc<Self>,
        root: String,
        cursor: RouteResolutionCursor,
        inherited: RouteValues,
        search: SearchValues,
    ) -> BoxFuture<'_, RoutingResult> {
        async move {
            let Some((owner, entry)) = self.resolve_handler(&cursor).await else {
                let remaining = cursor.remaining_path();
                warn!(scope = %self.name, %remaining, "no route matched");
                return RoutingResult::failure(format!(
                    "No match found for the remaining route path: {}",
                    remaining
                ));
            };

            owner.handle_matched(root, cursor, entry, inherited, search).await
        }
        .boxed()
    }

    /// Finds the first matching entry
    ///
    /// A relative cursor only sees this scope's table. A top-level cursor
    /// also searches every active descendant, depth-first, so an absolute URL
    /// can land directly on a nested route.
    fn resolve_handler<'a>(
        self: &'a Arc<Self>,
        cursor: &'a RouteResolutionCursor,
    ) -> BoxFuture<'a, Option<(Arc<RoutingScope>, Entry)>> {
        async move {
            if let Some(entry) = self.table.find(cursor) {
                return Some((Arc::clone(self), entry.clone()));
            }

            if cursor.is_relative() {
                return None;
            }

            for child in self.active_children().await {
                if let Some(found) = child.resolve_handler(cursor).await {
                    return Some(found);
                }
            }
            None
        }
        .boxed()
    }

    async fn handle_matched(
        self: &Arc<Self>,
        root: String,
        mut cursor: RouteResolutionCursor,
        entry: Entry,
        inherited: RouteValues,
        search: SearchValues,
    ) -> RoutingResult {
        let start = cursor.position();
        let local = match entry.route.route_values(&mut cursor) {
            Ok(local) => local,
            Err(err) => {
                error!(scope = %self.name, route = %entry.route, error = %err, "failed to read route values");
                return RoutingResult::failure("Error while reading route values");
            }
        };

        let mut values = inherited;
        values.extend(local);

        let mut query = search;
        if let Some(ambient) = &self.ambient {
            query.merge(&ambient.values());
        }

        let data = Arc::new(RouteData {
            template: entry.route.template().to_string(),
            path: cursor.consumed_since(start),
            values,
            query,
        });

        let previous = self.state().await;
        if self.is_unchanged(&previous, &data) {
            debug!(scope = %self.name, path = %data.path, "route unchanged, handler not re-invoked");
        } else {
            let ctx = HandlerContext::new(Arc::clone(self), entry.route.clone(), data.clone());
            if let Err(err) = self.invoker.invoke(entry.handler.clone(), ctx).await {
                error!(scope = %self.name, route = %entry.route, error = ?err, "routing handler failed");
                return RoutingResult::failure("Error while invoking routing handler");
            }
        }

        let separator = path::SEPARATOR;
        let child_root = format!(
            "{}{}",
            root,
            data.path.strip_prefix(separator).unwrap_or(&data.path)
        );
        let relative_url = cursor.source_path();

        self.invoke_children(child_root, cursor, &entry.route, &data)
            .await;

        *self.state.write().await = Arc::new(ScopeState {
            current: Some(data.clone()),
            current_template: Some(entry.route.template().to_string()),
            root_path: root,
        });

        RoutingResult::success(relative_url, data.query.clone())
    }

    fn is_unchanged(&self, previous: &ScopeState, data: &RouteData) -> bool {
        let Some(current) = &previous.current else {
            return false;
        };

        let same_location = current.path == data.path
            && previous.current_template.as_deref() == Some(data.template.as_str());

        if self.config.reinvoke_on_query_change {
            same_location && current.query == data.query
        } else {
            same_location
        }
    }

    /// Hands the cursor to the one active child mounted under `matched`
    ///
    /// Children mounted under any other route are deactivated on the way.
    async fn invoke_children(
        self: &Arc<Self>,
        root: String,
        cursor: RouteResolutionCursor,
        matched: &Arc<Route>,
        data: &RouteData,
    ) {
        let active = self.active_children().await;

        if active.is_empty() {
            if cursor.is_exhausted() {
                debug!(scope = %self.name, path = %cursor.source_path(), "route resolved");
            } else {
                warn!(
                    scope = %self.name,
                    remaining = %cursor.remaining_path(),
                    "no child to handle remaining path"
                );
            }
            return;
        }

        let mut children = Vec::with_capacity(active.len());
        for child in &active {
            children.push(ActiveChild {
                id: child.id,
                mounted_on: child.mounted_on().await,
            });
        }
        let plan = plan_cascade(&children, matched);

        for child in active.iter().filter(|child| plan.deactivate.contains(&child.id)) {
            if let Err(err) = child.deactivate().await {
                warn!(scope = %child.name, error = %err, "deactivation failed");
            }
        }

        let next = plan
            .continue_with
            .and_then(|id| active.iter().find(|child| child.id == id));

        match next {
            Some(child) => {
                let result = child
                    .handle(
                        root,
                        cursor.into_relative(),
                        data.values.clone(),
                        data.query.clone(),
                    )
                    .await;
                if let RoutingResult::Failure { reason } = result {
                    warn!(scope = %child.name, %reason, "child scope did not resolve");
                }
            }
            None if !cursor.is_exhausted() => {
                warn!(
                    scope = %self.name,
                    remaining = %cursor.remaining_path(),
                    "no match for remaining path"
                );
            }
            None => {}
        }
    }

    /// Mounts `child` under `route`, then runs its activate hooks
    ///
    /// Re-activating an already active child only updates its mount route.
    pub async fn activate_child(
        self: &Arc<Self>,
        child: Arc<RoutingScope>,
        route: Arc<Route>,
    ) -> anyhow::Result<()> {
        if Arc::ptr_eq(self, &child) {
            anyhow::bail!("scope `{}` cannot be its own child", self.name);
        }

        *child.parent.write().await = Arc::downgrade(self);
        *child.mounted_on.write().await = Some(route);

        let newly_active = {
            let mut children = self.children.write().await;
            if children.iter().any(|active| active.id == child.id) {
                false
            } else {
                children.push(Arc::clone(&child));
                true
            }
        };

        if newly_active {
            debug!(parent = %self.name, child = %child.name, "child scope activated");
            run_hooks(&child.hooks, LifecyclePhase::Activate, &child.name).await?;
        }
        Ok(())
    }

    /// Unmounts this scope and, recursively, its active children
    ///
    /// Every hook of every scope in the subtree runs even if some fail; the
    /// failures are reported together.
    pub fn deactivate(self: &Arc<Self>) -> BoxFuture<'_, anyhow::Result<()>> {
        async move {
            if let Some(parent) = self.parent().await {
                parent
                    .children
                    .write()
                    .await
                    .retain(|active| active.id != self.id);
            }
            *self.parent.write().await = Weak::new();
            *self.mounted_on.write().await = None;

            let children = std::mem::take(&mut *self.children.write().await);
            let mut failures = Vec::new();
            for child in &children {
                *child.parent.write().await = Weak::new();
                if let Err(err) = child.deactivate().await {
                    failures.push(format!("{:#}", err));
                }
            }

            if let Err(err) = run_hooks(&self.hooks, LifecyclePhase::Deactivate, &self.name).await {
                failures.push(format!("{:#}", err));
            }

            *self.state.write().await = Arc::new(ScopeState::default());
            debug!(scope = %self.name, "scope deactivated");

            if failures.is_empty() {
                Ok(())
            } else {
                Err(anyhow::anyhow!(failures.join("; ")))
            }
        }
        .boxed()
    }

    /// Builds an href for one of this scope's templates
    ///
    /// Relative templates are prefixed with the scope's root path.
    pub async fn href_for(&self, template: &str, values: &RouteValues) -> Result<String> {
        let entry = self
            .table
            .by_template(template)
            .ok_or_else(|| RouterError::UnknownTemplate(template.to_string()))?;

        let mut values = values.clone();
        let resolved = entry.route.resolve(&mut values, false)?;

        if !entry.route.is_relative() {
            return Ok(resolved);
        }

        let root = self.root_path().await;
        let separator = path::SEPARATOR;
        Ok(format!(
            "{}{}",
            root,
            resolved.strip_prefix(separator).unwrap_or(&resolved)
        ))
    }
}
