//! Integration tests for cascading evaluation
//!
//! Tests are organized by feature area and cover:
//! - Root and nested resolution
//! - Idempotent re-evaluation
//! - Child activation and deactivation
//! - Scope-local relative navigation
//! - Failures (no match, handler errors)
//! - Href generation, ambient values and configuration

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cascade_router::*;
use pretty_assertions::assert_eq;

// ============================================================================
// Helpers
// ============================================================================

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn counting(calls: &Arc<AtomicUsize>) -> Arc<dyn RouteHandler> {
    let calls = calls.clone();
    handler_fn(move |_| {
        let calls = calls.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    })
}

fn recording(seen: &Arc<Mutex<Vec<RouteData>>>) -> Arc<dyn RouteHandler> {
    let seen = seen.clone();
    handler_fn(move |ctx| {
        let seen = seen.clone();
        async move {
            seen.lock().unwrap().push(ctx.data().clone());
            Ok(())
        }
    })
}

/// Handler that mounts `child` under the route it was matched on
fn mounting(child: &Arc<RoutingScope>, calls: &Arc<AtomicUsize>) -> Arc<dyn RouteHandler> {
    let child = child.clone();
    let calls = calls.clone();
    handler_fn(move |ctx| {
        let child = child.clone();
        let calls = calls.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            ctx.activate_child(child).await
        }
    })
}

#[derive(Default)]
struct LifecycleLog {
    events: Mutex<Vec<String>>,
}

#[async_trait]
impl LifecycleHook for LifecycleLog {
    async fn activate(&self, scope: &str) -> anyhow::Result<()> {
        self.events.lock().unwrap().push(format!("activate {}", scope));
        Ok(())
    }

    async fn deactivate(&self, scope: &str) -> anyhow::Result<()> {
        self.events.lock().unwrap().push(format!("deactivate {}", scope));
        Ok(())
    }
}

// ============================================================================
// Root resolution
// ============================================================================

#[tokio::test]
async fn test_root_route_invoked_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let scope = RoutingScope::builder("app")
        .with_route("/", counting(&calls))
        .build()
        .unwrap();

    let result = scope.navigate("https://localhost/").await;

    assert!(result.is_success());
    assert_eq!(result.relative_url(), Some("/"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_first_declared_route_wins() {
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));
    let scope = RoutingScope::builder("app")
        .with_route("/items/:item", counting(&first))
        .with_route("/items/:+id", counting(&second))
        .build()
        .unwrap();

    assert!(scope.navigate("/items/42").await.is_success());
    assert_eq!(first.load(Ordering::SeqCst), 1);
    assert_eq!(second.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_route_data_is_committed() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let scope = RoutingScope::builder("app")
        .with_route("/items/:item/:+id?1", recording(&seen))
        .build()
        .unwrap();

    let result = scope.navigate("/items/robots?sort=asc").await;
    assert!(result.is_success());

    let current = scope.current().await.unwrap();
    assert_eq!(current.template, "/items/:item/:+id?1");
    assert_eq!(current.path, "/items/robots/");
    assert_eq!(current.values.get("item"), Some(&RouteValue::from("robots")));
    assert_eq!(current.values.get("id"), Some(&RouteValue::Number(1.0)));
    assert_eq!(current.query.get("sort"), Some("asc"));
    assert_eq!(seen.lock().unwrap().as_slice(), &[(*current).clone()]);
    assert_eq!(scope.root_path().await, "/");
}

#[tokio::test]
async fn test_defaults_are_overlaid_by_route_values() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let scope = RoutingScope::builder("app")
        .with_route("/items/:item", recording(&seen))
        .build()
        .unwrap();

    let defaults = RouteValues::from([
        ("item".to_string(), RouteValue::from("fallback")),
        ("lang".to_string(), RouteValue::from("en")),
    ]);
    scope.eval("/items/robots", &defaults).await;

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].values.get("item"), Some(&RouteValue::from("robots")));
    assert_eq!(seen[0].values.get("lang"), Some(&RouteValue::from("en")));
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_no_match_is_a_failure_value() {
    init_tracing();
    let scope = RoutingScope::builder("app")
        .with_route("/", handler_fn(|_| async { Ok(()) }))
        .build()
        .unwrap();

    let result = scope.navigate("/nowhere/else").await;

    assert_eq!(
        result,
        RoutingResult::failure("No match found for the remaining route path: /nowhere/else/")
    );
    assert!(scope.current().await.is_none());
}

#[tokio::test]
async fn test_handler_error_becomes_failure() {
    let scope = RoutingScope::builder("app")
        .with_route("/broken", handler_fn(|_| async { anyhow::bail!("boom") }))
        .build()
        .unwrap();

    let result = scope.navigate("/broken").await;

    assert_eq!(result.reason(), Some("Error while invoking routing handler"));
    assert!(scope.current().await.is_none());
}

#[test]
fn test_broken_template_fails_scope_build() {
    let err = RoutingScope::builder("app")
        .with_route("/ok", handler_fn(|_| async { Ok(()) }))
        .with_route("/a/*/b", handler_fn(|_| async { Ok(()) }))
        .build()
        .unwrap_err();

    assert!(matches!(err, TemplateError::WildcardNotLast(_)));
}

// ============================================================================
// Nested scopes
// ============================================================================

#[tokio::test]
async fn test_nested_relative_route() {
    init_tracing();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let parent_calls = Arc::new(AtomicUsize::new(0));

    let details = RoutingScope::builder("details")
        .with_route("~/view/:view", recording(&seen))
        .build()
        .unwrap();
    let app = RoutingScope::builder("app")
        .with_route("/page/:part/*", mounting(&details, &parent_calls))
        .build()
        .unwrap();

    let result = app
        .navigate("https://localhost/page/species/view/vertebrate")
        .await;

    assert_eq!(result.relative_url(), Some("/page/species/view/vertebrate/"));
    assert_eq!(parent_calls.load(Ordering::SeqCst), 1);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].values.get("view"), Some(&RouteValue::from("vertebrate")));
    assert_eq!(seen[0].values.get("part"), Some(&RouteValue::from("species")));
    assert_eq!(seen[0].path, "/view/vertebrate/");
    drop(seen);

    assert_eq!(details.root_path().await, "/page/species/");
    assert!(Arc::ptr_eq(&details.parent().await.unwrap(), &app));
}

#[tokio::test]
async fn test_unchanged_location_still_cascades() {
    let parent_calls = Arc::new(AtomicUsize::new(0));
    let child_calls = Arc::new(AtomicUsize::new(0));

    let details = RoutingScope::builder("details")
        .with_route("~/view/:view", counting(&child_calls))
        .build()
        .unwrap();
    let app = RoutingScope::builder("app")
        .with_route("/page/:part/*", mounting(&details, &parent_calls))
        .build()
        .unwrap();

    app.navigate("/page/species/view/vertebrate").await;
    app.navigate("/page/species/view/vertebrate").await;
    assert_eq!(parent_calls.load(Ordering::SeqCst), 1);
    assert_eq!(child_calls.load(Ordering::SeqCst), 1);

    // Same parent location, new child location
    let result = app.navigate("/page/species/view/invertebrate").await;
    assert!(result.is_success());
    assert_eq!(parent_calls.load(Ordering::SeqCst), 1);
    assert_eq!(child_calls.load(Ordering::SeqCst), 2);
    assert_eq!(
        details.current().await.unwrap().values.get("view"),
        Some(&RouteValue::from("invertebrate"))
    );
}

#[tokio::test]
async fn test_stale_child_is_deactivated() {
    init_tracing();
    let log = Arc::new(LifecycleLog::default());
    let calls = Arc::new(AtomicUsize::new(0));

    let list = RoutingScope::builder("list")
        .with_hook(log.clone())
        .with_route("~/:+page?1", handler_fn(|_| async { Ok(()) }))
        .build()
        .unwrap();
    let detail = RoutingScope::builder("detail")
        .with_hook(log.clone())
        .with_route("~/:id", handler_fn(|_| async { Ok(()) }))
        .build()
        .unwrap();
    let app = RoutingScope::builder("app")
        .with_route("/list/*", mounting(&list, &calls))
        .with_route("/detail/*", mounting(&detail, &calls))
        .build()
        .unwrap();

    app.navigate("/list/2").await;
    let active: Vec<String> = app
        .active_children()
        .await
        .iter()
        .map(|child| child.name().to_string())
        .collect();
    assert_eq!(active, vec!["list"]);

    app.navigate("/detail/abc").await;
    let active: Vec<String> = app
        .active_children()
        .await
        .iter()
        .map(|child| child.name().to_string())
        .collect();
    assert_eq!(active, vec!["detail"]);

    assert!(list.parent().await.is_none());
    assert!(list.current().await.is_none());
    assert_eq!(
        log.events.lock().unwrap().as_slice(),
        &["activate list", "activate detail", "deactivate list"]
    );
}

#[tokio::test]
async fn test_deactivation_is_recursive() {
    let log = Arc::new(LifecycleLog::default());
    let calls = Arc::new(AtomicUsize::new(0));

    let leaf = RoutingScope::builder("leaf")
        .with_hook(log.clone())
        .with_route("~/:tab", handler_fn(|_| async { Ok(()) }))
        .build()
        .unwrap();
    let middle = RoutingScope::builder("middle")
        .with_hook(log.clone())
        .with_route("~/:section/*", mounting(&leaf, &calls))
        .build()
        .unwrap();

    let root = RoutingScope::builder("root")
        .with_route("/docs/*", mounting(&middle, &calls))
        .with_route("/", handler_fn(|_| async { Ok(()) }))
        .build()
        .unwrap();

    root.navigate("/docs/guide/intro").await;
    assert_eq!(middle.active_children().await.len(), 1);

    root.navigate("/").await;
    assert!(root.active_children().await.is_empty());
    assert!(middle.active_children().await.is_empty());
    assert_eq!(
        log.events.lock().unwrap().as_slice(),
        &[
            "activate middle",
            "activate leaf",
            "deactivate leaf",
            "deactivate middle"
        ]
    );
}

#[tokio::test]
async fn test_absolute_url_from_child_resolves_from_root() {
    let calls = Arc::new(AtomicUsize::new(0));
    let home = Arc::new(AtomicUsize::new(0));

    let details = RoutingScope::builder("details")
        .with_route("~/view/:view", handler_fn(|_| async { Ok(()) }))
        .build()
        .unwrap();
    let app = RoutingScope::builder("app")
        .with_route("/page/:part/*", mounting(&details, &calls))
        .with_route("/", counting(&home))
        .build()
        .unwrap();

    app.navigate("/page/species/view/vertebrate").await;
    let result = details.navigate("/").await;

    assert!(result.is_success());
    assert_eq!(home.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_absolute_url_lands_on_active_descendant() {
    let mounts = Arc::new(AtomicUsize::new(0));
    let settings = Arc::new(AtomicUsize::new(0));

    let account = RoutingScope::builder("account")
        .with_route("/settings", counting(&settings))
        .build()
        .unwrap();
    let app = RoutingScope::builder("app")
        .with_route("/account/*", mounting(&account, &mounts))
        .build()
        .unwrap();

    app.navigate("/account").await;
    assert_eq!(app.active_children().await.len(), 1);

    let result = app.navigate("/settings").await;

    assert_eq!(result.relative_url(), Some("/settings/"));
    assert_eq!(settings.load(Ordering::SeqCst), 1);
    assert_eq!(mounts.load(Ordering::SeqCst), 1);
    assert_eq!(account.root_path().await, "/");
    assert_eq!(account.current().await.unwrap().path, "/settings/");
    assert_eq!(app.current().await.unwrap().path, "/account/");
}

// ============================================================================
// Relative navigation
// ============================================================================

#[tokio::test]
async fn test_relative_eval_stays_in_scope() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let calls = Arc::new(AtomicUsize::new(0));

    let details = RoutingScope::builder("details")
        .with_route("~/view/:view", recording(&seen))
        .build()
        .unwrap();
    let app = RoutingScope::builder("app")
        .with_route("/page/:part/*", mounting(&details, &calls))
        .build()
        .unwrap();

    app.navigate("/page/species/view/vertebrate").await;
    let result = details.navigate("./view/mammal?lang=en").await;

    assert_eq!(result.relative_url(), Some("/page/species/view/mammal/"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[1].values.get("view"), Some(&RouteValue::from("mammal")));
    assert_eq!(seen[1].query.get("lang"), Some("en"));
}

#[tokio::test]
async fn test_relative_eval_does_not_search_children() {
    let calls = Arc::new(AtomicUsize::new(0));
    let details = RoutingScope::builder("details")
        .with_route("~/view/:view", handler_fn(|_| async { Ok(()) }))
        .build()
        .unwrap();
    let app = RoutingScope::builder("app")
        .with_route("/page/:part/*", mounting(&details, &calls))
        .build()
        .unwrap();

    app.navigate("/page/species/view/vertebrate").await;
    let result = app.navigate("./view/mammal").await;

    assert_eq!(
        result.reason(),
        Some("No match found for the remaining route path: /view/mammal/")
    );
}

// ============================================================================
// Href generation
// ============================================================================

#[tokio::test]
async fn test_href_for_absolute_and_relative_templates() {
    let calls = Arc::new(AtomicUsize::new(0));
    let details = RoutingScope::builder("details")
        .with_route("~/view/:view", handler_fn(|_| async { Ok(()) }))
        .build()
        .unwrap();
    let app = RoutingScope::builder("app")
        .with_route("/page/:part/*", mounting(&details, &calls))
        .build()
        .unwrap();

    app.navigate("/page/species/view/vertebrate").await;

    let values = RouteValues::from([("part".to_string(), RouteValue::from("genus"))]);
    assert_eq!(app.href_for("/page/:part/*", &values).await.unwrap(), "/page/genus/");

    let values = RouteValues::from([("view".to_string(), RouteValue::from("fish"))]);
    assert_eq!(
        details.href_for("~/view/:view", &values).await.unwrap(),
        "/page/species/view/fish/"
    );

    let err = details
        .href_for("~/view/:view", &RouteValues::new())
        .await
        .unwrap_err();
    assert!(matches!(err, RouterError::MissingValue(ref name) if name == "view"));

    let err = app.href_for("/missing", &RouteValues::new()).await.unwrap_err();
    assert!(matches!(err, RouterError::UnknownTemplate(_)));
}

// ============================================================================
// Ambient values and configuration
// ============================================================================

struct FixedAmbient;

impl AmbientValues for FixedAmbient {
    fn values(&self) -> SearchValues {
        SearchValues::new().with("theme", "dark")
    }
}

#[tokio::test]
async fn test_ambient_values_override_query() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let scope = RoutingScope::builder("app")
        .with_ambient(Arc::new(FixedAmbient))
        .with_route("/", recording(&seen))
        .build()
        .unwrap();

    let result = scope.navigate("/?theme=light&lang=de").await;

    let expected = SearchValues::new().with("theme", "dark").with("lang", "de");
    assert_eq!(result, RoutingResult::success("/", expected.clone()));
    assert_eq!(seen.lock().unwrap()[0].query, expected);
}

#[tokio::test]
async fn test_query_change_is_ignored_by_default() {
    let calls = Arc::new(AtomicUsize::new(0));
    let scope = RoutingScope::builder("app")
        .with_route("/search", counting(&calls))
        .build()
        .unwrap();

    scope.navigate("/search?q=a").await;
    scope.navigate("/search?q=b").await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_query_change_reinvokes_when_configured() {
    let config = RouterConfig::from_toml_str("[router]\nreinvoke_on_query_change = true\n").unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let scope = RoutingScope::builder("app")
        .with_config(Arc::new(config))
        .with_route("/search", counting(&calls))
        .build()
        .unwrap();

    scope.navigate("/search?q=a").await;
    scope.navigate("/search?q=a").await;
    scope.navigate("/search?q=b").await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_backslash_input_is_coerced() {
    let calls = Arc::new(AtomicUsize::new(0));
    let scope = RoutingScope::builder("app")
        .with_route("/users/:+id", counting(&calls))
        .build()
        .unwrap();

    let result = scope.navigate("  \\users\\42 ").await;
    assert_eq!(result.relative_url(), Some("/users/42/"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_result_serializes_to_wire_shape() {
    let success = RoutingResult::success("/a/", SearchValues::new().with("x", "1"));
    assert_eq!(
        serde_json::to_value(&success).unwrap(),
        serde_json::json!({ "success": true, "relativeUrl": "/a/", "query": { "x": "1" } })
    );

    let failure = RoutingResult::failure("nope");
    assert_eq!(
        serde_json::to_value(&failure).unwrap(),
        serde_json::json!({ "success": false, "reason": "nope" })
    );
}
