//! # Cascade Router
//!
//! A hierarchical client-side router. Routes are declared as typed templates
//! and grouped into nested scopes:
//! - Static segments (`/about`)
//! - Typed values (`/users/:+id`, `/flags/:!on<yes|no>`)
//! - Optional values with defaults (`/posts/:page?1`)
//! - Constraints: ranges (`<1..10>`), regexes (`<^[a-z]+$>`), enums (`<a|b>`)
//! - Relative (`~/view/:view`) and wildcard (`/page/:part/*`) routes
//!
//! ## Cascading Evaluation
//!
//! A URL is matched top-down. The scope that owns the first matching route
//! invokes its handler, then passes the unconsumed tokens to the one active
//! child scope mounted under that route. Children mounted under any other
//! route are deactivated. Re-evaluating an unchanged location does not
//! re-invoke the handler but still cascades into the children.
//!
//! ## Example
//!
//! ```
//! use cascade_router::{handler_fn, RoutingScope, RouteValue};
//!
//! # tokio_test_block(async {
//! let scope = RoutingScope::builder("app")
//!     .with_route("/items/:item/:+id?", handler_fn(|ctx| async move {
//!         assert_eq!(ctx.value("item"), Some(&RouteValue::from("robots")));
//!         Ok(())
//!     }))
//!     .build()
//!     .unwrap();
//!
//! let result = scope.navigate("/items/robots").await;
//! assert_eq!(result.relative_url(), Some("/items/robots/"));
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

pub mod config;
pub mod constraint;
pub mod convert;
pub mod cursor;
pub mod error;
pub mod lifecycle;
pub mod path;
pub mod query;
pub mod route;
pub mod router;
pub mod table;
pub mod value;

pub use config::RouterConfig;
pub use constraint::{
    DefaultValidatorFactory, EnumValidator, RangeValidator, RegexValidator, SegmentArgs,
    Validator, ValidatorFactory,
};
pub use convert::{
    BooleanConverter, Converter, ConverterFactory, DefaultConverterFactory, NumberConverter,
    StringConverter,
};
pub use cursor::RouteResolutionCursor;
pub use error::{RouterError, TemplateError};
pub use lifecycle::{LifecycleHook, LifecyclePhase};
pub use path::{Path, PathOptions};
pub use query::SearchValues;
pub use route::{Route, RouteTemplateParser, Segment, ValueSegment};
pub use router::{
    handler_fn, AmbientValues, DirectInvoker, HandlerContext, HandlerInvoker, RouteData,
    RouteHandler, RoutingResult, RoutingScope, ScopeBuilder, ScopeId, ScopeState,
};
pub use table::{RouteEntry, RoutingTable};
pub use value::{RouteValue, RouteValues};
