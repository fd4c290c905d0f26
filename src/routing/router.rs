//! Route registration and dispatch.
//!
//! # Responsibilities
//! - Hold the registered route table and user modifiers
//! - Walk a table in order, compile each pattern, stop at the first match
//! - Invoke the entry's handler, or the fallback handler
//!
//! # Design Decisions
//! - Table reads are lock-free snapshots (`ArcSwap`); registration is
//!   read-copy-update, so in-flight dispatches never observe a half-applied change
//! - The table and the user-modifier registry share one snapshot, so a reload
//!   replaces both at once
//! - Option scopes are owned by each run, never by the router
//! - First match wins unconditionally; handler outcomes are not inspected
//! - Patterns are compiled fresh on every run

use std::sync::{Arc, LazyLock};

use arc_swap::ArcSwap;
use serde::Serialize;
use uuid::Uuid;

use crate::error::RouteError;
use crate::routing::compiler::{compile, normalize};
use crate::routing::modifiers::UserModifiers;
use crate::routing::options::{OptionSet, Resolver};
use crate::routing::table::{Handler, RouteTable, RouteValue};

/// Outcome of a successful dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteMatch {
    /// The pattern of the entry that matched.
    pub pattern: String,
    /// Captured segments, one per pattern segment.
    pub segments: Vec<String>,
    /// Whether a handler was invoked.
    pub handled: bool,
}

/// What one dispatch reads: the table and the registry its `::name`
/// segments resolve against.
#[derive(Debug, Clone)]
struct RouterState {
    table: Arc<RouteTable>,
    user_modifiers: UserModifiers,
}

/// A route registry and dispatcher.
#[derive(Debug)]
pub struct Router {
    base: OptionSet,
    state: ArcSwap<RouterState>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        Self::with_defaults(OptionSet::default())
    }

    /// Create a router whose base scope is `base`.
    pub fn with_defaults(base: OptionSet) -> Self {
        Self::from_parts(base, UserModifiers::new())
    }

    /// Create a router sharing an existing user-modifier registry.
    pub fn from_parts(base: OptionSet, user_modifiers: UserModifiers) -> Self {
        Self {
            base,
            state: ArcSwap::from_pointee(RouterState {
                table: Arc::new(RouteTable::new()),
                user_modifiers,
            }),
        }
    }

    pub fn defaults(&self) -> &OptionSet {
        &self.base
    }

    /// Register a pattern in the router's table.
    ///
    /// Re-registering a pattern replaces its entry in place.
    pub fn register(&self, pattern: impl Into<String>, value: impl Into<RouteValue>) {
        let pattern = pattern.into();
        let value = value.into();
        self.state.rcu(|state| {
            let mut table = RouteTable::clone(&state.table);
            table.insert(pattern.clone(), value.clone());
            RouterState {
                table: Arc::new(table),
                user_modifiers: state.user_modifiers.clone(),
            }
        });
        tracing::debug!(pattern = %pattern, "Registered route");
    }

    /// Register a user modifier, usable in patterns as `::name`.
    pub fn register_modifier<F>(&self, name: impl Into<String>, validator: F)
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.state.load().user_modifiers.register(name, validator);
    }

    /// Handle to the live user-modifier registry.
    pub fn user_modifiers(&self) -> UserModifiers {
        self.state.load().user_modifiers.clone()
    }

    /// Swap in a whole table, keeping the user modifiers.
    pub fn replace_table(&self, table: RouteTable) {
        tracing::info!(routes = table.len(), "Route table replaced");
        let table = Arc::new(table);
        self.state.rcu(|state| RouterState {
            table: table.clone(),
            user_modifiers: state.user_modifiers.clone(),
        });
    }

    /// Swap in a table together with the registry it was built against.
    ///
    /// Modifiers missing from `user_modifiers` stop resolving, including ones
    /// registered through [`Router::register_modifier`].
    pub fn replace(&self, table: RouteTable, user_modifiers: UserModifiers) {
        tracing::info!(
            routes = table.len(),
            user_modifiers = user_modifiers.len(),
            "Route table and user modifiers replaced"
        );
        self.state.store(Arc::new(RouterState {
            table: Arc::new(table),
            user_modifiers,
        }));
    }

    /// Snapshot of the registered table.
    pub fn table(&self) -> Arc<RouteTable> {
        self.state.load().table.clone()
    }

    /// Dispatch `path` against the registered table.
    pub fn run(&self, path: &str) -> Result<Option<RouteMatch>, RouteError> {
        self.dispatch(path, None, None)
    }

    /// Dispatch against the registered table with a fallback handler.
    pub fn run_with<F>(&self, path: &str, fallback: F) -> Result<Option<RouteMatch>, RouteError>
    where
        F: Fn(&[String]) + Send + Sync + 'static,
    {
        let fallback: Handler = Arc::new(fallback);
        self.dispatch(path, None, Some(&fallback))
    }

    /// Dispatch against `table`. An empty table falls back to the registered one.
    pub fn run_table(
        &self,
        path: &str,
        table: &RouteTable,
        fallback: Option<&Handler>,
    ) -> Result<Option<RouteMatch>, RouteError> {
        self.dispatch(path, Some(table), fallback)
    }

    fn dispatch(
        &self,
        path: &str,
        table: Option<&RouteTable>,
        fallback: Option<&Handler>,
    ) -> Result<Option<RouteMatch>, RouteError> {
        let path = normalize(path);

        let state = self.state.load_full();
        let table = match table {
            Some(table) if !table.is_empty() => table,
            _ => state.table.as_ref(),
        };

        let run_id = Uuid::new_v4();
        let span = tracing::debug_span!("dispatch", %run_id, path);
        let _enter = span.enter();

        let mut resolver = Resolver::new(&self.base, state.user_modifiers.snapshot());

        for entry in table {
            let Some((pattern, options)) = resolver.resolve(entry) else {
                continue;
            };

            let compiled = compile(pattern, &options, path)?;
            tracing::debug!(pattern, expression = compiled.expression(), "Trying route");

            let Some(segments) = compiled.captures(path) else {
                continue;
            };

            let handler = options.handler.as_ref().or(fallback);
            if let Some(handler) = handler {
                handler(&segments);
            }

            tracing::debug!(pattern, ?segments, handled = handler.is_some(), "Route matched");
            return Ok(Some(RouteMatch {
                pattern: pattern.to_string(),
                segments,
                handled: handler.is_some(),
            }));
        }

        tracing::debug!(entries = table.len(), "No route matched");
        Ok(None)
    }
}

static GLOBAL: LazyLock<Router> = LazyLock::new(Router::new);

/// The process-wide router behind the free functions.
pub fn global() -> &'static Router {
    &GLOBAL
}

/// Register a pattern in the process-wide table.
pub fn register(pattern: impl Into<String>, value: impl Into<RouteValue>) {
    global().register(pattern, value);
}

/// Register a user modifier with the process-wide router.
pub fn register_modifier<F>(name: impl Into<String>, validator: F)
where
    F: Fn(&str) -> bool + Send + Sync + 'static,
{
    global().register_modifier(name, validator);
}

/// Dispatch `path` against the process-wide table.
pub fn run(path: &str) -> Result<Option<RouteMatch>, RouteError> {
    global().run(path)
}

/// Dispatch against the process-wide table with a fallback handler.
pub fn run_with<F>(path: &str, fallback: F) -> Result<Option<RouteMatch>, RouteError>
where
    F: Fn(&[String]) + Send + Sync + 'static,
{
    global().run_with(path, fallback)
}

/// Dispatch against `table`, or the process-wide table when `table` is empty.
pub fn run_table(
    path: &str,
    table: &RouteTable,
    fallback: Option<&Handler>,
) -> Result<Option<RouteMatch>, RouteError> {
    global().run_table(path, table, fallback)
}
