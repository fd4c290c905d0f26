//! Declarative route-pattern compiler and dispatcher.
//!
//! Patterns are compiled into anchored expressions under a stack of option
//! scopes, matched against a request path in table order, and the first match
//! hands its captured segments to a handler.
//!
//! ```
//! use pathwarden::routing::{RouteOptions, RouteTable, Router};
//!
//! let router = Router::new();
//! let table = RouteTable::new()
//!     .route("hello/world")
//!     .configured("hello/:int", RouteOptions::new().case_sensitive(true))
//!     .route("hello/:@a|b|c@");
//!
//! let matched = router.run_table("/hello/b", &table, None).unwrap().unwrap();
//! assert_eq!(matched.pattern, "hello/:@a|b|c@");
//! assert_eq!(matched.segments, vec!["hello", "b"]);
//! ```

pub mod config;
pub mod error;
pub mod observability;
pub mod routing;

pub use error::RouteError;
pub use routing::{RouteMatch, RouteOptions, RouteTable, Router};
