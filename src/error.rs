//! Error types for pattern compilation and dispatch.

use thiserror::Error;

/// Errors that can occur while compiling or dispatching a route.
///
/// The engine is permissive: unknown modifiers, failing validators and
/// unresolved option groups are never errors. The only failure is an
/// expression the regex engine refuses, which almost always comes from a
/// malformed inline regex segment.
#[derive(Debug, Error)]
pub enum RouteError {
    /// The assembled expression for a pattern failed to compile.
    #[error("pattern `{pattern}` compiled to invalid expression `{expression}`: {source}")]
    InvalidExpression {
        pattern: String,
        expression: String,
        #[source]
        source: regex::Error,
    },
}

impl RouteError {
    /// The pattern that produced this error.
    pub fn pattern(&self) -> &str {
        match self {
            RouteError::InvalidExpression { pattern, .. } => pattern,
        }
    }
}
