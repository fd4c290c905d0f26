//! Modifier registry.
//!
//! # Responsibilities
//! - Map built-in single-colon tokens (`:int`, `:hex`, ...) to regex fragments
//! - Store user-defined double-colon modifiers (`::name`) as validators
//!
//! # Design Decisions
//! - Built-ins are a fixed static table; they cannot be overwritten
//! - User modifiers live in a `DashMap` so registration never blocks readers
//! - Unknown tokens are not errors; the compiler treats them as literals

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use regex::Regex;

/// A user modifier: receives the live path segment, returns whether it is acceptable.
pub type Validator = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// The wildcard terminator: matches the rest of the path.
pub const WILDCARD: &str = ":*";

/// Prefix marking a user modifier segment.
pub const USER_MODIFIER_PREFIX: &str = "::";

/// Built-in modifier tokens and their fragments.
///
/// Hex digits are upper case only; they match lower case input through the
/// default case-insensitive compilation.
pub const BUILTIN_MODIFIERS: &[(&str, &str)] = &[
    // signed or unsigned integer
    (":int", "-?[0-9]{1,}"),
    (":digit", "[0-9]{1,}"),
    (":float", r"-?[0-9]{1,}\.[0-9]{1,}"),
    (":num", r"\d+"),
    (":hex", "(?:0x)?[A-F0-9]+"),
    // anything up to the next separator
    (":any", "[^/]+"),
    (WILDCARD, ".*"),
    (":bin", "[0-1]+"),
];

/// Look up the fragment for a built-in token.
pub fn resolve_builtin(token: &str) -> Option<&'static str> {
    BUILTIN_MODIFIERS
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, fragment)| *fragment)
}

/// All built-in modifiers as an owned map, the expansion of `modifiers = true`.
pub fn builtin_modifiers() -> HashMap<String, String> {
    BUILTIN_MODIFIERS
        .iter()
        .map(|(name, fragment)| (name.to_string(), fragment.to_string()))
        .collect()
}

/// Build a validator that accepts a segment when `expr` matches it.
///
/// Used for user modifiers declared in route-table files.
pub fn regex_validator(expr: &str) -> Result<Validator, regex::Error> {
    let re = Regex::new(expr)?;
    Ok(Arc::new(move |segment: &str| re.is_match(segment)))
}

/// Registry of user modifiers, shared between a router and its callers.
#[derive(Clone, Default)]
pub struct UserModifiers {
    inner: Arc<DashMap<String, Validator>>,
}

impl UserModifiers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or overwrite a user modifier. `name` is given without the `::` prefix.
    pub fn register<F>(&self, name: impl Into<String>, validator: F)
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.insert(name, Arc::new(validator));
    }

    /// Add or overwrite a user modifier from an already shared validator.
    pub fn insert(&self, name: impl Into<String>, validator: Validator) {
        let name = name.into();
        tracing::debug!(modifier = %name, "Registered user modifier");
        self.inner.insert(name, validator);
    }

    pub fn resolve(&self, name: &str) -> Option<Validator> {
        self.inner.get(name).map(|entry| entry.value().clone())
    }

    /// Copy the current registrations, the expansion of `user_modifiers = true`.
    ///
    /// A dispatch run works from one snapshot so concurrent registration
    /// cannot change the set halfway through.
    pub fn snapshot(&self) -> HashMap<String, Validator> {
        self.inner
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl fmt::Debug for UserModifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserModifiers")
            .field("names", &self.names())
            .finish()
    }
}
