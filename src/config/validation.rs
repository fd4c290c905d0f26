//! Route-table validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that handler names resolve
//! - Check that user-modifier expressions compile
//! - Flag entries that can have no effect
//! - Reject keys no option claims, so typos are not silently ignored
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure apart from warnings: `TableConfig` → `Result<(), Vec<ValidationError>>`
//! - A `use` naming an undeclared group is only a warning; at dispatch it
//!   simply contributes nothing

use std::collections::HashSet;

use regex::Regex;
use thiserror::Error;

use crate::config::handlers::HandlerRegistry;
use crate::config::schema::{OptionsConfig, TableConfig, UserModifiersConfig};

/// A semantic problem in a route-table file.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("{entry}: unknown handler `{handler}`")]
    UnknownHandler { entry: String, handler: String },

    #[error("user modifier `{name}`: invalid expression: {message}")]
    InvalidUserModifier { name: String, message: String },

    #[error("{entry}: option group carries no options")]
    EmptyGroup { entry: String },

    #[error("{entry}: `use` has no effect on an option group")]
    UseOnGroup { entry: String },

    #[error("{entry}: unknown key `{key}`")]
    UnknownKey { entry: String, key: String },
}

/// Validate a parsed route table against the available handlers.
pub fn validate_config(
    config: &TableConfig,
    handlers: &HandlerRegistry,
) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (name, expr) in &config.user_modifiers {
        if let Err(e) = Regex::new(expr) {
            errors.push(ValidationError::InvalidUserModifier {
                name: name.clone(),
                message: e.to_string(),
            });
        }
    }

    check_options("defaults", &config.defaults, config, handlers, &mut errors);

    let mut declared: HashSet<&str> = HashSet::new();
    for (index, route) in config.routes.iter().enumerate() {
        let entry = route.label(index);
        check_options(&entry, &route.options, config, handlers, &mut errors);

        if route.is_group() {
            if route.options.is_empty() && !route.reset && route.name.is_none() {
                errors.push(ValidationError::EmptyGroup {
                    entry: entry.clone(),
                });
            }
            if route.use_group.is_some() {
                errors.push(ValidationError::UseOnGroup {
                    entry: entry.clone(),
                });
            }
            if let Some(name) = &route.name {
                declared.insert(name.as_str());
            }
        } else {
            if route.name.is_some() {
                tracing::warn!(%entry, "`name` only declares a group on option-group entries; ignored");
            }
            if let Some(group) = &route.use_group {
                if !declared.contains(group.as_str()) {
                    tracing::warn!(%entry, group = %group, "`use` names a group not declared above it");
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_options(
    entry: &str,
    options: &OptionsConfig,
    config: &TableConfig,
    handlers: &HandlerRegistry,
    errors: &mut Vec<ValidationError>,
) {
    for key in options.unknown.keys() {
        errors.push(ValidationError::UnknownKey {
            entry: entry.to_string(),
            key: key.clone(),
        });
    }

    if let Some(handler) = &options.handler {
        if !handlers.contains(handler) {
            errors.push(ValidationError::UnknownHandler {
                entry: entry.to_string(),
                handler: handler.clone(),
            });
        }
    }

    if let Some(UserModifiersConfig::Explicit(names)) = &options.user_modifiers {
        for name in names {
            if !config.user_modifiers.contains_key(name) {
                tracing::warn!(%entry, modifier = %name, "User modifier not defined in this file");
            }
        }
    }
}
