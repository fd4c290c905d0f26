//! Route-table loading from disk.

use std::fs;
use std::path::Path;

use crate::config::handlers::HandlerRegistry;
use crate::config::schema::{
    ModifiersConfig, OptionsConfig, RouteConfig, TableConfig, UserModifiersConfig,
};
use crate::config::validation::{validate_config, ValidationError};
use crate::routing::modifiers::regex_validator;
use crate::routing::{
    ModifierSetting, OptionSet, RouteEntry, RouteOptions, RouteTable, Router, UserModifiers,
};

/// Error type for route-table loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Validation(_) => None,
        }
    }
}

impl From<ValidationError> for ConfigError {
    fn from(e: ValidationError) -> Self {
        ConfigError::Validation(vec![e])
    }
}

/// Load and validate a route table from a TOML file.
pub fn load_config(path: &Path, handlers: &HandlerRegistry) -> Result<TableConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content, handlers)
}

/// Parse and validate a route table from TOML text.
pub fn parse_config(content: &str, handlers: &HandlerRegistry) -> Result<TableConfig, ConfigError> {
    let config: TableConfig = toml::from_str(content).map_err(ConfigError::Parse)?;

    validate_config(&config, handlers).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load a file and build a router from it.
pub fn load_router(path: &Path, handlers: &HandlerRegistry) -> Result<Router, ConfigError> {
    let config = load_config(path, handlers)?;
    let router = build_router(&config, handlers)?;
    tracing::info!(path = %path.display(), routes = config.routes.len(), "Route table loaded");
    Ok(router)
}

/// Build a router whose base scope, user modifiers and table come from `config`.
pub fn build_router(config: &TableConfig, handlers: &HandlerRegistry) -> Result<Router, ConfigError> {
    let modifiers = UserModifiers::new();
    register_user_modifiers(config, &modifiers)?;

    let record = build_options("defaults", &config.defaults, &modifiers, handlers)?;
    let table = build_table(config, &modifiers, handlers)?;

    let router = Router::from_parts(OptionSet::default().merged_with(&record), modifiers);
    router.replace_table(table);
    Ok(router)
}

/// Apply a reloaded file to an existing router.
///
/// The file's user modifiers and table replace the live ones together, so a
/// modifier dropped from the file stops resolving. The base scope is fixed
/// when the router is built, so `[defaults]` is not re-read.
pub fn apply_config(
    router: &Router,
    config: &TableConfig,
    handlers: &HandlerRegistry,
) -> Result<(), ConfigError> {
    let modifiers = UserModifiers::new();
    register_user_modifiers(config, &modifiers)?;
    let table = build_table(config, &modifiers, handlers)?;

    router.replace(table, modifiers);
    Ok(())
}

fn register_user_modifiers(
    config: &TableConfig,
    modifiers: &UserModifiers,
) -> Result<(), ValidationError> {
    for (name, expr) in &config.user_modifiers {
        let validator = regex_validator(expr).map_err(|e| ValidationError::InvalidUserModifier {
            name: name.clone(),
            message: e.to_string(),
        })?;
        modifiers.insert(name.clone(), validator);
    }
    Ok(())
}

/// Build the ordered table. User modifiers named in explicit lists are looked
/// up in `modifiers`; names it does not know are dropped.
pub fn build_table(
    config: &TableConfig,
    modifiers: &UserModifiers,
    handlers: &HandlerRegistry,
) -> Result<RouteTable, ValidationError> {
    config
        .routes
        .iter()
        .enumerate()
        .map(|(index, route)| -> Result<RouteEntry, ValidationError> {
            let mut options = build_options(&route.label(index), &route.options, modifiers, handlers)?;
            options.reset = route.reset;
            options.name = route.name.clone();
            options.use_group = route.use_group.clone();

            Ok(match &route.pattern {
                None => RouteEntry::OptionGroup(options),
                Some(pattern) if options.is_empty() => RouteEntry::Literal(pattern.clone()),
                Some(pattern) if is_handler_only(route) => match options.handler {
                    Some(handler) => RouteEntry::WithHandler(pattern.clone(), handler),
                    None => RouteEntry::Literal(pattern.clone()),
                },
                Some(pattern) => RouteEntry::Configured(pattern.clone(), options),
            })
        })
        .collect()
}

fn is_handler_only(route: &RouteConfig) -> bool {
    let without_handler = OptionsConfig {
        handler: None,
        ..route.options.clone()
    };
    without_handler.is_empty() && !route.reset && route.name.is_none() && route.use_group.is_none()
}

fn build_options(
    entry: &str,
    options: &OptionsConfig,
    modifiers: &UserModifiers,
    handlers: &HandlerRegistry,
) -> Result<RouteOptions, ValidationError> {
    let handler = match &options.handler {
        Some(name) => Some(handlers.get(name).ok_or_else(|| ValidationError::UnknownHandler {
            entry: entry.to_string(),
            handler: name.clone(),
        })?),
        None => None,
    };

    Ok(RouteOptions {
        case_sensitive: options.case_sensitive,
        regex: options.regex,
        modifiers: options.modifiers.as_ref().map(|m| match m {
            ModifiersConfig::Switch(enabled) => ModifierSetting::from(*enabled),
            ModifiersConfig::Explicit(map) => ModifierSetting::Explicit(
                map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            ),
        }),
        user_modifiers: options.user_modifiers.as_ref().map(|m| match m {
            UserModifiersConfig::Switch(enabled) => ModifierSetting::from(*enabled),
            UserModifiersConfig::Explicit(names) => ModifierSetting::Explicit(
                names
                    .iter()
                    .filter_map(|name| modifiers.resolve(name).map(|v| (name.clone(), v)))
                    .collect(),
            ),
        }),
        handler,
        ..RouteOptions::default()
    })
}
