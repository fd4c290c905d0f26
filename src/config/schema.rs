//! Route-table file schema.
//!
//! A route-table file is TOML. All sections are optional; an empty file is an
//! empty table compiled with the built-in defaults.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root of a route-table file.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TableConfig {
    /// Replaces the base option scope.
    pub defaults: OptionsConfig,

    /// User modifiers defined as regular expressions (name → expression).
    pub user_modifiers: BTreeMap<String, String>,

    /// Ordered route entries.
    pub routes: Vec<RouteConfig>,

    /// Logging settings for the CLI.
    pub logging: LoggingConfig,
}

/// Option overrides shared by `[defaults]` and route entries.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct OptionsConfig {
    pub case_sensitive: Option<bool>,
    pub regex: Option<bool>,
    pub modifiers: Option<ModifiersConfig>,
    pub user_modifiers: Option<UserModifiersConfig>,
    /// Handler name, resolved through a `HandlerRegistry`.
    pub handler: Option<String>,

    /// Keys no field claims, kept so validation can report them.
    #[serde(flatten)]
    pub unknown: BTreeMap<String, toml::Value>,
}

impl OptionsConfig {
    pub fn is_empty(&self) -> bool {
        self == &OptionsConfig::default()
    }
}

/// Built-in modifier switch: `true`, `false`, or an explicit token → fragment table.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ModifiersConfig {
    Switch(bool),
    Explicit(BTreeMap<String, String>),
}

/// User modifier switch: `true`, `false`, or an explicit list of names.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum UserModifiersConfig {
    Switch(bool),
    Explicit(Vec<String>),
}

/// One `[[routes]]` entry. Without `pattern` it is an option group.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct RouteConfig {
    #[serde(default)]
    pub pattern: Option<String>,

    #[serde(flatten)]
    pub options: OptionsConfig,

    #[serde(default)]
    pub reset: bool,

    /// Declares a named group (option-group entries only).
    #[serde(default)]
    pub name: Option<String>,

    /// Layers a named group beneath this entry's options.
    #[serde(default, rename = "use")]
    pub use_group: Option<String>,
}

impl RouteConfig {
    pub fn is_group(&self) -> bool {
        self.pattern.is_none()
    }

    /// Human-readable label for diagnostics.
    pub fn label(&self, index: usize) -> String {
        match &self.pattern {
            Some(pattern) => format!("route `{pattern}`"),
            None => match &self.name {
                Some(name) => format!("group `{name}`"),
                None => format!("group #{index}"),
            },
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
