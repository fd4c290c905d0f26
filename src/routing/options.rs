//! Option scopes and their resolution.
//!
//! # Data Flow
//! ```text
//! base (immutable defaults)
//!     → current (accumulated by option-group entries, reset restores base)
//!     → effective (current + the entry's own overrides, one compilation only)
//!     → normalized (modifier switches expanded to concrete maps)
//! ```
//!
//! # Design Decisions
//! - All per-run state lives in `Resolver`, created fresh by every dispatch
//! - Named groups keep the declaring record only; `use` merges it over the
//!   entry's starting scope, exactly as if the record were written inline
//! - An unresolved `use` contributes nothing and is not an error

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::routing::modifiers::{builtin_modifiers, Validator};
use crate::routing::table::{Handler, RouteEntry};

/// How a family of modifiers is enabled for a pattern.
#[derive(Clone)]
pub enum ModifierSetting<T> {
    /// Every registered modifier of this kind.
    Enabled,
    /// None at all.
    Disabled,
    /// Exactly this mapping, used as-is.
    Explicit(HashMap<String, T>),
}

impl<T: Clone> ModifierSetting<T> {
    /// Expand into a concrete mapping. `all` supplies the registered set.
    pub fn normalize(&self, all: impl FnOnce() -> HashMap<String, T>) -> HashMap<String, T> {
        match self {
            ModifierSetting::Enabled => all(),
            ModifierSetting::Disabled => HashMap::new(),
            ModifierSetting::Explicit(map) => map.clone(),
        }
    }
}

impl<T> From<bool> for ModifierSetting<T> {
    fn from(enabled: bool) -> Self {
        if enabled {
            ModifierSetting::Enabled
        } else {
            ModifierSetting::Disabled
        }
    }
}

impl<T> fmt::Debug for ModifierSetting<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModifierSetting::Enabled => f.write_str("Enabled"),
            ModifierSetting::Disabled => f.write_str("Disabled"),
            ModifierSetting::Explicit(map) => {
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                f.debug_tuple("Explicit").field(&keys).finish()
            }
        }
    }
}

/// A complete option scope.
#[derive(Clone)]
pub struct OptionSet {
    pub case_sensitive: bool,
    /// Whether `:@...@` segments are treated as inline regular expressions.
    pub regex: bool,
    pub modifiers: ModifierSetting<String>,
    pub user_modifiers: ModifierSetting<Validator>,
    pub handler: Option<Handler>,
}

impl Default for OptionSet {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            regex: true,
            modifiers: ModifierSetting::Enabled,
            user_modifiers: ModifierSetting::Enabled,
            handler: None,
        }
    }
}

impl OptionSet {
    /// Layer `record` over this scope; keys the record sets win.
    pub fn merged_with(&self, record: &RouteOptions) -> OptionSet {
        OptionSet {
            case_sensitive: record.case_sensitive.unwrap_or(self.case_sensitive),
            regex: record.regex.unwrap_or(self.regex),
            modifiers: record.modifiers.clone().unwrap_or_else(|| self.modifiers.clone()),
            user_modifiers: record
                .user_modifiers
                .clone()
                .unwrap_or_else(|| self.user_modifiers.clone()),
            handler: record.handler.clone().or_else(|| self.handler.clone()),
        }
    }

    /// Expand modifier switches against the registered user modifiers.
    pub fn normalize(&self, user_modifiers: &HashMap<String, Validator>) -> EffectiveOptions {
        EffectiveOptions {
            case_sensitive: self.case_sensitive,
            regex: self.regex,
            modifiers: self.modifiers.normalize(builtin_modifiers),
            user_modifiers: self.user_modifiers.normalize(|| user_modifiers.clone()),
            handler: self.handler.clone(),
        }
    }
}

impl fmt::Debug for OptionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionSet")
            .field("case_sensitive", &self.case_sensitive)
            .field("regex", &self.regex)
            .field("modifiers", &self.modifiers)
            .field("user_modifiers", &self.user_modifiers)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

/// Per-entry configuration record. Unset fields inherit from the enclosing scope.
#[derive(Clone, Default)]
pub struct RouteOptions {
    pub case_sensitive: Option<bool>,
    pub regex: Option<bool>,
    pub modifiers: Option<ModifierSetting<String>>,
    pub user_modifiers: Option<ModifierSetting<Validator>>,
    pub handler: Option<Handler>,
    /// Start from base options instead of the accumulated scope.
    pub reset: bool,
    /// Register this record as a named group (option-group entries).
    pub name: Option<String>,
    /// Layer a previously declared named group beneath this record.
    pub use_group: Option<String>,
}

impl RouteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn case_sensitive(mut self, enabled: bool) -> Self {
        self.case_sensitive = Some(enabled);
        self
    }

    pub fn regex(mut self, enabled: bool) -> Self {
        self.regex = Some(enabled);
        self
    }

    pub fn modifiers(mut self, setting: impl Into<ModifierSetting<String>>) -> Self {
        self.modifiers = Some(setting.into());
        self
    }

    pub fn user_modifiers(mut self, setting: impl Into<ModifierSetting<Validator>>) -> Self {
        self.user_modifiers = Some(setting.into());
        self
    }

    pub fn handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&[String]) + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn with_handler(mut self, handler: Handler) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn reset(mut self) -> Self {
        self.reset = true;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn use_group(mut self, name: impl Into<String>) -> Self {
        self.use_group = Some(name.into());
        self
    }

    /// True when the record carries nothing at all.
    pub fn is_empty(&self) -> bool {
        self.case_sensitive.is_none()
            && self.regex.is_none()
            && self.modifiers.is_none()
            && self.user_modifiers.is_none()
            && self.handler.is_none()
            && !self.reset
            && self.name.is_none()
            && self.use_group.is_none()
    }
}

impl fmt::Debug for RouteOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteOptions")
            .field("case_sensitive", &self.case_sensitive)
            .field("regex", &self.regex)
            .field("modifiers", &self.modifiers)
            .field("user_modifiers", &self.user_modifiers)
            .field("handler", &self.handler.is_some())
            .field("reset", &self.reset)
            .field("name", &self.name)
            .field("use_group", &self.use_group)
            .finish()
    }
}

/// Options with modifier switches expanded, ready for the compiler.
#[derive(Clone)]
pub struct EffectiveOptions {
    pub case_sensitive: bool,
    pub regex: bool,
    pub modifiers: HashMap<String, String>,
    pub user_modifiers: HashMap<String, Validator>,
    pub handler: Option<Handler>,
}

impl EffectiveOptions {
    /// Resolve `options` with no user modifiers registered.
    pub fn from_options(options: &OptionSet) -> Self {
        options.normalize(&HashMap::new())
    }
}

/// Per-run option resolution state.
pub struct Resolver<'a> {
    base: &'a OptionSet,
    current: OptionSet,
    groups: HashMap<String, RouteOptions>,
    user_modifiers: HashMap<String, Validator>,
}

impl<'a> Resolver<'a> {
    /// Start a run: `current` equals base and no groups are declared.
    pub fn new(base: &'a OptionSet, user_modifiers: HashMap<String, Validator>) -> Self {
        Self {
            base,
            current: base.clone(),
            groups: HashMap::new(),
            user_modifiers,
        }
    }

    /// The accumulated scope.
    pub fn current(&self) -> &OptionSet {
        &self.current
    }

    pub fn group(&self, name: &str) -> Option<&RouteOptions> {
        self.groups.get(name)
    }

    /// Resolve the options for one table entry.
    ///
    /// Option-group entries update the accumulated scope and yield `None`;
    /// every other entry yields its pattern and effective options.
    pub fn resolve<'e>(&mut self, entry: &'e RouteEntry) -> Option<(&'e str, EffectiveOptions)> {
        let effective = match entry {
            RouteEntry::OptionGroup(record) => {
                self.apply_group(record);
                return None;
            }
            RouteEntry::Literal(_) => self.current.clone(),
            RouteEntry::WithHandler(_, handler) => OptionSet {
                handler: Some(handler.clone()),
                ..self.current.clone()
            },
            RouteEntry::Configured(_, record) => self.layered(record),
        };

        Some((entry.pattern()?, effective.normalize(&self.user_modifiers)))
    }

    fn apply_group(&mut self, record: &RouteOptions) {
        if record.reset {
            self.current = self.base.clone();
        }
        self.current = self.current.merged_with(record);

        if let Some(name) = &record.name {
            let group = RouteOptions {
                reset: false,
                name: None,
                use_group: None,
                ..record.clone()
            };
            tracing::trace!(group = %name, options = ?group, "Declared option group");
            self.groups.insert(name.clone(), group);
        }
    }

    fn layered(&self, record: &RouteOptions) -> OptionSet {
        let mut temp = if record.reset {
            self.base.clone()
        } else {
            self.current.clone()
        };

        if let Some(name) = &record.use_group {
            match self.groups.get(name) {
                Some(group) => temp = temp.merged_with(group),
                None => tracing::trace!(group = %name, "Unresolved option group, ignoring"),
            }
        }

        temp.merged_with(record)
    }
}
