//! Ordered route tables.
//!
//! Insertion order is the only ordering guarantee: the first entry that
//! matches wins. Entries are classified once, when they are added, instead of
//! being re-inspected on every dispatch.

use std::fmt;
use std::sync::Arc;

use crate::routing::options::RouteOptions;

/// A route handler. Receives the captured segments, first path component first.
pub type Handler = Arc<dyn Fn(&[String]) + Send + Sync>;

/// One entry of a route table.
#[derive(Clone)]
pub enum RouteEntry {
    /// A pattern compiled with the accumulated options.
    Literal(String),
    /// A pattern with its own option overrides.
    Configured(String, RouteOptions),
    /// A pattern with a handler and otherwise accumulated options.
    WithHandler(String, Handler),
    /// A configuration update; never matched against the path.
    OptionGroup(RouteOptions),
}

impl RouteEntry {
    pub fn literal(pattern: impl Into<String>) -> Self {
        RouteEntry::Literal(pattern.into())
    }

    pub fn configured(pattern: impl Into<String>, options: RouteOptions) -> Self {
        RouteEntry::Configured(pattern.into(), options)
    }

    pub fn with_handler<F>(pattern: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&[String]) + Send + Sync + 'static,
    {
        RouteEntry::WithHandler(pattern.into(), Arc::new(handler))
    }

    pub fn group(options: RouteOptions) -> Self {
        RouteEntry::OptionGroup(options)
    }

    /// Build the entry for a registration call.
    pub fn from_value(pattern: impl Into<String>, value: RouteValue) -> Self {
        let pattern = pattern.into();
        match value {
            RouteValue::None => RouteEntry::Literal(pattern),
            RouteValue::Options(options) => RouteEntry::Configured(pattern, options),
            RouteValue::Handler(handler) => RouteEntry::WithHandler(pattern, handler),
        }
    }

    /// The pattern, or `None` for option-group entries.
    pub fn pattern(&self) -> Option<&str> {
        match self {
            RouteEntry::Literal(pattern)
            | RouteEntry::Configured(pattern, _)
            | RouteEntry::WithHandler(pattern, _) => Some(pattern),
            RouteEntry::OptionGroup(_) => None,
        }
    }
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteEntry::Literal(pattern) => f.debug_tuple("Literal").field(pattern).finish(),
            RouteEntry::Configured(pattern, options) => f
                .debug_tuple("Configured")
                .field(pattern)
                .field(options)
                .finish(),
            RouteEntry::WithHandler(pattern, _) => {
                f.debug_tuple("WithHandler").field(pattern).finish()
            }
            RouteEntry::OptionGroup(options) => f.debug_tuple("OptionGroup").field(options).finish(),
        }
    }
}

/// What may be registered against a pattern.
#[derive(Clone, Default)]
pub enum RouteValue {
    #[default]
    None,
    Options(RouteOptions),
    Handler(Handler),
}

impl RouteValue {
    pub fn handler<F>(handler: F) -> Self
    where
        F: Fn(&[String]) + Send + Sync + 'static,
    {
        RouteValue::Handler(Arc::new(handler))
    }
}

impl From<RouteOptions> for RouteValue {
    fn from(options: RouteOptions) -> Self {
        RouteValue::Options(options)
    }
}

impl From<Handler> for RouteValue {
    fn from(handler: Handler) -> Self {
        RouteValue::Handler(handler)
    }
}

impl From<Option<RouteOptions>> for RouteValue {
    fn from(options: Option<RouteOptions>) -> Self {
        options.map(RouteValue::Options).unwrap_or_default()
    }
}

/// An ordered sequence of route entries.
#[derive(Clone, Default, Debug)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pattern. An existing entry with the same pattern is
    /// replaced where it stands; otherwise the entry is appended.
    pub fn insert(&mut self, pattern: impl Into<String>, value: impl Into<RouteValue>) {
        let entry = RouteEntry::from_value(pattern, value.into());
        let existing = self
            .entries
            .iter()
            .position(|e| e.pattern().is_some() && e.pattern() == entry.pattern());

        match existing {
            Some(index) => self.entries[index] = entry,
            None => self.entries.push(entry),
        }
    }

    /// Append an entry without de-duplication.
    pub fn push(&mut self, entry: RouteEntry) {
        self.entries.push(entry);
    }

    /// Chainable form of `push(RouteEntry::literal(..))`.
    pub fn route(mut self, pattern: impl Into<String>) -> Self {
        self.push(RouteEntry::literal(pattern));
        self
    }

    pub fn configured(mut self, pattern: impl Into<String>, options: RouteOptions) -> Self {
        self.push(RouteEntry::configured(pattern, options));
        self
    }

    pub fn handle<F>(mut self, pattern: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&[String]) + Send + Sync + 'static,
    {
        self.push(RouteEntry::with_handler(pattern, handler));
        self
    }

    pub fn group(mut self, options: RouteOptions) -> Self {
        self.push(RouteEntry::group(options));
        self
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RouteEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<RouteEntry> for RouteTable {
    fn from_iter<I: IntoIterator<Item = RouteEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RouteTable {
    type Item = &'a RouteEntry;
    type IntoIter = std::slice::Iter<'a, RouteEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
