//! Pattern compilation.
//!
//! # Responsibilities
//! - Split a pattern into path segments
//! - Classify each segment (literal, built-in, user-validated, inline regex)
//! - Hand the classified segments to `CompiledPattern` for assembly
//!
//! # Design Decisions
//! - Classification produces a `Segment` list first; the expression is built
//!   from it in a single pass, so no substitution can see another's output
//! - User modifiers are evaluated against the live path segment at the same
//!   position, which makes a compilation specific to one request path
//! - Inline regex content is trusted verbatim

use std::borrow::Cow;
use std::collections::HashMap;

use serde::Serialize;

use crate::error::RouteError;
use crate::routing::matcher::CompiledPattern;
use crate::routing::modifiers::{resolve_builtin, USER_MODIFIER_PREFIX, WILDCARD};
use crate::routing::options::EffectiveOptions;

/// Path separator for patterns and request paths.
pub const SEPARATOR: char = '/';

/// Leading character that forces a segment to be read literally.
pub const ESCAPE: char = '\\';

const INLINE_REGEX_OPEN: &str = ":@";
const INLINE_REGEX_CLOSE: char = '@';

/// Marker prepended to a rejected user-modifier segment.
const REJECTED_MARKER: char = '_';

/// One classified pattern segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Segment {
    /// Matched as literal text.
    Literal { text: String },
    /// A built-in modifier token replaced by its fragment.
    Builtin { token: String, fragment: String },
    /// A caller-supplied regular expression, used as-is.
    InlineRegex { expression: String },
    /// A live path segment accepted by a user modifier.
    Validated { modifier: String, value: String },
    /// A user modifier refused the live segment; never matches.
    Rejected { modifier: String, sentinel: String },
}

impl Segment {
    /// The regex fragment for this segment, without its capture group.
    pub fn fragment(&self) -> Cow<'_, str> {
        match self {
            Segment::Literal { text } => Cow::Owned(regex::escape(text)),
            Segment::Builtin { fragment, .. } => Cow::Borrowed(fragment),
            Segment::InlineRegex { expression } => Cow::Borrowed(expression),
            Segment::Validated { value, .. } => Cow::Owned(regex::escape(value)),
            // `\b\B` cannot hold at any position
            Segment::Rejected { sentinel, .. } => {
                Cow::Owned(format!(r"\b\B{}", regex::escape(sentinel)))
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Segment::Literal { .. } => "literal",
            Segment::Builtin { .. } => "builtin",
            Segment::InlineRegex { .. } => "inline-regex",
            Segment::Validated { .. } => "validated",
            Segment::Rejected { .. } => "rejected",
        }
    }
}

/// Compile `pattern` for matching against `path`.
///
/// `path` must already be normalized; it is only consulted by user modifiers.
pub fn compile(
    pattern: &str,
    options: &EffectiveOptions,
    path: &str,
) -> Result<CompiledPattern, RouteError> {
    let segments = classify_segments(pattern, options, path);
    CompiledPattern::new(pattern, segments, options.case_sensitive)
}

/// Split and classify every segment of `pattern`.
pub fn classify_segments(pattern: &str, options: &EffectiveOptions, path: &str) -> Vec<Segment> {
    let pattern = normalize(pattern);
    let live: Vec<&str> = path.split(SEPARATOR).collect();

    // The bare wildcard pattern only ever needs its own fragment.
    let wildcard_only: HashMap<String, String>;
    let modifiers = if pattern == WILDCARD {
        wildcard_only = resolve_builtin(WILDCARD)
            .map(|fragment| HashMap::from([(WILDCARD.to_string(), fragment.to_string())]))
            .unwrap_or_default();
        &wildcard_only
    } else {
        &options.modifiers
    };

    let mut raw: Vec<&str> = pattern.split(SEPARATOR).collect();
    if let Some(position) = raw.iter().position(|segment| *segment == WILDCARD) {
        raw.truncate(position + 1);
    }

    raw.into_iter()
        .enumerate()
        .map(|(index, segment)| classify(segment, live.get(index).copied(), modifiers, options))
        .collect()
}

/// Trim leading and trailing separators.
pub fn normalize(path: &str) -> &str {
    path.trim_matches(SEPARATOR)
}

fn classify(
    segment: &str,
    live: Option<&str>,
    modifiers: &HashMap<String, String>,
    options: &EffectiveOptions,
) -> Segment {
    if let Some(text) = segment.strip_prefix(ESCAPE) {
        return Segment::Literal {
            text: text.to_string(),
        };
    }

    if let Some(fragment) = modifiers.get(segment) {
        return Segment::Builtin {
            token: segment.to_string(),
            fragment: fragment.clone(),
        };
    }

    if segment.starts_with(USER_MODIFIER_PREFIX) {
        let name = segment.trim_start_matches(':');
        if let (Some(validator), Some(live)) = (options.user_modifiers.get(name), live) {
            return if validator(live) {
                Segment::Validated {
                    modifier: name.to_string(),
                    value: live.to_string(),
                }
            } else {
                Segment::Rejected {
                    modifier: name.to_string(),
                    sentinel: format!("{REJECTED_MARKER}{segment}"),
                }
            };
        }
    }

    if options.regex {
        if let Some(expression) = inline_regex(segment) {
            return Segment::InlineRegex {
                expression: expression.to_string(),
            };
        }
    }

    Segment::Literal {
        text: segment.to_string(),
    }
}

/// The inner expression of a `:@...@` segment.
fn inline_regex(segment: &str) -> Option<&str> {
    segment
        .strip_prefix(INLINE_REGEX_OPEN)?
        .strip_suffix(INLINE_REGEX_CLOSE)
}
