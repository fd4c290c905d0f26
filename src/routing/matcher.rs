//! Compiled, anchored matchers.
//!
//! Every pattern segment is wrapped in its own named capture group so the
//! number of captures always equals the number of segments, whatever groups
//! an inline regex brings along.

use regex::{Regex, RegexBuilder};

use crate::error::RouteError;
use crate::routing::compiler::{Segment, SEPARATOR};

const GROUP_PREFIX: &str = "__seg";

/// A pattern compiled into one anchored expression.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pattern: String,
    expression: String,
    regex: Regex,
    segments: Vec<Segment>,
}

impl CompiledPattern {
    /// Assemble the expression for `segments` and compile it.
    pub fn new(
        pattern: &str,
        segments: Vec<Segment>,
        case_sensitive: bool,
    ) -> Result<Self, RouteError> {
        let separator = SEPARATOR.to_string();
        let body = segments
            .iter()
            .enumerate()
            .map(|(index, segment)| {
                format!("(?P<{GROUP_PREFIX}{}>{})", index + 1, segment.fragment())
            })
            .collect::<Vec<_>>()
            .join(separator.as_str());
        let expression = format!("^{body}$");

        let regex = RegexBuilder::new(&expression)
            .case_insensitive(!case_sensitive)
            .build()
            .map_err(|source| RouteError::InvalidExpression {
                pattern: pattern.to_string(),
                expression: expression.clone(),
                source,
            })?;

        Ok(Self {
            pattern: pattern.to_string(),
            expression,
            regex,
            segments,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The anchored expression, without case flags.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Captured segments in pattern order, or `None` when `path` does not match.
    pub fn captures(&self, path: &str) -> Option<Vec<String>> {
        let caps = self.regex.captures(path)?;
        Some(
            (1..=self.segments.len())
                .map(|index| {
                    caps.name(&format!("{GROUP_PREFIX}{index}"))
                        .map(|m| m.as_str().to_string())
                        .unwrap_or_default()
                })
                .collect(),
        )
    }
}
