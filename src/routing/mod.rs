//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatch (per request path):
//!     RouteTable entries, in order
//!     → options.rs (resolve base / current / entry scopes)
//!     → compiler.rs (classify segments against the live path)
//!     → matcher.rs (anchored expression, one capture per segment)
//!     → router.rs (first match wins → handler or fallback)
//! ```
//!
//! # Pattern Syntax
//!
//! | Segment      | Meaning                                          |
//! |--------------|--------------------------------------------------|
//! | `text`       | Literal text                                     |
//! | `:int`       | Signed or unsigned integer                       |
//! | `:digit`     | Digit run                                        |
//! | `:float`     | Signed or unsigned float                         |
//! | `:num`       | Digit run (`\d+`)                                |
//! | `:hex`       | Hex number, optional `0x` prefix                 |
//! | `:any`       | Anything up to the next `/`                      |
//! | `:bin`       | Binary digit run                                 |
//! | `:*`         | The rest of the path; later segments are dropped |
//! | `::name`     | User modifier, validated against the live segment|
//! | `:@expr@`    | Inline regular expression                        |
//! | `\segment`   | Literal, even if it looks like a modifier        |
//!
//! # Design Decisions
//! - Matching is case-insensitive unless `case_sensitive` is set
//! - Deterministic: the same pattern, options and path always match the same way
//! - First match wins

pub mod compiler;
pub mod matcher;
pub mod modifiers;
pub mod options;
pub mod router;
pub mod table;

pub use compiler::{compile, Segment};
pub use matcher::CompiledPattern;
pub use modifiers::{UserModifiers, Validator, WILDCARD};
pub use options::{EffectiveOptions, ModifierSetting, OptionSet, Resolver, RouteOptions};
pub use router::{global, register, register_modifier, run, run_table, run_with, RouteMatch, Router};
pub use table::{Handler, RouteEntry, RouteTable, RouteValue};
