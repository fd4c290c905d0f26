//! Route-table files.
//!
//! # Data Flow
//! ```text
//! route table file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, handler names resolved)
//!     → loader.rs (build RouteTable, register user modifiers)
//!     → Router (table swapped in atomically)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads and validates the new file
//!     → consumer applies it with loader::apply_config
//!     → dispatches already running keep their old snapshot
//! ```
//!
//! # Design Decisions
//! - Handlers are referenced by name; code never lives in a file
//! - All fields have defaults to allow minimal files
//! - Validation separates syntactic (serde) from semantic checks

pub mod handlers;
pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use handlers::HandlerRegistry;
pub use loader::{apply_config, build_router, load_config, load_router, parse_config, ConfigError};
pub use schema::{LoggingConfig, OptionsConfig, RouteConfig, TableConfig};
pub use validation::ValidationError;
pub use watcher::TableWatcher;
