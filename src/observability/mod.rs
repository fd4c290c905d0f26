//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! routing, config
//!     → tracing events (one span per dispatch run, keyed by run id)
//!     → logging.rs (filter + fmt subscriber)
//!     → stderr
//! ```

pub mod logging;

pub use logging::init_logging;
