//! # Core Module
//!
//! Configuration and error types shared by the registry, middleware and dispatcher.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod config;
pub mod error;

pub use config::{is_valid_prefix, CategoryConfig, Config};
pub use error::{ConfigurationError, PersistenceFailure};
