//! # Command System
//!
//! Prefix command registration, lookup and the bundled commands.
//!
//! - **Version**: 3.0.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 3.0.0: Prefix/trigger commands with categories, priorities, guild aliases and middleware
//! - 2.1.0: Add modular handler infrastructure (handler trait, context, registry)
//! - 1.0.0: Initial reorganization with modular command structure

pub mod alias;
pub mod category;
pub mod command;
pub mod container;
pub mod context;
pub mod handlers;
pub mod metrics;
pub mod priority;
pub mod registry;

pub use alias::resolve_alias;
pub use category::{Category, CategoryRegistry};
pub use command::{relation, Command};
pub use container::{AliasCommandContainer, CommandContainer, ResolvedCommand};
pub use context::CommandContext;
pub use metrics::ExecutionCounters;
pub use priority::Priority;
pub use registry::CommandRegistry;
