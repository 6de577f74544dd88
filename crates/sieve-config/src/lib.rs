//! # Sieve Configuration Library
//!
//! Configuration management for the sieve filter compiler.
//! Provides type-safe loading of adapter binding, limits, logging and the
//! data-driven schema declaration that the compiler and the discovery walker
//! are built from.
//!
//! ## Features
//!
//! - Multi-format support (TOML, YAML, JSON)
//! - Environment overrides (`SIEVE_ADAPTER`, `SIEVE_BACKEND`, `SIEVE_LOG_LEVEL`)
//! - Declarative entity/field/enum registration
//! - Test utilities for easy testing
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sieve_config::ConfigLoader;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::load_from_file("sieve.toml")?;
//!     println!("max depth: {}", config.limits.max_depth);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod loader;
mod schema;

// Include test_utils when test-utils feature is enabled
#[cfg(feature = "test-utils")]
mod test_utils;

pub use config::*;
pub use loader::*;
pub use schema::*;

// Export test utilities when feature is enabled
#[cfg(feature = "test-utils")]
pub use test_utils::*;
