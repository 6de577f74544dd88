//! Sieve CLI library
//!
//! Argument parsing, configuration loading, logging setup and the
//! `compile`, `discover`, `operators` and `inputs` commands behind the
//! `sieve` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
