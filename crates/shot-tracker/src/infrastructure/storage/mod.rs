//! Storage infrastructure: configuration file persistence.
//!
//! The `config` sub-module handles:
//!
//! - Reading the TOML configuration file from the platform-appropriate
//!   directory, or from an explicit path given on the command line.
//! - Writing the configuration back to disk.
//! - Providing defaults when the file does not exist yet (first run).
//!
//! Shot counts are never persisted; a session always starts from zero.

pub mod config;
