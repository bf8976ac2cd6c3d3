//! CLI module
//!
//! Command-line interface for schema inference and SDL generation.
//!
//! # Commands
//!
//! - `infer` - Infer a schema from sampled documents, print as JSON
//! - `sdl` - Infer a schema and print the full SDL document
//! - `operations` - List enabled resolver operation names
//! - `validate` - Validate a configuration file

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
