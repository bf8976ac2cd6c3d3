//! CLI command execution

use super::commands::{Cli, Commands};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::schema::SchemaInferrer;
use crate::sdl::{operation_field_name, render_full};
use crate::types::JsonValue;
use std::path::Path;
use tracing::info;

/// Executes CLI commands
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a runner for parsed CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Execute the selected command
    pub async fn run(&self) -> Result<()> {
        let config = self.load_config()?;

        match &self.cli.command {
            Commands::Infer { input, type_name } => {
                let samples = load_samples(input)?;
                let inferrer = SchemaInferrer::with_config(config.sampling.clone());
                let schema = inferrer.infer(&samples, type_name);
                println!("{}", serde_json::to_string_pretty(&schema)?);
                Ok(())
            }

            Commands::Sdl { input, type_name } => {
                let samples = load_samples(input)?;
                let inferrer = SchemaInferrer::with_config(config.sampling.clone());
                let schema = inferrer.infer(&samples, type_name);
                print!("{}", render_full(&schema, &config.generator));
                Ok(())
            }

            Commands::Operations { type_name } => {
                for op in config.generator.operations.enabled() {
                    println!("{}", operation_field_name(op, type_name));
                }
                Ok(())
            }

            Commands::Validate => {
                let path = self.cli.config.as_ref().ok_or_else(|| {
                    Error::config("validate requires a configuration file (--config)")
                })?;
                Config::from_file(path)?;
                info!(path = %path.display(), "configuration is valid");
                println!("OK");
                Ok(())
            }
        }
    }

    fn load_config(&self) -> Result<Config> {
        match &self.cli.config {
            Some(path) => Config::from_file(path),
            None => Ok(Config::default()),
        }
    }
}

/// Load sample documents from a JSON file. A top-level array spreads into
/// individual documents; a single object becomes a one-document sample.
fn load_samples(path: &Path) -> Result<Vec<JsonValue>> {
    let content = std::fs::read_to_string(path).map_err(|_| Error::FileNotFound {
        path: path.display().to_string(),
    })?;
    let value: JsonValue = serde_json::from_str(&content)?;
    match value {
        JsonValue::Array(items) => Ok(items),
        object @ JsonValue::Object(_) => Ok(vec![object]),
        _ => Err(Error::validation(
            "infer",
            "input",
            "sample file must hold a JSON array or object",
        )),
    }
}
