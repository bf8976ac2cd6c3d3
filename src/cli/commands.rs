//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Autograph CDK CLI
#[derive(Parser, Debug)]
#[command(name = "autograph-cdk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Infer a schema from a JSON sample file and print it as JSON
    Infer {
        /// Sample file: a JSON array of documents (or a single document)
        #[arg(short, long)]
        input: PathBuf,

        /// Root type name for the inferred schema
        #[arg(short, long, default_value = "Document")]
        type_name: String,
    },

    /// Infer a schema and print the full SDL document
    Sdl {
        /// Sample file: a JSON array of documents (or a single document)
        #[arg(short, long)]
        input: PathBuf,

        /// Root type name for the inferred schema
        #[arg(short, long, default_value = "Document")]
        type_name: String,
    },

    /// List the resolver operation names the configuration enables
    Operations {
        /// Root type name
        #[arg(short, long, default_value = "Document")]
        type_name: String,
    },

    /// Validate a configuration file
    Validate,
}
