//! # Autograph CDK
//!
//! A minimal, Rust-native toolkit for inferring GraphQL APIs from
//! document-store data: sample stored records, unify their shapes into a
//! typed schema, derive the full CRUD operation contracts, and execute
//! them with optimistic concurrency and soft-delete semantics.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use autograph_cdk::config::GeneratorConfig;
//! use autograph_cdk::resolver::ResolverBuilder;
//! use autograph_cdk::schema::SchemaInferrer;
//! use autograph_cdk::sdl::render_full;
//! use autograph_cdk::store::{DocumentStore, MemoryStore, QuerySpec};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> autograph_cdk::Result<()> {
//!     let store = Arc::new(MemoryStore::new("products"));
//!
//!     // Sample the container and infer a typed schema
//!     let samples = store.query(&QuerySpec::sample(100)).await?;
//!     let schema = SchemaInferrer::new().infer(&samples.items, "Product");
//!
//!     // Render the SDL contract
//!     let config = GeneratorConfig::default();
//!     let sdl = render_full(&schema, &config);
//!
//!     // Build executable resolvers
//!     let resolvers = ResolverBuilder::new(store, &schema, config).build();
//!     let payload = resolvers
//!         .call("createProduct", serde_json::json!(null), serde_json::json!({
//!             "input": {"id": "p1", "pk": "tenant-1", "name": "Widget"}
//!         }))
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     sampled documents                           │
//! └──────────────────────────────┬──────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │  Unify   │   Infer   │    Render     │ Generate  │  Resolve    │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ Lattice  │ Sampling  │ Output Types  │ Inputs    │ CRUD        │
//! │ Widening │ Naming    │ Shared Blocks │ Payloads  │ Soft Delete │
//! │ Arrays   │ Partition │ Query/Mutation│ Batch     │ Batch       │
//! │ Degrade  │ Patterns  │               │           │ Tokens      │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)] // TODO: document enum variants before publishing

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the toolkit
pub mod error;

/// Common types and type aliases
pub mod types;

/// Configuration for inference, generation, and execution
pub mod config;

/// Schema inference from sampled documents
pub mod schema;

/// SDL generation from an inferred schema
pub mod sdl;

/// Array operation processing
pub mod array_ops;

/// Document container abstraction
pub mod store;

/// Mutation execution and resolver construction
pub mod resolver;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
