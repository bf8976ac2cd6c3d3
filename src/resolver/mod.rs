//! Mutation execution and resolver construction
//!
//! # Features
//!
//! - **Optimistic Concurrency**: conditional writes on caller-supplied tokens
//! - **Soft Delete**: idempotent marker semantics with restoration
//! - **Array Deltas**: update fields route through the array operation processor
//! - **Batch Execution**: independent items, structured partial failure
//! - **Resolver Map**: operation name to executable async resolver

mod builder;
mod mutations;
mod types;

pub use builder::ResolverBuilder;
pub use mutations::MutationExecutor;
pub use types::{
    BatchFailure, BatchPayload, CounterPayload, DeletePayload, ItemPayload, ResolverFn,
    ResolverMap, UpsertPayload,
};

#[cfg(test)]
mod tests;
