//! Document container abstraction
//!
//! Defines the four-capability [`DocumentStore`] trait consumed by sampling
//! and the mutation executor, plus an in-memory reference implementation.

mod memory;
mod types;

pub use memory::{
    MemoryStore, DELETE_CHARGE, QUERY_BASE_CHARGE, QUERY_ITEM_CHARGE, READ_CHARGE, WRITE_CHARGE,
};
pub use types::{DocumentStore, ItemResponse, QueryResponse, QuerySpec, WriteCondition};
