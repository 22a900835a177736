//! tabula schema - the authoritative table-definition cache
//!
//! This crate provides:
//! - `SchemaCache`, the cached definition of every table
//! - `CacheSynchronizer`, the `SchemaSync` implementation that keeps the
//!   cache in step with the backend after each mutation
//! - `SchemaLoader`, the seam through which definitions are read

mod cache;
mod sync;

pub use cache::SchemaCache;
pub use sync::{CacheSynchronizer, SchemaLoader};
