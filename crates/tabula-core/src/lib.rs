//! tabula core - shared abstractions for the table designer
//!
//! This crate provides the seams the designer depends on without knowing
//! anything about the backend:
//!
//! - `StatementExecutor` - runs an ordered batch of definition statements
//! - `SchemaSync` - refreshes the application's cached table list
//! - Identifier and literal quoting for generated statements
//! - `TabulaError` and the shared `Result` alias

mod error;
mod executor;
pub mod ident;
mod schema_sync;

pub use error::*;
pub use executor::*;
pub use schema_sync::*;
