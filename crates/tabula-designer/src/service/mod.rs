//! Service layer for table designer
//!
//! Compiles definition diffs into the statements that apply them.

mod ddl_compiler;
mod statement;

pub use ddl_compiler::{DdlCompiler, compile, preview_script};
pub use statement::{DdlStatement, StatementTarget};
