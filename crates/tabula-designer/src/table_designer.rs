//! Table designer for tabula
//!
//! Edits a table's definition and applies the edit to a backend that only
//! understands imperative `DEFINE`/`REMOVE` statements.
//!
//! ## Features
//!
//! - Typed definition model: table attributes, fields, indexes, events
//! - Validation gating the save action
//! - Diff compiler turning (baseline, draft) into an ordered statement batch
//! - Edit session state machine with save, revert, close and invalidation
//! - Session events for observers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tabula_designer::{DesignerConfig, EditSession, FieldDefinition};
//!
//! let session = EditSession::open(baseline, executor, sync, &DesignerConfig::default());
//! session.edit(|def| def.fields.push(FieldDefinition::named("nick").kind("string")))?;
//! println!("{}", session.preview_script());
//! session.save().await?;
//! ```

pub mod config;
pub mod events;
pub mod models;
pub mod service;
pub mod session;

mod error;

// Re-exports for convenience
pub use config::{CompileOptions, DesignerConfig, ObservedFieldPolicy};
pub use error::{DesignerError, DesignerResult};
pub use events::SessionEvent;
pub use models::{
    Changefeed, DistanceMetric, EventDefinition, FieldDefinition, FieldOrigin, FieldPermissions,
    IndexDefinition, IndexKind, Permissions, TableDefinition, TableKind, TableSchema,
    ValidationError, ValidationPolicy, VectorAlgorithm, validate,
};
pub use service::{DdlCompiler, DdlStatement, StatementTarget, compile, preview_script};
pub use session::{EditSession, SaveStatus, SessionOperation, SessionState};
