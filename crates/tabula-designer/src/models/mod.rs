//! Models for table definitions
//!
//! Plain data describing a table's full definition: table-wide attributes,
//! fields, indexes and events, plus the validation rules that gate saving.

mod event_definition;
mod field_definition;
mod index_definition;
mod table_definition;
mod table_schema;
mod validation;

pub use event_definition::EventDefinition;
pub use field_definition::{FieldDefinition, FieldOrigin, FieldPermissions};
pub use index_definition::{DistanceMetric, IndexDefinition, IndexKind, VectorAlgorithm};
pub use table_definition::TableDefinition;
pub use table_schema::{Changefeed, Permissions, TableKind, TableSchema};
pub use validation::{ValidationError, ValidationPolicy, validate};
