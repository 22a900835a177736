//! tabula Services Layer
//!
//! This crate provides the service layer that sits between a designer
//! surface and the domain logic.
//!
//! # Architecture
//!
//! ```text
//! Designer surface (tabula-cli, UI)
//!     ↓
//! Service Layer (tabula-services) ← This crate
//!     ↓
//! Domain Layer (tabula-designer, tabula-schema)
//!     ↓
//! Infrastructure Layer (tabula-core: executor, schema sync)
//! ```
//!
//! # Services
//!
//! - [`TableDesignService`] - Edit sessions, table creation and removal,
//!   statement preview

mod error;
mod table_design_service;

pub use error::{ServiceError, ServiceResult};
pub use table_design_service::TableDesignService;

// Re-export designer types used in service signatures
pub use tabula_designer::{
    DesignerConfig, DesignerError, EditSession, SaveStatus, SessionEvent, SessionState,
    TableDefinition,
};
