//! Specification document model and loading.
//!
//! Template files of an `_each` type iterate over the entity collections of a
//! [`SpecDocument`]: API groups, operations, models and enums.

pub mod loader;
pub mod parser;
pub mod types;

pub use loader::{CompositeSpecLoader, DocumentFormat, FileSpecLoader, HttpSpecLoader, SpecLoader};
pub use parser::{DEFAULT_API_GROUP, HttpMethod, OpenApiParser};
pub use types::*;
