//! # JsonApi Core
//!
//! Protocol-level types shared by the JsonApi crates: the JSON:API error
//! object model, the HTTP request abstraction, the parsed query-parameters
//! model, and the resource schema metadata traits.
//!
//! This crate knows nothing about validation rules; it only describes the
//! protocol surface that the validation layer (`jsonapi-validate`) builds on.

mod error;
mod query;
mod request;
mod schema;

// Public API
pub use error::{ErrorObject, ErrorSource};
pub use query::QueryParameters;
pub use request::Request;
pub use schema::{FieldKind, ResourceSchema, SchemaContainer};
