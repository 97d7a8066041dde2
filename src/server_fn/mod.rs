//! Server functions
//!
//! Validated, name-addressed operations returning a uniform response shape.
//! Each entity gets the same five functions from one generic service.

pub mod registry;
pub mod response;
pub mod service;

pub use registry::{ServerFn, ServerFunctions, TableRows};
pub use response::{InputValidationError, ServerResponse, parse_input};
pub use service::{Deleted, EntityService, parse_id};
