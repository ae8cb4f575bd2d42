//! Todo API Shared Library
//!
//! This crate contains the wire types, domain models, validation rules and
//! error enums shared by the backend and its clients.

pub mod errors;
pub mod models;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use models::{Todo, TokenPurpose, TokenRecord, User};
pub use types::*;
