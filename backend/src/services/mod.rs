//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! repositories and the auth primitives.

pub mod todo;
pub mod user;

pub use todo::TodoService;
pub use user::{Account, UserDirectory};
