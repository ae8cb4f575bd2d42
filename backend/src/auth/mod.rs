//! Authentication module
//!
//! bcrypt password hashing, HS256 bearer tokens and the request gate that
//! turns an `x-auth` header into an [`AuthenticatedIdentity`].

mod middleware;
mod password;
mod token;

pub use middleware::{authenticate, AuthenticatedIdentity, AUTH_HEADER};
pub use password::PasswordService;
pub use token::{Claims, TokenCodec};
