//! Credentials, bearer tokens and role permissions.

pub mod extractor;
pub mod handlers;
pub mod password;
pub mod permissions;
pub mod token;

pub use extractor::AuthUser;
