//! Service layer for user management.
//! - Owns the duplicate-prevention and update rules.
//! - Talks to storage only through the `UserRepository` contract.
//! - Shapes persisted users into their outward representation.

pub mod errors;
pub mod user;
#[cfg(test)]
pub mod test_support;

pub use errors::ServiceError;
pub use user::UserService;
