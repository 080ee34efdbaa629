//! User module: three-layer architecture (domain, repository, service).
//!
//! The repository trait is the persistence gateway; `repo::seaorm` is the
//! production implementation and `repository::mock` the in-memory one.

pub mod domain;
pub mod password;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::UserService;
