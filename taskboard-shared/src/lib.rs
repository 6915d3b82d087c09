//! # Taskboard Shared Library
//!
//! This crate contains the shared types and business logic used by the
//! Taskboard API server: database models, authentication primitives, and
//! the authorization checks that gate project and task mutations.
//!
//! ## Module Organization
//!
//! - `models`: Database models and the task status/progress coupling
//! - `auth`: Passwords, JWT tokens, auth middleware, authorization checks
//! - `db`: Connection pooling and migrations

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
