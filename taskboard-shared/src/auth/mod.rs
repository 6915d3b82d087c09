/// Authentication and authorization utilities
///
/// This module provides the security primitives for Taskboard:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and validation
/// - [`jwt`]: JWT token generation and validation
/// - [`middleware`]: The authenticated-caller context carried by requests
/// - [`authorization`]: Owner/member access checks for projects and tasks
///
/// # Design
///
/// The resolved caller is always passed explicitly: the JWT layer in the API
/// server turns a Bearer token into an [`middleware::AuthContext`], and every
/// authorization check takes the caller's user id as an argument. Nothing in
/// this crate reads identity from ambient state.

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
