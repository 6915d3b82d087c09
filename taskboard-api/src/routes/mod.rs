/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login, refresh)
/// - `users`: User directory endpoints
/// - `projects`: Project CRUD and membership endpoints
/// - `tasks`: Task CRUD and lifecycle endpoints

pub mod auth;
pub mod health;
pub mod projects;
pub mod tasks;
pub mod users;
