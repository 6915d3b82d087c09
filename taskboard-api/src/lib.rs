//! # Taskboard API Server Library
//!
//! This library provides the core functionality for the Taskboard API
//! server: an HTTP surface over the project/task tracker in
//! `taskboard-shared`.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
