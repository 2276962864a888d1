//! # Taskboard Shared Library
//!
//! This crate contains the domain model, persistence and business rules of
//! the task tracker. Presentation layers (the `taskboard` CLI, a GUI) build
//! on the services exported here.
//!
//! ## Module Organization
//!
//! - `models`: Users, projects and tasks with their validation rules
//! - `db`: SQLite pool, schema and the [`Store`] handle
//! - `services`: Entity-level operations over a store
//! - `progress`: Project progress derivation
//! - `timestamp`: Timestamp parsing and at-rest format
//! - `error`: Common error types

pub mod db;
pub mod error;
pub mod models;
pub mod progress;
pub mod services;
pub mod timestamp;

pub use db::store::Store;
pub use error::{StoreError, ValidationError};

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
