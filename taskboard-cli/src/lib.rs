//! # Taskboard CLI Library
//!
//! This library provides the command line front end of the task tracker.
//!
//! ## Modules
//!
//! - `commands`: Argument definitions and dispatch onto the services
//! - `config`: Configuration management
//! - `render`: Table, detail and JSON output

pub mod commands;
pub mod config;
pub mod render;
