//! Entity services
//!
//! A service holds a [`Store`](crate::db::store::Store) clone and works in
//! domain entities: it validates through the models, writes through the
//! store and rebuilds entities from the records it reads back. These are the
//! operations a presentation layer (GUI, CLI) calls.

pub mod projects;
pub mod tasks;
pub mod users;

pub use projects::ProjectService;
pub use tasks::{TaskFilter, TaskService};
pub use users::UserService;
