/// Database layer for the task tracker
///
/// This module provides the SQLite connection pool, the schema and the
/// [`store::Store`] handle with CRUD and query operations for every table.
///
/// # Modules
///
/// - `pool`: SQLite connection pool management with health checks
/// - `schema`: Table definitions, created idempotently on open
/// - `store`: The store handle, update allow-lists and shared statements
/// - `fields`: Column/value sets for updates
/// - `users`, `projects`, `tasks`: Per-table operations on `Store`
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::db::pool::DatabaseConfig;
/// use taskboard_shared::db::store::Store;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: "sqlite://database/tasks.db".to_string(),
///         ..Default::default()
///     };
///
///     let store = Store::open(config).await?;
///     println!("{} tasks", store.get_all_tasks().await?.len());
///     store.close().await;
///     Ok(())
/// }
/// ```

mod decode;
pub mod fields;
pub mod pool;
pub mod projects;
pub mod schema;
pub mod store;
pub mod tasks;
pub mod users;
