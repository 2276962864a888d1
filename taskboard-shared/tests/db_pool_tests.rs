/// Integration tests for the database connection pool
///
/// File-backed tests use a temporary directory per test, in-memory tests use
/// `sqlite::memory:`. Run with: cargo test --test db_pool_tests

use taskboard_shared::db::pool::{close_pool, create_pool, get_pool_stats, health_check, DatabaseConfig};
use taskboard_shared::Store;
use tempfile::TempDir;

/// Helper to build a config for a fresh database file
fn file_config(dir: &TempDir, max_connections: u32) -> DatabaseConfig {
    DatabaseConfig {
        url: format!("sqlite://{}", dir.path().join("tasks.db").display()),
        max_connections,
        connect_timeout_seconds: 1,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_create_pool_creates_file() {
    let dir = TempDir::new().unwrap();
    let config = file_config(&dir, 2);

    let pool = create_pool(config).await.expect("Failed to create pool");
    assert!(dir.path().join("tasks.db").exists());

    let stats = get_pool_stats(&pool);
    assert!(stats.total_connections > 0, "Pool should have at least one connection");

    close_pool(pool).await;
}

#[tokio::test]
async fn test_create_pool_without_create_if_missing() {
    let dir = TempDir::new().unwrap();
    let config = DatabaseConfig {
        create_if_missing: false,
        ..file_config(&dir, 1)
    };

    let result = create_pool(config).await;
    assert!(result.is_err(), "Should fail when the file does not exist");
}

#[tokio::test]
async fn test_create_pool_in_missing_directory() {
    let dir = TempDir::new().unwrap();
    let config = DatabaseConfig {
        url: format!("sqlite://{}", dir.path().join("missing").join("tasks.db").display()),
        ..Default::default()
    };

    assert!(create_pool(config).await.is_err(), "SQLite does not create directories");
}

#[tokio::test]
async fn test_health_check_success() {
    let pool = create_pool(DatabaseConfig::in_memory())
        .await
        .expect("Failed to create pool");

    assert!(health_check(&pool).await.is_ok(), "Health check should succeed");

    close_pool(pool).await;
}

#[tokio::test]
async fn test_in_memory_pool_is_capped_at_one_connection() {
    let config = DatabaseConfig {
        max_connections: 8,
        ..DatabaseConfig::in_memory()
    };

    let pool = create_pool(config).await.expect("Failed to create pool");

    sqlx::query("CREATE TABLE t (x INTEGER)")
        .execute(&pool)
        .await
        .unwrap();

    // Every query must land on the connection that owns the table
    for i in 0..10i64 {
        sqlx::query("INSERT INTO t (x) VALUES (?)")
            .bind(i)
            .execute(&pool)
            .await
            .unwrap();
    }

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM t")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count.0, 10);
    assert_eq!(get_pool_stats(&pool).total_connections, 1);

    close_pool(pool).await;
}

#[tokio::test]
async fn test_pool_concurrent_queries() {
    let dir = TempDir::new().unwrap();
    let pool = create_pool(file_config(&dir, 4))
        .await
        .expect("Failed to create pool");

    let mut handles = vec![];

    for i in 0..20i64 {
        let pool_clone = pool.clone();
        let handle = tokio::spawn(async move {
            let row: (i64,) = sqlx::query_as("SELECT ?")
                .bind(i)
                .fetch_one(&pool_clone)
                .await
                .expect("Failed to execute query");

            assert_eq!(row.0, i);
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.await.expect("Task panicked");
    }

    close_pool(pool).await;
}

#[tokio::test]
async fn test_get_pool_stats() {
    let pool = create_pool(DatabaseConfig::in_memory())
        .await
        .expect("Failed to create pool");

    let stats = get_pool_stats(&pool);
    assert_eq!(stats.total_connections, 1);
    assert_eq!(stats.active_connections, 0);

    let _conn = pool.acquire().await.expect("Failed to acquire connection");

    let stats_with_active = get_pool_stats(&pool);
    assert_eq!(stats_with_active.active_connections, 1);
    assert_eq!(stats_with_active.idle_connections, 0);

    drop(_conn);
    close_pool(pool).await;
}

#[tokio::test]
async fn test_close_pool() {
    let pool = create_pool(DatabaseConfig::in_memory())
        .await
        .expect("Failed to create pool");

    close_pool(pool.clone()).await;

    let result: Result<(i64,), _> = sqlx::query_as("SELECT 1").fetch_one(&pool).await;
    assert!(result.is_err(), "Queries should fail after pool is closed");
}

#[tokio::test]
async fn test_pool_exhaustion_timeout() {
    let dir = TempDir::new().unwrap();
    let pool = create_pool(file_config(&dir, 1))
        .await
        .expect("Failed to create pool");

    let _conn = pool.acquire().await.expect("Failed to acquire connection");

    let start = std::time::Instant::now();
    let result = pool.acquire().await;

    assert!(result.is_err(), "Should timeout when pool is exhausted");
    assert!(start.elapsed().as_millis() >= 900);

    drop(_conn);
    close_pool(pool).await;
}

#[tokio::test]
async fn test_file_store_survives_reopen() {
    let dir = TempDir::new().unwrap();

    let store = Store::open(file_config(&dir, 1)).await.unwrap();
    let user = taskboard_shared::models::User::new("alice", "alice@example.com", "admin").unwrap();
    let id = store.insert_user(&user).await.unwrap();
    store.close().await;

    let reopened = Store::open(file_config(&dir, 1)).await.unwrap();
    let record = reopened.get_user_by_id(id).await.unwrap().unwrap();
    assert_eq!(record.username, "alice");
    assert!(reopened.schema_status().await.unwrap().is_complete());
    reopened.close().await;
}
