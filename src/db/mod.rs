pub mod gateway;
pub mod models;
pub mod pool;
pub mod queries;

pub use gateway::{Database, SqlValue};

/// Connect to the database named by `DATABASE_URL` for ignored integration tests
#[cfg(test)]
pub(crate) async fn test_database() -> Database {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for database tests");
    let pool = sqlx::mysql::MySqlPoolOptions::new()
        .max_connections(4)
        .connect(&url)
        .await
        .expect("failed to connect to test database");
    pool::run_migrations(&pool)
        .await
        .expect("failed to run migrations");
    Database::new(pool)
}
