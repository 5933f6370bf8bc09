use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use tracing::info;

use crate::config::DatabaseSettings;

pub async fn create_pool(settings: &DatabaseSettings) -> Result<MySqlPool, sqlx::Error> {
    info!(
        "Connecting to database {} at {}:{} (pool size {})...",
        settings.database, settings.host, settings.port, settings.pool_size
    );

    let options = MySqlConnectOptions::new()
        .host(&settings.host)
        .port(settings.port)
        .username(&settings.user)
        .password(&settings.password)
        .database(&settings.database);

    // Callers wait at most `acquire_timeout` for a free connection, then get PoolTimedOut
    let pool = MySqlPoolOptions::new()
        .max_connections(settings.pool_size)
        .acquire_timeout(settings.acquire_timeout)
        .connect_with(options)
        .await?;

    info!("Database connection established");

    Ok(pool)
}

pub async fn run_migrations(pool: &MySqlPool) -> Result<(), sqlx::Error> {
    info!("Running database migrations...");

    let migrations = [
        include_str!("../../migrations/001_guilds.sql"),
        include_str!("../../migrations/002_punishment_actions.sql"),
        include_str!("../../migrations/003_role_assignments.sql"),
        include_str!("../../migrations/004_temp_roles.sql"),
    ];

    for (i, migration) in migrations.iter().enumerate() {
        info!("Running migration {}", i + 1);
        // MySQL prepares one statement at a time
        for statement in migration.split(';') {
            let statement = statement.trim();
            if !statement.is_empty() {
                if let Err(e) = sqlx::query(statement).execute(pool).await {
                    // Ignore "already exists" errors
                    let err_str = e.to_string();
                    if !err_str.contains("already exists") && !err_str.contains("Duplicate key name") {
                        return Err(e);
                    }
                }
            }
        }
    }

    info!("Migrations completed successfully");
    Ok(())
}
