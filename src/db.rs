use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use log::{info, warn};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

/// Upper bound on concurrently open database connections
const MAX_CONNECTIONS: u32 = 25;
/// Connections older than this are closed and replaced the next time they're released
const CONNECTION_LIFETIME: Duration = Duration::from_secs(5 * 60);
/// How long a writer waits for another connection's write lock before giving up
const LOCK_WAIT: Duration = Duration::from_secs(5);

const DATA_DIR: &str = "data";
const DB_FILE_NAME: &str = "todos.db";

/// Computes the database location used when none is configured: `data/todos.db`, creating the
/// `data` directory if needed. Falls back to `todos.db` in the working directory if the
/// directory can't be created.
pub fn default_database_path() -> PathBuf {
    let data_dir = Path::new(DATA_DIR);
    match fs::create_dir_all(data_dir) {
        Ok(()) => data_dir.join(DB_FILE_NAME),
        Err(err) => {
            warn!("Could not create data directory {}: {err}", data_dir.display());
            PathBuf::from(DB_FILE_NAME)
        }
    }
}

/// Opens a connection pool to the SQLite database at [db_path], creating the file if it doesn't
/// exist yet. One connection is established eagerly so an unreachable database fails startup.
pub async fn connect_sqlx(db_path: &Path) -> Result<SqlitePool, anyhow::Error> {
    let connect_options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(LOCK_WAIT);

    let pool = SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .max_lifetime(CONNECTION_LIFETIME)
        .connect_with(connect_options)
        .await
        .with_context(|| format!("opening database at {}", db_path.display()))?;

    info!("Database connected successfully: {}", db_path.display());
    Ok(pool)
}

/// Applies the embedded schema migrations. Safe to run on every startup.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), anyhow::Error> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("running database migrations")?;

    info!("Migrations executed successfully");
    Ok(())
}
