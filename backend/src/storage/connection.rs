use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{migrate::MigrateDatabase, Row, Sqlite, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

/// The database URL used when nothing is configured
pub const DEFAULT_DATABASE_URL: &str = "sqlite:instance/vaxguard.db";

/// DbConnection manages the SQLite pool and schema
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Create a new database connection, creating the database file if needed
    pub async fn new(url: &str) -> Result<Self> {
        ensure_parent_dir(url)?;

        // Create database if it doesn't exist
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            info!("Creating database at {}", url);
            Sqlite::create_database(url).await?
        }

        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Initialize a test database with a unique name
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("sqlite:file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url).await
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Drop every table and recreate the schema from scratch
    pub async fn reset(&self) -> Result<()> {
        warn!("Dropping all tables");
        for table in ["vaccinations", "children", "parents"] {
            sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
                .execute(self.pool())
                .await?;
        }
        Self::setup_schema(self.pool()).await
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS parents (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                age INTEGER,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS children (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                parent_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                dob TEXT NOT NULL,
                country TEXT DEFAULT 'India',
                created_at TEXT NOT NULL,
                FOREIGN KEY (parent_id) REFERENCES parents (id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_children_parent_id
            ON children(parent_id);
            "#,
        )
        .execute(pool)
        .await?;

        Self::ensure_country_column(pool).await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS vaccinations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                child_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                due_date TEXT NOT NULL,
                completed_at TEXT,
                created_at TEXT NOT NULL,
                FOREIGN KEY (child_id) REFERENCES children (id) ON DELETE CASCADE,
                CONSTRAINT uq_child_vaccine_name UNIQUE (child_id, name)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_vaccinations_child_id
            ON vaccinations(child_id);
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Databases created before schedules were country-specific lack the
    /// `country` column; add it and backfill the old default.
    async fn ensure_country_column(pool: &SqlitePool) -> Result<()> {
        let columns = sqlx::query("PRAGMA table_info(children)")
            .fetch_all(pool)
            .await?;

        let has_country = columns
            .iter()
            .any(|row| row.get::<String, _>("name") == "country");

        if !has_country {
            info!("Migrating children table: adding country column");
            sqlx::query("ALTER TABLE children ADD COLUMN country TEXT")
                .execute(pool)
                .await?;
            sqlx::query("UPDATE children SET country = 'India' WHERE country IS NULL")
                .execute(pool)
                .await?;
        }

        Ok(())
    }
}

/// Make sure the directory holding a file-backed SQLite database exists
fn ensure_parent_dir(url: &str) -> Result<()> {
    let path = url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    let path = path.split('?').next().unwrap_or_default();

    if path.is_empty() || path == ":memory:" || path.starts_with("file:") {
        return Ok(());
    }

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            info!("Creating database directory {}", parent.display());
            std::fs::create_dir_all(parent)?;
        }
    }

    Ok(())
}
