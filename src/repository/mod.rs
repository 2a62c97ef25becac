mod postgres;
mod sqlite;

pub use postgres::PostgresRepository;
pub use sqlite::SqliteRepository;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use std::sync::Arc;

use crate::{config::DatabaseConfig, models::Note};

const CREATE_TABLE_SQLITE: &str = "CREATE TABLE IF NOT EXISTS notes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    note TEXT NOT NULL,
    date TIMESTAMP NOT NULL
)";

const CREATE_TABLE_POSTGRES: &str = "CREATE TABLE IF NOT EXISTS notes (
    id BIGSERIAL PRIMARY KEY,
    note TEXT NOT NULL,
    date TIMESTAMPTZ NOT NULL
)";

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] tokio_rusqlite::Error),

    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("note {id} has an unreadable date: {source}")]
    Corrupt {
        id: i64,
        source: chrono::ParseError,
    },
}

/// Persistence for the `notes` table.
///
/// Every statement binds its values as parameters. `update` and `delete`
/// report how many rows they touched and leave the interpretation of zero to
/// the caller.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Creates the `notes` table if it does not exist yet.
    async fn ensure_schema(&self) -> Result<(), RepositoryError>;

    /// All notes, most recently written first.
    async fn list_notes(&self) -> Result<Vec<Note>, RepositoryError>;

    async fn get_note(&self, id: i64) -> Result<Option<Note>, RepositoryError>;

    async fn insert_note(&self, note: &str, date: DateTime<Utc>) -> Result<(), RepositoryError>;

    async fn update_note(
        &self,
        id: i64,
        note: &str,
        date: DateTime<Utc>,
    ) -> Result<u64, RepositoryError>;

    async fn delete_note(&self, id: i64) -> Result<u64, RepositoryError>;
}

/// Opens the configured backend and makes sure the schema is in place.
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn NoteRepository>, RepositoryError> {
    let repo: Arc<dyn NoteRepository> = match config {
        DatabaseConfig::Sqlite { path } => {
            tracing::info!("Opening SQLite database at {}", path);
            Arc::new(SqliteRepository::open(path).await?)
        }
        DatabaseConfig::Postgres { dsn } => {
            tracing::info!("Connecting to PostgreSQL");
            Arc::new(PostgresRepository::connect(dsn).await?)
        }
    };

    repo.ensure_schema().await?;
    tracing::info!("Notes table is ready");

    Ok(repo)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_opens_sqlite_file_and_creates_table() {
        let path = std::env::temp_dir().join(format!(
            "thunder-notes-connect-{}-{}.sdb",
            std::process::id(),
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let config = DatabaseConfig::Sqlite {
            path: path.to_string_lossy().into_owned(),
        };

        let repo = connect(&config).await.unwrap();
        repo.insert_note("persisted", Utc::now()).await.unwrap();
        drop(repo);

        // Schema creation is idempotent and the row survives a reopen
        let repo = connect(&config).await.unwrap();
        let notes = repo.list_notes().await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].note, "persisted");

        drop(repo);
        let _ = std::fs::remove_file(path);
    }
}
