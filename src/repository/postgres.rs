use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_postgres::{Client, NoTls, Row};

use super::{CREATE_TABLE_POSTGRES, NoteRepository, RepositoryError};
use crate::models::Note;

pub struct PostgresRepository {
    client: Client,
}

impl PostgresRepository {
    pub async fn connect(database_dsn: &str) -> Result<Self, RepositoryError> {
        let (client, con) = tokio_postgres::connect(database_dsn, NoTls).await?;

        tokio::spawn(async move {
            if let Err(e) = con.await {
                tracing::error!("connection error: {}", e);
            }
        });

        Ok(Self { client })
    }
}

fn note_from_row(row: &Row) -> Note {
    Note {
        id: row.get("id"),
        note: row.get("note"),
        date: row.get("date"),
    }
}

#[async_trait]
impl NoteRepository for PostgresRepository {
    async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        self.client.batch_execute(CREATE_TABLE_POSTGRES).await?;
        Ok(())
    }

    async fn list_notes(&self) -> Result<Vec<Note>, RepositoryError> {
        let rows = self
            .client
            .query(
                "SELECT id, note, date FROM notes ORDER BY date DESC, id DESC",
                &[],
            )
            .await?;

        Ok(rows.iter().map(note_from_row).collect())
    }

    async fn get_note(&self, id: i64) -> Result<Option<Note>, RepositoryError> {
        let row = self
            .client
            .query_opt("SELECT id, note, date FROM notes WHERE id = $1", &[&id])
            .await?;

        Ok(row.as_ref().map(note_from_row))
    }

    async fn insert_note(&self, note: &str, date: DateTime<Utc>) -> Result<(), RepositoryError> {
        self.client
            .execute(
                "INSERT INTO notes (note, date) VALUES ($1, $2)",
                &[&note, &date],
            )
            .await?;

        Ok(())
    }

    async fn update_note(
        &self,
        id: i64,
        note: &str,
        date: DateTime<Utc>,
    ) -> Result<u64, RepositoryError> {
        let rows = self
            .client
            .execute(
                "UPDATE notes SET note = $1, date = $2 WHERE id = $3",
                &[&note, &date, &id],
            )
            .await?;

        Ok(rows)
    }

    async fn delete_note(&self, id: i64) -> Result<u64, RepositoryError> {
        let rows = self
            .client
            .execute("DELETE FROM notes WHERE id = $1", &[&id])
            .await?;

        Ok(rows)
    }
}
