use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{OptionalExtension, Row, params};
use tokio_rusqlite::Connection;

use super::{CREATE_TABLE_SQLITE, NoteRepository, RepositoryError};
use crate::models::Note;

const SELECT_ALL: &str = "SELECT id, note, date FROM notes ORDER BY date DESC, id DESC";
const SELECT_ONE: &str = "SELECT id, note, date FROM notes WHERE id = ?1";
const INSERT: &str = "INSERT INTO notes (note, date) VALUES (?1, ?2)";
const UPDATE: &str = "UPDATE notes SET note = ?1, date = ?2 WHERE id = ?3";
const DELETE: &str = "DELETE FROM notes WHERE id = ?1";

/// Row as stored, with the date still in its text form.
type RawNote = (i64, String, String);

/// Notes stored in an embedded SQLite file.
///
/// Dates are kept as RFC 3339 UTC text with a fixed number of fractional
/// digits so that ordering by the column is chronological.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    pub async fn open(path: &str) -> Result<Self, RepositoryError> {
        let conn = Connection::open(path).await?;
        Ok(Self { conn })
    }

    /// Private database that lives as long as the repository.
    #[cfg(test)]
    pub async fn open_in_memory() -> Result<Self, RepositoryError> {
        let conn = Connection::open_in_memory().await?;
        Ok(Self { conn })
    }
}

fn format_date(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn raw_note(row: &Row<'_>) -> rusqlite::Result<RawNote> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
}

fn note_from_raw((id, note, date): RawNote) -> Result<Note, RepositoryError> {
    let date = DateTime::parse_from_rfc3339(&date)
        .map_err(|source| RepositoryError::Corrupt { id, source })?
        .with_timezone(&Utc);

    Ok(Note { id, note, date })
}

#[async_trait]
impl NoteRepository for SqliteRepository {
    async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        self.conn
            .call(|conn| {
                conn.execute_batch(CREATE_TABLE_SQLITE)?;
                Ok(())
            })
            .await?;

        Ok(())
    }

    async fn list_notes(&self) -> Result<Vec<Note>, RepositoryError> {
        let rows = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare(SELECT_ALL)?;
                let rows = stmt
                    .query_map([], raw_note)?
                    .collect::<rusqlite::Result<Vec<RawNote>>>()?;
                Ok(rows)
            })
            .await?;

        rows.into_iter().map(note_from_raw).collect()
    }

    async fn get_note(&self, id: i64) -> Result<Option<Note>, RepositoryError> {
        let row = self
            .conn
            .call(move |conn| Ok(conn.query_row(SELECT_ONE, [id], raw_note).optional()?))
            .await?;

        row.map(note_from_raw).transpose()
    }

    async fn insert_note(&self, note: &str, date: DateTime<Utc>) -> Result<(), RepositoryError> {
        let note = note.to_owned();
        let date = format_date(date);

        self.conn
            .call(move |conn| {
                conn.execute(INSERT, params![note, date])?;
                Ok(())
            })
            .await?;

        Ok(())
    }

    async fn update_note(
        &self,
        id: i64,
        note: &str,
        date: DateTime<Utc>,
    ) -> Result<u64, RepositoryError> {
        let note = note.to_owned();
        let date = format_date(date);

        let rows = self
            .conn
            .call(move |conn| Ok(conn.execute(UPDATE, params![note, date, id])?))
            .await?;

        Ok(rows as u64)
    }

    async fn delete_note(&self, id: i64) -> Result<u64, RepositoryError> {
        let rows = self
            .conn
            .call(move |conn| Ok(conn.execute(DELETE, [id])?))
            .await?;

        Ok(rows as u64)
    }
}
