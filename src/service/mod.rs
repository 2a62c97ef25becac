use chrono::{DateTime, SubsecRound, Utc};

use std::sync::Arc;

use crate::{
    dto::{NotePayload, NoteResponse},
    repository::{NoteRepository, RepositoryError},
};

#[derive(Clone)]
pub struct NoteService {
    repo: Arc<dyn NoteRepository>,
}

/// Write timestamp, truncated to the microsecond precision both backends store.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

impl NoteService {
    pub fn new(repo: Arc<dyn NoteRepository>) -> Self {
        Self { repo }
    }

    pub async fn create_note(&self, payload: NotePayload) -> Result<(), RepositoryError> {
        self.repo.insert_note(&payload.note, now()).await
    }

    /// Overwrites the note at `id`. An id with no row is not an error.
    pub async fn update_note(&self, id: i64, payload: NotePayload) -> Result<(), RepositoryError> {
        let rows = self.repo.update_note(id, &payload.note, now()).await?;
        if rows == 0 {
            tracing::warn!("update of note {} matched no rows", id);
        }

        Ok(())
    }

    /// Removes the note at `id`. An id with no row is not an error.
    pub async fn delete_note(&self, id: i64) -> Result<(), RepositoryError> {
        let rows = self.repo.delete_note(id).await?;
        if rows == 0 {
            tracing::warn!("delete of note {} matched no rows", id);
        }

        Ok(())
    }

    pub async fn get_one_note(&self, id: i64) -> Result<Option<NoteResponse>, RepositoryError> {
        self.repo
            .get_note(id)
            .await
            .map(|note| note.map(NoteResponse::from))
    }

    pub async fn get_all_notes(&self) -> Result<Vec<NoteResponse>, RepositoryError> {
        self.repo
            .list_notes()
            .await
            .map(|notes| notes.into_iter().map(NoteResponse::from).collect())
    }
}
