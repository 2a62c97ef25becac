use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::models::Note;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NoteResponse {
    /// Note ID
    pub id: i64,
    /// Note text
    pub note: String,
    /// Time of the last write, ISO-8601 in UTC
    pub date: DateTime<Utc>,
}

impl From<Note> for NoteResponse {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            note: note.note,
            date: note.date,
        }
    }
}

/// Body accepted by both create and update.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NoteRequest {
    /// Note text, must not be empty
    pub note: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("body is not a JSON object")]
    NotAnObject,

    #[error("note must be a non-empty string")]
    EmptyNote,
}

/// Validated note text taken from a request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotePayload {
    pub note: String,
}

impl NotePayload {
    /// Parses a raw body, regardless of its content type.
    ///
    /// A missing or null `note` field is read as an empty string and rejected
    /// along with an explicitly empty one.
    pub fn from_body(body: &[u8]) -> Result<Self, PayloadError> {
        let value: Value = serde_json::from_slice(body)?;
        if !value.is_object() {
            return Err(PayloadError::NotAnObject);
        }

        let request: NoteRequest = serde_json::from_value(value)?;
        let note = request.note.unwrap_or_default();
        if note.is_empty() {
            return Err(PayloadError::EmptyNote);
        }

        Ok(Self { note })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_object_with_note() {
        let payload = NotePayload::from_body(br#"{"note":"buy milk"}"#).unwrap();
        assert_eq!(payload.note, "buy milk");
    }

    #[test]
    fn ignores_unknown_fields() {
        let payload =
            NotePayload::from_body(br#"{"note":"buy milk","date":"1999-01-01T00:00:00Z","id":7}"#)
                .unwrap();
        assert_eq!(payload.note, "buy milk");
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            NotePayload::from_body(b"{\"note\":"),
            Err(PayloadError::Json(_))
        ));
        assert!(matches!(
            NotePayload::from_body(b""),
            Err(PayloadError::Json(_))
        ));
    }

    #[test]
    fn rejects_non_object_json() {
        let bodies: [&[u8]; 4] = [br#"["note"]"#, br#""note""#, b"42", b"null"];
        for body in bodies {
            assert!(matches!(
                NotePayload::from_body(body),
                Err(PayloadError::NotAnObject)
            ));
        }
    }

    #[test]
    fn missing_or_null_note_is_empty() {
        let bodies: [&[u8]; 3] = [b"{}", br#"{"note":null}"#, br#"{"text":"x"}"#];
        for body in bodies {
            assert!(matches!(
                NotePayload::from_body(body),
                Err(PayloadError::EmptyNote)
            ));
        }
    }

    #[test]
    fn rejects_empty_note() {
        assert!(matches!(
            NotePayload::from_body(br#"{"note":""}"#),
            Err(PayloadError::EmptyNote)
        ));
    }

    #[test]
    fn rejects_non_string_note() {
        assert!(NotePayload::from_body(br#"{"note":12}"#).is_err());
        assert!(NotePayload::from_body(br#"{"note":["a"]}"#).is_err());
    }

    #[test]
    fn response_serializes_date_as_iso_string() {
        let date = DateTime::parse_from_rfc3339("2024-05-01T10:20:30Z")
            .unwrap()
            .with_timezone(&Utc);
        let json = serde_json::to_value(NoteResponse {
            id: 3,
            note: "x".to_string(),
            date,
        })
        .unwrap();

        assert_eq!(json["id"], 3);
        assert_eq!(json["note"], "x");
        assert_eq!(json["date"], "2024-05-01T10:20:30Z");
    }
}
