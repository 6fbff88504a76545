use axum::extract::{Path, State};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use crate::envelope::Envelope;
use crate::errors::ApiError;
use crate::models::note::NoteModel;
use crate::routes::ApiJson;
use crate::services::token::Claims;
use crate::startup::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateNotePayload {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNotePayload {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[instrument(name = "HTTP: List notes", skip(state, claims), fields(user_id = %claims.user_id))]
pub async fn list_notes(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Envelope<Vec<NoteModel>>, ApiError> {
    let notes = state.note_service.list_for(claims.user_id).await?;
    Ok(Envelope::ok("Notes fetched successfully", Some(notes)))
}

#[instrument(
    name = "HTTP: Create note",
    skip(state, claims, payload),
    fields(user_id = %claims.user_id)
)]
pub async fn create_note(
    State(state): State<AppState>,
    claims: Claims,
    ApiJson(payload): ApiJson<CreateNotePayload>,
) -> Result<Envelope<NoteModel>, ApiError> {
    let note = state
        .note_service
        .create(claims.user_id, payload.title, payload.content)
        .await?;
    Ok(Envelope::ok("Note created successfully", note))
}

#[instrument(
    name = "HTTP: Update note",
    skip(state, claims, payload),
    fields(user_id = %claims.user_id)
)]
pub async fn update_note(
    State(state): State<AppState>,
    claims: Claims,
    Path(note_id): Path<String>,
    ApiJson(payload): ApiJson<UpdateNotePayload>,
) -> Result<Envelope<NoteModel>, ApiError> {
    let note = match parse_note_id(&note_id) {
        Some(id) => {
            state
                .note_service
                .update(claims.user_id, id, payload.title, payload.content)
                .await?
        }
        None => None,
    };
    Ok(Envelope::ok("Note updated successfully", note))
}

#[instrument(name = "HTTP: Delete note", skip(state, claims), fields(user_id = %claims.user_id))]
pub async fn delete_note(
    State(state): State<AppState>,
    claims: Claims,
    Path(note_id): Path<String>,
) -> Result<Envelope<NoteModel>, ApiError> {
    let note = match parse_note_id(&note_id) {
        Some(id) => state.note_service.delete(claims.user_id, id).await?,
        None => None,
    };
    Ok(Envelope::ok("Note deleted successfully", note))
}

/// An id that cannot name a row is treated like one that names no row.
fn parse_note_id(raw: &str) -> Option<Uuid> {
    match Uuid::parse_str(raw) {
        Ok(id) => Some(id),
        Err(_) => {
            tracing::warn!(note_id = %raw, "Note id is not a UUID");
            None
        }
    }
}
