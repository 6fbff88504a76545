use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::{
    configuration::NoteAccessPolicy,
    errors::ApiError,
    models::note::{NewNote, NoteChanges, NoteModel},
    store::NoteStore,
};

#[derive(Clone, Debug)]
pub struct NoteService {
    repo: Arc<dyn NoteStore>,
    access: NoteAccessPolicy,
}

impl NoteService {
    pub fn new(repo: Arc<dyn NoteStore>, access: NoteAccessPolicy) -> Self {
        Self { repo, access }
    }

    #[instrument(name = "Service: List notes", skip(self))]
    pub async fn list_for(&self, user_id: Uuid) -> Result<Vec<NoteModel>, ApiError> {
        self.repo.list_by_user(user_id).await.map_err(internal)
    }

    #[instrument(name = "Service: Create note", skip(self, title, content))]
    pub async fn create(
        &self,
        user_id: Uuid,
        title: String,
        content: String,
    ) -> Result<Option<NoteModel>, ApiError> {
        let note = NewNote {
            title,
            content,
            user_id,
            created_at: chrono::Utc::now(),
        };
        let id = self.repo.create(&note).await.map_err(internal)?;
        self.repo.find(id).await.map_err(internal)
    }

    /// Returns the row as it reads after the update, `None` if it does not exist.
    #[instrument(name = "Service: Update note", skip(self, title, content))]
    pub async fn update(
        &self,
        caller: Uuid,
        note_id: Uuid,
        title: Option<String>,
        content: Option<String>,
    ) -> Result<Option<NoteModel>, ApiError> {
        self.check_access(caller, note_id).await?;

        let changes = NoteChanges {
            title,
            content,
            updated_at: chrono::Utc::now(),
        };
        self.repo
            .update(note_id, &changes)
            .await
            .map_err(internal)?;
        self.repo.find(note_id).await.map_err(internal)
    }

    /// Returns the row as it read before deletion, `None` if it did not exist.
    #[instrument(name = "Service: Delete note", skip(self))]
    pub async fn delete(&self, caller: Uuid, note_id: Uuid) -> Result<Option<NoteModel>, ApiError> {
        let snapshot = self.repo.find(note_id).await.map_err(internal)?;
        if let Some(note) = &snapshot {
            self.ensure_allowed(caller, note)?;
        }
        self.repo.delete(note_id).await.map_err(internal)?;
        Ok(snapshot)
    }

    async fn check_access(&self, caller: Uuid, note_id: Uuid) -> Result<(), ApiError> {
        if self.access == NoteAccessPolicy::Shared {
            return Ok(());
        }
        match self.repo.find(note_id).await.map_err(internal)? {
            Some(note) => self.ensure_allowed(caller, &note),
            None => Ok(()),
        }
    }

    fn ensure_allowed(&self, caller: Uuid, note: &NoteModel) -> Result<(), ApiError> {
        match self.access {
            NoteAccessPolicy::Shared => Ok(()),
            NoteAccessPolicy::OwnerOnly if note.user_id == caller => Ok(()),
            NoteAccessPolicy::OwnerOnly => {
                tracing::warn!(owner = %note.user_id, "Rejected change to a note owned by another user");
                Err(ApiError::Forbidden)
            }
        }
    }
}

fn internal(e: anyhow::Error) -> ApiError {
    tracing::error!("Note store failure: {:?}", e);
    ApiError::Internal
}
