use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use tracing::instrument;
use uuid::Uuid;

use crate::models::note::{NewNote, NoteChanges, NoteModel};
use crate::store::NoteStore;

#[derive(Clone, Debug)]
pub struct NoteRepository {
    pg_pool: Pool<Postgres>,
}

impl NoteRepository {
    pub fn new(pg_pool: Pool<Postgres>) -> Self {
        Self { pg_pool }
    }
}

#[async_trait]
impl NoteStore for NoteRepository {
    /// Fetch all notes belonging to a specific user
    #[instrument(name = "Listing notes from database", skip(self))]
    async fn list_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<NoteModel>> {
        let rows = sqlx::query_as::<_, NoteModel>(
            r#"SELECT id, title, content, user_id, created_at, updated_at
            FROM notes
            WHERE user_id = $1"#,
        )
        .bind(user_id)
        .fetch_all(&self.pg_pool)
        .await?;
        Ok(rows)
    }

    #[instrument(name = "Fetching note from database", skip(self))]
    async fn find(&self, id: Uuid) -> anyhow::Result<Option<NoteModel>> {
        let row = sqlx::query_as::<_, NoteModel>(
            r#"SELECT id, title, content, user_id, created_at, updated_at
            FROM notes
            WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pg_pool)
        .await?;
        Ok(row)
    }

    #[instrument(name = "Saving new note to database", skip(self, note), fields(user_id = %note.user_id))]
    async fn create(&self, note: &NewNote) -> anyhow::Result<Uuid> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO notes (id, title, content, user_id, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(id)
        .bind(&note.title)
        .bind(&note.content)
        .bind(note.user_id)
        .bind(note.created_at)
        .execute(&self.pg_pool)
        .await?;
        Ok(id)
    }

    #[instrument(name = "Updating note in database", skip(self, changes))]
    async fn update(&self, id: Uuid, changes: &NoteChanges) -> anyhow::Result<()> {
        sqlx::query(
            r#"UPDATE notes
            SET title = COALESCE($1, title),
                content = COALESCE($2, content),
                updated_at = $3
            WHERE id = $4"#,
        )
        .bind(changes.title.as_deref())
        .bind(changes.content.as_deref())
        .bind(changes.updated_at)
        .bind(id)
        .execute(&self.pg_pool)
        .await?;
        Ok(())
    }

    #[instrument(name = "Deleting note from database", skip(self))]
    async fn delete(&self, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(&self.pg_pool)
            .await?;
        Ok(())
    }
}
