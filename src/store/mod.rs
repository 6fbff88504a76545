//! Table access for users and notes.
//!
//! Services only see the `UserStore` and `NoteStore` traits so the HTTP layer
//! can be driven against any backend; `UserRepository` and `NoteRepository`
//! are the Postgres implementations used in production.

pub mod note;
pub mod user;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    note::{NewNote, NoteChanges, NoteModel},
    user::{NewUser, UserModel},
};

pub use note::NoteRepository;
pub use user::UserRepository;

#[async_trait]
pub trait UserStore: Send + Sync + std::fmt::Debug {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserModel>>;

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserModel>>;

    /// Inserts the row and returns its generated id.
    async fn create_user(&self, user: &NewUser) -> anyhow::Result<Uuid>;

    /// Overwrites the last issued token on the row.
    async fn set_token(&self, id: Uuid, token: &str) -> anyhow::Result<()>;
}

#[async_trait]
pub trait NoteStore: Send + Sync + std::fmt::Debug {
    /// Notes owned by `user_id`, in storage order.
    async fn list_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<NoteModel>>;

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<NoteModel>>;

    /// Inserts the row and returns its generated id.
    async fn create(&self, note: &NewNote) -> anyhow::Result<Uuid>;

    /// Applies `changes` to the row with `id`. A missing row is not an error.
    async fn update(&self, id: Uuid, changes: &NoteChanges) -> anyhow::Result<()>;

    /// Removes the row with `id`. A missing row is not an error.
    async fn delete(&self, id: Uuid) -> anyhow::Result<()>;
}
