use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct UserModel {
    pub id: Uuid,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub token: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A user row about to be inserted. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
