use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use tracing::instrument;
use uuid::Uuid;

use crate::models::user::{NewUser, UserModel};
use crate::store::UserStore;

#[derive(Clone, Debug)]
pub struct UserRepository {
    pool: Pool<Postgres>,
}

impl UserRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    #[instrument(name = "Fetching user by email from database", skip(self))]
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserModel>> {
        let user = sqlx::query_as::<_, UserModel>(
            r#"SELECT id, firstname, lastname, email, username, password_hash, token, created_at
            FROM users WHERE email = $1"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch user: {:?}", e);
            e
        })?;
        Ok(user)
    }

    #[instrument(name = "Fetching user by id from database", skip(self))]
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserModel>> {
        let user = sqlx::query_as::<_, UserModel>(
            r#"SELECT id, firstname, lastname, email, username, password_hash, token, created_at
            FROM users WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch user: {:?}", e);
            e
        })?;
        Ok(user)
    }

    #[instrument(
        name = "Saving new user to database",
        skip(self, user),
        fields(user_email = %user.email)
    )]
    async fn create_user(&self, user: &NewUser) -> anyhow::Result<Uuid> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"INSERT INTO users (id, firstname, lastname, email, username, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
        )
        .bind(id)
        .bind(&user.firstname)
        .bind(&user.lastname)
        .bind(&user.email)
        // the login identity doubles as the username
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to execute query: {:?}", e);
            e
        })?;
        Ok(id)
    }

    #[instrument(name = "Persisting issued token", skip(self, token))]
    async fn set_token(&self, id: Uuid, token: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET token = $1 WHERE id = $2")
            .bind(token)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to execute query: {:?}", e);
                e
            })?;
        Ok(())
    }
}
