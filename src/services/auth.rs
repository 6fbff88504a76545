use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    errors::ApiError,
    models::user::NewUser,
    services::token::TokenService,
    store::UserStore,
};

/// Payload returned by both login and signup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthBody {
    pub user_id: Uuid,
    pub email: String,
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug)]
pub struct AuthService {
    repo: Arc<dyn UserStore>,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(repo: Arc<dyn UserStore>, tokens: TokenService) -> Self {
        Self { repo, tokens }
    }

    #[instrument(
        name = "AuthService: Signup attempt",
        skip(self, registration),
        fields(user_email = %registration.email)
    )]
    pub async fn register(&self, registration: Registration) -> Result<AuthBody, ApiError> {
        // Pre-check only; two concurrent signups can still both pass it.
        let existing = self
            .repo
            .find_by_email(&registration.email)
            .await
            .map_err(internal("looking up email during signup"))?;
        if existing.is_some() {
            tracing::warn!("Signup failed: email already registered");
            return Err(ApiError::UserAlreadyExists);
        }

        let password_hash = hash_password(&registration.password)?;
        let new_user = NewUser {
            firstname: registration.firstname,
            lastname: registration.lastname,
            email: registration.email,
            password_hash,
            created_at: chrono::Utc::now(),
        };
        let user_id = self
            .repo
            .create_user(&new_user)
            .await
            .map_err(internal("inserting user"))?;

        let user = self
            .repo
            .find_by_id(user_id)
            .await
            .map_err(internal("re-reading new user"))?
            .ok_or_else(|| {
                tracing::error!("Newly inserted user {} could not be read back", user_id);
                ApiError::Internal
            })?;

        let token = self.tokens.issue(user.id, &user.email)?;
        self.repo
            .set_token(user.id, &token)
            .await
            .map_err(internal("persisting token"))?;

        tracing::info!("User registered");
        Ok(AuthBody {
            user_id: user.id,
            email: user.email,
            token,
        })
    }

    #[instrument(
        name = "AuthService: Login attempt",
        skip(self, password),
        fields(user_email = %email)
    )]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthBody, ApiError> {
        // 1. Fetch User
        let user = self
            .repo
            .find_by_email(email)
            .await
            .map_err(internal("fetching user during login"))?;

        let user = match user {
            Some(u) => u,
            None => {
                tracing::warn!("Login failed: User not found");
                return Err(ApiError::WrongCredentials);
            }
        };

        // 2. Verify Password
        if !verify_password(password, &user.password_hash)? {
            tracing::warn!("Login failed: Invalid password provided");
            return Err(ApiError::WrongCredentials);
        }

        // 3. Issue a fresh token; the stored one is left as is
        let token = self.tokens.issue(user.id, &user.email)?;

        tracing::info!("User authenticated successfully");
        Ok(AuthBody {
            user_id: user.id,
            email: user.email,
            token,
        })
    }
}

fn internal(context: &'static str) -> impl Fn(anyhow::Error) -> ApiError {
    move |e| {
        tracing::error!("Database error while {}: {:?}", context, e);
        ApiError::Internal
    }
}

fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            tracing::error!("Failed to hash password: {:?}", e);
            ApiError::Internal
        })
}

fn verify_password(password: &str, stored_hash: &str) -> Result<bool, ApiError> {
    let parsed_hash = PasswordHash::new(stored_hash).map_err(|e| {
        tracing::error!("Critical: Failed to parse password hash from DB: {:?}", e);
        ApiError::Internal
    })?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
