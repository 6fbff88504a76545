use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ApiError;

/// How long an issued token stays valid, in seconds.
pub const TOKEN_TTL_SECS: i64 = 3600;

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Keys {
    fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// Identity carried inside a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies bearer tokens with the configured shared secret.
#[derive(Clone)]
pub struct TokenService {
    keys: Arc<Keys>,
    validation: Validation,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService").finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &SecretString) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);
        Self {
            keys: Arc::new(Keys::new(secret.expose_secret().as_bytes())),
            validation,
        }
    }

    pub fn issue(&self, user_id: Uuid, email: &str) -> Result<String, ApiError> {
        self.issue_at(user_id, email, chrono::Utc::now())
    }

    fn issue_at(
        &self,
        user_id: Uuid,
        email: &str,
        issued_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<String, ApiError> {
        let claims = Claims {
            user_id,
            email: email.to_owned(),
            iat: issued_at.timestamp(),
            exp: (issued_at + chrono::Duration::seconds(TOKEN_TTL_SECS)).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.keys.encoding).map_err(|e| {
            tracing::error!("JWT Encoding failed: {:?}", e);
            ApiError::TokenCreation
        })
    }

    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        let token_data =
            decode::<Claims>(token, &self.keys.decoding, &self.validation).map_err(|e| {
                tracing::warn!("JWT decoding failed: {:?}", e);
                ApiError::InvalidToken
            })?;
        Ok(token_data.claims)
    }
}
