use axum::extract::{FromRef, FromRequestParts, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use serde::Deserialize;
use tracing::instrument;

use crate::envelope::Envelope;
use crate::errors::ApiError;
use crate::routes::ApiJson;
use crate::services::auth::{AuthBody, Registration};
use crate::services::token::{Claims, TokenService};
use crate::startup::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignupPayload {
    #[serde(default)]
    firstname: String,
    #[serde(default)]
    lastname: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[instrument(
    name = "HTTP: Login",
    skip(state, payload),
    fields(user_email = %payload.email)
)]
pub async fn login_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginPayload>,
) -> Result<Envelope<AuthBody>, ApiError> {
    tracing::info!("Received login request");

    let body = state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;

    tracing::info!("JWT issued for user");
    Ok(Envelope::ok("Login successful", Some(body)))
}

#[instrument(
    name = "HTTP: Signup",
    skip(state, payload),
    fields(user_email = %payload.email)
)]
pub async fn signup_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SignupPayload>,
) -> Result<Envelope<AuthBody>, ApiError> {
    let body = state
        .auth_service
        .register(Registration {
            firstname: payload.firstname,
            lastname: payload.lastname,
            email: payload.email,
            password: payload.password,
        })
        .await?;

    Ok(Envelope::ok("User created successfully", Some(body)))
}

/// Every protected route takes `Claims` as an argument; this is the only
/// place a bearer token is read and verified.
impl<S> FromRequestParts<S> for Claims
where
    TokenService: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    #[instrument(name = "Extracting Claims", skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = match parts.headers.get(AUTHORIZATION) {
            Some(value) => value.to_str().map_err(|_| {
                tracing::warn!("Authorization header is not valid UTF-8");
                ApiError::InvalidToken
            })?,
            None => {
                tracing::warn!("No Authorization header on protected route");
                return Err(ApiError::MissingToken);
            }
        };

        let token = bearer_token(header).ok_or_else(|| {
            tracing::warn!("Authorization header carries no token");
            ApiError::MissingToken
        })?;

        TokenService::from_ref(state).verify(token)
    }
}

/// The token part of `"<scheme> <token>"`. Any scheme is accepted.
fn bearer_token(header: &str) -> Option<&str> {
    header.split(' ').nth(1).filter(|token| !token.is_empty())
}
