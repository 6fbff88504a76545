use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::envelope::Envelope;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authorization header is missing")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Wrong credentials")]
    WrongCredentials,

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("Note belongs to another user")]
    Forbidden,

    #[error("Malformed request body")]
    MalformedBody(#[from] JsonRejection),

    #[error("Resource not found")]
    NotFound,

    #[error("Token creation error")]
    TokenCreation,

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            // Older clients expect a 200 here and read `success` instead.
            ApiError::MissingToken => StatusCode::OK,
            ApiError::InvalidToken | ApiError::WrongCredentials => StatusCode::UNAUTHORIZED,
            ApiError::UserAlreadyExists => StatusCode::CONFLICT,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::TokenCreation | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message sent to the client. Never contains store or driver details.
    pub fn public_message(&self) -> &'static str {
        match self {
            ApiError::MissingToken => "Error!Token was not provided.",
            ApiError::InvalidToken => "Invalid token",
            ApiError::WrongCredentials => "Invalid credentials",
            ApiError::UserAlreadyExists => "User already exists",
            ApiError::Forbidden => "Note belongs to another user",
            ApiError::MalformedBody(_) => "Malformed request body",
            ApiError::NotFound => "Resource not found",
            ApiError::TokenCreation => "Failed to generate session",
            ApiError::Internal => "An unexpected error occurred",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::MalformedBody(rejection) = &self {
            tracing::warn!("Rejected request body: {}", rejection.body_text());
        }
        Envelope::<()>::failure(self.public_message()).with_status(self.status())
    }
}
