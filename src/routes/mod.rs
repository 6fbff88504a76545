pub mod auth;
pub mod notes;

use axum::extract::FromRequest;

use crate::errors::ApiError;

/// `Json` whose rejections are reported in the response envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

pub async fn greet() -> &'static str {
    "Hello World!"
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
