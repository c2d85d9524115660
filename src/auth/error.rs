use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::auth::dto::MessageResponse;

/// Failures of the credential operations, mapped one-to-one onto HTTP
/// statuses by `IntoResponse`.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("User not found")]
    UserNotFound,

    /// Deliberately covers both an unknown email and a wrong password so the
    /// response never reveals which check failed.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("New password cannot be the same as the old password")]
    SamePassword,

    #[error("Error hashing password")]
    Hashing(#[source] anyhow::Error),

    #[error("Error accessing user store")]
    Persistence(#[source] anyhow::Error),

    #[error("Error issuing token")]
    TokenIssuance(#[source] anyhow::Error),
}

impl CredentialError {
    pub fn status(&self) -> StatusCode {
        match self {
            CredentialError::PasswordMismatch | CredentialError::SamePassword => {
                StatusCode::BAD_REQUEST
            }
            CredentialError::UserNotFound => StatusCode::NOT_FOUND,
            CredentialError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            CredentialError::Hashing(_)
            | CredentialError::Persistence(_)
            | CredentialError::TokenIssuance(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CredentialError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = ?self, "request failed");
        }
        (
            status,
            Json(MessageResponse {
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}
