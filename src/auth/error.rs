// Authentication and authorization error types

use axum::http::StatusCode;
use thiserror::Error;

/// Errors produced by the credential hasher, the token issuer/validator
/// and the access guard.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The hashing primitive failed (entropy or resource failure)
    #[error("password hashing failed: {0}")]
    Hash(String),

    /// A stored hash could not be parsed
    #[error("stored password hash is malformed")]
    MalformedHash,

    /// Unknown account or wrong password
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token is malformed")]
    Malformed,

    #[error("missing authentication token")]
    MissingToken,

    /// Refresh token no longer matches the one on record
    #[error("refresh token has been revoked")]
    RevokedToken,

    #[error("token signing failed: {0}")]
    Signing(String),

    /// Caller is authenticated but not allowed to perform the operation
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// No signing secret was configured
    #[error("token signing secret is not configured")]
    MissingSecret,
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials
            | AuthError::InvalidSignature
            | AuthError::Expired
            | AuthError::Malformed
            | AuthError::MissingToken
            | AuthError::RevokedToken => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
            AuthError::Hash(_)
            | AuthError::MalformedHash
            | AuthError::Signing(_)
            | AuthError::MissingSecret => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code used in error bodies
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::InvalidSignature => "INVALID_SIGNATURE",
            AuthError::Expired => "TOKEN_EXPIRED",
            AuthError::Malformed => "MALFORMED_TOKEN",
            AuthError::MissingToken => "MISSING_TOKEN",
            AuthError::RevokedToken => "REVOKED_TOKEN",
            AuthError::Forbidden(_) => "FORBIDDEN",
            AuthError::Hash(_)
            | AuthError::MalformedHash
            | AuthError::Signing(_)
            | AuthError::MissingSecret => "INTERNAL_ERROR",
        }
    }

    /// Message that is safe to send to clients
    pub fn error_message(&self) -> String {
        match self {
            AuthError::Hash(_)
            | AuthError::MalformedHash
            | AuthError::Signing(_)
            | AuthError::MissingSecret => "An internal server error occurred".to_string(),
            other => other.to_string(),
        }
    }
}
