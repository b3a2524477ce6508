use std::time::Duration;

use auth::AuthenticationError;
use auth::JwtError;
use auth::PasswordError;
use http::StatusCode;
use thiserror::Error;

use crate::domain::errors::codes;
use crate::domain::errors::ClassifiedError;

/// Error for Identifier validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("Identifier must not be empty")]
    Empty,

    #[error("Identifier too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error("Identifier contains invalid characters (only alphanumeric, '_', '-', '.' and '@' allowed)")]
    InvalidCharacters,
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Top-level error for all principal operations
#[derive(Debug, Clone, Error)]
pub enum PrincipalError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(#[from] IdentifierError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    // Domain-level errors
    #[error("Principal not found: {0}")]
    NotFound(String),

    #[error("Principal already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token subject does not match principal {0}")]
    SubjectMismatch(String),

    #[error("Token error: {0}")]
    Token(#[from] JwtError),

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    // Infrastructure errors
    #[error("Stored record is corrupt: {0}")]
    CorruptRecord(String),

    #[error("Credential store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Credential store call exceeded {0:?}")]
    StoreTimeout(Duration),
}

impl PrincipalError {
    /// Failures worth retrying on an idempotent read.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PrincipalError::StoreUnavailable(_) | PrincipalError::StoreTimeout(_)
        )
    }
}

impl From<AuthenticationError> for PrincipalError {
    fn from(err: AuthenticationError) -> Self {
        match err {
            AuthenticationError::InvalidCredentials => PrincipalError::InvalidCredentials,
            AuthenticationError::PasswordError(e) => PrincipalError::Password(e),
            AuthenticationError::JwtError(e) => PrincipalError::Token(e),
        }
    }
}

impl From<PrincipalError> for ClassifiedError {
    fn from(err: PrincipalError) -> Self {
        let classified = match &err {
            PrincipalError::InvalidIdentifier(e) => {
                ClassifiedError::validation(codes::INVALID_IDENTIFIER, e.to_string())
            }
            PrincipalError::InvalidEmail(e) => {
                ClassifiedError::validation(codes::INVALID_EMAIL, e.to_string())
            }
            PrincipalError::NotFound(identifier) => ClassifiedError::business(
                codes::PRINCIPAL_NOT_FOUND,
                format!("Principal '{}' not found", identifier),
            )
            .with_status(StatusCode::NOT_FOUND),
            PrincipalError::AlreadyExists(identifier) => ClassifiedError::business(
                codes::PRINCIPAL_EXISTS,
                format!("Principal '{}' already exists", identifier),
            )
            .with_status(StatusCode::CONFLICT),
            PrincipalError::InvalidCredentials => {
                ClassifiedError::auth(codes::INVALID_CREDENTIALS, "Invalid credentials")
            }
            PrincipalError::SubjectMismatch(_) => ClassifiedError::auth(
                codes::TOKEN_SUBJECT_MISMATCH,
                "Token does not belong to this principal",
            ),
            PrincipalError::Token(jwt) => classify_token_error(jwt),
            PrincipalError::Password(_) => {
                ClassifiedError::technical(codes::HASHING_FAILED, "Credential processing failed")
            }
            PrincipalError::CorruptRecord(_) => {
                ClassifiedError::technical(codes::CORRUPT_RECORD, "Stored record is unreadable")
            }
            PrincipalError::StoreUnavailable(_) => {
                ClassifiedError::adapter(codes::STORE_UNAVAILABLE, "Credential store unavailable")
            }
            PrincipalError::StoreTimeout(_) => {
                ClassifiedError::adapter(codes::STORE_TIMEOUT, "Credential store timed out")
            }
        };

        classified.with_cause(err)
    }
}

fn classify_token_error(err: &JwtError) -> ClassifiedError {
    match err {
        JwtError::TokenExpired => ClassifiedError::auth(codes::TOKEN_EXPIRED, "Token has expired"),
        JwtError::AlgorithmNotAllowed(_) => {
            ClassifiedError::auth(codes::TOKEN_ALGORITHM, "Token algorithm not allowed")
        }
        JwtError::InvalidSignature | JwtError::InvalidToken(_) | JwtError::MissingClaim(_) => {
            ClassifiedError::auth(codes::TOKEN_INVALID, "Token is invalid")
        }
        JwtError::EncodingFailed(_) | JwtError::InvalidKey(_) => {
            ClassifiedError::technical(codes::SIGNING_FAILED, "Token issuance failed")
        }
    }
}
