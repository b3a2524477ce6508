use thiserror::Error;

/// Error type for JWT operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Invalid key material: {0}")]
    InvalidKey(String),

    #[error("Algorithm not allowed: {0}")]
    AlgorithmNotAllowed(String),

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token is expired")]
    TokenExpired,

    #[error("Token is invalid: {0}")]
    InvalidToken(String),

    #[error("Missing required claim: {0}")]
    MissingClaim(String),
}

/// Error type for token lifetime parsing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExpiryError {
    #[error("Token lifetime is empty")]
    Empty,

    #[error("Invalid token lifetime '{0}': expected <number>[s|m|h|d]")]
    InvalidFormat(String),

    #[error("Token lifetime must be positive")]
    NotPositive,
}
