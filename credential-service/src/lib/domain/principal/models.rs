use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;

use crate::principal::errors::EmailError;
use crate::principal::errors::IdentifierError;

/// Principal aggregate entity.
///
/// Keyed by an immutable identifier. The credential hash is set at
/// registration; the token pair is replaced as a unit on every issuance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub identifier: Identifier,
    pub email: Option<EmailAddress>,
    pub credential_hash: Option<String>,
    pub token: Option<TokenState>,
}

impl Principal {
    /// New principal carrying a credential hash and no token.
    pub fn registered(
        identifier: Identifier,
        email: Option<EmailAddress>,
        credential_hash: String,
    ) -> Self {
        Self {
            identifier,
            email,
            credential_hash: Some(credential_hash),
            token: None,
        }
    }

    pub fn with_token(mut self, token: TokenState) -> Self {
        self.token = Some(token);
        self
    }
}

/// Bearer token together with the instant it stops being valid.
///
/// Stored and replaced as a pair: there is no way to hold one half without
/// the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenState {
    pub auth_token: String,
    pub expires_at: DateTime<Utc>,
}

impl TokenState {
    pub fn new(auth_token: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            auth_token,
            expires_at,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

impl From<auth::IssuedToken> for TokenState {
    fn from(issued: auth::IssuedToken) -> Self {
        Self::new(issued.token, issued.expires_at)
    }
}

/// Principal identifier value type
///
/// 1-128 characters; alphanumerics plus `_`, `-`, `.` and `@`, so both
/// usernames and email-shaped identifiers are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    const MAX_LENGTH: usize = 128;

    /// Create a new valid identifier.
    ///
    /// # Errors
    /// * `Empty` - Identifier is empty
    /// * `TooLong` - Identifier longer than 128 characters
    /// * `InvalidCharacters` - Contains characters outside the allowed set
    pub fn new(identifier: String) -> Result<Self, IdentifierError> {
        let identifier = Self::with_valid_length(identifier)?;
        let identifier = Self::with_valid_chars(identifier)?;
        Ok(Self(identifier))
    }

    fn with_valid_length(identifier: String) -> Result<String, IdentifierError> {
        let length = identifier.chars().count();
        if length == 0 {
            Err(IdentifierError::Empty)
        } else if length > Self::MAX_LENGTH {
            Err(IdentifierError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(identifier)
        }
    }

    fn with_valid_chars(identifier: String) -> Result<String, IdentifierError> {
        if identifier
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '@'))
        {
            Ok(identifier)
        } else {
            Err(IdentifierError::InvalidCharacters)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Command to register a new principal with domain types
#[derive(Debug)]
pub struct RegisterCommand {
    pub identifier: Identifier,
    pub email: Option<EmailAddress>,
    pub credential: String,
}

impl RegisterCommand {
    /// # Arguments
    /// * `identifier` - Validated identifier
    /// * `email` - Optional validated contact address
    /// * `credential` - Plain text credential (hashed by the service)
    pub fn new(identifier: Identifier, email: Option<EmailAddress>, credential: String) -> Self {
        Self {
            identifier,
            email,
            credential,
        }
    }
}

/// Command to exchange a credential for a token.
#[derive(Debug)]
pub struct AuthenticateCommand {
    pub identifier: Identifier,
    pub credential: String,
}

/// Command to exchange a still-valid token for a fresh one.
#[derive(Debug)]
pub struct RefreshTokenCommand {
    pub identifier: Identifier,
    pub auth_token: String,
}
