use serde::de::DeserializeOwned;

use crate::jwt::IssuedToken;
use crate::jwt::JwtError;
use crate::jwt::TokenSigner;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Plaintext behind the decoy hash used by [`Authenticator::reject`].
const DECOY_PASSWORD: &str = "decoy-credential";

/// Authentication coordinator combining password verification and token issuance.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    signer: TokenSigner,
    decoy_hash: Option<String>,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `password_hasher` - Hasher carrying the configured work factor
    /// * `signer` - Token signer holding the process keypair
    pub fn new(password_hasher: PasswordHasher, signer: TokenSigner) -> Self {
        let decoy_hash = password_hasher.hash(DECOY_PASSWORD).ok();

        Self {
            password_hasher,
            signer,
            decoy_hash,
        }
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Reject a login that has no stored hash to check against.
    ///
    /// Still runs one verification against a decoy hash made with the same
    /// work factor, so the rejection costs as much as a wrong password.
    pub fn reject(&self, password: &str) -> AuthenticationError {
        if let Some(decoy_hash) = &self.decoy_hash {
            let _ = self.password_hasher.verify(password, decoy_hash);
        }
        AuthenticationError::InvalidCredentials
    }

    /// Verify credentials and issue a token for `identifier`.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Stored hash could not be checked
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        identifier: &str,
    ) -> Result<IssuedToken, AuthenticationError> {
        if !self.password_hasher.verify(password, stored_hash)? {
            return Err(AuthenticationError::InvalidCredentials);
        }

        Ok(self.signer.issue(identifier)?)
    }

    /// Issue a token without password verification.
    ///
    /// Used for refresh flows, where possession of a valid token has already
    /// been established.
    pub fn issue_token(&self, identifier: &str) -> Result<IssuedToken, JwtError> {
        self.signer.issue(identifier)
    }

    /// Validate and decode a token.
    ///
    /// # Errors
    /// * `JwtError` - Token validation or decoding failed
    pub fn validate_token<T: DeserializeOwned>(&self, token: &str) -> Result<T, JwtError> {
        self.signer.decode(token)
    }
}
