use async_trait::async_trait;

use crate::domain::principal::models::AuthenticateCommand;
use crate::domain::principal::models::Identifier;
use crate::domain::principal::models::Principal;
use crate::domain::principal::models::RefreshTokenCommand;
use crate::domain::principal::models::RegisterCommand;
use crate::domain::principal::models::TokenState;
use crate::principal::errors::PrincipalError;

/// Port for principal domain service operations.
#[async_trait]
pub trait PrincipalServicePort: Send + Sync + 'static {
    /// Retrieve a principal by identifier.
    ///
    /// # Errors
    /// * `NotFound` - Principal does not exist
    /// * `StoreUnavailable` / `StoreTimeout` - Store call failed
    async fn lookup(&self, identifier: &Identifier) -> Result<Principal, PrincipalError>;

    /// Register a new principal with a hashed credential.
    ///
    /// # Errors
    /// * `AlreadyExists` - Identifier is already taken
    /// * `Password` - Hashing failed
    /// * `StoreUnavailable` / `StoreTimeout` - Store call failed
    async fn register(&self, command: RegisterCommand) -> Result<Principal, PrincipalError>;

    /// Verify a credential and issue a token.
    ///
    /// Returns the principal carrying the newly stored token.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown identifier or wrong credential
    /// * `Token` - Token issuance failed
    /// * `StoreUnavailable` / `StoreTimeout` - Store call failed
    async fn authenticate(&self, command: AuthenticateCommand)
        -> Result<Principal, PrincipalError>;

    /// Exchange a valid token for a fresh one.
    ///
    /// # Errors
    /// * `Token` - Presented token is invalid, expired or forged
    /// * `NotFound` - Principal does not exist
    /// * `SubjectMismatch` - Token was issued to another principal
    /// * `StoreUnavailable` / `StoreTimeout` - Store call failed
    async fn refresh_token(&self, command: RefreshTokenCommand)
        -> Result<Principal, PrincipalError>;
}

/// Persistence operations for the principal aggregate.
#[async_trait]
pub trait PrincipalRepository: Send + Sync + 'static {
    /// Retrieve principal by identifier.
    ///
    /// # Returns
    /// Optional principal (None if not found)
    ///
    /// # Errors
    /// * `StoreUnavailable` - Store could not be reached
    /// * `CorruptRecord` - Stored row could not be read back
    async fn find_by_identifier(
        &self,
        identifier: &Identifier,
    ) -> Result<Option<Principal>, PrincipalError>;

    /// Insert a new principal. Never overwrites an existing record.
    ///
    /// # Errors
    /// * `AlreadyExists` - Identifier is already present
    /// * `StoreUnavailable` - Store could not be reached
    async fn create(&self, principal: Principal) -> Result<Principal, PrincipalError>;

    /// Replace the token pair of an existing principal. Last write wins.
    ///
    /// # Errors
    /// * `NotFound` - Principal does not exist
    /// * `StoreUnavailable` - Store could not be reached
    async fn update_token(
        &self,
        identifier: &Identifier,
        token: &TokenState,
    ) -> Result<(), PrincipalError>;
}
