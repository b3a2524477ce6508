use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use auth::Claims;
use auth::JwtError;

use crate::domain::principal::models::AuthenticateCommand;
use crate::domain::principal::models::Identifier;
use crate::domain::principal::models::Principal;
use crate::domain::principal::models::RefreshTokenCommand;
use crate::domain::principal::models::RegisterCommand;
use crate::domain::principal::models::TokenState;
use crate::principal::errors::PrincipalError;
use crate::principal::ports::PrincipalRepository;
use crate::principal::ports::PrincipalServicePort;

/// Domain service implementation for the credential lifecycle.
///
/// Within one call the steps are strictly sequential: hash or verify, then
/// sign, then persist.
pub struct PrincipalService<R>
where
    R: PrincipalRepository,
{
    repository: Arc<R>,
    authenticator: Arc<Authenticator>,
}

impl<R> PrincipalService<R>
where
    R: PrincipalRepository,
{
    /// Create a new principal service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Principal persistence implementation
    /// * `authenticator` - Hasher and token signer built from process configuration
    pub fn new(repository: Arc<R>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }

    async fn find_existing(&self, identifier: &Identifier) -> Result<Principal, PrincipalError> {
        self.repository
            .find_by_identifier(identifier)
            .await?
            .ok_or_else(|| PrincipalError::NotFound(identifier.to_string()))
    }

    async fn store_token(
        &self,
        principal: Principal,
        token: TokenState,
    ) -> Result<Principal, PrincipalError> {
        self.repository
            .update_token(&principal.identifier, &token)
            .await?;

        tracing::debug!(
            identifier = %principal.identifier,
            expires_at = %token.expires_at,
            "Token stored"
        );

        Ok(principal.with_token(token))
    }
}

#[async_trait]
impl<R> PrincipalServicePort for PrincipalService<R>
where
    R: PrincipalRepository,
{
    async fn lookup(&self, identifier: &Identifier) -> Result<Principal, PrincipalError> {
        self.find_existing(identifier).await
    }

    async fn register(&self, command: RegisterCommand) -> Result<Principal, PrincipalError> {
        if self
            .repository
            .find_by_identifier(&command.identifier)
            .await?
            .is_some()
        {
            return Err(PrincipalError::AlreadyExists(command.identifier.to_string()));
        }

        let credential_hash = self.authenticator.hash_password(&command.credential)?;

        let principal = Principal::registered(command.identifier, command.email, credential_hash);
        let created = self.repository.create(principal).await?;

        tracing::info!(identifier = %created.identifier, "Principal registered");

        Ok(created)
    }

    async fn authenticate(
        &self,
        command: AuthenticateCommand,
    ) -> Result<Principal, PrincipalError> {
        // Unknown identifiers and missing hashes look the same as a wrong
        // credential, in the response and in the time spent hashing.
        let principal = match self
            .repository
            .find_by_identifier(&command.identifier)
            .await?
        {
            Some(principal) => principal,
            None => return Err(self.authenticator.reject(&command.credential).into()),
        };

        let Some(stored_hash) = principal.credential_hash.as_deref() else {
            return Err(self.authenticator.reject(&command.credential).into());
        };

        let issued = self.authenticator.authenticate(
            &command.credential,
            stored_hash,
            principal.identifier.as_str(),
        )?;

        self.store_token(principal, issued.into()).await
    }

    async fn refresh_token(
        &self,
        command: RefreshTokenCommand,
    ) -> Result<Principal, PrincipalError> {
        let claims: Claims = self.authenticator.validate_token(&command.auth_token)?;

        let principal = self.find_existing(&command.identifier).await?;

        let subject = claims
            .sub
            .ok_or_else(|| JwtError::MissingClaim("sub".to_string()))?;
        if subject != principal.identifier.as_str() {
            return Err(PrincipalError::SubjectMismatch(
                principal.identifier.to_string(),
            ));
        }

        let issued = self.authenticator.issue_token(principal.identifier.as_str())?;

        self.store_token(principal, issued.into()).await
    }
}
