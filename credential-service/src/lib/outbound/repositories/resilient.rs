use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;

use crate::config::StoreConfig;
use crate::domain::principal::errors::PrincipalError;
use crate::domain::principal::models::Identifier;
use crate::domain::principal::models::Principal;
use crate::domain::principal::models::TokenState;
use crate::domain::principal::ports::PrincipalRepository;

/// Deadline and retry bounds for store calls.
#[derive(Debug, Clone, Copy)]
pub struct StorePolicy {
    /// Deadline for each individual attempt.
    pub request_timeout: Duration,
    /// Extra attempts allowed for reads after a transient failure.
    pub max_read_retries: u32,
    /// Delay before the first retry; doubled on each further attempt.
    pub retry_backoff: Duration,
}

impl StorePolicy {
    pub fn from_config(config: &StoreConfig) -> Self {
        Self {
            request_timeout: config.request_timeout(),
            max_read_retries: config.max_read_retries,
            retry_backoff: config.retry_backoff(),
        }
    }
}

impl Default for StorePolicy {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_millis(5000),
            max_read_retries: 3,
            retry_backoff: Duration::from_millis(100),
        }
    }
}

/// Wraps any principal store with a per-call deadline and read retries.
///
/// Expired deadlines surface as `StoreTimeout`. Only `find_by_identifier` is
/// retried; writes run exactly once.
pub struct ResilientRepository<R>
where
    R: PrincipalRepository,
{
    inner: R,
    policy: StorePolicy,
}

impl<R> ResilientRepository<R>
where
    R: PrincipalRepository,
{
    pub fn new(inner: R, policy: StorePolicy) -> Self {
        Self { inner, policy }
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, PrincipalError>
    where
        F: Future<Output = Result<T, PrincipalError>>,
    {
        timeout(self.policy.request_timeout, call)
            .await
            .map_err(|_| PrincipalError::StoreTimeout(self.policy.request_timeout))?
    }
}

#[async_trait]
impl<R> PrincipalRepository for ResilientRepository<R>
where
    R: PrincipalRepository,
{
    async fn find_by_identifier(
        &self,
        identifier: &Identifier,
    ) -> Result<Option<Principal>, PrincipalError> {
        let mut attempt = 0;
        let mut backoff = self.policy.retry_backoff;

        loop {
            match self.bounded(self.inner.find_by_identifier(identifier)).await {
                Err(e) if e.is_transient() && attempt < self.policy.max_read_retries => {
                    attempt += 1;
                    tracing::warn!(
                        identifier = %identifier,
                        attempt,
                        max_retries = self.policy.max_read_retries,
                        error = %e,
                        "Retrying credential store read"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = backoff.saturating_mul(2);
                }
                result => return result,
            }
        }
    }

    async fn create(&self, principal: Principal) -> Result<Principal, PrincipalError> {
        self.bounded(self.inner.create(principal)).await
    }

    async fn update_token(
        &self,
        identifier: &Identifier,
        token: &TokenState,
    ) -> Result<(), PrincipalError> {
        self.bounded(self.inner.update_token(identifier, token)).await
    }
}
