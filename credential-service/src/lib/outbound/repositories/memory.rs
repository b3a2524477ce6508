use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::principal::errors::PrincipalError;
use crate::domain::principal::models::Identifier;
use crate::domain::principal::models::Principal;
use crate::domain::principal::models::TokenState;
use crate::domain::principal::ports::PrincipalRepository;

/// Process-local principal store for development runs and tests.
///
/// Same contract as the Cassandra store: insert-if-absent, token pair
/// replaced under one write lock.
#[derive(Clone, Default)]
pub struct InMemoryPrincipalRepository {
    principals: Arc<RwLock<HashMap<String, Principal>>>,
}

impl InMemoryPrincipalRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.principals.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.principals.read().await.is_empty()
    }
}

#[async_trait]
impl PrincipalRepository for InMemoryPrincipalRepository {
    async fn find_by_identifier(
        &self,
        identifier: &Identifier,
    ) -> Result<Option<Principal>, PrincipalError> {
        let principals = self.principals.read().await;
        Ok(principals.get(identifier.as_str()).cloned())
    }

    async fn create(&self, principal: Principal) -> Result<Principal, PrincipalError> {
        let mut principals = self.principals.write().await;

        match principals.entry(principal.identifier.as_str().to_string()) {
            Entry::Occupied(_) => Err(PrincipalError::AlreadyExists(
                principal.identifier.to_string(),
            )),
            Entry::Vacant(slot) => {
                slot.insert(principal.clone());
                Ok(principal)
            }
        }
    }

    async fn update_token(
        &self,
        identifier: &Identifier,
        token: &TokenState,
    ) -> Result<(), PrincipalError> {
        let mut principals = self.principals.write().await;

        let principal = principals
            .get_mut(identifier.as_str())
            .ok_or_else(|| PrincipalError::NotFound(identifier.to_string()))?;
        principal.token = Some(token.clone());

        Ok(())
    }
}
