use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use scylla::frame::response::result::CqlValue;
use scylla::QueryResult;
use scylla::Session;
use scylla::SessionBuilder;

use crate::config::StoreConfig;
use crate::domain::principal::errors::PrincipalError;
use crate::domain::principal::models::EmailAddress;
use crate::domain::principal::models::Identifier;
use crate::domain::principal::models::Principal;
use crate::domain::principal::models::TokenState;
use crate::domain::principal::ports::PrincipalRepository;

type PrincipalRow = (
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<DateTime<Utc>>,
);

/// Principal store backed by the `auth_tokens` table.
///
/// Inserts and token updates are lightweight transactions, so `create` never
/// overwrites and `update_token` never resurrects a missing row.
pub struct CassandraPrincipalRepository {
    session: Arc<Session>,
}

impl CassandraPrincipalRepository {
    pub async fn new(config: &StoreConfig) -> Result<Self, anyhow::Error> {
        let session = SessionBuilder::new()
            .known_nodes(&config.nodes)
            .connection_timeout(config.connection_timeout())
            .build()
            .await?;

        // Create keyspace if not exists
        session
            .query(
                format!(
                    "CREATE KEYSPACE IF NOT EXISTS {}
                    WITH REPLICATION = {{
                        'class': 'SimpleStrategy',
                        'replication_factor': 1
                    }}",
                    &config.keyspace
                ),
                &[],
            )
            .await?;

        session.use_keyspace(&config.keyspace, false).await?;

        session
            .query(
                "CREATE TABLE IF NOT EXISTS auth_tokens (
                    identifier text PRIMARY KEY,
                    email text,
                    credential_hash text,
                    auth_token text,
                    expires_at timestamp
                )",
                &[],
            )
            .await?;

        tracing::info!(keyspace = %config.keyspace, "Credential store ready");

        Ok(Self {
            session: Arc::new(session),
        })
    }
}

/// Reads the `[applied]` column every conditional statement returns first.
fn was_applied(result: &QueryResult) -> Result<bool, PrincipalError> {
    result
        .rows
        .as_ref()
        .and_then(|rows| rows.first())
        .and_then(|row| row.columns.first())
        .and_then(|column| column.as_ref())
        .and_then(CqlValue::as_boolean)
        .ok_or_else(|| {
            PrincipalError::CorruptRecord("conditional write returned no [applied] column".into())
        })
}

fn into_principal(row: PrincipalRow) -> Result<Principal, PrincipalError> {
    let (identifier, email, credential_hash, auth_token, expires_at) = row;

    let identifier = Identifier::new(identifier)
        .map_err(|e| PrincipalError::CorruptRecord(format!("identifier: {}", e)))?;

    let email = email
        .map(EmailAddress::new)
        .transpose()
        .map_err(|e| PrincipalError::CorruptRecord(format!("email: {}", e)))?;

    // A half-written pair is treated as no token at all.
    let token = match (auth_token, expires_at) {
        (Some(auth_token), Some(expires_at)) => Some(TokenState::new(auth_token, expires_at)),
        _ => None,
    };

    Ok(Principal {
        identifier,
        email,
        credential_hash,
        token,
    })
}

#[async_trait]
impl PrincipalRepository for CassandraPrincipalRepository {
    async fn find_by_identifier(
        &self,
        identifier: &Identifier,
    ) -> Result<Option<Principal>, PrincipalError> {
        let result = self
            .session
            .query(
                "SELECT identifier, email, credential_hash, auth_token, expires_at
                 FROM auth_tokens
                 WHERE identifier = ?",
                (identifier.as_str(),),
            )
            .await
            .map_err(|e| PrincipalError::StoreUnavailable(e.to_string()))?;

        let Some(row) = result.rows.and_then(|rows| rows.into_iter().next()) else {
            return Ok(None);
        };

        let row = row
            .into_typed::<PrincipalRow>()
            .map_err(|e| PrincipalError::CorruptRecord(e.to_string()))?;

        into_principal(row).map(Some)
    }

    async fn create(&self, principal: Principal) -> Result<Principal, PrincipalError> {
        let (auth_token, expires_at) = match &principal.token {
            Some(token) => (Some(token.auth_token.as_str()), Some(token.expires_at)),
            None => (None, None),
        };

        let result = self
            .session
            .query(
                "INSERT INTO auth_tokens (identifier, email, credential_hash, auth_token, expires_at)
                 VALUES (?, ?, ?, ?, ?)
                 IF NOT EXISTS",
                (
                    principal.identifier.as_str(),
                    principal.email.as_ref().map(EmailAddress::as_str),
                    principal.credential_hash.as_deref(),
                    auth_token,
                    expires_at,
                ),
            )
            .await
            .map_err(|e| PrincipalError::StoreUnavailable(e.to_string()))?;

        if !was_applied(&result)? {
            return Err(PrincipalError::AlreadyExists(principal.identifier.to_string()));
        }

        Ok(principal)
    }

    async fn update_token(
        &self,
        identifier: &Identifier,
        token: &TokenState,
    ) -> Result<(), PrincipalError> {
        let result = self
            .session
            .query(
                "UPDATE auth_tokens
                 SET auth_token = ?, expires_at = ?
                 WHERE identifier = ?
                 IF EXISTS",
                (
                    token.auth_token.as_str(),
                    token.expires_at,
                    identifier.as_str(),
                ),
            )
            .await
            .map_err(|e| PrincipalError::StoreUnavailable(e.to_string()))?;

        if !was_applied(&result)? {
            return Err(PrincipalError::NotFound(identifier.to_string()));
        }

        Ok(())
    }
}
