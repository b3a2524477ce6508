#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use auth::Authenticator;
use auth::PasswordHasher;
use auth::TokenSigner;
use axum::Router;
use credential_service::domain::monitoring::Monitor;
use credential_service::domain::monitoring::MonitoringEvent;
use credential_service::domain::principal::errors::PrincipalError;
use credential_service::domain::principal::models::Identifier;
use credential_service::domain::principal::models::Principal;
use credential_service::domain::principal::models::TokenState;
use credential_service::domain::principal::ports::PrincipalRepository;
use credential_service::domain::principal::service::PrincipalService;
use credential_service::inbound::http::pipeline::ErrorPipeline;
use credential_service::inbound::http::router::create_router;
use credential_service::outbound::repositories::InMemoryPrincipalRepository;
use credential_service::outbound::repositories::ResilientRepository;
use credential_service::outbound::repositories::StorePolicy;
use jsonwebtoken::Algorithm;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use serde_json::json;

pub const PRIVATE_KEY: &[u8] = include_bytes!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../auth/testdata/rsa_private.pem"
));
pub const PUBLIC_KEY: &[u8] = include_bytes!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../auth/testdata/rsa_public.pem"
));
pub const OTHER_PRIVATE_KEY: &[u8] = include_bytes!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../auth/testdata/rsa_other_private.pem"
));

/// Monitor that keeps every event for later assertions.
#[derive(Default)]
pub struct RecordingMonitor {
    events: Mutex<Vec<MonitoringEvent>>,
}

impl RecordingMonitor {
    pub fn codes(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|event| event.code)
            .collect()
    }
}

impl Monitor for RecordingMonitor {
    fn record(&self, event: &MonitoringEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Store that is never reachable.
pub struct UnavailableRepository;

#[async_trait]
impl PrincipalRepository for UnavailableRepository {
    async fn find_by_identifier(
        &self,
        _identifier: &Identifier,
    ) -> Result<Option<Principal>, PrincipalError> {
        Err(PrincipalError::StoreUnavailable("connection refused".to_string()))
    }

    async fn create(&self, _principal: Principal) -> Result<Principal, PrincipalError> {
        Err(PrincipalError::StoreUnavailable("connection refused".to_string()))
    }

    async fn update_token(
        &self,
        _identifier: &Identifier,
        _token: &TokenState,
    ) -> Result<(), PrincipalError> {
        Err(PrincipalError::StoreUnavailable("connection refused".to_string()))
    }
}

/// Store whose calls never complete.
pub struct StalledRepository;

#[async_trait]
impl PrincipalRepository for StalledRepository {
    async fn find_by_identifier(
        &self,
        _identifier: &Identifier,
    ) -> Result<Option<Principal>, PrincipalError> {
        std::future::pending().await
    }

    async fn create(&self, _principal: Principal) -> Result<Principal, PrincipalError> {
        std::future::pending().await
    }

    async fn update_token(
        &self,
        _identifier: &Identifier,
        _token: &TokenState,
    ) -> Result<(), PrincipalError> {
        std::future::pending().await
    }
}

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub api_client: reqwest::Client,
    pub authenticator: Arc<Authenticator>,
    pub monitor: Arc<RecordingMonitor>,
    pub repository: Option<InMemoryPrincipalRepository>,
}

impl TestApp {
    /// Spawn the application backed by an in-memory store.
    pub async fn spawn() -> Self {
        let repository = InMemoryPrincipalRepository::new();
        let mut app = Self::spawn_with_repository(repository.clone()).await;
        app.repository = Some(repository);
        app
    }

    /// Spawn the application backed by `repository`, wrapped in a short
    /// deadline and a single read retry.
    pub async fn spawn_with_repository<R>(repository: R) -> Self
    where
        R: PrincipalRepository,
    {
        let authenticator = test_authenticator();
        let monitor = Arc::new(RecordingMonitor::default());

        let policy = StorePolicy {
            request_timeout: Duration::from_millis(200),
            max_read_retries: 1,
            retry_backoff: Duration::from_millis(5),
        };
        let service = Arc::new(PrincipalService::new(
            Arc::new(ResilientRepository::new(repository, policy)),
            Arc::clone(&authenticator),
        ));

        let router = create_router(
            service,
            Arc::clone(&authenticator),
            ErrorPipeline::new(monitor.clone()),
        );

        Self::spawn_router(router, authenticator, monitor).await
    }

    /// Serve an arbitrary router on a random port.
    pub async fn spawn_router(
        router: Router,
        authenticator: Arc<Authenticator>,
        monitor: Arc<RecordingMonitor>,
    ) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            api_client: reqwest::Client::builder()
                .build()
                .expect("Failed to create reqwest client"),
            authenticator,
            monitor,
            repository: None,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make PUT request
    pub fn put(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.put(format!("{}{}", self.address, path))
    }

    /// Helper to make DELETE request
    pub fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.delete(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Register a principal and return the raw response.
    pub async fn register(&self, identifier: &str, credential: &str) -> reqwest::Response {
        self.post("/api/auth/principals")
            .json(&json!({
                "identifier": identifier,
                "email": format!("{}@example.com", identifier),
                "credential": credential,
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Log in and return the issued token.
    pub async fn login(&self, identifier: &str, credential: &str) -> String {
        let response = self
            .post("/api/auth/login")
            .json(&json!({
                "identifier": identifier,
                "credential": credential,
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        body["data"]["authToken"]
            .as_str()
            .expect("authToken in login response")
            .to_string()
    }
}

pub fn test_authenticator() -> Arc<Authenticator> {
    let signer = TokenSigner::from_pem(
        Algorithm::RS256,
        PRIVATE_KEY,
        PUBLIC_KEY,
        chrono::Duration::hours(1),
    )
    .expect("fixture keys load");

    Arc::new(Authenticator::new(
        PasswordHasher::with_params(4096, 1, 1).expect("valid params"),
        signer,
    ))
}

/// Sign arbitrary claims with the given key, bypassing the service signer.
pub fn forge_token(algorithm: Algorithm, key: &EncodingKey, claims: serde_json::Value) -> String {
    jsonwebtoken::encode(&Header::new(algorithm), &claims, key).expect("Failed to forge token")
}

pub fn test_key() -> EncodingKey {
    EncodingKey::from_rsa_pem(PRIVATE_KEY).expect("fixture key")
}

pub fn other_key() -> EncodingKey {
    EncodingKey::from_rsa_pem(OTHER_PRIVATE_KEY).expect("fixture key")
}
