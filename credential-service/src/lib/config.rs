use std::collections::HashMap;
use std::env;
use std::time::Duration;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

/// Application configuration for credential-service.
///
/// Loaded from configuration files with environment variable overrides.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub password: PasswordConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Cassandra,
    Memory,
}

/// Credential store configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    #[serde(default)]
    pub nodes: Vec<String>,
    pub keyspace: String,
    pub connection_timeout_ms: u64,
    /// Deadline applied to every single store call.
    pub request_timeout_ms: u64,
    pub max_read_retries: u32,
    pub retry_backoff_ms: u64,
}

impl StoreConfig {
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

/// Token signing configuration.
///
/// Key material is referenced by path and read once at startup.
#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub algorithm: String,
    pub private_key_path: String,
    pub public_key_path: String,
    /// Token lifetime such as `1h` or `30m`.
    pub expiration: String,
}

/// Argon2id work factor.
#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Monitoring stage table.
///
/// `stages` maps an error code namespace (`AUTH`, `ADP`, ...) to the stage and
/// operation reported for it; `DEF` is the fallback entry.
#[derive(Debug, Deserialize, Clone)]
pub struct MonitoringConfig {
    pub application: String,
    #[serde(default)]
    pub stages: HashMap<String, StageConfig>,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            application: "credential-service".to_string(),
            stages: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct StageConfig {
    pub stage: String,
    pub operation: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LoggingConfig {
    /// Emit JSON log lines instead of the human readable format.
    #[serde(default)]
    pub json: bool,
}

impl Config {
    /// Load configuration from files with environment variable overrides.
    ///
    /// # Configuration Priority (highest to lowest)
    /// 1. Environment variables (STORE__BACKEND, SERVER__HTTP_PORT, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    ///
    /// # Errors
    /// Returns error if required configuration values are missing or invalid
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: STORE__NODES=10.0.0.1:9042,10.0.0.2:9042 overrides store.nodes
            .add_source(
                Environment::with_prefix("")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("store.nodes")
                    .try_parsing(true),
            )
            .build()?;

        configuration.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    const SAMPLE: &str = r#"
        [server]
        http_port = 3000

        [store]
        backend = "memory"
        keyspace = "credentials"
        connection_timeout_ms = 10000
        request_timeout_ms = 5000
        max_read_retries = 3
        retry_backoff_ms = 50

        [jwt]
        algorithm = "RS256"
        private_key_path = "keys/jwt_private.pem"
        public_key_path = "keys/jwt_public.pem"
        expiration = "1h"

        [monitoring]
        application = "credential-service"

        [monitoring.stages.AUTH]
        stage = "authentication"
        operation = "verify-token"
    "#;

    #[test]
    fn test_deserialize_sample() {
        let config: Config = ConfigBuilder::builder()
            .add_source(File::from_str(SAMPLE, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.http_port, 3000);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert!(config.store.nodes.is_empty());
        assert_eq!(config.store.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.jwt.expiration, "1h");
        assert_eq!(config.password.iterations, 2);
        assert!(!config.logging.json);
        assert_eq!(
            config.monitoring.stages.get("AUTH"),
            Some(&StageConfig {
                stage: "authentication".to_string(),
                operation: "verify-token".to_string(),
            })
        );
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let sample = SAMPLE.replace(r#"backend = "memory""#, r#"backend = "dynamo""#);
        let result = ConfigBuilder::builder()
            .add_source(File::from_str(&sample, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize::<Config>();

        assert!(result.is_err());
    }
}
