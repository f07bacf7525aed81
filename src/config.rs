use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub node: NodeConfig,
    pub sessions: SessionConfig,
    /// Enables dangerous operations like purge. Must never be true in production.
    pub test_mode: bool,
    pub tokens: TokenConfig,
}

#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Shared secret required on admin routes (header `x-admin-key`).
    pub admin_key: String,
    pub bind_address: String,
    pub data_dir: String,
    pub id: String,
}

#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Seconds the previous global token stays valid after a rotation.
    pub grace_period_seconds: u64,
    /// Absolute lifetime of an issued re-entry token.
    pub reentry_ttl_seconds: u64,
    /// Seconds between scheduled rotations of the global token.
    pub rotation_interval_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How often the store sweeper evicts expired keys.
    pub cleanup_interval_seconds: u64,
    /// Seconds a session stays live without a heartbeat.
    pub timeout_seconds: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            grace_period_seconds: 120,
            reentry_ttl_seconds: 300,
            rotation_interval_seconds: 1800, // 30 minutes
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cleanup_interval_seconds: 60,
            timeout_seconds: 900, // 15 minutes
        }
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let node_id = std::env::var("NODE_ID").unwrap_or_else(|_| uuid::Uuid::new_v4().to_string());

        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());

        let admin_key = std::env::var("ADMIN_KEY").unwrap_or_default();

        let test_mode = std::env::var("TEST_MODE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let token_defaults = TokenConfig::default();
        let session_defaults = SessionConfig::default();

        let config = Config {
            node: NodeConfig {
                admin_key,
                bind_address,
                data_dir,
                id: node_id,
            },
            sessions: SessionConfig {
                cleanup_interval_seconds: env_u64(
                    "CLEANUP_INTERVAL_SECONDS",
                    session_defaults.cleanup_interval_seconds,
                ),
                timeout_seconds: env_u64(
                    "SESSION_TIMEOUT_SECONDS",
                    session_defaults.timeout_seconds,
                ),
            },
            test_mode,
            tokens: TokenConfig {
                grace_period_seconds: env_u64(
                    "TOKEN_GRACE_PERIOD_SECONDS",
                    token_defaults.grace_period_seconds,
                ),
                reentry_ttl_seconds: env_u64(
                    "REENTRY_TTL_SECONDS",
                    token_defaults.reentry_ttl_seconds,
                ),
                rotation_interval_seconds: env_u64(
                    "ROTATION_INTERVAL_SECONDS",
                    token_defaults.rotation_interval_seconds,
                ),
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.node.id.is_empty() {
            return Err(ConfigError::ValidationError(
                "NODE_ID cannot be empty".to_string(),
            ));
        }

        if self.tokens.rotation_interval_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "ROTATION_INTERVAL_SECONDS must be greater than zero".to_string(),
            ));
        }

        if self.tokens.grace_period_seconds >= self.tokens.rotation_interval_seconds {
            return Err(ConfigError::ValidationError(
                "TOKEN_GRACE_PERIOD_SECONDS must be shorter than the rotation interval"
                    .to_string(),
            ));
        }

        if self.node.admin_key.is_empty() {
            tracing::warn!(
                "ADMIN_KEY is not set. Admin routes will reject every request until it is configured."
            );
        }

        Ok(())
    }
}
