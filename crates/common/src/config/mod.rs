//! Configuration management for PaperHub services
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default, config/{APP_ENV}, config/local)
//! - Default values

use config::{Config, Environment, File};
pub use config::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Authorship claim configuration
    #[serde(default)]
    pub claims: ClaimsConfig,

    /// External article importers
    #[serde(default)]
    pub importer: ImporterConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Allowed CORS origins; empty means any
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Run pending migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Primary database URL (for writes)
    pub url: String,

    /// Read replica URL (optional, falls back to primary)
    pub read_url: Option<String>,

    /// Maximum number of connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of connections
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Idle timeout in seconds
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT secret for token signing; the gateway refuses to start without one
    pub jwt_secret: Option<String>,

    /// JWT expiration in seconds
    #[serde(default = "default_jwt_expiration")]
    pub jwt_expiration_secs: u64,

    /// Minimum password length at registration
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Window length in seconds
    #[serde(default = "default_window")]
    pub window_secs: u64,

    /// Requests allowed per window for general API routes
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Requests allowed per window for /api/auth routes
    #[serde(default = "default_auth_max_requests")]
    pub auth_max_requests: u32,

    /// How often expired entries are swept
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClaimsConfig {
    /// Minimum name similarity for a potential claim
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// Upper bound on imported papers scanned per potential-claims request
    #[serde(default = "default_claim_scan_limit")]
    pub scan_limit: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImporterConfig {
    /// arXiv Atom API endpoint
    #[serde(default = "default_arxiv_url")]
    pub arxiv_base_url: String,

    /// NCBI E-utilities base URL
    #[serde(default = "default_pubmed_url")]
    pub pubmed_base_url: String,

    /// Optional NCBI API key (raises PubMed rate limits)
    pub pubmed_api_key: Option<String>,

    /// HTTP timeout in seconds
    #[serde(default = "default_importer_timeout")]
    pub timeout_secs: u64,

    /// Give up retrying a fetch after this many seconds
    #[serde(default = "default_importer_retry_budget")]
    pub max_retry_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log filter directive (e.g. "info", "paperhub=debug,tower_http=info")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Expose Prometheus metrics on /metrics
    #[serde(default = "default_enabled")]
    pub metrics_enabled: bool,

    /// Service name attached to logs
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_request_timeout() -> u64 { 30 }
fn default_max_connections() -> u32 { 20 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 10 }
fn default_idle_timeout() -> u64 { 300 }
fn default_jwt_expiration() -> u64 { 7 * 24 * 3600 }
fn default_min_password_length() -> usize { 8 }
fn default_enabled() -> bool { true }
fn default_window() -> u64 { 15 * 60 }
fn default_max_requests() -> u32 { 100 }
fn default_auth_max_requests() -> u32 { 20 }
fn default_sweep_interval() -> u64 { 5 * 60 }
fn default_similarity_threshold() -> f64 { 0.7 }
fn default_claim_scan_limit() -> u64 { 500 }
fn default_arxiv_url() -> String { "http://export.arxiv.org/api/query".to_string() }
fn default_pubmed_url() -> String { "https://eutils.ncbi.nlm.nih.gov/entrez/eutils".to_string() }
fn default_importer_timeout() -> u64 { 30 }
fn default_importer_retry_budget() -> u64 { 60 }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_service_name() -> String { "paperhub".to_string() }

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            .set_default("database.url", "postgres://localhost/paperhub")?
            // Load base config file
            .add_source(File::with_name("config/default").required(false))
            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // Load local overrides
            .add_source(File::with_name("config/local").required(false))
            // e.g., APP__SERVER__PORT=8081
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }
}

impl AuthConfig {
    /// The signing secret, or an error when it is unset or blank
    pub fn jwt_secret(&self) -> Result<&str, ConfigError> {
        match self.jwt_secret.as_deref().map(str::trim) {
            Some(secret) if !secret.is_empty() => Ok(secret),
            _ => Err(ConfigError::Message(
                "auth.jwt_secret is not set (APP__AUTH__JWT_SECRET)".to_string(),
            )),
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
            cors_origins: Vec::new(),
            auto_migrate: false,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            jwt_expiration_secs: default_jwt_expiration(),
            min_password_length: default_min_password_length(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            window_secs: default_window(),
            max_requests: default_max_requests(),
            auth_max_requests: default_auth_max_requests(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

impl Default for ClaimsConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            scan_limit: default_claim_scan_limit(),
        }
    }
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self {
            arxiv_base_url: default_arxiv_url(),
            pubmed_base_url: default_pubmed_url(),
            pubmed_api_key: None,
            timeout_secs: default_importer_timeout(),
            max_retry_secs: default_importer_retry_budget(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            metrics_enabled: default_enabled(),
            service_name: default_service_name(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: "postgres://localhost/paperhub".to_string(),
                read_url: None,
                max_connections: default_max_connections(),
                min_connections: default_min_connections(),
                connect_timeout_secs: default_connect_timeout(),
                idle_timeout_secs: default_idle_timeout(),
            },
            auth: AuthConfig::default(),
            rate_limit: RateLimitConfig::default(),
            claims: ClaimsConfig::default(),
            importer: ImporterConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}
