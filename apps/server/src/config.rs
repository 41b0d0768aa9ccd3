//! Configuration management for the records server

use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub rest: RestConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Origins allowed by CORS. Empty means no cross-origin access.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Maximum request body size in bytes. Default: 1 MB
    #[serde(default = "default_max_request_body_size")]
    pub max_request_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            max_request_body_size: default_max_request_body_size(),
        }
    }
}

/// What happens when a client voids a record that is already voided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RevoidPolicy {
    /// Succeed without touching the stored reason.
    #[default]
    Ignore,
    /// Fail with a conflict.
    Reject,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RestConfig {
    /// Prefix for every resource route, e.g. `/ws/rest/v1`.
    #[serde(default = "default_base_path")]
    pub base_path: String,
    /// Page size used when the request has no `limit`.
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    /// Upper bound for a requested `limit`.
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
    #[serde(default)]
    pub revoid_policy: RevoidPolicy,
    /// Reason stored when a void request carries none.
    #[serde(default = "default_void_reason")]
    pub default_void_reason: String,
    /// User recorded in audit fields when the request names none.
    #[serde(default = "default_system_user")]
    pub system_user: String,
    /// JSON file with records loaded into the store at startup.
    #[serde(default)]
    pub seed_file: Option<String>,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            revoid_policy: RevoidPolicy::default(),
            default_void_reason: default_void_reason(),
            system_user: default_system_user(),
            seed_file: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Use JSON formatting for console logs
    #[serde(default)]
    pub json: bool,

    /// Enable file logging in addition to console
    #[serde(default)]
    pub file_enabled: bool,

    /// Directory for log files (default: ./logs)
    #[serde(default = "default_log_directory")]
    pub file_directory: String,

    /// Log file prefix (default: chartkeeper)
    #[serde(default = "default_log_file_prefix")]
    pub file_prefix: String,

    /// Log rotation: daily, hourly, minutely, never (default: daily)
    #[serde(default = "default_log_rotation")]
    pub file_rotation: String,

    #[serde(default)]
    pub audit: AuditConfig,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            file_enabled: false,
            file_directory: default_log_directory(),
            file_prefix: default_log_file_prefix(),
            file_rotation: default_log_rotation(),
            audit: AuditConfig::default(),
        }
    }
}

/// Audit events for REST interactions, emitted on the `audit` tracing target.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Record the `q` parameter of searches.
    #[serde(default = "default_true")]
    pub capture_search_query: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capture_search_query: true,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_request_body_size() -> usize {
    1024 * 1024
}

fn default_base_path() -> String {
    "/ws/rest/v1".to_string()
}

fn default_limit() -> usize {
    50
}

fn default_max_limit() -> usize {
    100
}

fn default_void_reason() -> String {
    "web service call".to_string()
}

fn default_system_user() -> String {
    "admin".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_directory() -> String {
    "./logs".to_string()
}

fn default_log_file_prefix() -> String {
    "chartkeeper".to_string()
}

fn default_log_rotation() -> String {
    "daily".to_string()
}

const LOG_ROTATIONS: [&str; 4] = ["daily", "hourly", "minutely", "never"];

impl Config {
    /// Load configuration from defaults, an optional config file and the environment.
    ///
    /// Without an explicit path, `config.{toml,yaml,json}` in the working directory is
    /// picked up when present. Environment variables use the `RECORDS` prefix with `__`
    /// separators, e.g. `RECORDS__SERVER__PORT=9090`.
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let file_source = match path {
            Some(path) => config::File::with_name(path).required(true),
            None => config::File::with_name("config").required(false),
        };

        let config = config::Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            .set_default(
                "server.max_request_body_size",
                default_max_request_body_size() as i64,
            )?
            .set_default("rest.base_path", default_base_path())?
            .set_default("rest.default_limit", default_limit() as i64)?
            .set_default("rest.max_limit", default_max_limit() as i64)?
            .set_default("rest.revoid_policy", "ignore")?
            .set_default("rest.default_void_reason", default_void_reason())?
            .set_default("rest.system_user", default_system_user())?
            .set_default("logging.level", default_log_level())?
            .set_default("logging.json", false)?
            .set_default("logging.file_enabled", false)?
            .set_default("logging.file_directory", default_log_directory())?
            .set_default("logging.file_prefix", default_log_file_prefix())?
            .set_default("logging.file_rotation", default_log_rotation())?
            .set_default("logging.audit.enabled", default_true())?
            .set_default("logging.audit.capture_search_query", default_true())?
            .add_source(file_source)
            .add_source(
                config::Environment::with_prefix("RECORDS")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        Ok(addr.parse()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.rest.base_path.starts_with('/') {
            return Err("rest.base_path must start with '/'".to_string());
        }
        if self.rest.base_path.len() > 1 && self.rest.base_path.ends_with('/') {
            return Err("rest.base_path must not end with '/'".to_string());
        }
        if self.rest.default_limit == 0 {
            return Err("rest.default_limit must be > 0".to_string());
        }
        if self.rest.max_limit < self.rest.default_limit {
            return Err("rest.max_limit must be >= rest.default_limit".to_string());
        }
        if self.rest.default_void_reason.trim().is_empty() {
            return Err("rest.default_void_reason must not be empty".to_string());
        }
        if self.rest.system_user.trim().is_empty() {
            return Err("rest.system_user must not be empty".to_string());
        }
        if !LOG_ROTATIONS.contains(&self.logging.file_rotation.to_ascii_lowercase().as_str()) {
            return Err(format!(
                "logging.file_rotation must be one of: {}",
                LOG_ROTATIONS.join(", ")
            ));
        }
        if self.server.max_request_body_size == 0 {
            return Err("server.max_request_body_size must be > 0".to_string());
        }

        Ok(())
    }
}
