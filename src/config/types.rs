// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub files: FilesConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub workers: Option<usize>,
}

/// Served directory configuration
#[derive(Debug, Deserialize, Clone)]
pub struct FilesConfig {
    /// Root directory, relative to the working directory unless absolute
    pub root: String,
    /// Index documents tried in order when a directory is requested
    #[serde(default = "default_index_files")]
    pub index_files: Vec<String>,
    /// What to do for a directory without an index document
    #[serde(default)]
    pub directory_policy: DirectoryPolicy,
}

fn default_index_files() -> Vec<String> {
    vec!["index.html".to_string()]
}

/// Directory handling when no index document exists
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DirectoryPolicy {
    /// Generate an HTML listing of the entries
    #[default]
    Listing,
    /// Respond 403 Forbidden
    Forbidden,
    /// Respond 404 Not Found
    NotFound,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    /// Seconds allowed for a client to send request headers
    pub read_timeout: u64,
    #[serde(default)]
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    /// Cache-Control value attached to file responses, omitted when unset
    #[serde(default)]
    pub cache_control: Option<String>,
}
