// Configuration module entry point
// Loads application configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

use crate::error::StartupError;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, DirectoryPolicy, FilesConfig, HttpConfig, LoggingConfig, PerformanceConfig,
    ServerConfig,
};

/// Default config file name (without extension)
const DEFAULT_CONFIG_PATH: &str = "config";

/// Prefix for environment overrides, e.g. `STATIC_SERVER__PORT=9000`
const ENV_PREFIX: &str = "STATIC";

/// The only list-valued key
const INDEX_FILES_KEY: &str = "files.index_files";

impl Config {
    /// Load configuration from the default location.
    ///
    /// With no `config.toml` and no environment overrides this yields the
    /// stock behavior: port 8080 on all interfaces, serving `./static`.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from specified file path (without extension)
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::load_layers(config_path, None)
    }

    /// Defaults, then the file, then environment overrides.
    ///
    /// `env` stands in for the process environment when given.
    fn load_layers(
        config_path: &str,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, config::ConfigError> {
        let settings = Self::defaults()?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    // STATIC_FILES__INDEX_FILES=index.html,index.htm
                    .list_separator(",")
                    .with_list_parse_key(INDEX_FILES_KEY)
                    .source(env),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Built-in defaults only, ignoring files and environment
    pub fn with_defaults() -> Result<Self, config::ConfigError> {
        Self::defaults()?.build()?.try_deserialize()
    }

    fn defaults(
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("files.root", "static")?
            .set_default(INDEX_FILES_KEY, vec!["index.html"])?
            .set_default("files.directory_policy", "listing")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.read_timeout", 30)?
            .set_default("http.server_name", "static-file-server")
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, StartupError> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse()
            .map_err(|source| StartupError::InvalidAddress { addr, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_stock_behavior() {
        let cfg = Config::with_defaults().unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.files.root, "static");
        assert_eq!(cfg.files.index_files, vec!["index.html".to_string()]);
        assert_eq!(cfg.files.directory_policy, DirectoryPolicy::Listing);
        assert!(cfg.logging.access_log);
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert!(cfg.server.workers.is_none());
        assert!(cfg.performance.max_connections.is_none());
        assert!(cfg.http.cache_control.is_none());
    }

    #[test]
    fn test_socket_addr() {
        let mut cfg = Config::with_defaults().unwrap();
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "0.0.0.0:8080".parse::<SocketAddr>().unwrap()
        );

        cfg.server.host = "not an address".to_string();
        assert!(matches!(
            cfg.get_socket_addr(),
            Err(StartupError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.toml");
        std::fs::write(
            &path,
            "[server]\nport = 9090\n\n[files]\nroot = \"public\"\ndirectory_policy = \"forbidden\"\n",
        )
        .unwrap();

        let stem = dir.path().join("server");
        let cfg = Config::load_from(stem.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.files.root, "public");
        assert_eq!(cfg.files.directory_policy, DirectoryPolicy::Forbidden);
        // Untouched keys keep their defaults
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.files.index_files, vec!["index.html".to_string()]);
    }

    fn env(vars: &[(&str, &str)]) -> Option<config::Map<String, String>> {
        Some(
            vars.iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_env_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let stem = dir.path().join("absent");
        let cfg = Config::load_layers(
            stem.to_str().unwrap(),
            env(&[
                ("STATIC_SERVER__PORT", "9000"),
                ("STATIC_FILES__ROOT", "/srv/www"),
                ("STATIC_FILES__DIRECTORY_POLICY", "not_found"),
                ("STATIC_LOGGING__ACCESS_LOG", "false"),
                ("STATIC_HTTP__CACHE_CONTROL", "no-cache"),
                ("UNRELATED_SERVER__PORT", "1"),
            ]),
        )
        .unwrap();

        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.files.root, "/srv/www");
        assert_eq!(cfg.files.directory_policy, DirectoryPolicy::NotFound);
        assert!(!cfg.logging.access_log);
        assert_eq!(cfg.http.cache_control.as_deref(), Some("no-cache"));
        assert_eq!(cfg.server.host, "0.0.0.0");
    }

    #[test]
    fn test_env_index_files_list() {
        let dir = tempfile::tempdir().unwrap();
        let stem = dir.path().join("absent");

        let single = Config::load_layers(
            stem.to_str().unwrap(),
            env(&[("STATIC_FILES__INDEX_FILES", "home.html")]),
        )
        .unwrap();
        assert_eq!(single.files.index_files, vec!["home.html".to_string()]);

        let several = Config::load_layers(
            stem.to_str().unwrap(),
            env(&[("STATIC_FILES__INDEX_FILES", "index.html,index.htm")]),
        )
        .unwrap();
        assert_eq!(
            several.files.index_files,
            vec!["index.html".to_string(), "index.htm".to_string()]
        );
    }

    #[test]
    fn test_env_beats_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("server.toml"), "[server]\nport = 9090\n").unwrap();

        let stem = dir.path().join("server");
        let cfg = Config::load_layers(
            stem.to_str().unwrap(),
            env(&[("STATIC_SERVER__PORT", "9191")]),
        )
        .unwrap();
        assert_eq!(cfg.server.port, 9191);
    }
}
