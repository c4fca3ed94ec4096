//! Configuration module for depot.

use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

use crate::{DepotError, Result};

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Maximum request body size for uploads in megabytes. 0 means unlimited.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_upload_size() -> u64 {
    32
}

impl HttpConfig {
    /// Upload limit in bytes.
    pub fn max_upload_size_bytes(&self) -> usize {
        (self.max_upload_size_mb as usize).saturating_mul(1024 * 1024)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
            max_upload_size_mb: default_max_upload_size(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file. Empty disables file output.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/depot.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
///
/// Storage layout on disk:
/// ```text
/// {root}/
/// ├── {users_dir}/<identity>/projects   newline-delimited allow-list
/// └── {data_dir}/<project>/<file>       stored content
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Storage root every other directory is resolved against.
    #[serde(default = "default_root")]
    pub root: String,
    /// Directory under `root` holding one subdirectory per project.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Directory under `root` holding one subdirectory per user.
    #[serde(default = "default_users_dir")]
    pub users_dir: String,
    /// HTTP configuration.
    #[serde(default)]
    pub http: HttpConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_root() -> String {
    ".".to_string()
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_users_dir() -> String {
    "users".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: default_root(),
            data_dir: default_data_dir(),
            users_dir: default_users_dir(),
            http: HttpConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(DepotError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| DepotError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `DEPOT_ROOT`, `DEPOT_DATA_DIR`, `DEPOT_USERS_DIR`: storage layout
    /// - `DEPOT_HOST`, `DEPOT_PORT`: HTTP bind address
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(root) = non_empty("DEPOT_ROOT") {
            self.root = root;
        }
        if let Some(data_dir) = non_empty("DEPOT_DATA_DIR") {
            self.data_dir = data_dir;
        }
        if let Some(users_dir) = non_empty("DEPOT_USERS_DIR") {
            self.users_dir = users_dir;
        }
        if let Some(host) = non_empty("DEPOT_HOST") {
            self.http.host = host;
        }
        if let Some(port) = non_empty("DEPOT_PORT") {
            self.http.port = port
                .parse::<u16>()
                .map_err(|e| DepotError::Config(format!("invalid DEPOT_PORT {port:?}: {e}")))?;
        }
        Ok(())
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - `root` is empty
    /// - `data_dir` or `users_dir` is empty, absolute, or climbs out of `root`
    pub fn validate(&self) -> Result<()> {
        if self.root.is_empty() {
            return Err(DepotError::Config("root must not be empty".to_string()));
        }
        validate_subdir("data_dir", &self.data_dir)?;
        validate_subdir("users_dir", &self.users_dir)?;
        Ok(())
    }

    /// Directory holding project content: `root/data_dir`.
    pub fn data_root(&self) -> PathBuf {
        Path::new(&self.root).join(&self.data_dir)
    }

    /// Directory holding per-user permission lists: `root/users_dir`.
    pub fn users_root(&self) -> PathBuf {
        Path::new(&self.root).join(&self.users_dir)
    }
}

fn validate_subdir(key: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(DepotError::Config(format!("{key} must not be empty")));
    }
    let escapes = Path::new(value).components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes {
        return Err(DepotError::Config(format!(
            "{key} must be a relative path inside root, got {value:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.root, ".");
        assert_eq!(config.data_dir, "data");
        assert_eq!(config.users_dir, "users");

        assert_eq!(config.http.host, "0.0.0.0");
        assert_eq!(config.http.port, 8080);
        assert!(config.http.cors_origins.is_empty());
        assert_eq!(config.http.max_upload_size_mb, 32);

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, "logs/depot.log");
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
root = "/srv/depot"
data_dir = "projects"
users_dir = "accounts"

[http]
host = "127.0.0.1"
port = 9000
cors_origins = ["http://localhost:3000"]

[logging]
level = "debug"
file = ""
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.root, "/srv/depot");
        assert_eq!(config.data_dir, "projects");
        assert_eq!(config.users_dir, "accounts");
        assert_eq!(config.http.host, "127.0.0.1");
        assert_eq!(config.http.port, 9000);
        assert_eq!(config.http.cors_origins.len(), 1);
        assert_eq!(config.http.max_upload_size_mb, 32);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.file.is_empty());

        assert_eq!(config.data_root(), PathBuf::from("/srv/depot/projects"));
        assert_eq!(config.users_root(), PathBuf::from("/srv/depot/accounts"));
    }

    #[test]
    fn test_parse_partial_config() {
        let config = Config::parse("root = \"/tmp/x\"").unwrap();

        assert_eq!(config.root, "/tmp/x");
        assert_eq!(config.data_dir, "data");
        assert_eq!(config.http.port, 8080);
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.root, ".");
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("root = [");
        assert!(matches!(result, Err(DepotError::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("depot.toml");
        std::fs::write(&path, "users_dir = \"people\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.users_dir, "people");
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/depot.toml");
        assert!(matches!(result, Err(DepotError::Io(_))));
    }

    #[test]
    fn test_apply_overrides() {
        let env: HashMap<&str, &str> = [
            ("DEPOT_ROOT", "/var/lib/depot"),
            ("DEPOT_USERS_DIR", ""),
            ("DEPOT_PORT", "9090"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.root, "/var/lib/depot");
        // Empty values are ignored
        assert_eq!(config.users_dir, "users");
        assert_eq!(config.http.port, 9090);
    }

    #[test]
    fn test_apply_overrides_invalid_port() {
        let mut config = Config::default();
        let result = config.apply_overrides(|key| {
            (key == "DEPOT_PORT").then(|| "not-a-port".to_string())
        });
        assert!(matches!(result, Err(DepotError::Config(_))));
    }

    #[test]
    fn test_validate() {
        assert!(Config::default().validate().is_ok());

        let config = Config {
            root: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            data_dir: "../elsewhere".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            users_dir: "/etc".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            data_dir: "store/projects".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_max_upload_size_bytes() {
        let http = HttpConfig {
            max_upload_size_mb: 2,
            ..Default::default()
        };
        assert_eq!(http.max_upload_size_bytes(), 2 * 1024 * 1024);
    }
}
