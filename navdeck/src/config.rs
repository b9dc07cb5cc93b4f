// This file is part of the product NavDeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use argon2::password_hash::PasswordHash;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path};

/// Environment variable that overrides `auth.password_hash` with a plaintext secret.
pub const ADMIN_PASSWORD_ENV: &str = "ADMIN_PASSWORD";

/// Paths the admin prefix may not shadow.
const RESERVED_ADMIN_PATHS: [&str; 4] = ["/", "/login", "/api", "/icons"];

#[derive(Debug)]
pub enum ConfigError {
    LoadError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::LoadError(msg) => write!(f, "Configuration load error: {}", msg),
            ConfigError::ValidationError(msg) => {
                write!(f, "Configuration validation error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub app: AppConfig,
}

#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub server: ServerConfig,
    pub admin: AdminConfig,
    pub auth: ValidatedAuthConfig,
    pub storage: StorageConfig,
    pub upload: UploadConfig,
    pub logging: LoggingConfig,
    pub app: AppConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl ServerConfig {
    pub fn address_tuple(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

fn default_workers() -> usize {
    2
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AdminConfig {
    #[serde(default = "default_admin_path")]
    pub path: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            path: default_admin_path(),
        }
    }
}

fn default_admin_path() -> String {
    "/config".to_string()
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub password_hash: Option<String>,
    pub jwt: JwtConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_jwt_issuer")]
    pub issuer: String,
    #[serde(default = "default_jwt_audience")]
    pub audience: String,
    #[serde(default = "default_jwt_expiration_hours")]
    pub expiration_hours: u64,
    #[serde(default = "default_jwt_cookie_name")]
    pub cookie_name: String,
}

fn default_jwt_issuer() -> String {
    "navdeck".to_string()
}

fn default_jwt_audience() -> String {
    "navdeck-admin".to_string()
}

fn default_jwt_expiration_hours() -> u64 {
    24 * 7
}

fn default_jwt_cookie_name() -> String {
    "auth_token".to_string()
}

/// Auth settings after the admin secret has been resolved to a PHC hash string.
#[derive(Debug, Clone)]
pub struct ValidatedAuthConfig {
    pub password_hash: String,
    pub jwt: JwtConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_data_file")]
    pub data_file: String,
    #[serde(default = "default_public_dir")]
    pub public_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            public_dir: default_public_dir(),
        }
    }
}

fn default_data_file() -> String {
    "data/data.json".to_string()
}

fn default_public_dir() -> String {
    "public".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct UploadConfig {
    #[serde(default = "default_max_file_size_mb")]
    pub max_file_size_mb: u64,
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: default_max_file_size_mb(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

impl UploadConfig {
    pub fn max_file_size_bytes(&self) -> usize {
        (self.max_file_size_mb as usize).saturating_mul(1024 * 1024)
    }
}

fn default_max_file_size_mb() -> u64 {
    5
}

fn default_allowed_extensions() -> Vec<String> {
    ["png", "jpg", "jpeg", "gif", "svg", "webp", "ico", "avif"]
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_app_description")]
    pub description: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            description: default_app_description(),
        }
    }
}

fn default_app_name() -> String {
    "NavDeck".to_string()
}

fn default_app_description() -> String {
    "Personal navigation page".to_string()
}

impl Config {
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let config_path = root.join("config.yaml");
        let config_content = fs::read_to_string(&config_path).map_err(|e| {
            ConfigError::LoadError(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;
        Self::parse(&config_content).map_err(|e| match e {
            ConfigError::LoadError(msg) => ConfigError::LoadError(format!(
                "Failed to parse config file '{}': {}",
                config_path.display(),
                msg
            )),
            other => other,
        })
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::LoadError(e.to_string()))
    }

    /// Loads and validates configuration at startup. If validation fails, the application should not start.
    pub fn load_and_validate(root: &Path) -> Result<ValidatedConfig, ConfigError> {
        let config = Self::load(root)?;
        let env_password = std::env::var(ADMIN_PASSWORD_ENV).ok();
        config.validate(env_password.as_deref())
    }

    /// Validates a parsed config. `env_password` takes precedence over the stored hash.
    pub fn validate(self, env_password: Option<&str>) -> Result<ValidatedConfig, ConfigError> {
        Self::validate_server(&self.server)?;
        Self::validate_admin_path(&self.admin.path)?;
        Self::validate_jwt(&self.auth.jwt)?;
        Self::validate_relative_path("storage.data_file", &self.storage.data_file)?;
        Self::validate_relative_path("storage.public_dir", &self.storage.public_dir)?;
        Self::validate_logging(&self.logging)?;

        let password_hash = match env_password.map(str::trim).filter(|p| !p.is_empty()) {
            Some(plaintext) => {
                if self.auth.password_hash.is_some() {
                    warn!(
                        "{} is set; ignoring auth.password_hash from config.yaml",
                        ADMIN_PASSWORD_ENV
                    );
                }
                crate::iam::hash_admin_password(plaintext)
                    .map_err(|e| ConfigError::ValidationError(e.to_string()))?
            }
            None => {
                let stored = self.auth.password_hash.clone().ok_or_else(|| {
                    ConfigError::ValidationError(format!(
                        "auth.password_hash is required unless {} is set",
                        ADMIN_PASSWORD_ENV
                    ))
                })?;
                PasswordHash::new(&stored).map_err(|e| {
                    ConfigError::ValidationError(format!(
                        "auth.password_hash is not a valid PHC hash string: {}",
                        e
                    ))
                })?;
                stored
            }
        };

        Ok(ValidatedConfig {
            server: self.server,
            admin: self.admin,
            auth: ValidatedAuthConfig {
                password_hash,
                jwt: self.auth.jwt,
            },
            storage: self.storage,
            upload: self.upload,
            logging: self.logging,
            app: self.app,
        })
    }

    fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
        if server.host.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "server.host cannot be empty".to_string(),
            ));
        }
        if server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be greater than 0".to_string(),
            ));
        }
        if server.workers == 0 {
            return Err(ConfigError::ValidationError(
                "server.workers must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_admin_path(path: &str) -> Result<(), ConfigError> {
        if !path.starts_with('/') || path.len() < 2 {
            return Err(ConfigError::ValidationError(format!(
                "admin.path must start with '/' and name a sub-path, got: '{}'",
                path
            )));
        }
        if path.ends_with('/') {
            return Err(ConfigError::ValidationError(format!(
                "admin.path must not end with '/', got: '{}'",
                path
            )));
        }
        if RESERVED_ADMIN_PATHS.contains(&path) {
            return Err(ConfigError::ValidationError(format!(
                "admin.path '{}' collides with a built-in route",
                path
            )));
        }
        Ok(())
    }

    fn validate_jwt(jwt: &JwtConfig) -> Result<(), ConfigError> {
        if jwt.secret.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "auth.jwt.secret cannot be empty".to_string(),
            ));
        }
        if jwt.expiration_hours == 0 {
            return Err(ConfigError::ValidationError(
                "auth.jwt.expiration_hours must be at least 1".to_string(),
            ));
        }
        if jwt.cookie_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "auth.jwt.cookie_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_relative_path(label: &str, value: &str) -> Result<(), ConfigError> {
        let path = Path::new(value);
        if value.trim().is_empty() || path.is_absolute() {
            return Err(ConfigError::ValidationError(format!(
                "{} must be a relative path inside the runtime root, got: '{}'",
                label, value
            )));
        }
        if path
            .components()
            .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir))
        {
            return Err(ConfigError::ValidationError(format!(
                "{} must not escape the runtime root, got: '{}'",
                label, value
            )));
        }
        Ok(())
    }

    fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
        match logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" | "off" => Ok(()),
            other => Err(ConfigError::ValidationError(format!(
                "logging.level must be one of trace, debug, info, warn, error, off; got: {}",
                other
            ))),
        }
    }
}

impl ValidatedConfig {
    /// True when the listener only accepts loopback connections; the session
    /// cookie is then issued without the `Secure` flag so plain HTTP works.
    pub fn is_localhost_only(&self) -> bool {
        ["127.0.0.1", "localhost", "::1"].contains(&self.server.host.as_str())
    }

    pub fn log_level_filter(&self) -> log::LevelFilter {
        match self.logging.level.to_lowercase().as_str() {
            "trace" => log::LevelFilter::Trace,
            "debug" => log::LevelFilter::Debug,
            "warn" => log::LevelFilter::Warn,
            "error" => log::LevelFilter::Error,
            "off" => log::LevelFilter::Off,
            _ => log::LevelFilter::Info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$ZGlnZXN0ZGlnZXN0ZGlnZXN0ZGlnZXN0ZGlnZXN0MDE";

    fn minimal_yaml() -> String {
        format!(
            "server:\n  host: \"127.0.0.1\"\n  port: 3000\nauth:\n  password_hash: \"{}\"\n  jwt:\n    secret: \"s3cret\"\n",
            TEST_HASH
        )
    }

    #[test]
    fn parse_applies_defaults() {
        let config = Config::parse(&minimal_yaml()).expect("parse");
        assert_eq!(config.admin.path, "/config");
        assert_eq!(config.auth.jwt.cookie_name, "auth_token");
        assert_eq!(config.auth.jwt.expiration_hours, 168);
        assert_eq!(config.storage.data_file, "data/data.json");
        assert_eq!(config.storage.public_dir, "public");
        assert_eq!(config.server.workers, 2);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn validate_keeps_stored_hash_without_env_override() {
        let config = Config::parse(&minimal_yaml()).expect("parse");
        let validated = config.validate(None).expect("valid");
        assert_eq!(validated.auth.password_hash, TEST_HASH);
        assert!(validated.is_localhost_only());
    }

    #[test]
    fn validate_env_password_replaces_stored_hash() {
        let config = Config::parse(&minimal_yaml()).expect("parse");
        let validated = config.validate(Some("from-env")).expect("valid");
        assert_ne!(validated.auth.password_hash, TEST_HASH);
        assert!(crate::iam::verify_admin_password(
            "from-env",
            &validated.auth.password_hash
        ));
    }

    #[test]
    fn validate_blank_env_password_is_ignored() {
        let config = Config::parse(&minimal_yaml()).expect("parse");
        let validated = config.validate(Some("   ")).expect("valid");
        assert_eq!(validated.auth.password_hash, TEST_HASH);
    }

    #[test]
    fn validate_requires_some_password_source() {
        let yaml = "server:\n  host: \"127.0.0.1\"\n  port: 3000\nauth:\n  jwt:\n    secret: \"s3cret\"\n";
        let config = Config::parse(yaml).expect("parse");
        assert!(matches!(
            config.validate(None),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn validate_rejects_garbage_hash() {
        let yaml = minimal_yaml().replace(TEST_HASH, "not-a-hash");
        let config = Config::parse(&yaml).expect("parse");
        assert!(config.validate(None).is_err());
    }

    #[test]
    fn admin_path_rules() {
        assert!(Config::validate_admin_path("/config").is_ok());
        assert!(Config::validate_admin_path("/manage/links").is_ok());
        assert!(Config::validate_admin_path("config").is_err());
        assert!(Config::validate_admin_path("/").is_err());
        assert!(Config::validate_admin_path("/config/").is_err());
        assert!(Config::validate_admin_path("/login").is_err());
        assert!(Config::validate_admin_path("/icons").is_err());
    }

    #[test]
    fn storage_paths_must_stay_inside_root() {
        assert!(Config::validate_relative_path("storage.data_file", "data/data.json").is_ok());
        assert!(Config::validate_relative_path("storage.data_file", "../data.json").is_err());
        assert!(Config::validate_relative_path("storage.data_file", "/etc/data.json").is_err());
        assert!(Config::validate_relative_path("storage.data_file", "").is_err());
    }

    #[test]
    fn validate_rejects_unknown_log_level() {
        let yaml = format!("{}logging:\n  level: \"loud\"\n", minimal_yaml());
        let config = Config::parse(&yaml).expect("parse");
        assert!(config.validate(None).is_err());
    }

    #[test]
    fn validate_rejects_zero_port() {
        let yaml = minimal_yaml().replace("port: 3000", "port: 0");
        let config = Config::parse(&yaml).expect("parse");
        assert!(config.validate(None).is_err());
    }

    #[test]
    fn public_host_is_not_localhost_only() {
        let yaml = minimal_yaml().replace("127.0.0.1", "0.0.0.0");
        let validated = Config::parse(&yaml)
            .expect("parse")
            .validate(None)
            .expect("valid");
        assert!(!validated.is_localhost_only());
    }
}
