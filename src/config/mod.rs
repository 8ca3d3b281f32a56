use serde::{Deserialize, Deserializer, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Secret shipped in sample configs. Refused outside development.
pub const PLACEHOLDER_JWT_SECRET: &str = "your-secret-key-change-this";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    #[serde(deserialize_with = "duration_secs")]
    pub access_token_ttl_secs: u64,
    #[serde(deserialize_with = "duration_secs")]
    pub refresh_token_ttl_secs: u64,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Directory for rolling log files; stdout only when unset.
    pub dir: Option<PathBuf>,
    pub file: String,
    pub rotation: String,
    pub json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::development()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6020,
            request_timeout_secs: 30,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://postgres@localhost:5432/anch".to_string(),
            max_connections: 25,
            connect_timeout_secs: 10,
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: PLACEHOLDER_JWT_SECRET.to_string(),
            access_token_ttl_secs: 60 * 60,
            refresh_token_ttl_secs: 7 * 24 * 60 * 60,
            cors_origins: vec!["http://localhost:5173".to_string()],
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
            file: "anch.log".to_string(),
            rotation: "daily".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Defaults for the `APP_ENV` environment, overridden by environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };
        Self::preset(environment).with_env_overrides()
    }

    fn preset(environment: Environment) -> Self {
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
    }

    /// Reads a YAML file, then applies environment variable overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&raw)?.with_env_overrides()
    }

    /// Starts from the preset named by the file's `environment` key and
    /// overlays every field the file sets.
    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        let file: serde_yaml::Value = if raw.trim().is_empty() {
            serde_yaml::Value::Null
        } else {
            serde_yaml::from_str(raw)?
        };
        let environment = match file.get("environment") {
            Some(value) => serde_yaml::from_value(value.clone())?,
            None => Environment::Development,
        };
        let preset = Self::preset(environment);
        let sets_secret = file
            .get("security")
            .and_then(|security| security.get("jwt_secret"))
            .is_some();

        let mut merged = serde_yaml::to_value(&preset)?;
        if !file.is_null() {
            overlay(&mut merged, file);
        }

        let mut config: Self = serde_yaml::from_value(merged)?;
        // jwt_secret is never serialized, so the preset's value is restored here
        if !sets_secret {
            config.security.jwt_secret = preset.security.jwt_secret;
        }
        Ok(config)
    }

    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        // Server overrides
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Some(port) = env_parsed("SERVER_PORT")? {
            self.server.port = port;
        }
        if let Some(secs) = env_duration("SERVER_REQUEST_TIMEOUT")? {
            self.server.request_timeout_secs = secs;
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Some(max) = env_parsed("DATABASE_MAX_CONNECTIONS")? {
            self.database.max_connections = max;
        }
        if let Some(secs) = env_duration("DATABASE_CONNECT_TIMEOUT")? {
            self.database.connect_timeout_secs = secs;
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Some(secs) = env_duration("JWT_ACCESS_DURATION")? {
            self.security.access_token_ttl_secs = secs;
        }
        if let Some(secs) = env_duration("JWT_REFRESH_DURATION")? {
            self.security.refresh_token_ttl_secs = secs;
        }
        if let Ok(v) = env::var("CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Logging overrides
        if let Ok(v) = env::var("LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Ok(v) = env::var("LOG_DIR") {
            self.logging.dir = Some(PathBuf::from(v));
        }
        if let Some(json) = env_parsed("LOG_JSON")? {
            self.logging.json = json;
        }

        Ok(self)
    }

    /// Checks the invariants the token layer depends on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let security = &self.security;
        if security.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Invalid("jwt_secret must not be empty".into()));
        }
        if self.environment != Environment::Development
            && security.jwt_secret == PLACEHOLDER_JWT_SECRET
        {
            return Err(ConfigError::Invalid(
                "jwt_secret still uses the placeholder value".into(),
            ));
        }
        if security.access_token_ttl_secs == 0 || security.refresh_token_ttl_secs == 0 {
            return Err(ConfigError::Invalid("token lifetimes must be positive".into()));
        }
        if security.access_token_ttl_secs >= security.refresh_token_ttl_secs {
            return Err(ConfigError::Invalid(
                "access token lifetime must be shorter than refresh token lifetime".into(),
            ));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig::default(),
            database: DatabaseConfig {
                max_connections: 10,
                ..DatabaseConfig::default()
            },
            security: SecurityConfig::default(),
            logging: LoggingConfig {
                level: "debug".to_string(),
                ..LoggingConfig::default()
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                ..ServerConfig::default()
            },
            database: DatabaseConfig::default(),
            security: SecurityConfig {
                cors_origins: vec!["https://staging.example.com".to_string()],
                ..SecurityConfig::default()
            },
            logging: LoggingConfig {
                dir: Some(PathBuf::from("logs")),
                ..LoggingConfig::default()
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                request_timeout_secs: 15,
                ..ServerConfig::default()
            },
            database: DatabaseConfig {
                max_connections: 50,
                connect_timeout_secs: 5,
                ..DatabaseConfig::default()
            },
            security: SecurityConfig {
                access_token_ttl_secs: 15 * 60,
                cors_origins: vec!["https://app.example.com".to_string()],
                ..SecurityConfig::default()
            },
            logging: LoggingConfig {
                dir: Some(PathBuf::from("logs")),
                json: true,
                ..LoggingConfig::default()
            },
        }
    }
}

/// Replaces mappings key by key; any other value in `patch` wins outright.
fn overlay(base: &mut serde_yaml::Value, patch: serde_yaml::Value) {
    match (base, patch) {
        (serde_yaml::Value::Mapping(base), serde_yaml::Value::Mapping(patch)) => {
            for (key, value) in patch {
                match base.get_mut(&key) {
                    Some(slot) => overlay(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

fn env_parsed<T: FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(format!("{} has an invalid value '{}'", name, raw))),
        Err(_) => Ok(None),
    }
}

fn env_duration(name: &str) -> Result<Option<u64>, ConfigError> {
    match env::var(name) {
        Ok(raw) => parse_duration_secs(&raw)
            .map(Some)
            .ok_or_else(|| ConfigError::Invalid(format!("{} is not a duration: '{}'", name, raw))),
        Err(_) => Ok(None),
    }
}

/// Parses `3600`, `90s`, `15m`, `1h` or `7d` into seconds.
pub fn parse_duration_secs(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if let Ok(secs) = raw.parse::<u64>() {
        return Some(secs);
    }
    let (split, _) = raw.char_indices().last()?;
    let (value, unit) = raw.split_at(split);
    let value: u64 = value.trim().parse().ok()?;
    let scale = match unit {
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        _ => return None,
    };
    value.checked_mul(scale)
}

fn duration_secs<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Secs(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Secs(secs) => Ok(secs),
        Raw::Text(text) => parse_duration_secs(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid duration '{}'", text))),
    }
}
