//! Configuration module for stash.
//!
//! Operational settings live in a TOML file and every field has a default,
//! so an empty or missing file yields a runnable configuration. Secrets
//! (master password hash, session signing key, admin path) live in a
//! separate generated JSON file and are never part of the TOML.

use std::path::{Path, PathBuf};

use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::hash_password;
use crate::{Result, StashError};

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public base URL used when composing shareable links.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// CORS allowed origins; empty means permissive (development mode).
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_url: default_base_url(),
            cors_origins: vec![],
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the uploaded files.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    /// Path to the metadata JSON file.
    #[serde(default = "default_metadata_file")]
    pub metadata_file: String,
    /// Path to the generated secrets JSON file.
    #[serde(default = "default_secrets_file")]
    pub secrets_file: String,
    /// Maximum upload size in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
}

fn default_upload_dir() -> String {
    "data/files".to_string()
}

fn default_metadata_file() -> String {
    "data/file_metadata.json".to_string()
}

fn default_secrets_file() -> String {
    "data/secrets.json".to_string()
}

fn default_max_upload_size() -> u64 {
    500
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            metadata_file: default_metadata_file(),
            secrets_file: default_secrets_file(),
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
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/stash.log".to_string()
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
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(StashError::Io)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| StashError::Config(format!("config parse error: {e}")))
    }

    /// Maximum upload size in bytes.
    pub fn max_upload_size(&self) -> u64 {
        self.storage.max_upload_size_mb * 1024 * 1024
    }
}

/// Generated secrets backing the admin surface.
///
/// Created once on first run and persisted as JSON. The admin path segment
/// is random so the panel URL is not guessable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Secrets {
    /// Argon2id PHC hash of the master password.
    pub password_hash: String,
    /// Signing key for session tokens, hex-encoded.
    pub session_secret: String,
    /// Random path segment the admin panel is mounted at.
    pub admin_path: String,
}

impl Secrets {
    /// Generate a fresh secrets set from a master password.
    pub fn generate(master_password: &str) -> Result<Self> {
        let password_hash = hash_password(master_password)?;

        let mut key = [0u8; 32];
        rand::rng().fill_bytes(&mut key);

        Ok(Self {
            password_hash,
            session_secret: hex::encode(key),
            admin_path: Uuid::new_v4().simple().to_string(),
        })
    }

    /// Load secrets from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(StashError::Io)?;
        serde_json::from_str(&content)
            .map_err(|e| StashError::Config(format!("secrets parse error: {e}")))
    }

    /// Save secrets to a JSON file, creating parent directories as needed.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path: &Path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| StashError::Config(format!("secrets serialize error: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load secrets, or generate and save them if the file does not exist.
    ///
    /// `master_password` is only consulted on first run.
    pub fn load_or_create<P: AsRef<Path>>(
        path: P,
        master_password: impl FnOnce() -> Result<String>,
    ) -> Result<Self> {
        let path: PathBuf = path.as_ref().to_path_buf();
        if path.exists() {
            return Self::load(&path);
        }
        let secrets = Self::generate(&master_password()?)?;
        secrets.save(&path)?;
        Ok(secrets)
    }
}
