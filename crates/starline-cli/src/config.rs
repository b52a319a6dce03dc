//! Configuration file handling for starline-cli

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use starline_client::Config as Credentials;
use std::path::{Path, PathBuf};

/// Configuration for the CLI tool
///
/// ```toml
/// login = "driver@example.com"
/// password = "..."
/// app_id = "4242"
/// secret = "..."
/// user_ip = "192.0.2.10"
/// output = "table"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub login: Option<String>,
    pub password: Option<String>,
    pub app_id: Option<String>,
    pub secret: Option<String>,
    /// End-user address sent with the login request
    pub user_ip: Option<String>,
    /// Default output format
    pub output: Option<String>,
    /// Disable colored output
    pub no_color: Option<bool>,
    /// Verify TLS certificates of the StarLine hosts
    pub verify_tls: Option<bool>,
}

/// Values given on the command line (or through their env vars)
#[derive(Debug, Clone, Default)]
pub struct ArgOverrides<'a> {
    pub login: Option<&'a str>,
    pub password: Option<&'a str>,
    pub app_id: Option<&'a str>,
    pub secret: Option<&'a str>,
    pub user_ip: Option<&'a str>,
    pub no_color: bool,
    pub verify_tls: bool,
}

impl Config {
    /// Load configuration from the default config file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Get the default config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("starline-cli");

        Ok(config_dir.join("config.toml"))
    }

    /// Merge CLI arguments over config file values
    pub fn merge_with_args(&self, args: &ArgOverrides<'_>) -> MergedConfig {
        fn pick(arg: Option<&str>, file: &Option<String>) -> String {
            arg.map(String::from)
                .or_else(|| file.clone())
                .unwrap_or_default()
        }

        MergedConfig {
            credentials: Credentials::new()
                .with_login(pick(args.login, &self.login))
                .with_password(pick(args.password, &self.password))
                .with_app_id(pick(args.app_id, &self.app_id))
                .with_secret(pick(args.secret, &self.secret)),
            user_ip: args
                .user_ip
                .map(String::from)
                .or_else(|| self.user_ip.clone()),
            no_color: args.no_color || self.no_color.unwrap_or(false),
            verify_tls: args.verify_tls || self.verify_tls.unwrap_or(false),
        }
    }
}

/// Fully resolved configuration after merging CLI args
#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub credentials: Credentials,
    pub user_ip: Option<String>,
    pub no_color: bool,
    pub verify_tls: bool,
}

impl MergedConfig {
    /// Credentials, or an error naming every missing field
    pub fn credentials(&self) -> Result<Credentials> {
        let missing = self.credentials.missing_fields();
        if !missing.is_empty() {
            bail!(
                "Missing credentials: {} (set them in the config file, flags or STARLINE_* env vars)",
                missing.join(", ")
            );
        }
        Ok(self.credentials.clone())
    }
}
