//! Credentials for the StarLine developer API
//!
//! The four values come from the application page at
//! <https://my.starline.ru/developer>.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Account and application credentials
///
/// Built with the `with_*` setters or deserialized from a config file.
/// The client only reads it; swap it through
/// [`StarlineClient::set_config`](crate::StarlineClient::set_config).
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// User login
    #[serde(default)]
    pub login: String,
    /// User password, sent as a SHA-1 hex digest
    #[serde(default)]
    pub password: String,
    /// Application id
    #[serde(default)]
    pub app_id: String,
    /// Application secret key, sent as an MD5 hex digest
    #[serde(default)]
    pub secret: String,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_login(mut self, login: impl Into<String>) -> Self {
        self.login = login.into();
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = app_id.into();
        self
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = secret.into();
        self
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Names of the fields that are still empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.login.is_empty() {
            missing.push("login");
        }
        if self.password.is_empty() {
            missing.push("password");
        }
        if self.app_id.is_empty() {
            missing.push("app_id");
        }
        if self.secret.is_empty() {
            missing.push("secret");
        }
        missing
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .field("app_id", &self.app_id)
            .field("secret", &"<redacted>")
            .finish()
    }
}
