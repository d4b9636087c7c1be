//! Connection settings gathered from `.env`, the environment, and flags.
//!
//! Raw settings are collected into [`Config`] first and only become usable
//! [`Settings`] after [`Config::validate`], which every command goes through
//! before a client is built.
use anyhow::{anyhow, Result};
use base64::Engine;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings as collected, before validation.
#[derive(Clone, Default)]
pub struct Config {
    pub host: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub token: Option<String>,
    pub verify_ssl: bool,
    pub ca_bundle: Option<PathBuf>,
    pub timeout_secs: u64,
}

/// Values given on the command line; each one present wins over the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub token: Option<String>,
    pub verify_ssl: Option<bool>,
    pub ca_bundle: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load `.env` from the working directory (if any), then read the process
    /// environment.
    pub fn from_env() -> Self {
        let _ = dotenv::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.is_empty());
        let verify_ssl = lookup("AAP_VERIFY_SSL")
            .map(|value| parse_flag(&value))
            .unwrap_or(true);
        let timeout_secs = lookup("AAP_TIMEOUT")
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            host: non_empty("AAP_HOST"),
            username: non_empty("AAP_USERNAME"),
            password: non_empty("AAP_PASSWORD"),
            token: non_empty("AAP_TOKEN"),
            verify_ssl,
            ca_bundle: non_empty("AAP_CA_BUNDLE").map(PathBuf::from),
            timeout_secs,
        }
    }

    pub fn apply(mut self, overrides: Overrides) -> Self {
        if overrides.host.is_some() {
            self.host = overrides.host;
        }
        if overrides.username.is_some() {
            self.username = overrides.username;
        }
        if overrides.password.is_some() {
            self.password = overrides.password;
        }
        if overrides.token.is_some() {
            self.token = overrides.token;
        }
        if let Some(verify) = overrides.verify_ssl {
            self.verify_ssl = verify;
        }
        if overrides.ca_bundle.is_some() {
            self.ca_bundle = overrides.ca_bundle;
        }
        if let Some(timeout) = overrides.timeout_secs {
            self.timeout_secs = timeout;
        }
        self
    }

    /// Check required settings and normalize the host.
    pub fn validate(self) -> Result<Settings> {
        let host = self.host.as_deref().map(str::trim).unwrap_or_default();
        if host.is_empty() {
            return Err(anyhow!(
                "AAP host is required. Set AAP_HOST environment variable or use --aap-host"
            ));
        }
        let host = normalize_host(host);

        let auth = match (self.token, self.username, self.password) {
            (Some(token), _, _) => Auth::Bearer(token),
            (None, Some(username), Some(password)) => Auth::Basic { username, password },
            _ => {
                return Err(anyhow!(
                    "Authentication required. Provide either:\n  \
                     - AAP_TOKEN environment variable or --aap-token\n  \
                     - AAP_USERNAME and AAP_PASSWORD environment variables or --aap-username/--aap-password"
                ))
            }
        };

        let tls = match self.ca_bundle {
            Some(path) => Tls::CaBundle(path),
            None if self.verify_ssl => Tls::Verify,
            None => Tls::Insecure,
        };

        Ok(Settings {
            host,
            auth,
            tls,
            timeout: Duration::from_secs(self.timeout_secs),
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("has_password", &self.password.is_some())
            .field("has_token", &self.token.is_some())
            .field("verify_ssl", &self.verify_ssl)
            .field("ca_bundle", &self.ca_bundle)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Validated connection settings shared by every service client.
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub auth: Auth,
    pub tls: Tls,
    pub timeout: Duration,
}

impl Settings {
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            timeout,
            ..self.clone()
        }
    }
}

#[derive(Clone)]
pub enum Auth {
    Bearer(String),
    Basic { username: String, password: String },
}

impl Auth {
    /// Value for the `Authorization` header.
    pub fn header_value(&self) -> String {
        match self {
            Auth::Bearer(token) => format!("Bearer {token}"),
            Auth::Basic { username, password } => {
                let encoded = base64::engine::general_purpose::STANDARD
                    .encode(format!("{username}:{password}"));
                format!("Basic {encoded}")
            }
        }
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Auth::Bearer(_) => f.write_str("Bearer(<redacted>)"),
            Auth::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tls {
    Verify,
    Insecure,
    CaBundle(PathBuf),
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

fn normalize_host(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
