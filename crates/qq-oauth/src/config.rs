//! Client configuration loading
//!
//! Optional helper for hosts that keep OAuth settings in a TOML file.
//! The client secret is never stored in the TOML directly: it comes from
//! the `QQ_OAUTH_CLIENT_SECRET` env var or from `client_secret_file`.

use common::Secret;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::client::Endpoints;
use crate::constants::{CLIENT_SECRET_ENV, DEFAULT_TIMEOUT_SECS};

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct ClientConfig {
    pub client: ClientSettings,
    #[serde(default)]
    pub endpoints: EndpointOverrides,
}

/// Registered application settings
#[derive(Debug, Deserialize)]
pub struct ClientSettings {
    pub client_id: String,
    pub redirect_uri: String,
    #[serde(skip)]
    pub client_secret: Option<Secret<String>>,
    /// Path to a file containing the client secret (alternative to the env var)
    #[serde(default)]
    pub client_secret_file: Option<PathBuf>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Per-endpoint URL overrides; unset entries keep the provider defaults.
#[derive(Debug, Default, Deserialize)]
pub struct EndpointOverrides {
    pub authorize: Option<String>,
    pub token: Option<String>,
    pub user_info: Option<String>,
}

impl EndpointOverrides {
    pub fn resolve(&self) -> Endpoints {
        let defaults = Endpoints::default();
        Endpoints {
            authorize: self.authorize.clone().unwrap_or(defaults.authorize),
            token: self.token.clone().unwrap_or(defaults.token),
            user_info: self.user_info.clone().unwrap_or(defaults.user_info),
        }
    }
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ClientConfig {
    /// Load configuration from a TOML file, then resolve the client secret.
    ///
    /// Secret resolution order:
    /// 1. QQ_OAUTH_CLIENT_SECRET env var
    /// 2. client_secret_file path from config
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(contents: &str) -> common::Result<Self> {
        let mut config: ClientConfig = toml::from_str(contents)?;

        if config.client.client_id.is_empty() {
            return Err(common::Error::Config("client_id must not be empty".into()));
        }
        if config.client.redirect_uri.is_empty() {
            return Err(common::Error::Config(
                "redirect_uri must not be empty".into(),
            ));
        }
        if config.client.timeout_secs == 0 {
            return Err(common::Error::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        // Env var takes precedence over file
        config.client.client_secret = std::env::var(CLIENT_SECRET_ENV)
            .ok()
            .filter(|secret| !secret.is_empty())
            .map(Secret::new);
        if config.client.client_secret.is_none() {
            if let Some(ref secret_file) = config.client.client_secret_file {
                let secret = std::fs::read_to_string(secret_file).map_err(|e| {
                    common::Error::Config(format!(
                        "failed to read client_secret_file {}: {e}",
                        secret_file.display()
                    ))
                })?;
                let secret = secret.trim().to_owned();
                if !secret.is_empty() {
                    config.client.client_secret = Some(Secret::new(secret));
                }
            }
        }

        if config.client.client_secret.is_none() {
            return Err(common::Error::Config(format!(
                "client secret not set: export {CLIENT_SECRET_ENV} or set client.client_secret_file"
            )));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::OAuthClient;
    use crate::constants::{AUTHORIZE_ENDPOINT, USER_INFO_ENDPOINT};
    use std::sync::Mutex;

    /// Mutex to serialize tests that read or mutate environment variables.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// SAFETY: Callers must hold ENV_MUTEX to prevent concurrent env mutation.
    unsafe fn set_env(key: &str, val: &str) {
        unsafe { std::env::set_var(key, val) };
    }

    unsafe fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) };
    }

    fn toml_with_secret_file(secret_file: &Path) -> String {
        format!(
            r#"
[client]
client_id = "101234567"
redirect_uri = "https://example.com/oauth/callback"
client_secret_file = "{}"
"#,
            secret_file.display()
        )
    }

    const NO_SECRET_TOML: &str = r#"
[client]
client_id = "101234567"
redirect_uri = "https://example.com/oauth/callback"
timeout_secs = 10

[endpoints]
token = "http://127.0.0.1:9000/oauth2.0/token"
"#;

    #[test]
    fn load_reads_secret_file_and_defaults() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { remove_env(CLIENT_SECRET_ENV) };

        let dir = tempfile::tempdir().unwrap();
        let secret_path = dir.path().join("secret");
        std::fs::write(&secret_path, "qq-app-secret\n").unwrap();
        let path = dir.path().join("qq-oauth.toml");
        std::fs::write(&path, toml_with_secret_file(&secret_path)).unwrap();

        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.client.client_id, "101234567");
        assert_eq!(config.client.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(
            config.client.client_secret.as_ref().unwrap().expose(),
            "qq-app-secret"
        );
        assert_eq!(config.endpoints.resolve(), Endpoints::default());
    }

    #[test]
    fn env_secret_overrides_file() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let secret_path = dir.path().join("secret");
        std::fs::write(&secret_path, "from-file").unwrap();

        unsafe { set_env(CLIENT_SECRET_ENV, "from-env") };
        let result = ClientConfig::from_toml(&toml_with_secret_file(&secret_path));
        unsafe { remove_env(CLIENT_SECRET_ENV) };

        let config = result.unwrap();
        assert_eq!(
            config.client.client_secret.as_ref().unwrap().expose(),
            "from-env"
        );
    }

    #[test]
    fn missing_secret_is_rejected() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { remove_env(CLIENT_SECRET_ENV) };

        match ClientConfig::from_toml(NO_SECRET_TOML) {
            Err(common::Error::Config(msg)) => assert!(msg.contains(CLIENT_SECRET_ENV), "got: {msg}"),
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn unreadable_secret_file_is_rejected() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { remove_env(CLIENT_SECRET_ENV) };

        let result = ClientConfig::from_toml(&toml_with_secret_file(Path::new(
            "/nonexistent/qq-secret",
        )));
        assert!(matches!(result, Err(common::Error::Config(_))));
    }

    #[test]
    fn endpoint_overrides_merge_with_defaults() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { set_env(CLIENT_SECRET_ENV, "qq-app-secret") };
        let result = ClientConfig::from_toml(NO_SECRET_TOML);
        unsafe { remove_env(CLIENT_SECRET_ENV) };

        let config = result.unwrap();
        let endpoints = config.endpoints.resolve();
        assert_eq!(endpoints.token, "http://127.0.0.1:9000/oauth2.0/token");
        assert_eq!(endpoints.authorize, AUTHORIZE_ENDPOINT);
        assert_eq!(endpoints.user_info, USER_INFO_ENDPOINT);
        assert_eq!(config.client.timeout_secs, 10);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let toml = r#"
[client]
client_id = "101234567"
redirect_uri = "https://example.com/oauth/callback"
timeout_secs = 0
"#;
        assert!(matches!(
            ClientConfig::from_toml(toml),
            Err(common::Error::Config(_))
        ));
    }

    #[test]
    fn empty_client_id_is_rejected() {
        let toml = r#"
[client]
client_id = ""
redirect_uri = "https://example.com/oauth/callback"
"#;
        match ClientConfig::from_toml(toml) {
            Err(common::Error::Config(msg)) => assert!(msg.contains("client_id")),
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn invalid_toml_is_rejected() {
        assert!(matches!(
            ClientConfig::from_toml("not valid {{{{ toml"),
            Err(common::Error::Toml(_))
        ));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let result = ClientConfig::load(Path::new("/nonexistent/path/qq-oauth.toml"));
        assert!(matches!(result, Err(common::Error::Io(_))));
    }

    #[test]
    fn config_builds_client() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { set_env(CLIENT_SECRET_ENV, "qq-app-secret") };
        let result = ClientConfig::from_toml(NO_SECRET_TOML);
        unsafe { remove_env(CLIENT_SECRET_ENV) };

        let client = OAuthClient::from_config(&result.unwrap()).unwrap();
        assert_eq!(client.client_id(), "101234567");
        assert_eq!(client.timeout(), std::time::Duration::from_secs(10));
    }
}
