//! Configuration for the RoomieHaus client and backend.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    env,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
};

use crate::greeting::LOCAL_GREETING_URL;

/// Environment variable naming a Firestore emulator (`host:port`).
pub const FIRESTORE_EMULATOR_HOST_ENV: &str = "FIRESTORE_EMULATOR_HOST";

pub const DEFAULT_GREETING: &str = "Hello from RoomieHaus backend!";

/// Firebase web app connection parameters, in the shape the Firebase console emits them.
///
/// The values are opaque to this crate and are not validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirebaseOptions {
    pub api_key: String,
    pub auth_domain: String,
    pub project_id: String,
    pub storage_bucket: String,
    pub messaging_sender_id: String,
    pub app_id: String,
}

/// HTTP client settings for the Firestore handle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FirestoreSettings {
    /// Retries for transient failures, with exponential backoff. `0` disables retrying.
    #[serde(default)]
    pub max_retries: u32,
}

/// Config for the backend HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// Text served by `/api/greeting`.
    pub greeting: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 5000),
            greeting: DEFAULT_GREETING.to_string(),
        }
    }
}

/// Top-level configuration.
///
/// Usually loaded from a JSON file with [`Self::load`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub firebase: FirebaseOptions,
    /// Path to a service account key. When set, Firestore requests use OAuth2 instead of the
    /// API key.
    #[serde(default)]
    pub service_account_key: Option<PathBuf>,
    /// `host:port` of a Firestore emulator.
    #[serde(default)]
    pub firestore_emulator_host: Option<String>,
    #[serde(default)]
    pub firestore: FirestoreSettings,
    #[serde(default)]
    pub server: ServerConfig,
    /// Endpoint queried by the `greet` command.
    #[serde(default = "default_greeting_url")]
    pub greeting_url: String,
}

fn default_greeting_url() -> String {
    LOCAL_GREETING_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            firebase: FirebaseOptions::default(),
            service_account_key: None,
            firestore_emulator_host: None,
            firestore: FirestoreSettings::default(),
            server: ServerConfig::default(),
            greeting_url: default_greeting_url(),
        }
    }
}

impl Config {
    /// Load the config from a JSON file and apply environment overrides.
    pub async fn load(path: impl AsRef<Path>) -> Result<Config> {
        let s = tokio::fs::read_to_string(path.as_ref())
            .await
            .with_context(|| format!("failed to read {}", path.as_ref().to_string_lossy()))?;
        let config: Config = serde_json::from_str(&s)
            .with_context(|| format!("failed to parse {}", path.as_ref().to_string_lossy()))?;
        Ok(config.with_env_overrides())
    }

    /// Applies `FIRESTORE_EMULATOR_HOST` if it is set and non-empty.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(host) = env::var(FIRESTORE_EMULATOR_HOST_ENV) {
            if !host.is_empty() {
                self.firestore_emulator_host = Some(host);
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_console_shaped_firebase_options() {
        let json = serde_json::json!({
            "firebase": {
                "apiKey": "AIza-test",
                "authDomain": "roomiehaus.firebaseapp.com",
                "projectId": "roomiehaus",
                "storageBucket": "roomiehaus.appspot.com",
                "messagingSenderId": "1234",
                "appId": "1:1234:web:abcd"
            }
        });

        let config: Config = serde_json::from_value(json).unwrap();
        assert_eq!(config.firebase.project_id, "roomiehaus");
        assert_eq!(config.firebase.api_key, "AIza-test");
        assert_eq!(config.firebase.app_id, "1:1234:web:abcd");
        assert_eq!(config.greeting_url, LOCAL_GREETING_URL);
        assert_eq!(config.server.bind_addr.port(), 5000);
        assert_eq!(config.server.greeting, DEFAULT_GREETING);
        assert_eq!(config.firestore.max_retries, 0);
        assert!(config.service_account_key.is_none());
    }

    #[tokio::test]
    async fn load_reports_missing_file() {
        let err = Config::load("/nonexistent/roomiehaus.json").await.unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
