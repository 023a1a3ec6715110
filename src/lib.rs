//! RoomieHaus: roommate records and partner accounts in Cloud Firestore, plus the small
//! greeting service the web frontend talks to.
//!
//! Start from [`initialize_app`] with the project's [`FirebaseOptions`], then get a
//! Firestore handle with [`FirebaseApp::firestore`].

pub mod accounts;
pub mod config;
pub mod core;
pub mod firestore;
pub mod greeting;
pub mod roommates;
pub mod server;

pub use config::{Config, FirebaseOptions, FirestoreSettings};
pub use yup_oauth2;

use crate::core::middleware::{ApiKeyMiddleware, AuthMiddleware};
use firestore::FirebaseFirestore;
use reqwest::Client;
use reqwest_middleware::ClientBuilder;
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use yup_oauth2::ServiceAccountKey;

/// How Firestore requests are authorized.
#[derive(Clone)]
enum Credentials {
    /// The web API key from [`FirebaseOptions::api_key`].
    ApiKey,
    ServiceAccount(ServiceAccountKey),
}

/// An initialized Firebase app. Cheap to create; no request is made until a service
/// handle is used.
#[derive(Clone)]
pub struct FirebaseApp {
    options: FirebaseOptions,
    credentials: Credentials,
    settings: FirestoreSettings,
    emulator_host: Option<String>,
}

/// Initializes an app that authorizes with the web API key.
pub fn initialize_app(options: FirebaseOptions) -> FirebaseApp {
    FirebaseApp::new(options)
}

impl FirebaseApp {
    pub fn new(options: FirebaseOptions) -> Self {
        Self {
            options,
            credentials: Credentials::ApiKey,
            settings: FirestoreSettings::default(),
            emulator_host: None,
        }
    }

    /// Initializes an app with admin credentials. The project id falls back to the key's
    /// when the options leave it empty.
    pub fn with_service_account(mut options: FirebaseOptions, key: ServiceAccountKey) -> Self {
        if options.project_id.is_empty() {
            options.project_id = key.project_id.clone().unwrap_or_default();
        }
        Self {
            options,
            credentials: Credentials::ServiceAccount(key),
            settings: FirestoreSettings::default(),
            emulator_host: None,
        }
    }

    /// Builds an app from a loaded [`Config`], reading the service account key if one is
    /// configured.
    pub async fn from_config(config: &Config) -> std::io::Result<Self> {
        let app = match &config.service_account_key {
            Some(path) => {
                let key = yup_oauth2::read_service_account_key(path).await?;
                Self::with_service_account(config.firebase.clone(), key)
            }
            None => Self::new(config.firebase.clone()),
        };
        Ok(app
            .with_settings(config.firestore.clone())
            .with_emulator_host(config.firestore_emulator_host.clone()))
    }

    pub fn with_settings(mut self, settings: FirestoreSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Points Firestore handles at an emulator (`host:port`).
    pub fn with_emulator_host(mut self, host: Option<String>) -> Self {
        self.emulator_host = host;
        self
    }

    pub fn options(&self) -> &FirebaseOptions {
        &self.options
    }

    /// Returns a handle to the project's default Firestore database.
    pub fn firestore(&self) -> FirebaseFirestore {
        let retry_policy =
            ExponentialBackoff::builder().build_with_max_retries(self.settings.max_retries);
        let builder = ClientBuilder::new(Client::new())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy));

        let client = match &self.credentials {
            Credentials::ApiKey => builder.with(ApiKeyMiddleware::new(self.options.api_key.clone())),
            Credentials::ServiceAccount(key) => builder.with(AuthMiddleware::new(key.clone())),
        }
        .build();

        match &self.emulator_host {
            Some(host) => FirebaseFirestore::new_with_emulator(client, host, &self.options.project_id),
            None => FirebaseFirestore::new(client, &self.options.project_id),
        }
    }
}
