//! Cloud Firestore module.
//!
//! A small client over the Firestore REST API: collection and document references,
//! paginated collection reads, and single-collection structured queries.
//!
//! Creating a [`FirebaseFirestore`] never touches the network. Bad credentials or an
//! unknown project only show up as a [`FirestoreError`] on the first request.

pub mod models;
pub mod query;
pub mod reference;
pub mod snapshot;

#[cfg(test)]
mod tests;

use self::query::{ExecutableQuery, Query};
use self::reference::{CollectionReference, DocumentReference};
use reqwest_middleware::ClientWithMiddleware;
use thiserror::Error;

const FIRESTORE_V1_API: &str =
    "https://firestore.googleapis.com/v1/projects/{project_id}/databases/(default)/documents";

const FIRESTORE_EMULATOR_API: &str =
    "http://{host}/v1/projects/{project_id}/databases/(default)/documents";

/// Errors that can occur during Firestore operations.
#[derive(Error, Debug)]
pub enum FirestoreError {
    /// Wrapper for `reqwest::Error`.
    #[error("HTTP Request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    /// Wrapper for `reqwest_middleware::Error`.
    #[error("Middleware error: {0}")]
    MiddlewareError(#[from] reqwest_middleware::Error),
    /// Errors returned by the Firestore API.
    #[error("API error: {0}")]
    ApiError(String),
    /// Wrapper for `serde_json::Error`.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Client for interacting with Cloud Firestore.
#[derive(Clone)]
pub struct FirebaseFirestore {
    client: ClientWithMiddleware,
    base_url: String,
}

impl FirebaseFirestore {
    /// Creates a client for the production endpoint of `project_id`.
    ///
    /// This is typically called via `FirebaseApp::firestore()`.
    pub fn new(client: ClientWithMiddleware, project_id: &str) -> Self {
        let base_url = FIRESTORE_V1_API.replace("{project_id}", project_id);
        Self { client, base_url }
    }

    /// Creates a client for a local Firestore emulator, e.g. `localhost:8080`.
    pub fn new_with_emulator(client: ClientWithMiddleware, host: &str, project_id: &str) -> Self {
        let base_url = FIRESTORE_EMULATOR_API
            .replace("{host}", host)
            .replace("{project_id}", project_id);
        Self { client, base_url }
    }

    /// Creates a client with a custom documents root URL (useful for testing).
    pub fn new_with_url(client: ClientWithMiddleware, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// The documents root every path is resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Gets a `CollectionReference` for the collection at the specified path.
    ///
    /// # Arguments
    ///
    /// * `collection_id` - The ID of the collection (e.g., "roommates").
    pub fn collection(&self, collection_id: &str) -> CollectionReference<'_> {
        CollectionReference {
            client: &self.client,
            path: format!("{}/{}", self.base_url, collection_id),
        }
    }

    /// Gets a `DocumentReference` for the document at the specified path.
    ///
    /// # Arguments
    ///
    /// * `document_path` - The slash-separated path to the document (e.g., "users/user1").
    pub fn doc(&self, document_path: &str) -> DocumentReference<'_> {
        DocumentReference {
            client: &self.client,
            path: format!("{}/{}", self.base_url, document_path),
        }
    }

    /// Attaches a query definition to this client.
    pub fn query(&self, query: Query) -> ExecutableQuery<'_> {
        ExecutableQuery::new(&self.client, self.base_url.clone(), query)
    }
}
