//! Roommate records in the `roommates` collection.
//!
//! [`create_roommate`] and [`list_roommates`] return their failures. The workflow
//! functions ([`add_then_list`], [`add_and_list_unordered`]) are the fire-and-forget
//! entry points: they log every outcome and never return an error.
//!
//! # Ordering
//!
//! [`add_then_list`] finishes the write before the read starts, so the listing always
//! includes the new record. [`add_and_list_unordered`] starts both at once, which is how
//! the Firestore seeding script behaved: the listing may or may not contain the record
//! being written. That is a race, not a consistency guarantee.


use crate::firestore::{FirebaseFirestore, FirestoreError};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{error, info, warn};

pub const ROOMMATES_COLLECTION: &str = "roommates";

/// Server-assigned identifier of a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoommateRecord {
    pub name: String,
    pub income: f64,
}

impl fmt::Display for RoommateRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ name: {:?}, income: {} }}", self.name, self.income)
    }
}

#[derive(Error, Debug)]
pub enum RoommateError {
    /// Creating the document failed.
    #[error("Error adding document: {0}")]
    RemoteWrite(#[source] FirestoreError),
    /// Reading the collection failed.
    #[error("Error reading documents: {0}")]
    RemoteRead(#[source] FirestoreError),
}

/// Creates a roommate document and returns its new id.
///
/// Not idempotent: every call creates another document, even for the same name.
pub async fn create_roommate(
    db: &FirebaseFirestore,
    name: &str,
    income: f64,
) -> Result<DocumentId, RoommateError> {
    let record = RoommateRecord {
        name: name.to_string(),
        income,
    };

    let doc = db
        .collection(ROOMMATES_COLLECTION)
        .add(&record)
        .await
        .map_err(RoommateError::RemoteWrite)?;

    let id = DocumentId::new(doc.id());
    info!(%id, "Document added with ID: {}", id);
    Ok(id)
}

/// Lists every roommate at call time. Order not guaranteed.
///
/// Documents that do not decode as a [`RoommateRecord`] are logged and skipped.
pub async fn list_roommates(
    db: &FirebaseFirestore,
) -> Result<Vec<(DocumentId, RoommateRecord)>, RoommateError> {
    let snapshot = db
        .collection(ROOMMATES_COLLECTION)
        .get()
        .await
        .map_err(RoommateError::RemoteRead)?;

    let mut roommates = Vec::with_capacity(snapshot.size());
    for doc in snapshot {
        let id = DocumentId::new(doc.id());
        match doc.data::<RoommateRecord>() {
            Ok(record) => {
                info!("{} => {}", id, record);
                roommates.push((id, record));
            }
            Err(e) => warn!(%id, "skipping document {}: {}", id, e),
        }
    }

    Ok(roommates)
}

/// Outcome of a write/list workflow. Failed steps are `None`; the failure has been logged.
#[derive(Debug, Default)]
pub struct SeedReport {
    pub created: Option<DocumentId>,
    pub listed: Option<Vec<(DocumentId, RoommateRecord)>>,
}

/// Creates a roommate, waits for the write to finish, then lists the collection.
pub async fn add_then_list(db: &FirebaseFirestore, name: &str, income: f64) -> SeedReport {
    let created = log_failure(create_roommate(db, name, income).await);
    let listed = log_failure(list_roommates(db).await);
    SeedReport { created, listed }
}

/// Starts the write and the listing concurrently with no ordering between them.
///
/// The listing may or may not include the record being created.
pub async fn add_and_list_unordered(db: &FirebaseFirestore, name: &str, income: f64) -> SeedReport {
    let (created, listed) = tokio::join!(create_roommate(db, name, income), list_roommates(db));
    SeedReport {
        created: log_failure(created),
        listed: log_failure(listed),
    }
}

fn log_failure<T>(result: Result<T, RoommateError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            error!("{}", e);
            None
        }
    }
}
