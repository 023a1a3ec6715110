//! Partner-pair accounts in the `users` collection.
//!
//! An account is keyed by the two partner names and protected by a four digit PIN.


use crate::firestore::models::{FieldOperator, Value, ValueType};
use crate::firestore::query::Query;
use crate::firestore::{FirebaseFirestore, FirestoreError};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::info;

pub const USERS_COLLECTION: &str = "users";

/// Registration and login payload. Every field is required; they are optional here so a
/// missing field can be reported as such.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountRequest {
    pub partner1: Option<String>,
    pub partner2: Option<String>,
    pub pin: Option<String>,
}

/// A stored account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub partner1: String,
    pub partner2: String,
    pub pin: String,
    #[serde(default)]
    pub registered_at: Option<String>,
}

#[derive(Error, Debug)]
pub enum AccountError {
    #[error("Please fill in all fields.")]
    MissingFields,
    #[error("PIN must be exactly 4 numbers.")]
    InvalidPinFormat,
    #[error("Account with these partners already exists. Please sign in.")]
    AlreadyExists,
    #[error("No account found with these partner names. Please register.")]
    NotFound,
    #[error("Invalid PIN. Please try again.")]
    InvalidPin,
    #[error(transparent)]
    Store(#[from] FirestoreError),
}

/// Returns `true` if `pin` is exactly four ASCII digits.
///
/// Other Unicode decimal digits (e.g. `"١٢٣٤"`) are rejected.
pub fn validate_pin(pin: &str) -> bool {
    pin.len() == 4 && pin.bytes().all(|b| b.is_ascii_digit())
}

struct Validated<'a> {
    partner1: &'a str,
    partner2: &'a str,
    pin: &'a str,
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

fn validate(request: &AccountRequest) -> Result<Validated<'_>, AccountError> {
    let (Some(partner1), Some(partner2), Some(pin)) = (
        non_empty(&request.partner1),
        non_empty(&request.partner2),
        non_empty(&request.pin),
    ) else {
        return Err(AccountError::MissingFields);
    };

    if !validate_pin(pin) {
        return Err(AccountError::InvalidPinFormat);
    }

    Ok(Validated {
        partner1,
        partner2,
        pin,
    })
}

async fn find_account(
    db: &FirebaseFirestore,
    partner1: &str,
    partner2: &str,
) -> Result<Option<UserAccount>, AccountError> {
    let query = Query::new(USERS_COLLECTION)
        .where_filter("partner1", FieldOperator::Equal, partner1)?
        .where_filter("partner2", FieldOperator::Equal, partner2)?
        .limit(1);

    let snapshot = db.query(query).get().await?;
    match snapshot.documents().first() {
        Some(doc) => Ok(Some(doc.data::<UserAccount>()?)),
        None => Ok(None),
    }
}

/// Registers a new partner pair. Returns the new document's id.
pub async fn register(
    db: &FirebaseFirestore,
    request: &AccountRequest,
) -> Result<String, AccountError> {
    let account = validate(request)?;

    if find_account(db, account.partner1, account.partner2)
        .await?
        .is_some()
    {
        return Err(AccountError::AlreadyExists);
    }

    let string = |s: &str| Value {
        value_type: ValueType::StringValue(s.to_string()),
    };
    let mut fields = HashMap::new();
    fields.insert("partner1".to_string(), string(account.partner1));
    fields.insert("partner2".to_string(), string(account.partner2));
    fields.insert("pin".to_string(), string(account.pin));
    fields.insert(
        "registeredAt".to_string(),
        Value {
            value_type: ValueType::TimestampValue(
                Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            ),
        },
    );

    let doc = db.collection(USERS_COLLECTION).add_fields(fields).await?;
    info!(id = doc.id(), "registered {} & {}", account.partner1, account.partner2);
    Ok(doc.id().to_string())
}

/// Checks a partner pair's PIN.
pub async fn login(db: &FirebaseFirestore, request: &AccountRequest) -> Result<(), AccountError> {
    let account = validate(request)?;

    let stored = find_account(db, account.partner1, account.partner2)
        .await?
        .ok_or(AccountError::NotFound)?;

    if stored.pin != account.pin {
        return Err(AccountError::InvalidPin);
    }

    Ok(())
}
