use super::models::{FieldOperator, ValueType};
use super::query::Query;
use super::reference::{convert_serde_value_to_firestore_value, convert_serializable_to_fields};
use super::*;
use crate::core::middleware::ApiKeyMiddleware;
use httpmock::prelude::*;
use reqwest::Client;
use reqwest_middleware::ClientBuilder;
use serde::{Deserialize, Serialize};

const DOCUMENTS: &str = "/v1/projects/p/databases/(default)/documents";

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Roommate {
    name: String,
    income: f64,
}

fn firestore(server: &MockServer) -> FirebaseFirestore {
    let client = ClientBuilder::new(Client::new()).build();
    FirebaseFirestore::new_with_url(client, server.url(DOCUMENTS))
}

#[test]
fn integral_numbers_encode_as_integers() {
    let fields = convert_serializable_to_fields(&Roommate {
        name: "Aura".to_string(),
        income: 10000.0,
    })
    .unwrap();

    assert_eq!(
        fields["income"].value_type,
        ValueType::IntegerValue("10000".to_string())
    );
    assert_eq!(
        fields["name"].value_type,
        ValueType::StringValue("Aura".to_string())
    );

    let fractional = convert_serde_value_to_firestore_value(serde_json::json!(2500.5)).unwrap();
    assert_eq!(fractional.value_type, ValueType::DoubleValue(2500.5));

    let huge = convert_serde_value_to_firestore_value(serde_json::json!(1e300)).unwrap();
    assert_eq!(huge.value_type, ValueType::DoubleValue(1e300));
}

#[test]
fn non_object_documents_are_rejected() {
    let err = convert_serializable_to_fields(&vec![1, 2, 3]).unwrap_err();
    assert!(matches!(err, FirestoreError::SerializationError(_)));
}

#[tokio::test]
async fn api_key_is_sent_as_query_parameter() {
    let server = MockServer::start();
    let client = ClientBuilder::new(Client::new())
        .with(ApiKeyMiddleware::new("test-key"))
        .build();
    let db = FirebaseFirestore::new_with_url(client, server.url(DOCUMENTS));

    let mock = server.mock(|when, then| {
        when.method(GET)
            .path(format!("{DOCUMENTS}/roommates/abc"))
            .query_param("key", "test-key");
        then.status(200).json_body(serde_json::json!({
            "name": "projects/p/databases/(default)/documents/roommates/abc",
            "fields": {
                "name": { "stringValue": "Aura" },
                "income": { "doubleValue": 10000.5 }
            },
            "createTime": "2025-01-01T00:00:00Z",
            "updateTime": "2025-01-01T00:00:00Z"
        }));
    });

    let roommate: Option<Roommate> = db.collection("roommates").doc("abc").get().await.unwrap();
    assert_eq!(
        roommate,
        Some(Roommate {
            name: "Aura".to_string(),
            income: 10000.5,
        })
    );
    mock.assert();
}

#[tokio::test]
async fn missing_document_is_none() {
    let server = MockServer::start();
    let db = firestore(&server);

    server.mock(|when, then| {
        when.method(GET).path(format!("{DOCUMENTS}/roommates/gone"));
        then.status(404).json_body(serde_json::json!({
            "error": { "code": 404, "message": "Document not found", "status": "NOT_FOUND" }
        }));
    });

    let roommate: Option<Roommate> = db.doc("roommates/gone").get().await.unwrap();
    assert!(roommate.is_none());
}

#[tokio::test]
async fn collection_get_reads_snapshot() {
    let server = MockServer::start();
    let db = firestore(&server);

    server.mock(|when, then| {
        when.method(GET)
            .path(format!("{DOCUMENTS}/roommates"))
            .query_param("pageSize", "300");
        then.status(200).json_body(serde_json::json!({
            "documents": [
                {
                    "name": "projects/p/databases/(default)/documents/roommates/a",
                    "fields": { "name": { "stringValue": "Aura" }, "income": { "integerValue": "10000" } }
                },
                {
                    "name": "projects/p/databases/(default)/documents/roommates/b",
                    "fields": { "name": { "stringValue": "Bo" }, "income": { "integerValue": "8000" } }
                }
            ]
        }));
    });

    let snapshot = db.collection("roommates").get().await.unwrap();
    assert_eq!(snapshot.size(), 2);
    let ids: Vec<&str> = snapshot.iter().map(|d| d.id()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    let bo: Roommate = snapshot.documents()[1].data().unwrap();
    assert_eq!(bo.income, 8000.0);
}

#[tokio::test]
async fn api_errors_carry_the_service_message() {
    let server = MockServer::start();
    let db = firestore(&server);

    server.mock(|when, then| {
        when.method(GET).path(format!("{DOCUMENTS}/roommates"));
        then.status(400).json_body(serde_json::json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT"
            }
        }));
    });

    let err = db.collection("roommates").get().await.unwrap_err();
    let FirestoreError::ApiError(msg) = err else {
        panic!("expected an API error");
    };
    assert!(msg.starts_with("List documents failed"));
    assert!(msg.contains("API key not valid"));
    assert!(msg.contains("INVALID_ARGUMENT"));
}

#[tokio::test]
async fn query_runs_against_documents_root() {
    let server = MockServer::start();
    let db = firestore(&server);

    let mock = server.mock(|when, then| {
        when.method(POST)
            .path(format!("{DOCUMENTS}:runQuery"))
            .json_body(serde_json::json!({
                "structuredQuery": {
                    "from": [{ "collectionId": "users" }],
                    "where": {
                        "compositeFilter": {
                            "op": "AND",
                            "filters": [
                                { "fieldFilter": {
                                    "field": { "fieldPath": "partner1" },
                                    "op": "EQUAL",
                                    "value": { "stringValue": "Ana" }
                                } },
                                { "fieldFilter": {
                                    "field": { "fieldPath": "partner2" },
                                    "op": "EQUAL",
                                    "value": { "stringValue": "Ben" }
                                } }
                            ]
                        }
                    },
                    "limit": 1
                }
            }));
        then.status(200).json_body(serde_json::json!([
            { "readTime": "2025-01-02T00:00:00Z" }
        ]));
    });

    let query = Query::new("users")
        .where_filter("partner1", FieldOperator::Equal, "Ana")
        .unwrap()
        .where_filter("partner2", FieldOperator::Equal, "Ben")
        .unwrap()
        .limit(1);
    let snapshot = db.query(query).get().await.unwrap();

    assert!(snapshot.empty());
    assert_eq!(snapshot.read_time(), Some("2025-01-02T00:00:00Z"));
    mock.assert();
}

#[tokio::test]
async fn collection_get_follows_page_tokens() {
    let server = MockServer::start();
    let db = firestore(&server);

    let second_page = server.mock(|when, then| {
        when.method(GET)
            .path(format!("{DOCUMENTS}/roommates"))
            .query_param("pageToken", "page-2");
        then.status(200).json_body(serde_json::json!({
            "documents": [{
                "name": "projects/p/databases/(default)/documents/roommates/b",
                "fields": { "name": { "stringValue": "Bo" }, "income": { "integerValue": "8000" } }
            }]
        }));
    });
    let first_page = server.mock(|when, then| {
        when.method(GET)
            .path(format!("{DOCUMENTS}/roommates"))
            .query_param("pageSize", "300")
            .query_param_missing("pageToken");
        then.status(200).json_body(serde_json::json!({
            "documents": [{
                "name": "projects/p/databases/(default)/documents/roommates/a",
                "fields": { "name": { "stringValue": "Aura" }, "income": { "integerValue": "10000" } }
            }],
            "nextPageToken": "page-2"
        }));
    });

    let snapshot = db.collection("roommates").get().await.unwrap();

    let ids: Vec<&str> = snapshot.iter().map(|d| d.id()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    first_page.assert();
    second_page.assert();
}
