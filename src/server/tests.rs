use super::*;
use httpmock::prelude::*;
use reqwest::Client;
use reqwest_middleware::ClientBuilder;
use std::net::SocketAddr;

const DOCUMENTS: &str = "/v1/projects/p/databases/(default)/documents";

async fn spawn(firestore_mock: &MockServer) -> SocketAddr {
    let client = ClientBuilder::new(Client::new()).build();
    let state = AppState {
        firestore: FirebaseFirestore::new_with_url(client, firestore_mock.url(DOCUMENTS)),
        greeting: "Hello from RoomieHaus backend!".to_string(),
    };
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(listener, state));
    addr
}

#[tokio::test]
async fn serves_greeting_and_home() {
    let firestore_mock = MockServer::start();
    let addr = spawn(&firestore_mock).await;
    let client = Client::new();

    let greeting: Value = client
        .get(format!("http://{addr}/api/greeting"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(greeting, json!({ "greeting": "Hello from RoomieHaus backend!" }));

    let home: Value = client
        .get(format!("http://{addr}/"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(home["message"], "RoomieHaus backend is running!");
}

#[tokio::test]
async fn greeting_is_readable_by_the_fetch_client() {
    let firestore_mock = MockServer::start();
    let addr = spawn(&firestore_mock).await;

    let payload = crate::greeting::fetch_greeting(&Client::new(), &format!("http://{addr}/api/greeting"))
        .await
        .unwrap();
    assert_eq!(payload.greeting, "Hello from RoomieHaus backend!");
}

#[tokio::test]
async fn echoes_posted_data() {
    let firestore_mock = MockServer::start();
    let addr = spawn(&firestore_mock).await;

    let response = Client::new()
        .post(format!("http://{addr}/api/data"))
        .json(&json!({ "rent": 1200 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "received": { "rent": 1200 } }));
}

#[tokio::test]
async fn register_maps_validation_and_conflicts_to_status_codes() {
    let firestore_mock = MockServer::start();
    firestore_mock.mock(|when, then| {
        when.method(POST).path(format!("{DOCUMENTS}:runQuery"));
        then.status(200).json_body(json!([{
            "document": {
                "name": "projects/p/databases/(default)/documents/users/u1",
                "fields": {
                    "partner1": { "stringValue": "Ana" },
                    "partner2": { "stringValue": "Ben" },
                    "pin": { "stringValue": "1234" }
                }
            }
        }]));
    });
    let addr = spawn(&firestore_mock).await;
    let client = Client::new();

    let missing = client
        .post(format!("http://{addr}/register"))
        .json(&json!({ "partner1": "Ana", "pin": "1234" }))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = missing.json().await.unwrap();
    assert_eq!(body["message"], "Please fill in all fields.");

    let duplicate = client
        .post(format!("http://{addr}/register"))
        .json(&json!({ "partner1": "Ana", "partner2": "Ben", "pin": "1234" }))
        .send()
        .await
        .unwrap();
    assert_eq!(duplicate.status(), reqwest::StatusCode::CONFLICT);

    let wrong_pin = client
        .post(format!("http://{addr}/login"))
        .json(&json!({ "partner1": "Ana", "partner2": "Ben", "pin": "0000" }))
        .send()
        .await
        .unwrap();
    assert_eq!(wrong_pin.status(), reqwest::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn store_failures_become_internal_errors() {
    let firestore_mock = MockServer::start();
    firestore_mock.mock(|when, then| {
        when.method(POST).path(format!("{DOCUMENTS}:runQuery"));
        then.status(500).body("backend down");
    });
    let addr = spawn(&firestore_mock).await;

    let response = Client::new()
        .post(format!("http://{addr}/login"))
        .json(&json!({ "partner1": "Ana", "partner2": "Ben", "pin": "1234" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().starts_with("Login failed"));
}
