//! HTTP backend for the RoomieHaus frontend.

#[cfg(test)]
mod tests;

use crate::accounts::{self, AccountError, AccountRequest};
use crate::config::ServerConfig;
use crate::firestore::FirebaseFirestore;
use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

/// Shared state of the request handlers.
pub struct AppState {
    pub firestore: FirebaseFirestore,
    pub greeting: String,
}

/// Builds the router. Cross-origin requests are allowed from anywhere so the frontend can
/// be served from another port.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/api/greeting", get(greeting))
        .route("/api/data", post(receive_data))
        .route("/register", post(register))
        .route("/login", post(login))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Serves on an already-bound listener until the future is dropped or the server fails.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    info!("HTTP server listening on {}", listener.local_addr()?);
    axum::serve(listener, create_app(state)).await?;
    Ok(())
}

/// Binds `config.bind_addr` and serves until ctrl-c.
pub async fn run_until_ctrl_c(config: &ServerConfig, firestore: FirebaseFirestore) -> Result<()> {
    let listener = TcpListener::bind(config.bind_addr).await?;
    let state = AppState {
        firestore,
        greeting: config.greeting.clone(),
    };

    tokio::select! {
        res = serve(listener, state) => res,
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down");
            Ok(())
        }
    }
}

async fn home() -> Json<Value> {
    Json(json!({ "message": "RoomieHaus backend is running!" }))
}

async fn greeting(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({ "greeting": state.greeting }))
}

async fn receive_data(Json(data): Json<Value>) -> Json<Value> {
    Json(json!({ "received": data }))
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AccountRequest>,
) -> Response {
    match accounts::register(&state.firestore, &request).await {
        Ok(_) => message(
            StatusCode::CREATED,
            "Registration successful! You can now sign in.",
        ),
        Err(e) => account_error(e, "Registration failed"),
    }
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AccountRequest>,
) -> Response {
    match accounts::login(&state.firestore, &request).await {
        Ok(()) => message(StatusCode::OK, "Login successful! Welcome to the house."),
        Err(e) => account_error(e, "Login failed"),
    }
}

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "message": text }))).into_response()
}

fn account_error(err: AccountError, context: &str) -> Response {
    let status = match &err {
        AccountError::MissingFields | AccountError::InvalidPinFormat => StatusCode::BAD_REQUEST,
        AccountError::AlreadyExists => StatusCode::CONFLICT,
        AccountError::NotFound => StatusCode::NOT_FOUND,
        AccountError::InvalidPin => StatusCode::UNAUTHORIZED,
        AccountError::Store(e) => {
            error!("{}: {}", context, e);
            return message(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("{}: {}", context, e),
            );
        }
    };
    message(status, &err.to_string())
}
