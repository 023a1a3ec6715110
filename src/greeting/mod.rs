//! Greeting fetch from the RoomieHaus backend.
//!
//! One GET, one JSON parse, one text update. There is no retry and no timeout, and a
//! failure only produces a log line: the display element keeps whatever it showed before.


use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

pub const LOCAL_GREETING_URL: &str = "http://localhost:5000/api/greeting";

/// The same endpoint as seen from inside the compose network.
pub const DOCKER_GREETING_URL: &str = "http://backend:5000/api/greeting";

/// Id of the element the greeting is rendered into.
pub const GREETING_ELEMENT_ID: &str = "greeting";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GreetingPayload {
    pub greeting: String,
}

#[derive(Error, Debug)]
pub enum GreetingError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status: {0}")]
    Status(StatusCode),
    #[error("invalid greeting body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Something that displays a line of text.
pub trait TextElement {
    fn set_text(&mut self, text: &str);
}

/// An addressable text element, standing in for a page element with an id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayElement {
    id: String,
    text: String,
}

impl DisplayElement {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: String::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl TextElement for DisplayElement {
    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }
}

/// Fetches and decodes the greeting. Non-2xx responses are errors.
pub async fn fetch_greeting(client: &Client, url: &str) -> Result<GreetingPayload, GreetingError> {
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(GreetingError::Status(status));
    }

    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

/// Fetches the greeting and writes it into `element`.
///
/// Errors are logged and swallowed; `element` is only touched on success.
pub async fn render_greeting<E: TextElement>(
    client: &Client,
    url: &str,
    element: &mut E,
) -> Option<GreetingPayload> {
    match fetch_greeting(client, url).await {
        Ok(payload) => {
            info!("{}", payload.greeting);
            element.set_text(&payload.greeting);
            Some(payload)
        }
        Err(e) => {
            error!("Error: {}", e);
            None
        }
    }
}
