pub mod middleware;

use serde::Deserialize;

/// Error envelope returned by Google APIs, e.g. `{"error": {"code": 403, ...}}`.
#[derive(Debug, Deserialize)]
pub struct FirebaseErrorResponse {
    pub error: FirebaseErrorDetails,
}

#[derive(Debug, Deserialize)]
pub struct FirebaseErrorDetails {
    pub code: u16,
    pub message: String,
    pub status: Option<String>,
}

impl FirebaseErrorResponse {
    pub fn display_message(&self) -> String {
        match &self.error.status {
            Some(status) => format!(
                "{} (code: {}, status: {})",
                self.error.message, self.error.code, status
            ),
            None => format!("{} (code: {})", self.error.message, self.error.code),
        }
    }
}

/// Renders a failed response into a message, falling back to the HTTP status
/// when the body is not a Google API error envelope.
pub async fn parse_error_response(response: reqwest::Response, default_msg: &str) -> String {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    match serde_json::from_str::<FirebaseErrorResponse>(&text) {
        Ok(error_resp) => format!("{}: {}", default_msg, error_resp.display_message()),
        Err(_) if text.is_empty() => format!("{}: {}", default_msg, status),
        Err(_) => format!("{} {}: {}", default_msg, status, text),
    }
}
