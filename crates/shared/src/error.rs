use serde::{Deserialize, Serialize};

/// Error body some item servers return alongside a non-2xx status.
///
/// Servers disagree on the key, so both `message` and `error` are accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.message.or(self.error)
    }
}

/// Best-effort extraction of a human-readable message from an error response body.
pub fn error_message_from_body(body: &str) -> String {
    let trimmed = body.trim();
    serde_json::from_str::<ApiErrorBody>(trimmed)
        .ok()
        .and_then(ApiErrorBody::into_message)
        .unwrap_or_else(|| trimmed.to_string())
}
