use serde::Deserialize;

/// Standard JSON response envelope of the service API.
///
/// ```json
/// { "status": 200, "success": true, "data": { ... }, "message": "...", "error": null }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub status:  Option<u16>,
    #[serde(default)]
    pub success: bool,
    pub data:    Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error:   Option<serde_json::Value>,
}

impl<T> ApiEnvelope<T> {
    /// Human-readable failure reason: the message, else the error payload,
    /// else `fallback`.
    pub fn error_message(&self, fallback: &str) -> String {
        if let Some(msg) = self.message.as_deref().map(str::trim)
            && !msg.is_empty()
        {
            return msg.to_owned();
        }

        if let Some(err) = &self.error {
            let rendered = match err {
                serde_json::Value::String(s) => s.trim().to_owned(),
                serde_json::Value::Null => String::new(),
                other => other.to_string(),
            };
            if !rendered.is_empty() && rendered != "null" {
                return rendered;
            }
        }

        fallback.to_owned()
    }
}

/// `data` member of a successful bootstrap response.
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapData {
    pub session_id:     String,
    pub session_secret: String,
    pub expires_in:     u64,
}
