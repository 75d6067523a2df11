use serde::{Deserialize, Serialize};

/// Loose view of an error body.
///
/// Non-2xx answers are usually envelope-shaped, but proxies and framework
/// defaults (e.g. a bare 403) may send something else. Every field is
/// optional so any JSON object decodes.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub status: Option<u16>,
}

impl ErrorBody {
    /// Best-effort parse: `None` when the bytes are not a JSON object.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        serde_json::from_slice(bytes).ok()
    }

    /// Most specific non-empty message carried by the body
    pub fn into_message(self) -> Option<String> {
        self.message
            .filter(|m| !m.trim().is_empty())
            .or(self.error.filter(|e| !e.trim().is_empty()))
    }
}
