use serde::{Deserialize, Serialize};

/// Body the generation service returns alongside a non-2xx status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServiceErrorBody {
    /// The server-provided message, if it carries any text.
    pub fn message(&self) -> Option<&str> {
        self.error
            .as_deref()
            .filter(|message| !message.trim().is_empty())
    }
}
