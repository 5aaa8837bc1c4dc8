//! UI/backend events and error modeling for desktop GUI controller.

use client_core::GenerationError;
use shared::protocol::GenerateQuestionsResponse;

pub enum UiEvent {
    Info(String),
    Error(UiError),
    GenerationFinished {
        job_id: u64,
        outcome: Result<GenerateQuestionsResponse, GenerationError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Configuration,
    Transport,
    Service,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Generation,
    Export,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("function url map")
            || message_lower.contains("endpoint")
            || message_lower.contains("settings file")
            || message_lower.contains("not supported")
        {
            UiErrorCategory::Configuration
        } else if message_lower.contains("timed out")
            || message_lower.contains("timeout")
            || message_lower.contains("connection")
            || message_lower.contains("failed to reach")
            || message_lower.contains("disconnected")
            || message_lower.contains("queue is full")
        {
            UiErrorCategory::Transport
        } else if message_lower.contains("generation service")
            || message_lower.contains("invalid generation response")
        {
            UiErrorCategory::Service
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub fn context_label(context: UiErrorContext) -> &'static str {
    match context {
        UiErrorContext::BackendStartup => "startup",
        UiErrorContext::Generation => "generation",
        UiErrorContext::Export => "export",
    }
}

pub fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Configuration => "Configuration",
        UiErrorCategory::Transport => "Transport",
        UiErrorCategory::Service => "Service",
        UiErrorCategory::Unknown => "Unexpected",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_missing_endpoint_as_configuration() {
        let err = UiError::from_message(
            UiErrorContext::BackendStartup,
            "generation endpoint unavailable: function URL map 'backend/func2url.json' has no 'generate-questions' entry",
        );
        assert_eq!(err.category(), UiErrorCategory::Configuration);
        assert_eq!(err.context(), UiErrorContext::BackendStartup);
    }

    #[test]
    fn classifies_command_processor_disconnect_as_transport() {
        let err = UiError::from_message(
            UiErrorContext::Generation,
            "Backend command processor disconnected; restart the app",
        );
        assert_eq!(err.category(), UiErrorCategory::Transport);
        assert_eq!(err_label(err.category()), "Transport");
    }

    #[test]
    fn unknown_messages_fall_back_to_unexpected() {
        let err = UiError::from_message(UiErrorContext::Export, "disk quota exceeded");
        assert_eq!(err.category(), UiErrorCategory::Unknown);
        assert_eq!(err.message(), "disk quota exceeded");
    }
}
