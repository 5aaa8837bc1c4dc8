use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    error::ServiceErrorBody,
    protocol::{GenerateQuestionsRequest, GenerateQuestionsResponse},
};
use tracing::{info, warn};
use url::Url;

pub mod analytics;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod seed;

pub use analytics::AnalyticsSnapshot;
pub use dashboard::{
    DashboardController, GenerationJob, GenerationOutcome, GenerationRecord, Notice,
    NoticeSeverity,
};
pub use error::{DashboardError, GenerationError};
pub use seed::DashboardSeed;

/// The external question-generation service.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate_questions(
        &self,
        request: &GenerateQuestionsRequest,
    ) -> Result<GenerateQuestionsResponse, GenerationError>;
}

pub struct HttpGenerationClient {
    http: Client,
    endpoint: Url,
}

impl HttpGenerationClient {
    pub fn new(endpoint: Url, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build generation http client")?;
        Ok(Self { http, endpoint })
    }

    pub fn from_settings(settings: &config::Settings) -> anyhow::Result<Self> {
        let endpoint = config::resolve_generation_endpoint(settings)?;
        Self::new(endpoint, settings.request_timeout())
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl GenerationClient for HttpGenerationClient {
    async fn generate_questions(
        &self,
        request: &GenerateQuestionsRequest,
    ) -> Result<GenerateQuestionsResponse, GenerationError> {
        let started = Instant::now();
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ServiceErrorBody>(&body)
                .ok()
                .and_then(|body| body.message().map(str::to_string));
            warn!(
                status = status.as_u16(),
                message = message.as_deref().unwrap_or_default(),
                "generation service rejected request"
            );
            return Err(GenerationError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateQuestionsResponse = serde_json::from_slice(&body)
            .map_err(|err| GenerationError::InvalidResponse(err.to_string()))?;
        info!(
            difficulty = %request.difficulty,
            requested = request.question_count,
            returned = parsed.questions.len(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "generation service returned questions"
        );
        Ok(parsed)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
