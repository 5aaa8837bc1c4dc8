//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::{config::Settings, GenerationClient, GenerationError, HttpGenerationClient};
use crossbeam_channel::{Receiver, Sender};
use futures::future::{AbortHandle, AbortRegistration, Abortable};
use shared::protocol::{GenerateQuestionsRequest, GenerateQuestionsResponse};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>, settings: Settings) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        // Endpoint errors surface at startup and again on each generation attempt.
        let client = match HttpGenerationClient::from_settings(&settings) {
            Ok(client) => {
                tracing::info!(endpoint = %client.endpoint(), "generation endpoint resolved");
                let _ = ui_tx.try_send(UiEvent::Info("Generation service configured".to_string()));
                Ok(Arc::new(client))
            }
            Err(err) => {
                let message = format!("{err:#}");
                tracing::warn!("generation endpoint unavailable: {message}");
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("generation endpoint unavailable: {message}"),
                )));
                Err(message)
            }
        };

        runtime.block_on(async move {
            let mut in_flight: Option<(u64, AbortHandle)> = None;

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::GenerateQuestions { job_id, request } => {
                        let client = match &client {
                            Ok(client) => client.clone(),
                            Err(message) => {
                                let _ = ui_tx.send(UiEvent::GenerationFinished {
                                    job_id,
                                    outcome: Err(GenerationError::Endpoint(message.clone())),
                                });
                                continue;
                            }
                        };

                        let (abort_handle, registration) = AbortHandle::new_pair();
                        in_flight = Some((job_id, abort_handle));
                        let ui_tx = ui_tx.clone();
                        tokio::spawn(async move {
                            let outcome = run_generation(client, request, registration).await;
                            let _ = ui_tx.send(UiEvent::GenerationFinished { job_id, outcome });
                        });
                    }
                    BackendCommand::CancelGeneration { job_id } => match in_flight.take() {
                        Some((active, handle)) if active == job_id => {
                            tracing::info!(job_id, "cancelling generation");
                            handle.abort();
                        }
                        other => in_flight = other,
                    },
                }
            }
            tracing::debug!("ui command channel closed; backend worker exiting");
        });
    });
}

async fn run_generation(
    client: Arc<HttpGenerationClient>,
    request: GenerateQuestionsRequest,
    registration: AbortRegistration,
) -> Result<GenerateQuestionsResponse, GenerationError> {
    match Abortable::new(client.generate_questions(&request), registration).await {
        Ok(outcome) => outcome,
        Err(_aborted) => Err(GenerationError::Cancelled),
    }
}
