//! State transitions driven by UI actions and backend events.

use client_core::{DashboardController, DashboardError, GenerationError, GenerationJob};
use crossbeam_channel::Sender;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;

struct PendingGeneration {
    job_id: u64,
    job: GenerationJob,
}

/// Tracks the one generation job the UI may have in flight.
#[derive(Default)]
pub struct GenerationSlot {
    next_job_id: u64,
    pending: Option<PendingGeneration>,
}

impl GenerationSlot {
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Starts a job and hands it to the backend. Refusals (no selection, a
    /// job already running) are reported through the dashboard's notices.
    pub fn start(
        &mut self,
        dashboard: &mut DashboardController,
        cmd_tx: &Sender<BackendCommand>,
        status: &mut String,
    ) {
        let Ok(job) = dashboard.begin_generation() else {
            return;
        };

        self.next_job_id += 1;
        let job_id = self.next_job_id;
        let cmd = BackendCommand::GenerateQuestions {
            job_id,
            request: job.request().clone(),
        };

        if dispatch_backend_command(cmd_tx, cmd, status) {
            *status = "Generating questions...".to_string();
            self.pending = Some(PendingGeneration { job_id, job });
        } else {
            let _ = dashboard.complete_generation(job, Err(GenerationError::Dispatch(status.clone())));
        }
    }

    pub fn cancel(&mut self, cmd_tx: &Sender<BackendCommand>, status: &mut String) {
        if let Some(pending) = &self.pending {
            dispatch_backend_command(
                cmd_tx,
                BackendCommand::CancelGeneration {
                    job_id: pending.job_id,
                },
                status,
            );
        }
    }
}

pub fn apply_ui_event(
    dashboard: &mut DashboardController,
    slot: &mut GenerationSlot,
    status: &mut String,
    status_banner: &mut Option<UiError>,
    event: UiEvent,
) {
    match event {
        UiEvent::Info(message) => {
            *status = message;
        }
        UiEvent::Error(err) => {
            *status = err.message().to_string();
            *status_banner = Some(err);
        }
        UiEvent::GenerationFinished { job_id, outcome } => match slot.pending.take() {
            Some(pending) if pending.job_id == job_id => {
                *status = match dashboard.complete_generation(pending.job, outcome) {
                    Ok(count) => format!("Generated {count} questions"),
                    Err(err) => {
                        if let DashboardError::Generation(inner @ GenerationError::Endpoint(_)) = &err {
                            *status_banner = Some(UiError::from_message(
                                UiErrorContext::Generation,
                                inner.to_string(),
                            ));
                        }
                        err.to_string()
                    }
                };
            }
            other => {
                slot.pending = other;
                tracing::warn!(job_id, "ignoring result for unknown generation job");
            }
        },
    }
}
