//! Backend commands queued from UI to backend worker.

use shared::protocol::GenerateQuestionsRequest;

#[derive(Debug)]
pub enum BackendCommand {
    GenerateQuestions {
        job_id: u64,
        request: GenerateQuestionsRequest,
    },
    CancelGeneration {
        job_id: u64,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::GenerateQuestions { .. } => "generate_questions",
            BackendCommand::CancelGeneration { .. } => "cancel_generation",
        }
    }
}
