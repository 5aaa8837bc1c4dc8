//! Dashboard state and the operations the views drive.

use std::{
    collections::VecDeque,
    path::Path,
    time::{Duration, Instant},
};

use chrono::{DateTime, Local, NaiveDate};
use shared::{
    domain::{
        DashboardTab, Exam, ExportFormat, GenerationLanguage, GenerationSettings, Material,
        MaterialId, Question,
    },
    protocol::{GenerateQuestionsRequest, GenerateQuestionsResponse},
};
use tracing::{debug, info, warn};

use crate::{
    analytics::{AnalyticsSnapshot, GenerationTotals, ACTIVITY_WINDOW_DAYS},
    error::{DashboardError, GenerationError},
    seed::DashboardSeed,
    GenerationClient,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeSeverity {
    Info,
    Error,
}

/// Non-blocking message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: NoticeSeverity,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            severity: NoticeSeverity::Info,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            severity: NoticeSeverity::Error,
            title: title.into(),
            description: description.into(),
        }
    }
}

/// A generation call that has been started but not yet merged.
#[derive(Debug, Clone)]
pub struct GenerationJob {
    material_id: MaterialId,
    request: GenerateQuestionsRequest,
    started_at: Instant,
}

impl GenerationJob {
    pub fn request(&self) -> &GenerateQuestionsRequest {
        &self.request
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationOutcome {
    Succeeded { question_count: u32 },
    Failed,
    Cancelled,
    /// The request never left the client.
    NotSent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRecord {
    pub material_id: MaterialId,
    pub finished_at: DateTime<Local>,
    pub elapsed: Duration,
    pub outcome: GenerationOutcome,
}

#[derive(Debug, Clone)]
pub struct DashboardController {
    materials: Vec<Material>,
    questions: Vec<Question>,
    exams: Vec<Exam>,
    settings: GenerationSettings,
    active_tab: DashboardTab,
    selected_material: Option<MaterialId>,
    generating: bool,
    notices: Vec<Notice>,
    /// Finished generations inside the activity window, oldest first.
    recent: VecDeque<GenerationRecord>,
    totals: GenerationTotals,
}

impl Default for DashboardController {
    fn default() -> Self {
        Self::new(DashboardSeed::sample())
    }
}

impl DashboardController {
    pub fn new(seed: DashboardSeed) -> Self {
        Self {
            materials: seed.materials,
            questions: seed.questions,
            exams: seed.exams,
            settings: GenerationSettings::default(),
            active_tab: DashboardTab::default(),
            selected_material: None,
            generating: false,
            notices: Vec::new(),
            recent: VecDeque::new(),
            totals: GenerationTotals::default(),
        }
    }

    pub fn empty() -> Self {
        Self::new(DashboardSeed::default())
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn material(&self, id: &MaterialId) -> Option<&Material> {
        self.materials.iter().find(|material| &material.id == id)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn exams(&self) -> &[Exam] {
        &self.exams
    }

    pub fn settings(&self) -> GenerationSettings {
        self.settings
    }

    pub fn active_tab(&self) -> DashboardTab {
        self.active_tab
    }

    pub fn selected_material(&self) -> Option<&MaterialId> {
        self.selected_material.as_ref()
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn recent_generations(&self) -> &VecDeque<GenerationRecord> {
        &self.recent
    }

    pub fn set_active_tab(&mut self, tab: DashboardTab) {
        self.active_tab = tab;
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Records the given files as materials uploaded today.
    pub fn add_materials<I>(&mut self, files: I) -> Vec<MaterialId>
    where
        I: IntoIterator,
        I::Item: AsRef<Path>,
    {
        self.add_materials_on(files, Local::now().date_naive())
    }

    /// Only the file names are used; contents are never read.
    pub fn add_materials_on<I>(&mut self, files: I, upload_date: NaiveDate) -> Vec<MaterialId>
    where
        I: IntoIterator,
        I::Item: AsRef<Path>,
    {
        let base = self.materials.len();
        let added: Vec<Material> = files
            .into_iter()
            .enumerate()
            .map(|(index, file)| {
                let name = display_file_name(file.as_ref());
                Material {
                    id: MaterialId((base + index + 1).to_string()),
                    kind: material_type_label(&name),
                    name,
                    upload_date,
                    questions_generated: 0,
                }
            })
            .collect();

        let ids: Vec<MaterialId> = added.iter().map(|material| material.id.clone()).collect();
        info!(count = ids.len(), "added materials");
        self.materials.extend(added);
        ids
    }

    pub fn select_material(&mut self, id: MaterialId) {
        if self.selected_material.as_ref() == Some(&id) {
            return;
        }
        debug!(material_id = %id, "selected material for generation");
        self.selected_material = Some(id);
    }

    pub fn update_settings(&mut self, question_count: u32, difficulty_level: u32) {
        self.settings.question_count = question_count;
        self.settings.difficulty_level = difficulty_level;
    }

    pub fn set_language(&mut self, language: GenerationLanguage) {
        self.settings.language = language;
    }

    pub fn set_export_format(&mut self, export_format: ExportFormat) {
        self.settings.export_format = export_format;
    }

    pub fn replace_settings(&mut self, settings: GenerationSettings) {
        self.settings = settings;
    }

    pub fn reset_settings(&mut self) {
        self.settings = GenerationSettings::default();
    }

    /// Validates the selection, raises the generating flag and builds the
    /// request. The job must be handed back to [`Self::complete_generation`].
    pub fn begin_generation(&mut self) -> Result<GenerationJob, DashboardError> {
        let Some(material_id) = self.selected_material.clone() else {
            self.notices.push(Notice::error(
                "Select a material",
                "Please choose a material to generate questions from.",
            ));
            return Err(DashboardError::MissingSelection);
        };

        if self.generating {
            self.notices.push(Notice::info(
                "Generation in progress",
                "Wait for the current generation to finish.",
            ));
            return Err(DashboardError::GenerationInProgress);
        }

        let material_name = self.material(&material_id).map(|m| m.name.as_str());
        let request = GenerateQuestionsRequest {
            material_text: material_sample(material_name, self.settings.language),
            difficulty: self.settings.difficulty(),
            question_count: self.settings.question_count,
        };

        info!(
            material_id = %material_id,
            difficulty = %request.difficulty,
            question_count = request.question_count,
            "starting question generation"
        );
        self.generating = true;
        Ok(GenerationJob {
            material_id,
            request,
            started_at: Instant::now(),
        })
    }

    pub fn complete_generation(
        &mut self,
        job: GenerationJob,
        outcome: Result<GenerateQuestionsResponse, GenerationError>,
    ) -> Result<usize, DashboardError> {
        self.complete_generation_at(job, outcome, Local::now())
    }

    /// Merges a finished call. Failure leaves materials and questions
    /// untouched; the generating flag is cleared either way.
    pub fn complete_generation_at(
        &mut self,
        job: GenerationJob,
        outcome: Result<GenerateQuestionsResponse, GenerationError>,
        finished_at: DateTime<Local>,
    ) -> Result<usize, DashboardError> {
        self.generating = false;
        let elapsed = job.elapsed();

        match outcome {
            Ok(response) => {
                let count = response.questions.len();
                let count_u32 = u32::try_from(count).unwrap_or(u32::MAX);
                let material_id = job.material_id;

                self.questions.extend(
                    response
                        .questions
                        .into_iter()
                        .map(|question| question.into_question(material_id.clone())),
                );
                if let Some(material) = self.materials.iter_mut().find(|m| m.id == material_id) {
                    material.questions_generated =
                        material.questions_generated.saturating_add(count_u32);
                }

                self.notices.push(Notice::info(
                    "Questions generated",
                    format!("Created {count} questions with AI"),
                ));
                self.active_tab = DashboardTab::Generator;
                info!(
                    material_id = %material_id,
                    count,
                    elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                    "merged generated questions"
                );
                self.record(GenerationRecord {
                    material_id,
                    finished_at,
                    elapsed,
                    outcome: GenerationOutcome::Succeeded {
                        question_count: count_u32,
                    },
                });
                Ok(count)
            }
            Err(err) => {
                let outcome = match err {
                    GenerationError::Cancelled => GenerationOutcome::Cancelled,
                    GenerationError::Dispatch(_) => GenerationOutcome::NotSent,
                    _ => GenerationOutcome::Failed,
                };
                warn!(material_id = %job.material_id, "question generation failed: {err}");
                self.notices
                    .push(Notice::error("Generation failed", err.user_message()));
                self.record(GenerationRecord {
                    material_id: job.material_id,
                    finished_at,
                    elapsed,
                    outcome,
                });
                Err(DashboardError::Generation(err))
            }
        }
    }

    pub async fn generate_questions<C>(&mut self, client: &C) -> Result<usize, DashboardError>
    where
        C: GenerationClient + ?Sized,
    {
        let job = self.begin_generation()?;
        let outcome = client.generate_questions(job.request()).await;
        self.complete_generation(job, outcome)
    }

    pub fn analytics(&self) -> AnalyticsSnapshot {
        self.analytics_at(Local::now())
    }

    pub fn analytics_at(&self, now: DateTime<Local>) -> AnalyticsSnapshot {
        AnalyticsSnapshot::compute(
            &self.materials,
            &self.questions,
            &self.exams,
            &self.recent,
            &self.totals,
            now,
        )
    }

    fn record(&mut self, record: GenerationRecord) {
        self.totals.record(record.outcome, record.elapsed);

        let cutoff = record.finished_at - chrono::Duration::days(ACTIVITY_WINDOW_DAYS);
        while self
            .recent
            .front()
            .is_some_and(|oldest| oldest.finished_at <= cutoff)
        {
            self.recent.pop_front();
        }
        self.recent.push_back(record);
    }
}

fn display_file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Upper-cased text after the last dot, `FILE` when that is empty.
pub fn material_type_label(file_name: &str) -> String {
    match file_name.rsplit('.').next() {
        Some(extension) if !extension.is_empty() => extension.to_uppercase(),
        _ => "FILE".to_string(),
    }
}

/// Stand-in text sent instead of the material's contents.
pub fn material_sample(material_name: Option<&str>, language: GenerationLanguage) -> String {
    match language {
        GenerationLanguage::Russian => format!(
            "Образец учебного материала по теме \"{}\". Это может быть текст из учебника, лекции или другого учебного источника.",
            material_name.unwrap_or("материал")
        ),
        GenerationLanguage::English => format!(
            "Sample study material on the topic \"{}\". This may be text from a textbook, a lecture or another study source.",
            material_name.unwrap_or("material")
        ),
    }
}

#[cfg(test)]
#[path = "tests/dashboard_tests.rs"]
mod tests;
