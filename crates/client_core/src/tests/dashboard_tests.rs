use super::*;

use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::{
    domain::{Difficulty, QuestionId},
    protocol::GeneratedQuestion,
};

struct FakeGenerationClient {
    calls: AtomicUsize,
    requests: Mutex<Vec<GenerateQuestionsRequest>>,
    fail_with: Option<String>,
    returned: usize,
}

impl FakeGenerationClient {
    fn returning(returned: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            fail_with: None,
            returned,
        }
    }

    fn rejecting(message: impl Into<String>) -> Self {
        Self {
            fail_with: Some(message.into()),
            ..Self::returning(0)
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_request(&self) -> GenerateQuestionsRequest {
        self.requests
            .lock()
            .expect("requests lock")
            .last()
            .cloned()
            .expect("a request was sent")
    }
}

#[async_trait]
impl GenerationClient for FakeGenerationClient {
    async fn generate_questions(
        &self,
        request: &GenerateQuestionsRequest,
    ) -> Result<GenerateQuestionsResponse, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .expect("requests lock")
            .push(request.clone());

        if let Some(message) = &self.fail_with {
            return Err(GenerationError::Rejected {
                status: 500,
                message: Some(message.clone()),
            });
        }

        Ok(generated_response(self.returned, request.difficulty))
    }
}

fn generated_response(count: usize, difficulty: Difficulty) -> GenerateQuestionsResponse {
    GenerateQuestionsResponse {
        questions: (0..count)
            .map(|index| GeneratedQuestion {
                id: QuestionId(format!("gen-{index}")),
                text: format!("Generated question {index}"),
                difficulty,
                extra: serde_json::Map::new(),
            })
            .collect(),
        count: Some(count as u32),
        model: None,
    }
}

fn upload_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).expect("date")
}

#[test]
fn adding_files_appends_materials_with_uppercased_types() {
    let mut dashboard = DashboardController::default();
    let ids = dashboard.add_materials_on(
        ["lectures/Week 1.pptx", "notes.txt", "scan.Pdf"],
        upload_day(),
    );

    assert_eq!(
        ids,
        vec![
            MaterialId::from("3"),
            MaterialId::from("4"),
            MaterialId::from("5")
        ]
    );
    let added = &dashboard.materials()[2..];
    assert_eq!(added.len(), 3);
    assert_eq!(added[0].name, "Week 1.pptx");
    assert_eq!(added[0].kind, "PPTX");
    assert_eq!(added[1].kind, "TXT");
    assert_eq!(added[2].kind, "PDF");
    assert!(added
        .iter()
        .all(|m| m.questions_generated == 0 && m.upload_date == upload_day()));
}

#[test]
fn adding_nothing_leaves_library_unchanged() {
    let mut dashboard = DashboardController::default();
    let ids = dashboard.add_materials_on(Vec::<PathBuf>::new(), upload_day());
    assert!(ids.is_empty());
    assert_eq!(dashboard.materials().len(), 2);
}

#[test]
fn material_type_falls_back_for_trailing_dot() {
    assert_eq!(material_type_label("draft."), "FILE");
    assert_eq!(material_type_label("README"), "README");
    assert_eq!(material_type_label("archive.tar.gz"), "GZ");
}

#[test]
fn reselecting_material_keeps_selection() {
    let mut dashboard = DashboardController::default();
    dashboard.select_material(MaterialId::from("2"));
    dashboard.select_material(MaterialId::from("2"));
    assert_eq!(dashboard.selected_material(), Some(&MaterialId::from("2")));

    dashboard.select_material(MaterialId::from("1"));
    assert_eq!(dashboard.selected_material(), Some(&MaterialId::from("1")));
}

#[tokio::test]
async fn generate_without_selection_makes_no_call() {
    let mut dashboard = DashboardController::default();
    let client = FakeGenerationClient::returning(5);
    let materials_before = dashboard.materials().to_vec();
    let questions_before = dashboard.questions().to_vec();

    let err = dashboard
        .generate_questions(&client)
        .await
        .expect_err("must fail");

    assert!(matches!(err, DashboardError::MissingSelection));
    assert_eq!(client.calls(), 0);
    assert_eq!(dashboard.materials(), materials_before.as_slice());
    assert_eq!(dashboard.questions(), questions_before.as_slice());
    assert!(!dashboard.is_generating());
    let notices = dashboard.drain_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].severity, NoticeSeverity::Error);
}

#[tokio::test]
async fn successful_generation_merges_questions_for_selected_material() {
    let mut dashboard = DashboardController::default();
    let client = FakeGenerationClient::returning(4);
    dashboard.select_material(MaterialId::from("2"));
    dashboard.update_settings(10, 80);

    let merged = dashboard.generate_questions(&client).await.expect("generate");

    assert_eq!(merged, 4);
    assert_eq!(dashboard.questions().len(), 3 + 4);
    assert!(dashboard.questions()[3..]
        .iter()
        .all(|q| q.material_id == MaterialId::from("2")));
    assert_eq!(
        dashboard.material(&MaterialId::from("2")).map(|m| m.questions_generated),
        Some(23 + 4)
    );
    assert_eq!(
        dashboard.material(&MaterialId::from("1")).map(|m| m.questions_generated),
        Some(15)
    );
    assert_eq!(dashboard.active_tab(), DashboardTab::Generator);
    assert!(!dashboard.is_generating());

    let request = client.last_request();
    assert_eq!(request.difficulty, Difficulty::Hard);
    assert_eq!(request.question_count, 10);
    assert!(request.material_text.contains("История России.docx"));
}

#[tokio::test]
async fn failed_generation_leaves_state_untouched() {
    let mut dashboard = DashboardController::default();
    let client = FakeGenerationClient::rejecting("OpenAI API key not configured");
    dashboard.select_material(MaterialId::from("1"));
    let materials_before = dashboard.materials().to_vec();
    let questions_before = dashboard.questions().to_vec();

    let err = dashboard
        .generate_questions(&client)
        .await
        .expect_err("must fail");

    assert!(matches!(err, DashboardError::Generation(_)));
    assert_eq!(client.calls(), 1);
    assert_eq!(dashboard.materials(), materials_before.as_slice());
    assert_eq!(dashboard.questions(), questions_before.as_slice());
    assert!(!dashboard.is_generating());
    assert_eq!(dashboard.active_tab(), DashboardTab::Upload);

    let notices = dashboard.drain_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].description, "OpenAI API key not configured");
}

#[test]
fn second_begin_while_generating_is_rejected() {
    let mut dashboard = DashboardController::default();
    dashboard.select_material(MaterialId::from("1"));

    let job = dashboard.begin_generation().expect("first begin");
    assert!(dashboard.is_generating());

    let err = dashboard.begin_generation().expect_err("second begin");
    assert!(matches!(err, DashboardError::GenerationInProgress));
    assert!(dashboard.is_generating());

    dashboard
        .complete_generation(job, Err(GenerationError::Cancelled))
        .expect_err("cancelled");
    assert!(!dashboard.is_generating());
    assert_eq!(
        dashboard.recent_generations().back().map(|r| r.outcome),
        Some(GenerationOutcome::Cancelled)
    );
}

#[test]
fn job_keeps_material_selected_at_start() {
    let mut dashboard = DashboardController::default();
    dashboard.select_material(MaterialId::from("1"));
    let job = dashboard.begin_generation().expect("begin");
    dashboard.select_material(MaterialId::from("2"));

    dashboard
        .complete_generation(job, Ok(generated_response(2, Difficulty::Medium)))
        .expect("complete");

    assert_eq!(
        dashboard.material(&MaterialId::from("1")).map(|m| m.questions_generated),
        Some(17)
    );
    assert_eq!(
        dashboard.material(&MaterialId::from("2")).map(|m| m.questions_generated),
        Some(23)
    );
}

#[test]
fn request_uses_generic_name_for_unknown_material() {
    let mut dashboard = DashboardController::empty();
    dashboard.select_material(MaterialId::from("42"));
    dashboard.set_language(GenerationLanguage::English);

    let job = dashboard.begin_generation().expect("begin");
    assert!(job.request().material_text.contains("\"material\""));
    assert_eq!(job.request().difficulty, Difficulty::Medium);
    assert_eq!(job.request().question_count, 20);
}

#[test]
fn settings_are_written_without_clamping() {
    let mut dashboard = DashboardController::default();
    dashboard.update_settings(70, 130);
    assert_eq!(dashboard.settings().question_count, 70);
    assert_eq!(dashboard.settings().difficulty_level, 130);
    assert!(!dashboard.settings().is_within_bounds());

    dashboard.reset_settings();
    assert_eq!(dashboard.settings(), GenerationSettings::default());
}

#[test]
fn analytics_follow_generation_history() {
    let mut dashboard = DashboardController::default();
    dashboard.select_material(MaterialId::from("1"));
    let job = dashboard.begin_generation().expect("begin");
    dashboard
        .complete_generation(job, Ok(generated_response(3, Difficulty::Hard)))
        .expect("complete");

    let snapshot = dashboard.analytics();
    assert_eq!(snapshot.material_count, 2);
    assert_eq!(snapshot.question_count, 6);
    assert_eq!(snapshot.exam_count, 2);
    assert_eq!(snapshot.difficulty_distribution[2].count, 3);
    assert_eq!(snapshot.performance.attempts, 1);
    assert_eq!(snapshot.performance.success_rate, Some(1.0));
    assert_eq!(snapshot.activity.today, 3);
}

#[test]
fn analytics_totals_survive_long_sessions() {
    let mut dashboard = DashboardController::default();
    dashboard.select_material(MaterialId::from("1"));
    let start = Local::now();

    for _ in 0..300 {
        let job = dashboard.begin_generation().expect("begin");
        dashboard
            .complete_generation_at(job, Ok(generated_response(1, Difficulty::Easy)), start)
            .expect("complete");
    }

    let snapshot = dashboard.analytics_at(start);
    assert_eq!(snapshot.performance.attempts, 300);
    assert_eq!(snapshot.performance.successes, 300);
    assert_eq!(snapshot.performance.generated_questions, 300);
    assert_eq!(snapshot.activity.today, 300);
    assert_eq!(snapshot.activity.last_30_days, 300);
    assert_eq!(
        dashboard.material(&MaterialId::from("1")).map(|m| m.questions_generated),
        Some(315)
    );
}

#[test]
fn activity_window_is_pruned_by_age_but_totals_are_kept() {
    let mut dashboard = DashboardController::default();
    dashboard.select_material(MaterialId::from("2"));
    let long_ago = Local::now() - chrono::Duration::days(45);
    let now = Local::now();

    let job = dashboard.begin_generation().expect("begin");
    dashboard
        .complete_generation_at(job, Ok(generated_response(4, Difficulty::Medium)), long_ago)
        .expect("complete");
    let job = dashboard.begin_generation().expect("begin");
    dashboard
        .complete_generation_at(job, Ok(generated_response(2, Difficulty::Medium)), now)
        .expect("complete");

    assert_eq!(dashboard.recent_generations().len(), 1);
    let snapshot = dashboard.analytics_at(now);
    assert_eq!(snapshot.activity.last_30_days, 2);
    assert_eq!(snapshot.performance.attempts, 2);
    assert_eq!(snapshot.performance.generated_questions, 6);
}
