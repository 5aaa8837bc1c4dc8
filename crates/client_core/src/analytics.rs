//! Figures for the analytics view, derived from the live dashboard state.

use std::{collections::VecDeque, time::Duration};

use chrono::{DateTime, Local};
use shared::domain::{Difficulty, Exam, Material, Question};

use crate::dashboard::{GenerationOutcome, GenerationRecord};

/// Longest window the activity figures look back over.
pub const ACTIVITY_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifficultyShare {
    pub difficulty: Difficulty,
    pub count: usize,
    /// Rounded share of all questions, 0..=100.
    pub percent: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationActivity {
    pub today: u32,
    pub last_7_days: u32,
    pub last_30_days: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GenerationPerformance {
    /// Calls made, excluding cancelled ones.
    pub attempts: usize,
    pub successes: usize,
    /// `None` until at least one call finished.
    pub success_rate: Option<f64>,
    pub mean_latency: Option<Duration>,
    pub generated_questions: u32,
}

/// Running totals over every generation since startup. Never evicted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationTotals {
    attempts: usize,
    successes: usize,
    latency_total: Duration,
    generated_questions: u32,
}

impl GenerationTotals {
    pub fn record(&mut self, outcome: GenerationOutcome, elapsed: Duration) {
        match outcome {
            GenerationOutcome::Succeeded { question_count } => {
                self.attempts += 1;
                self.successes += 1;
                self.latency_total = self.latency_total.saturating_add(elapsed);
                self.generated_questions = self.generated_questions.saturating_add(question_count);
            }
            GenerationOutcome::Failed => self.attempts += 1,
            GenerationOutcome::Cancelled | GenerationOutcome::NotSent => {}
        }
    }

    pub fn performance(&self) -> GenerationPerformance {
        let mean_latency = u32::try_from(self.successes)
            .ok()
            .filter(|successes| *successes > 0)
            .map(|successes| self.latency_total / successes);
        GenerationPerformance {
            attempts: self.attempts,
            successes: self.successes,
            success_rate: (self.attempts > 0)
                .then(|| self.successes as f64 / self.attempts as f64),
            mean_latency,
            generated_questions: self.generated_questions,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsSnapshot {
    pub material_count: usize,
    pub question_count: usize,
    pub exam_count: usize,
    pub difficulty_distribution: [DifficultyShare; 3],
    pub activity: GenerationActivity,
    pub performance: GenerationPerformance,
}

impl AnalyticsSnapshot {
    pub fn compute(
        materials: &[Material],
        questions: &[Question],
        exams: &[Exam],
        recent: &VecDeque<GenerationRecord>,
        totals: &GenerationTotals,
        now: DateTime<Local>,
    ) -> Self {
        Self {
            material_count: materials.len(),
            question_count: questions.len(),
            exam_count: exams.len(),
            difficulty_distribution: difficulty_distribution(questions),
            activity: activity(recent, now),
            performance: totals.performance(),
        }
    }
}

fn difficulty_distribution(questions: &[Question]) -> [DifficultyShare; 3] {
    let total = questions.len();
    Difficulty::ALL.map(|difficulty| {
        let count = questions
            .iter()
            .filter(|question| question.difficulty == difficulty)
            .count();
        let percent = if total == 0 {
            0
        } else {
            ((count as f64 * 100.0) / total as f64).round() as u32
        };
        DifficultyShare {
            difficulty,
            count,
            percent,
        }
    })
}

fn activity<'a, I>(recent: I, now: DateTime<Local>) -> GenerationActivity
where
    I: IntoIterator<Item = &'a GenerationRecord>,
{
    let today = now.date_naive();
    let mut activity = GenerationActivity::default();

    for record in recent {
        let GenerationOutcome::Succeeded { question_count } = record.outcome else {
            continue;
        };
        let age = now.signed_duration_since(record.finished_at);
        if record.finished_at.date_naive() == today {
            activity.today = activity.today.saturating_add(question_count);
        }
        if age < chrono::Duration::days(7) {
            activity.last_7_days = activity.last_7_days.saturating_add(question_count);
        }
        if age < chrono::Duration::days(ACTIVITY_WINDOW_DAYS) {
            activity.last_30_days = activity.last_30_days.saturating_add(question_count);
        }
    }

    activity
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use shared::domain::{MaterialId, QuestionId};

    use super::*;

    fn question(id: &str, difficulty: Difficulty) -> Question {
        Question {
            id: QuestionId::from(id),
            text: format!("question {id}"),
            difficulty,
            material_id: MaterialId::from("1"),
            extra: serde_json::Map::new(),
        }
    }

    fn record(
        finished_at: DateTime<Local>,
        elapsed_ms: u64,
        outcome: GenerationOutcome,
    ) -> GenerationRecord {
        GenerationRecord {
            material_id: MaterialId::from("1"),
            finished_at,
            elapsed: Duration::from_millis(elapsed_ms),
            outcome,
        }
    }

    fn noon(day: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2024, 10, day, 12, 0, 0)
            .single()
            .expect("unambiguous local time")
    }

    #[test]
    fn distribution_is_empty_without_questions() {
        let distribution = difficulty_distribution(&[]);
        assert!(distribution.iter().all(|share| share.count == 0 && share.percent == 0));
    }

    #[test]
    fn distribution_reflects_live_questions() {
        let questions = vec![
            question("1", Difficulty::Easy),
            question("2", Difficulty::Medium),
            question("3", Difficulty::Easy),
        ];
        let distribution = difficulty_distribution(&questions);
        assert_eq!(distribution[0].difficulty, Difficulty::Easy);
        assert_eq!(distribution[0].count, 2);
        assert_eq!(distribution[0].percent, 67);
        assert_eq!(distribution[1].percent, 33);
        assert_eq!(distribution[2].percent, 0);
    }

    #[test]
    fn activity_buckets_successful_generations_by_age() {
        let now = noon(20);
        let history = vec![
            record(noon(20), 100, GenerationOutcome::Succeeded { question_count: 5 }),
            record(noon(16), 100, GenerationOutcome::Succeeded { question_count: 10 }),
            record(noon(2), 100, GenerationOutcome::Succeeded { question_count: 20 }),
            record(noon(20), 100, GenerationOutcome::Failed),
        ];
        assert_eq!(
            activity(&history, now),
            GenerationActivity {
                today: 5,
                last_7_days: 15,
                last_30_days: 35,
            }
        );
    }

    fn totals(history: &[GenerationRecord]) -> GenerationTotals {
        let mut totals = GenerationTotals::default();
        for record in history {
            totals.record(record.outcome, record.elapsed);
        }
        totals
    }

    #[test]
    fn performance_ignores_cancelled_and_unsent_calls() {
        let history = vec![
            record(noon(20), 1000, GenerationOutcome::Succeeded { question_count: 5 }),
            record(noon(20), 3000, GenerationOutcome::Succeeded { question_count: 5 }),
            record(noon(20), 500, GenerationOutcome::Failed),
            record(noon(20), 200, GenerationOutcome::Cancelled),
            record(noon(20), 0, GenerationOutcome::NotSent),
        ];
        let performance = totals(&history).performance();
        assert_eq!(performance.attempts, 3);
        assert_eq!(performance.successes, 2);
        assert_eq!(performance.generated_questions, 10);
        assert_eq!(performance.mean_latency, Some(Duration::from_secs(2)));
        let rate = performance.success_rate.expect("rate");
        assert!((rate - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn performance_has_no_rate_without_attempts() {
        let performance = GenerationTotals::default().performance();
        assert_eq!(performance.success_rate, None);
        assert_eq!(performance.mean_latency, None);
    }
}
