use chrono::NaiveDate;
use shared::domain::{Difficulty, Exam, ExamId, Material, MaterialId, Question, QuestionId};

/// Initial dashboard contents.
#[derive(Debug, Clone, Default)]
pub struct DashboardSeed {
    pub materials: Vec<Material>,
    pub questions: Vec<Question>,
    pub exams: Vec<Exam>,
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn material(id: &str, name: &str, kind: &str, uploaded: NaiveDate, generated: u32) -> Material {
    Material {
        id: MaterialId::from(id),
        name: name.to_string(),
        kind: kind.to_string(),
        upload_date: uploaded,
        questions_generated: generated,
    }
}

fn question(id: &str, text: &str, difficulty: Difficulty, material_id: &str) -> Question {
    Question {
        id: QuestionId::from(id),
        text: text.to_string(),
        difficulty,
        material_id: MaterialId::from(material_id),
        extra: serde_json::Map::new(),
    }
}

impl DashboardSeed {
    /// The demo library the dashboard opens with.
    pub fn sample() -> Self {
        Self {
            materials: vec![
                material("1", "Основы алгебры.pdf", "PDF", date(2024, 10, 10), 15),
                material("2", "История России.docx", "DOCX", date(2024, 10, 12), 23),
            ],
            questions: vec![
                question("1", "Что такое квадратное уравнение?", Difficulty::Easy, "1"),
                question("2", "Решите уравнение: x² + 5x + 6 = 0", Difficulty::Medium, "1"),
                question(
                    "3",
                    "В каком году началась Великая Отечественная война?",
                    Difficulty::Easy,
                    "2",
                ),
            ],
            exams: vec![
                Exam {
                    id: ExamId::from("1"),
                    name: "Экзамен по алгебре".to_string(),
                    question_count: 15,
                    created_date: date(2024, 10, 13),
                    difficulty: Difficulty::Medium,
                },
                Exam {
                    id: ExamId::from("2"),
                    name: "Тест по истории".to_string(),
                    question_count: 10,
                    created_date: date(2024, 10, 14),
                    difficulty: Difficulty::Easy,
                },
            ],
        }
    }
}
