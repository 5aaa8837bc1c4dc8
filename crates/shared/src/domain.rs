use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Ids coming back from the generation service may be JSON numbers (database
/// keys) or strings; both are kept as strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl From<RawId> for String {
    fn from(value: RawId) -> Self {
        match value {
            RawId::Text(text) => text,
            RawId::Number(number) => number.to_string(),
        }
    }
}

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                RawId::deserialize(deserializer).map(|raw| Self(raw.into()))
            }
        }
    };
}

id_newtype!(MaterialId);
id_newtype!(QuestionId);
id_newtype!(ExamId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Slider anchors in evaluation order; ties resolve toward the earlier entry.
const DIFFICULTY_BUCKETS: [(u32, Difficulty); 3] = [
    (0, Difficulty::Easy),
    (50, Difficulty::Medium),
    (100, Difficulty::Hard),
];

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Maps a continuous difficulty level onto the nearest bucket anchor.
    pub fn from_level(level: u32) -> Self {
        DIFFICULTY_BUCKETS
            .iter()
            .skip(1)
            .fold(DIFFICULTY_BUCKETS[0], |best, candidate| {
                if level.abs_diff(candidate.0) < level.abs_diff(best.0) {
                    *candidate
                } else {
                    best
                }
            })
            .1
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn label(self, language: GenerationLanguage) -> &'static str {
        match (language, self) {
            (GenerationLanguage::Russian, Difficulty::Easy) => "Легкий",
            (GenerationLanguage::Russian, Difficulty::Medium) => "Средний",
            (GenerationLanguage::Russian, Difficulty::Hard) => "Сложный",
            (GenerationLanguage::English, Difficulty::Easy) => "Easy",
            (GenerationLanguage::English, Difficulty::Medium) => "Medium",
            (GenerationLanguage::English, Difficulty::Hard) => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown difficulty '{0}', expected easy, medium or hard")]
pub struct ParseDifficultyError(String);

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ParseDifficultyError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: MaterialId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub upload_date: NaiveDate,
    pub questions_generated: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub difficulty: Difficulty,
    pub material_id: MaterialId,
    /// Fields returned by the generation service that this client does not model.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exam {
    pub id: ExamId,
    pub name: String,
    pub question_count: u32,
    pub created_date: NaiveDate,
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationLanguage {
    #[default]
    Russian,
    English,
}

impl GenerationLanguage {
    pub const ALL: [GenerationLanguage; 2] =
        [GenerationLanguage::Russian, GenerationLanguage::English];

    pub fn label(self) -> &'static str {
        match self {
            GenerationLanguage::Russian => "Русский",
            GenerationLanguage::English => "English",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Pdf,
    Docx,
    Xlsx,
    #[default]
    Json,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Pdf,
        ExportFormat::Docx,
        ExportFormat::Xlsx,
        ExportFormat::Json,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "PDF",
            ExportFormat::Docx => "DOCX",
            ExportFormat::Xlsx => "XLSX",
            ExportFormat::Json => "JSON",
        }
    }
}

/// File types offered by the upload picker.
pub const SUPPORTED_MATERIAL_EXTENSIONS: [&str; 8] =
    ["pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt"];

pub const QUESTION_COUNT_MIN: u32 = 5;
pub const QUESTION_COUNT_MAX: u32 = 50;
pub const QUESTION_COUNT_STEP: u32 = 5;
pub const DIFFICULTY_LEVEL_MAX: u32 = 100;
pub const DIFFICULTY_LEVEL_STEP: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub question_count: u32,
    pub difficulty_level: u32,
    pub language: GenerationLanguage,
    pub export_format: ExportFormat,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            question_count: 20,
            difficulty_level: 50,
            language: GenerationLanguage::default(),
            export_format: ExportFormat::default(),
        }
    }
}

impl GenerationSettings {
    pub fn difficulty(&self) -> Difficulty {
        Difficulty::from_level(self.difficulty_level)
    }

    /// Whether both sliders sit on a valid step inside their ranges.
    pub fn is_within_bounds(&self) -> bool {
        (QUESTION_COUNT_MIN..=QUESTION_COUNT_MAX).contains(&self.question_count)
            && self.question_count % QUESTION_COUNT_STEP == 0
            && self.difficulty_level <= DIFFICULTY_LEVEL_MAX
            && self.difficulty_level % DIFFICULTY_LEVEL_STEP == 0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardTab {
    #[default]
    Upload,
    Library,
    Generator,
    Exams,
    Analytics,
    Settings,
}

impl DashboardTab {
    pub const ALL: [DashboardTab; 6] = [
        DashboardTab::Upload,
        DashboardTab::Library,
        DashboardTab::Generator,
        DashboardTab::Exams,
        DashboardTab::Analytics,
        DashboardTab::Settings,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DashboardTab::Upload => "Upload",
            DashboardTab::Library => "Library",
            DashboardTab::Generator => "Generator",
            DashboardTab::Exams => "Exams",
            DashboardTab::Analytics => "Analytics",
            DashboardTab::Settings => "Settings",
        }
    }
}
