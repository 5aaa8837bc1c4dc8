use serde::{Deserialize, Serialize};

use crate::domain::{Difficulty, MaterialId, Question, QuestionId};

/// Logical name of the generation function in the function URL map.
pub const GENERATE_QUESTIONS_FUNCTION: &str = "generate-questions";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuestionsRequest {
    pub material_text: String,
    pub difficulty: Difficulty,
    pub question_count: u32,
}

/// One question as returned by the service, before it is tied to a material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    pub id: QuestionId,
    pub text: String,
    pub difficulty: Difficulty,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl GeneratedQuestion {
    /// Tags the question with the material it was generated for. A
    /// `materialId` the service may have echoed back is overridden.
    pub fn into_question(mut self, material_id: MaterialId) -> Question {
        self.extra.remove("materialId");
        Question {
            id: self.id,
            text: self.text,
            difficulty: self.difficulty,
            material_id,
            extra: self.extra,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateQuestionsResponse {
    pub questions: Vec<GeneratedQuestion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_camel_case_wire_names() {
        let request = GenerateQuestionsRequest {
            material_text: "sample".to_string(),
            difficulty: Difficulty::Hard,
            question_count: 15,
        };
        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({
                "materialText": "sample",
                "difficulty": "hard",
                "questionCount": 15
            })
        );
    }

    #[test]
    fn generated_question_keeps_unmodelled_fields() {
        let response: GenerateQuestionsResponse = serde_json::from_value(serde_json::json!({
            "questions": [
                {
                    "id": 17,
                    "text": "What is a prime?",
                    "difficulty": "easy",
                    "created_at": "2024-10-15 10:00:00",
                    "materialId": "99"
                }
            ],
            "count": 1,
            "model": "gpt-4o-mini"
        }))
        .expect("deserialize");

        let question = response.questions[0]
            .clone()
            .into_question(MaterialId::from("2"));
        assert_eq!(question.id.as_str(), "17");
        assert_eq!(question.material_id.as_str(), "2");
        assert_eq!(
            question.extra.get("created_at"),
            Some(&serde_json::json!("2024-10-15 10:00:00"))
        );
        assert!(!question.extra.contains_key("materialId"));
    }
}
