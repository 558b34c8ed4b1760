use serde::{Deserialize, Serialize};

pub type QuizId = i64;
pub type QuestionId = i64;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuizMeta {
    pub id: QuizId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub chapter_id: Option<i64>,
    #[serde(default)]
    pub chapter_name: Option<String>,
    #[serde(default)]
    pub subject_name: Option<String>,
    /// Time allowed for one attempt, in minutes.
    pub duration: u32,
    #[serde(default)]
    pub date_of_quiz: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub questions_count: Option<u32>,
}

fn default_active() -> bool {
    true
}

impl QuizMeta {
    pub fn duration_seconds(&self) -> u32 {
        self.duration.saturating_mul(60)
    }
}

/// A question as served during an attempt; the correct answer is withheld.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Question {
    pub id: QuestionId,
    pub quiz_id: QuizId,
    pub question_statement: String,
    #[serde(default)]
    pub options: Vec<String>,
}
