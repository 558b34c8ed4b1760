use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::domain::quiz::{Question, QuestionId, QuizId, QuizMeta};
use crate::models::dto::response::StartQuizResponse;

pub type ScoreId = i64;

/// Lifecycle of the attempt held by the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum AttemptPhase {
    Idle,
    Loading,
    Active,
    Submitting,
    Completed,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Answer {
    Choice(i64),
    Multiple(Vec<i64>),
    Text(String),
}

impl From<&str> for Answer {
    fn from(value: &str) -> Self {
        Answer::Text(value.to_string())
    }
}

impl From<i64> for Answer {
    fn from(value: i64) -> Self {
        Answer::Choice(value)
    }
}

impl From<Vec<i64>> for Answer {
    fn from(value: Vec<i64>) -> Self {
        Answer::Multiple(value)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QuizAttempt {
    pub quiz: QuizMeta,
    pub questions: Vec<Question>,
    pub answers: BTreeMap<QuestionId, Answer>,
    pub start_time: DateTime<Utc>,
    pub time_remaining_seconds: u32,
    pub results: Option<AttemptResult>,
}

impl QuizAttempt {
    /// Fresh attempt state from a start response: no answers, full time.
    pub fn begin(response: StartQuizResponse) -> Self {
        let time_remaining_seconds = response.quiz.duration_seconds();
        QuizAttempt {
            quiz: response.quiz,
            questions: response.questions,
            answers: BTreeMap::new(),
            start_time: response.start_time,
            time_remaining_seconds,
            results: None,
        }
    }

    pub fn quiz_id(&self) -> QuizId {
        self.quiz.id
    }

    pub fn has_question(&self, question_id: QuestionId) -> bool {
        self.questions.iter().any(|q| q.id == question_id)
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }
}

/// Buffered answers sent on submission. Keys serialize as question id
/// strings.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SubmitPayload {
    pub answers: BTreeMap<QuestionId, Answer>,
    pub start_time: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ScoreSummary {
    pub id: ScoreId,
    pub quiz_id: QuizId,
    #[serde(default)]
    pub quiz_title: Option<String>,
    pub total_scored: i64,
    pub total_questions: i64,
    #[serde(default)]
    pub percentage: f64,
    /// Seconds spent; null for attempts recorded without timing.
    #[serde(default)]
    pub time_taken: Option<i64>,
    #[serde(default)]
    pub timestamp_of_attempt: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct AttemptResult {
    pub score: ScoreSummary,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ReviewedQuestion {
    #[serde(flatten)]
    pub question: Question,
    #[serde(default)]
    pub selected_option: Option<Answer>,
    #[serde(default)]
    pub correct_answer: Option<Answer>,
    #[serde(default)]
    pub is_correct: Option<bool>,
}

/// A past, already scored attempt.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct AttemptReview {
    #[serde(default)]
    pub score: Option<ScoreSummary>,
    #[serde(default)]
    pub quiz: Option<QuizMeta>,
    #[serde(default)]
    pub questions: Vec<ReviewedQuestion>,
}
