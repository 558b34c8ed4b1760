use chrono::{DateTime, TimeZone, Utc};

use crate::models::domain::{
    AttemptResult, AttemptReview, Question, QuizId, QuizMeta, ScoreId, ScoreSummary, UserIdentity,
    UserRole,
};
use crate::models::dto::response::StartQuizResponse;

#[cfg(test)]
pub mod fixtures {
    use super::*;
    use crate::models::dto::request::RegisterRequest;
    use secrecy::SecretString;

    /// Signed-in learner account
    pub fn learner() -> UserIdentity {
        UserIdentity::new(1, "jane@example.com", "Jane Smith", UserRole::User)
    }

    pub fn admin() -> UserIdentity {
        UserIdentity::new(2, "admin@example.com", "Quiz Admin", UserRole::Admin)
    }

    pub fn register_request() -> RegisterRequest {
        RegisterRequest {
            email: "new@example.com".to_string(),
            password: SecretString::from("s3cret-pass".to_string()),
            full_name: "New Learner".to_string(),
            qualification: "B.Sc".to_string(),
            dob: "2001-02-03".to_string(),
        }
    }

    pub fn start_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
    }

    /// Quiz with `duration` minutes on the clock
    pub fn quiz_meta(quiz_id: QuizId, duration: u32) -> QuizMeta {
        QuizMeta {
            id: quiz_id,
            title: format!("Quiz {}", quiz_id),
            description: None,
            chapter_id: Some(1),
            chapter_name: Some("Motion".to_string()),
            subject_name: Some("Physics".to_string()),
            duration,
            date_of_quiz: Some("2024-05-01".to_string()),
            is_active: true,
            questions_count: Some(2),
        }
    }

    /// Two questions, numbered `quiz_id * 10 + 1` and `+ 2`
    pub fn start_response(quiz_id: QuizId, duration: u32) -> StartQuizResponse {
        let questions = (1..=2)
            .map(|n| Question {
                id: quiz_id * 10 + n,
                quiz_id,
                question_statement: format!("Question {}", n),
                options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            })
            .collect();

        StartQuizResponse {
            quiz: quiz_meta(quiz_id, duration),
            questions,
            start_time: start_time(),
        }
    }

    pub fn score_summary(score_id: ScoreId, quiz_id: QuizId, scored: i64, total: i64) -> ScoreSummary {
        ScoreSummary {
            id: score_id,
            quiz_id,
            quiz_title: Some(format!("Quiz {}", quiz_id)),
            total_scored: scored,
            total_questions: total,
            percentage: scored as f64 * 100.0 / total as f64,
            time_taken: Some(120),
            timestamp_of_attempt: Some("2024-05-01T10:02:00".to_string()),
        }
    }

    pub fn attempt_result(quiz_id: QuizId, scored: i64, total: i64) -> AttemptResult {
        AttemptResult {
            score: score_summary(40, quiz_id, scored, total),
        }
    }

    pub fn attempt_review(score_id: ScoreId) -> AttemptReview {
        AttemptReview {
            score: Some(score_summary(score_id, 7, 1, 2)),
            quiz: Some(quiz_meta(7, 10)),
            questions: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;

    #[test]
    fn test_fixtures_start_response_question_ids() {
        let response = start_response(7, 10);
        let ids: Vec<_> = response.questions.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![71, 72]);
        assert_eq!(response.quiz.duration_seconds(), 600);
    }

    #[test]
    fn test_fixtures_attempt_result_percentage() {
        let result = attempt_result(7, 1, 2);
        assert_eq!(result.score.percentage, 50.0);
        assert_eq!(result.score.quiz_id, 7);
    }
}
