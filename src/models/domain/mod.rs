pub mod notification;
pub mod quiz;
pub mod quiz_attempt;
pub mod user;
pub use notification::{Notification, Severity};
pub use quiz::{Question, QuestionId, QuizId, QuizMeta};
pub use quiz_attempt::{
    Answer, AttemptPhase, AttemptResult, AttemptReview, QuizAttempt, ScoreId, ScoreSummary,
    SubmitPayload,
};
pub use user::{UserIdentity, UserId, UserRole};
