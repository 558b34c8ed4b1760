pub mod loading;
pub mod notification_service;
pub mod quiz_attempt_service;
pub mod session_service;
pub mod user_service;

pub use loading::{LoadingGuard, LoadingTracker};
pub use notification_service::NotificationChannel;
pub use quiz_attempt_service::{AttemptSnapshot, QuizAttemptController, TickOutcome};
pub use session_service::SessionService;
pub use user_service::UserService;
