pub mod auth_api;
pub mod quiz_api;
pub mod user_api;

pub use auth_api::{AuthApi, HttpAuthApi};
pub use quiz_api::{HttpQuizApi, QuizApi};
pub use user_api::{HttpUserApi, UserApi};
