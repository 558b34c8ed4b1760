use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

use crate::models::domain::{AttemptResult, Question, QuizMeta, UserIdentity};

fn secret_from_str<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecretString, D::Error> {
    String::deserialize(deserializer).map(SecretString::from)
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(deserialize_with = "secret_from_str")]
    pub access_token: SecretString,
    pub user: UserIdentity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyResponse {
    pub user: UserIdentity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartQuizResponse {
    pub quiz: QuizMeta,
    pub questions: Vec<Question>,
    pub start_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitQuizResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub results: AttemptResult,
}

/// Body of acknowledgement-only endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body. Route handlers use `error`, the JWT layer uses `msg`, some
/// proxies use `message`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> String {
        self.error
            .or(self.msg)
            .or(self.message)
            .unwrap_or_default()
    }
}
