use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    errors::AppResult,
    gateway::{Access, HttpGateway},
    models::{
        domain::{AttemptReview, QuizId, QuizMeta, ScoreId, SubmitPayload},
        dto::response::{StartQuizResponse, SubmitQuizResponse},
    },
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizApi: Send + Sync {
    async fn get_quiz_details(&self, quiz_id: QuizId) -> AppResult<QuizMeta>;
    async fn start_quiz(&self, quiz_id: QuizId) -> AppResult<StartQuizResponse>;
    async fn submit_quiz(
        &self,
        quiz_id: QuizId,
        payload: &SubmitPayload,
    ) -> AppResult<SubmitQuizResponse>;
    async fn get_quiz_attempt(&self, score_id: ScoreId) -> AppResult<AttemptReview>;
}

pub struct HttpQuizApi {
    gateway: Arc<HttpGateway>,
}

impl HttpQuizApi {
    pub fn new(gateway: Arc<HttpGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl QuizApi for HttpQuizApi {
    async fn get_quiz_details(&self, quiz_id: QuizId) -> AppResult<QuizMeta> {
        self.gateway
            .get(&format!("/quiz/{}/details", quiz_id), Access::Protected)
            .await
    }

    async fn start_quiz(&self, quiz_id: QuizId) -> AppResult<StartQuizResponse> {
        self.gateway
            .get(&format!("/quiz/{}/start", quiz_id), Access::Protected)
            .await
    }

    async fn submit_quiz(
        &self,
        quiz_id: QuizId,
        payload: &SubmitPayload,
    ) -> AppResult<SubmitQuizResponse> {
        self.gateway
            .post(&format!("/quiz/{}/submit", quiz_id), payload, Access::Protected)
            .await
    }

    async fn get_quiz_attempt(&self, score_id: ScoreId) -> AppResult<AttemptReview> {
        self.gateway
            .get(&format!("/quiz/attempt/{}", score_id), Access::Protected)
            .await
    }
}
