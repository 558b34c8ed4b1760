use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    errors::AppResult,
    gateway::{Access, HttpGateway},
    models::dto::{
        request::{Credentials, RegisterRequest},
        response::{LoginResponse, MessageResponse, VerifyResponse},
    },
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> AppResult<LoginResponse>;
    async fn register(&self, request: &RegisterRequest) -> AppResult<()>;
    async fn verify_token(&self) -> AppResult<VerifyResponse>;
    async fn logout(&self) -> AppResult<()>;
}

pub struct HttpAuthApi {
    gateway: Arc<HttpGateway>,
}

impl HttpAuthApi {
    pub fn new(gateway: Arc<HttpGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, credentials: &Credentials) -> AppResult<LoginResponse> {
        self.gateway
            .post("/auth/login", credentials, Access::Public)
            .await
    }

    async fn register(&self, request: &RegisterRequest) -> AppResult<()> {
        let _: MessageResponse = self
            .gateway
            .post("/auth/register", request, Access::Public)
            .await?;
        Ok(())
    }

    async fn verify_token(&self) -> AppResult<VerifyResponse> {
        self.gateway.get("/auth/me", Access::Protected).await
    }

    async fn logout(&self) -> AppResult<()> {
        let _: MessageResponse = self
            .gateway
            .post("/auth/logout", &serde_json::json!({}), Access::Protected)
            .await?;
        Ok(())
    }
}
