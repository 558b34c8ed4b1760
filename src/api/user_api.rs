use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    errors::AppResult,
    gateway::{Access, HttpGateway},
    models::dto::{request::ProfileUpdate, response::MessageResponse},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserApi: Send + Sync {
    async fn update_profile(&self, update: &ProfileUpdate) -> AppResult<()>;
}

pub struct HttpUserApi {
    gateway: Arc<HttpGateway>,
}

impl HttpUserApi {
    pub fn new(gateway: Arc<HttpGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl UserApi for HttpUserApi {
    async fn update_profile(&self, update: &ProfileUpdate) -> AppResult<()> {
        let _: MessageResponse = self
            .gateway
            .put("/user/profile", update, Access::Protected)
            .await?;
        Ok(())
    }
}
