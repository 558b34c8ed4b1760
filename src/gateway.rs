use std::sync::Arc;

use reqwest::{Client, Method, StatusCode};
use secrecy::ExposeSecret;
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::{
    auth::SessionHandle,
    config::Config,
    errors::{AppError, AppResult},
    models::dto::response::ErrorBody,
    routing::{Navigator, ENTRY_PATH},
};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// How a 401 on a request is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// Credential endpoints: a 401 means the submitted credentials were wrong.
    Public,
    /// Session endpoints: a 401 means the session is no longer valid.
    Protected,
}

/// Single exit point for every backend call. Attaches the bearer token and
/// turns a rejected session into a purge plus a redirect to the entry screen.
pub struct HttpGateway {
    client: Client,
    config: Arc<Config>,
    session: SessionHandle,
    navigator: Arc<dyn Navigator>,
}

impl HttpGateway {
    pub fn new(
        config: Arc<Config>,
        session: SessionHandle,
        navigator: Arc<dyn Navigator>,
    ) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            session,
            navigator,
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, access: Access) -> AppResult<T> {
        self.execute(Method::GET, path, None::<&()>, access).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B, access: Access) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(Method::POST, path, Some(body), access).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B, access: Access) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(Method::PUT, path, Some(body), access).await
    }

    async fn execute<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        access: Access,
    ) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.config.endpoint(path);
        let request_id = Uuid::new_v4().to_string();

        let epoch = self.session.epoch();
        let mut request = self
            .client
            .request(method.clone(), &url)
            .header(REQUEST_ID_HEADER, &request_id);
        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token.expose_secret());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        log::debug!("[{}] {} {}", request_id, method, url);

        let response = request.send().await.map_err(|e| {
            log::warn!("[{}] {} {} failed: {}", request_id, method, url, e);
            AppError::from(e)
        })?;
        let status = response.status();

        if status.is_success() {
            let bytes = response.bytes().await?;
            let payload: &[u8] = if bytes.is_empty() { b"{}" } else { &bytes };
            return serde_json::from_slice(payload).map_err(|e| {
                AppError::TransportError(format!("Malformed response from {}: {}", path, e))
            });
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .map(ErrorBody::into_message)
            .unwrap_or_default();
        log::info!("[{}] {} {} -> {}", request_id, method, url, status);

        if status == StatusCode::UNAUTHORIZED {
            return match access {
                Access::Public => Err(AppError::AuthError(message)),
                Access::Protected => {
                    self.expire_session(epoch, &request_id);
                    Err(AppError::Unauthorized(message))
                }
            };
        }

        Err(AppError::from_status(status, message))
    }

    fn expire_session(&self, epoch: u64, request_id: &str) {
        if self.session.epoch() != epoch {
            log::debug!(
                "[{}] Ignoring rejection of a token that was already replaced",
                request_id
            );
            return;
        }
        let had_session = self.session.clear_if_current(epoch);
        log::warn!(
            "[{}] Session rejected by server (session present: {}); returning to {}",
            request_id,
            had_session,
            ENTRY_PATH
        );
        self.navigator.force_navigate(ENTRY_PATH);
    }
}
