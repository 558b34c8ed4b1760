use std::sync::Arc;

use crate::{
    api::AuthApi,
    auth::SessionHandle,
    errors::{AppError, AppResult},
    models::{
        domain::UserIdentity,
        dto::request::{Credentials, RegisterRequest},
    },
    services::{loading::LoadingTracker, notification_service::NotificationChannel},
};

const LOGIN_FAILED: &str = "An unknown login error occurred.";
const REGISTER_FAILED: &str = "Registration failed";

/// Login, registration, identity refresh and logout over the shared session.
pub struct SessionService {
    api: Arc<dyn AuthApi>,
    session: SessionHandle,
    notifications: NotificationChannel,
    loading: LoadingTracker,
}

impl SessionService {
    pub fn new(
        api: Arc<dyn AuthApi>,
        session: SessionHandle,
        notifications: NotificationChannel,
        loading: LoadingTracker,
    ) -> Self {
        Self {
            api,
            session,
            notifications,
            loading,
        }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Signs in. A failure leaves the session untouched and comes back as
    /// `AuthError` carrying the message that was shown to the user.
    pub async fn login(&self, credentials: &Credentials) -> AppResult<UserIdentity> {
        let _busy = self.loading.begin();

        match self.api.login(credentials).await {
            Ok(response) => {
                let user = response.user;
                self.session.establish(response.access_token, user.clone());
                log::info!("User {} signed in as {:?}", user.id, user.role);
                self.notifications.success("Login successful!");
                Ok(user)
            }
            Err(err) => {
                let message = err.user_message(LOGIN_FAILED);
                log::warn!("Login failed: {}", err);
                self.notifications.error(message.clone());
                Err(AppError::AuthError(message))
            }
        }
    }

    /// Creates an account. No session is established.
    pub async fn register(&self, request: &RegisterRequest) -> AppResult<()> {
        let _busy = self.loading.begin();

        match self.api.register(request).await {
            Ok(()) => {
                self.notifications
                    .success("Registration successful! Please login.");
                Ok(())
            }
            Err(err) => {
                log::warn!("Registration failed: {}", err);
                self.notifications.report_failure(&err, REGISTER_FAILED);
                Err(err)
            }
        }
    }

    /// Refreshes the identity behind the current token. Any failure purges
    /// the whole session. The outcome is dropped if the token changed while
    /// the request was in flight.
    pub async fn verify(&self) -> AppResult<UserIdentity> {
        if !self.session.has_token() {
            self.session.clear();
            return Err(AppError::AuthError("No session token".to_string()));
        }

        let epoch = self.session.epoch();
        match self.api.verify_token().await {
            Ok(response) => {
                if !self.session.set_user_if_current(epoch, response.user.clone()) {
                    log::debug!("Discarding verify result for a replaced session");
                    return Err(AppError::Superseded(
                        "Session changed during verification".to_string(),
                    ));
                }
                log::debug!("Verified session for user {}", response.user.id);
                Ok(response.user)
            }
            Err(err) => {
                log::info!("Session verification failed: {}", err);
                self.session.clear_if_current(epoch);
                Err(err)
            }
        }
    }

    /// Ends the session locally no matter what the server says.
    pub async fn logout(&self) {
        if let Err(err) = self.api.logout().await {
            log::warn!("Logout API error: {}", err);
        }
        self.session.clear();
        self.notifications.success("Logged out successfully!");
    }
}
