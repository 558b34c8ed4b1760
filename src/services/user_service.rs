use std::sync::Arc;

use crate::{
    api::UserApi,
    errors::AppResult,
    models::{domain::UserIdentity, dto::request::ProfileUpdate},
    services::{
        loading::LoadingTracker, notification_service::NotificationChannel,
        session_service::SessionService,
    },
};

const PROFILE_FAILED: &str = "Failed to update profile";

pub struct UserService {
    api: Arc<dyn UserApi>,
    session_service: Arc<SessionService>,
    notifications: NotificationChannel,
    loading: LoadingTracker,
}

impl UserService {
    pub fn new(
        api: Arc<dyn UserApi>,
        session_service: Arc<SessionService>,
        notifications: NotificationChannel,
        loading: LoadingTracker,
    ) -> Self {
        Self {
            api,
            session_service,
            notifications,
            loading,
        }
    }

    /// Saves the profile, then re-verifies so the session holds the
    /// identity exactly as the server now reports it.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> AppResult<UserIdentity> {
        let _busy = self.loading.begin();

        if let Err(err) = self.api.update_profile(update).await {
            log::warn!("Profile update failed: {}", err);
            self.notifications.report_failure(&err, PROFILE_FAILED);
            return Err(err);
        }

        let user = self.session_service.verify().await?;
        log::info!("Profile of user {} updated", user.id);
        self.notifications.success("Profile updated successfully!");
        Ok(user)
    }
}
