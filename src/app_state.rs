use std::sync::Arc;

use crate::{
    api::{AuthApi, HttpAuthApi, HttpQuizApi, HttpUserApi, QuizApi, UserApi},
    auth::SessionHandle,
    config::Config,
    errors::AppResult,
    gateway::HttpGateway,
    models::domain::AttemptPhase,
    routing::{Location, NavigationOutcome, RouteName, Router},
    services::{
        LoadingTracker, NotificationChannel, QuizAttemptController, SessionService, UserService,
    },
    storage::{FileStorage, KeyValueStorage},
};

/// Backend access used by the services.
#[derive(Clone)]
pub struct Apis {
    pub auth: Arc<dyn AuthApi>,
    pub quiz: Arc<dyn QuizApi>,
    pub user: Arc<dyn UserApi>,
}

impl Apis {
    pub fn http(gateway: Arc<HttpGateway>) -> Self {
        Apis {
            auth: Arc::new(HttpAuthApi::new(gateway.clone())),
            quiz: Arc::new(HttpQuizApi::new(gateway.clone())),
            user: Arc::new(HttpUserApi::new(gateway)),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub session: SessionHandle,
    pub notifications: NotificationChannel,
    pub loading: LoadingTracker,
    pub router: Arc<Router>,
    pub session_service: Arc<SessionService>,
    pub quiz_attempts: QuizAttemptController,
    pub user_service: Arc<UserService>,
}

impl AppState {
    /// Opens durable storage, restores the session and, when a token was
    /// stored, verifies it against the backend.
    pub async fn init(config: Config) -> AppResult<Self> {
        let config = Arc::new(config);
        let storage: Arc<dyn KeyValueStorage> =
            Arc::new(FileStorage::open(config.storage_path.clone())?);
        let session = SessionHandle::restore(storage, &config.token_storage_key);
        let router = Arc::new(Router::new(session.clone()));
        let gateway = Arc::new(HttpGateway::new(
            config.clone(),
            session.clone(),
            router.clone(),
        )?);

        let state = Self::assemble(config, session, router, Apis::http(gateway));
        if state.session.has_token() {
            if let Err(err) = state.session_service.verify().await {
                log::warn!("Stored session could not be verified: {}", err);
            }
        }
        Ok(state)
    }

    pub fn assemble(
        config: Arc<Config>,
        session: SessionHandle,
        router: Arc<Router>,
        apis: Apis,
    ) -> Self {
        let notifications = NotificationChannel::new(config.notification_ttl());
        let loading = LoadingTracker::new();

        let session_service = Arc::new(SessionService::new(
            apis.auth,
            session.clone(),
            notifications.clone(),
            loading.clone(),
        ));
        let quiz_attempts = QuizAttemptController::new(
            apis.quiz,
            session.clone(),
            notifications.clone(),
            loading.clone(),
            config.countdown_period(),
        );
        let user_service = Arc::new(UserService::new(
            apis.user,
            session_service.clone(),
            notifications.clone(),
            loading.clone(),
        ));

        Self {
            config,
            session,
            notifications,
            loading,
            router,
            session_service,
            quiz_attempts,
            user_service,
        }
    }

    /// Guarded navigation. Leaving the attempt view discards the attempt,
    /// except when a completed attempt moves on to its own results.
    pub async fn navigate(&self, path: &str) -> AppResult<NavigationOutcome> {
        let previous = self.router.current();
        let outcome = self.router.navigate(path)?;

        if let Some(previous) = previous {
            if previous.name == RouteName::QuizAttempt
                && previous.path != outcome.location.path
                && !self.shows_own_results(&previous, &outcome.location).await
            {
                log::debug!("Left {}; discarding quiz attempt", previous.path);
                self.quiz_attempts.reset().await;
            }
        }
        Ok(outcome)
    }

    async fn shows_own_results(&self, attempt_view: &Location, target: &Location) -> bool {
        target.name == RouteName::QuizResults
            && target.param("id") == attempt_view.param("id")
            && self.quiz_attempts.phase().await == AttemptPhase::Completed
    }

    /// Signs out and drops whatever attempt the session had running.
    pub async fn logout(&self) {
        self.session_service.logout().await;
        self.quiz_attempts.reset().await;
    }
}
