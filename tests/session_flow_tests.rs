use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Semaphore;

use quiz_client::{
    api::AuthApi,
    auth::SessionHandle,
    errors::{AppError, AppResult},
    models::{
        domain::{UserIdentity, UserRole},
        dto::{
            request::{Credentials, RegisterRequest},
            response::{LoginResponse, VerifyResponse},
        },
    },
    services::{LoadingTracker, NotificationChannel, SessionService},
    storage::{KeyValueStorage, MemoryStorage},
};

/// Auth backend whose verify call is held open until the test releases it.
struct GatedAuthApi {
    gate: Semaphore,
    reject_verify: bool,
    verifies: AtomicUsize,
}

impl GatedAuthApi {
    fn new(reject_verify: bool) -> Arc<Self> {
        Arc::new(Self {
            gate: Semaphore::new(0),
            reject_verify,
            verifies: AtomicUsize::new(0),
        })
    }

    fn release(&self) {
        self.gate.add_permits(1);
    }
}

fn learner() -> UserIdentity {
    UserIdentity::new(1, "jane@example.com", "Jane Smith", UserRole::User)
}

fn admin() -> UserIdentity {
    UserIdentity::new(2, "admin@example.com", "Quiz Admin", UserRole::Admin)
}

#[async_trait]
impl AuthApi for GatedAuthApi {
    async fn login(&self, _credentials: &Credentials) -> AppResult<LoginResponse> {
        Ok(LoginResponse {
            message: None,
            access_token: SecretString::from("admin-token".to_string()),
            user: admin(),
        })
    }

    async fn register(&self, _request: &RegisterRequest) -> AppResult<()> {
        Ok(())
    }

    async fn verify_token(&self) -> AppResult<VerifyResponse> {
        self.verifies.fetch_add(1, Ordering::SeqCst);
        if let Ok(permit) = self.gate.acquire().await {
            permit.forget();
        }
        if self.reject_verify {
            return Err(AppError::Unauthorized("Token has expired".to_string()));
        }
        Ok(VerifyResponse { user: learner() })
    }

    async fn logout(&self) -> AppResult<()> {
        Ok(())
    }
}

struct Fixture {
    service: Arc<SessionService>,
    session: SessionHandle,
    storage: Arc<MemoryStorage>,
}

fn fixture(api: Arc<GatedAuthApi>) -> Fixture {
    let storage = Arc::new(MemoryStorage::with_entry("token", "learner-token"));
    let session = SessionHandle::restore(storage.clone(), "token");
    let service = Arc::new(SessionService::new(
        api,
        session.clone(),
        NotificationChannel::new(Duration::from_secs(5)),
        LoadingTracker::new(),
    ));
    Fixture {
        service,
        session,
        storage,
    }
}

async fn wait_until<F: Fn() -> bool>(condition: F) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}

fn spawn_verify(service: &Arc<SessionService>) -> tokio::task::JoinHandle<AppResult<UserIdentity>> {
    let service = service.clone();
    tokio::spawn(async move { service.verify().await })
}

#[tokio::test]
async fn test_verify_finishing_after_logout_stays_signed_out() {
    let api = GatedAuthApi::new(false);
    let fx = fixture(api.clone());

    let pending = spawn_verify(&fx.service);
    wait_until(|| api.verifies.load(Ordering::SeqCst) == 1).await;

    fx.service.logout().await;
    api.release();

    assert!(matches!(
        pending.await.unwrap(),
        Err(AppError::Superseded(_))
    ));
    assert!(!fx.session.has_token());
    assert!(!fx.session.is_authenticated());
    assert_eq!(fx.storage.get("token").unwrap(), None);
}

#[tokio::test]
async fn test_verify_of_old_token_keeps_newer_login() {
    let api = GatedAuthApi::new(false);
    let fx = fixture(api.clone());

    let pending = spawn_verify(&fx.service);
    wait_until(|| api.verifies.load(Ordering::SeqCst) == 1).await;

    let user = fx
        .service
        .login(&Credentials::new("admin@example.com", "pw"))
        .await
        .unwrap();
    assert_eq!(user.role, UserRole::Admin);
    api.release();

    assert!(matches!(
        pending.await.unwrap(),
        Err(AppError::Superseded(_))
    ));
    assert_eq!(fx.session.role(), Some(UserRole::Admin));
    assert_eq!(
        fx.session.token().map(|t| t.expose_secret().to_string()),
        Some("admin-token".to_string())
    );
}

#[tokio::test]
async fn test_rejected_old_token_does_not_clear_newer_login() {
    let api = GatedAuthApi::new(true);
    let fx = fixture(api.clone());

    let pending = spawn_verify(&fx.service);
    wait_until(|| api.verifies.load(Ordering::SeqCst) == 1).await;

    fx.service
        .login(&Credentials::new("admin@example.com", "pw"))
        .await
        .unwrap();
    api.release();

    assert!(matches!(
        pending.await.unwrap(),
        Err(AppError::Unauthorized(_))
    ));
    assert!(fx.session.is_authenticated());
    assert_eq!(fx.session.current_user(), Some(admin()));
    assert_eq!(
        fx.storage.get("token").unwrap(),
        Some("admin-token".to_string())
    );
}

#[tokio::test]
async fn test_rejected_current_token_clears_session() {
    let api = GatedAuthApi::new(true);
    let fx = fixture(api.clone());

    api.release();
    assert!(fx.service.verify().await.is_err());

    assert!(!fx.session.has_token());
    assert_eq!(fx.storage.get("token").unwrap(), None);
}
