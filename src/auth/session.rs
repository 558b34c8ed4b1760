use std::sync::{Arc, PoisonError, RwLock};

use secrecy::{ExposeSecret, SecretString};

use crate::{
    models::domain::{UserIdentity, UserRole},
    storage::KeyValueStorage,
};

/// Authentication state of this client. `is_authenticated` is derived from
/// the presence of a user, so the two can never disagree.
#[derive(Default)]
struct Session {
    token: Option<SecretString>,
    user: Option<UserIdentity>,
    /// Bumped whenever the token is issued or dropped.
    epoch: u64,
}

/// Read-only view of the session handed to the navigation guard and views.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionSnapshot {
    pub is_authenticated: bool,
    pub role: Option<UserRole>,
    pub user: Option<UserIdentity>,
    pub has_token: bool,
}

impl SessionSnapshot {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(user: UserIdentity) -> Self {
        SessionSnapshot {
            is_authenticated: true,
            role: Some(user.role),
            user: Some(user),
            has_token: true,
        }
    }
}

/// Shared owner of the session. Every token change is written to durable
/// storage under the same lock as the in-memory value.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<RwLock<Session>>,
    storage: Arc<dyn KeyValueStorage>,
    storage_key: String,
}

impl SessionHandle {
    /// Hydrates the token from durable storage. The user stays unknown until
    /// a verify succeeds.
    pub fn restore(storage: Arc<dyn KeyValueStorage>, storage_key: &str) -> Self {
        let token = match storage.get(storage_key) {
            Ok(token) => token.filter(|t| !t.is_empty()).map(SecretString::from),
            Err(e) => {
                log::error!("Failed to read stored session token: {}", e);
                None
            }
        };

        if token.is_some() {
            log::info!("Restored session token from storage");
        }

        Self {
            inner: Arc::new(RwLock::new(Session {
                token,
                user: None,
                epoch: 0,
            })),
            storage,
            storage_key: storage_key.to_string(),
        }
    }

    pub fn token(&self) -> Option<SecretString> {
        let session = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        session
            .token
            .as_ref()
            .map(|t| SecretString::from(t.expose_secret().to_string()))
    }

    pub fn has_token(&self) -> bool {
        let session = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        session.token.is_some()
    }

    pub fn current_user(&self) -> Option<UserIdentity> {
        let session = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        session.user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        let session = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        session.user.is_some()
    }

    pub fn role(&self) -> Option<UserRole> {
        let session = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        session.user.as_ref().map(|u| u.role)
    }

    /// Identifies the current token. Results of requests made under an older
    /// epoch must not be applied.
    pub fn epoch(&self) -> u64 {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .epoch
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let session = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        SessionSnapshot {
            is_authenticated: session.user.is_some(),
            role: session.user.as_ref().map(|u| u.role),
            user: session.user.clone(),
            has_token: session.token.is_some(),
        }
    }

    /// Installs a freshly issued token together with its user.
    pub fn establish(&self, token: SecretString, user: UserIdentity) {
        let mut session = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = self.storage.set(&self.storage_key, token.expose_secret()) {
            log::error!("Failed to persist session token: {}", e);
        }
        session.token = Some(token);
        session.user = Some(user);
        session.epoch += 1;
    }

    /// Replaces the identity for the current token.
    pub fn set_user(&self, user: UserIdentity) {
        let mut session = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        session.user = Some(user);
    }

    /// Installs `user` only if the token of `epoch` is still in place.
    pub fn set_user_if_current(&self, epoch: u64, user: UserIdentity) -> bool {
        let mut session = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if session.epoch != epoch || session.token.is_none() {
            return false;
        }
        session.user = Some(user);
        true
    }

    /// Clears the session only if it still holds the token of `epoch`.
    /// Returns whether a session was dropped.
    pub fn clear_if_current(&self, epoch: u64) -> bool {
        self.clear_matching(Some(epoch))
    }

    /// Drops token and user and removes the stored token. Returns whether
    /// there was anything to clear.
    pub fn clear(&self) -> bool {
        self.clear_matching(None)
    }

    fn clear_matching(&self, epoch: Option<u64>) -> bool {
        let mut session = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if epoch.is_some_and(|e| e != session.epoch) {
            return false;
        }
        if let Err(e) = self.storage.remove(&self.storage_key) {
            log::error!("Failed to remove stored session token: {}", e);
        }
        let had_session = session.token.is_some() || session.user.is_some();
        *session = Session {
            epoch: session.epoch + 1,
            ..Session::default()
        };
        had_session
    }
}
