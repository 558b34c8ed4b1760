use std::sync::{PoisonError, RwLock};

use serde::Serialize;

use crate::{
    auth::SessionHandle,
    errors::{AppError, AppResult},
    routing::{
        guard::{evaluate, GuardDecision},
        routes::{resolve, Location},
        Navigator,
    },
};

const MAX_REDIRECTS: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NavigationOutcome {
    pub requested: String,
    pub location: Location,
    pub redirected: bool,
}

/// Applies route redirects and the navigation guard, then commits the
/// resulting location.
pub struct Router {
    session: SessionHandle,
    current: RwLock<Option<Location>>,
}

impl Router {
    pub fn new(session: SessionHandle) -> Self {
        Self {
            session,
            current: RwLock::new(None),
        }
    }

    pub fn current(&self) -> Option<Location> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Resolves where a navigation to `path` ends up without committing it.
    pub fn plan(&self, path: &str) -> AppResult<NavigationOutcome> {
        let session = self.session.snapshot();
        let mut location = resolve(path);
        let mut hops = 0;

        loop {
            let definition = location.definition();
            let next = match definition.redirect {
                Some(target) => Some(target),
                None => match evaluate(definition, &session) {
                    GuardDecision::Allow => None,
                    GuardDecision::RedirectTo(target) => Some(target),
                },
            };

            let Some(target) = next else {
                break;
            };

            hops += 1;
            if hops > MAX_REDIRECTS {
                return Err(AppError::InvalidState(format!(
                    "Redirect loop while navigating to {}",
                    path
                )));
            }
            log::debug!("Redirecting {} -> {}", location.path, target);
            location = resolve(target);
        }

        Ok(NavigationOutcome {
            requested: path.to_string(),
            location,
            redirected: hops > 0,
        })
    }

    pub fn navigate(&self, path: &str) -> AppResult<NavigationOutcome> {
        let outcome = self.plan(path)?;
        *self.current.write().unwrap_or_else(PoisonError::into_inner) =
            Some(outcome.location.clone());
        log::info!("Navigated to {}", outcome.location.path);
        Ok(outcome)
    }
}

impl Navigator for Router {
    fn force_navigate(&self, path: &str) {
        let location = resolve(path);
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if current.as_ref().map(|l| l.path.as_str()) == Some(location.path.as_str()) {
            return;
        }
        log::warn!("Forced navigation to {}", location.path);
        *current = Some(location);
    }
}
