use crate::{
    auth::SessionSnapshot,
    models::domain::UserRole,
    routing::routes::{RouteDefinition, ENTRY_PATH},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    RedirectTo(&'static str),
}

fn landing_for(role: Option<UserRole>) -> &'static str {
    role.unwrap_or(UserRole::User).landing_path()
}

/// Decides whether `target` may render for `session`. The first matching
/// rule wins; the session is never touched.
pub fn evaluate(target: &RouteDefinition, session: &SessionSnapshot) -> GuardDecision {
    let requirement = target.requirement;

    if requirement.requires_auth {
        if !session.is_authenticated {
            return GuardDecision::RedirectTo(ENTRY_PATH);
        }

        if let Some(required) = requirement.role {
            if session.role != Some(required) {
                return GuardDecision::RedirectTo(landing_for(session.role));
            }
        }
    }

    if target.is_entry() && session.is_authenticated {
        return GuardDecision::RedirectTo(landing_for(session.role));
    }

    GuardDecision::Allow
}
