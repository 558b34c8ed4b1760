pub mod guard;
pub mod router;
pub mod routes;

pub use guard::{evaluate, GuardDecision};
pub use router::{NavigationOutcome, Router};
pub use routes::{resolve, Location, RouteName, RouteRequirement, ENTRY_PATH};

/// Performs transitions requested outside the normal guarded flow, such as
/// the gateway sending the user back to the entry screen.
pub trait Navigator: Send + Sync {
    fn force_navigate(&self, path: &str);
}
