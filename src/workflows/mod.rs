//! Actor workflows.
//!
//! Each workflow is a sequence of dependent API calls driven from the
//! [`ScenarioContext`](crate::scenario::ScenarioContext). A step runs only if
//! its prerequisite succeeded; a failed step halts that unit of work without
//! retrying, and the run moves on.

pub mod accounts;
pub mod booking;
pub mod cancellation;
pub mod hotel_setup;
pub mod review;
pub mod search;

use crate::entities::{EntityId, Role};
use crate::metrics::WORKFLOW_SKIPS_TOTAL;
use crate::registry::EntityRegistry;
use crate::scenario::Phase;

/// Count a unit of work skipped for lack of a prerequisite or candidate.
pub(crate) fn record_skip(phase: Phase, reason: &str) {
    WORKFLOW_SKIPS_TOTAL
        .with_label_values(&[phase.label(), reason])
        .inc();
}

/// `(id, token)` of every actor with `role`, in registration order.
pub(crate) fn credentials(registry: &EntityRegistry, role: Role) -> Vec<(EntityId, String)> {
    registry
        .actors_with_role(role)
        .map(|actor| (actor.id, actor.access_token.clone()))
        .collect()
}

/// The actor public searches run as: the first guest, else the first owner.
pub fn search_identity(registry: &EntityRegistry) -> Option<(EntityId, String)> {
    registry
        .actors_with_role(Role::Guest)
        .next()
        .or_else(|| registry.actors_with_role(Role::Owner).next())
        .map(|actor| (actor.id, actor.access_token.clone()))
}
