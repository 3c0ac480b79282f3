//! Registration and login.

use tracing::{debug, info, warn};

use crate::api::ApiOutcome;
use crate::entities::{Actor, EntityId, Role};
use crate::scenario::ScenarioContext;

/// Register then log in one actor. The actor is stored only when both calls
/// succeed; any other outcome drops it from the rest of the run.
pub async fn register_actor(ctx: &mut ScenarioContext, role: Role) -> Option<EntityId> {
    let profile = ctx.synth.registration();

    if let ApiOutcome::Failure { status, .. } = ctx.api.register(&profile).await {
        debug!(role = %role, email = %profile.email, status, "Registration failed, dropping actor");
        return None;
    }

    let session = match ctx.api.login(&profile.email, &profile.password).await {
        ApiOutcome::Success(session) => session,
        ApiOutcome::Failure { status, .. } => {
            debug!(role = %role, email = %profile.email, status, "Login failed, dropping actor");
            return None;
        }
    };

    let actor = Actor {
        id: session.user.id,
        email: profile.email,
        password: profile.password,
        access_token: session.access_token,
        display_name: format!("{} {}", profile.first_name, profile.last_name),
        role,
    };

    match ctx.registry.add(actor) {
        Ok(stored) => {
            info!(role = %role, id = stored.id, name = %stored.display_name, "Actor ready");
            Some(stored.id)
        }
        Err(e) => {
            warn!(role = %role, error = %e, "Actor not recorded");
            None
        }
    }
}

/// Register `count` actors with `role`; returns how many made it into the
/// registry.
pub async fn register_actors(ctx: &mut ScenarioContext, role: Role, count: u32) -> usize {
    let mut ready = 0;
    for _ in 0..count {
        if register_actor(ctx, role).await.is_some() {
            ready += 1;
        }
    }
    ready
}
