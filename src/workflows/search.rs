//! Public hotel search.

use tracing::{info, warn};

use crate::api::ApiOutcome;
use crate::scenario::{Phase, ScenarioContext};
use crate::workflows::{record_skip, search_identity};

/// Run the four standard searches; returns how many succeeded.
pub async fn run_searches(ctx: &mut ScenarioContext) -> usize {
    let Some((actor_id, token)) = search_identity(&ctx.registry) else {
        warn!("No authenticated actor available, skipping hotel search");
        record_skip(Phase::Search, "no_authenticated_actor");
        return 0;
    };

    let mut succeeded = 0;
    for filter in ctx.synth.search_filters() {
        match ctx.api.search_hotels(&token, &filter).await {
            ApiOutcome::Success(hotels) => {
                info!(
                    actor_id,
                    filter = filter.label(),
                    found = hotels.len(),
                    "Hotel search"
                );
                succeeded += 1;
            }
            ApiOutcome::Failure { status, .. } => {
                info!(actor_id, filter = filter.label(), status, "Hotel search failed");
            }
        }
    }
    succeeded
}
