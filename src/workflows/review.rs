//! Read-only review of what the run created.

use serde::Serialize;
use tracing::{debug, info};

use crate::api::ApiOutcome;
use crate::entities::Role;
use crate::scenario::ScenarioContext;
use crate::workflows::credentials;

/// Successful listings made during review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReviewSummary {
    pub guest_reservation_lists: usize,
    pub owner_hotel_lists: usize,
    pub hotel_reservation_lists: usize,
    pub room_type_lists: usize,
}

/// Guests list their reservations; owners list their hotels, then each
/// hotel's reservations and room types.
pub async fn review(ctx: &mut ScenarioContext) -> ReviewSummary {
    let mut summary = ReviewSummary::default();

    for (guest_id, token) in credentials(&ctx.registry, Role::Guest) {
        if let ApiOutcome::Success(reservations) = ctx.api.user_reservations(&token).await {
            info!(guest_id, count = reservations.len(), "Guest reservations");
            summary.guest_reservation_lists += 1;
        }
    }

    for (owner_id, token) in credentials(&ctx.registry, Role::Owner) {
        let hotels = match ctx.api.owner_hotels(&token).await {
            ApiOutcome::Success(hotels) => hotels,
            ApiOutcome::Failure { status, .. } => {
                debug!(owner_id, status, "Owner hotels unavailable, skipping their review");
                continue;
            }
        };
        summary.owner_hotel_lists += 1;
        info!(owner_id, count = hotels.len(), "Owner hotels");

        for hotel in hotels {
            if let ApiOutcome::Success(reservations) =
                ctx.api.hotel_reservations(&token, hotel.id).await
            {
                info!(
                    owner_id,
                    hotel_id = hotel.id,
                    count = reservations.len(),
                    "Hotel reservations"
                );
                summary.hotel_reservation_lists += 1;
            }

            if let ApiOutcome::Success(room_types) =
                ctx.api.list_room_types(&token, hotel.id).await
            {
                debug!(
                    owner_id,
                    hotel_id = hotel.id,
                    count = room_types.len(),
                    "Hotel room types"
                );
                summary.room_type_lists += 1;
            }
        }
    }

    summary
}
