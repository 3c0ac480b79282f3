//! Owner-side cancellation of a guest's reservation.
//!
//! Guests cannot cancel. The workflow picks a guest, picks one of their
//! reservations as the server lists them, finds the owner of its hotel by
//! asking each owner for their hotels, and cancels as that owner.

use tracing::{debug, info, warn};

use crate::api::{ApiOutcome, ReservationRecord};
use crate::entities::{EntityId, Role};
use crate::scenario::{Phase, ScenarioContext};
use crate::selection::choose;
use crate::workflows::{credentials, record_skip};

#[derive(Debug, Clone, PartialEq)]
pub enum CancellationOutcome {
    Cancelled {
        reservation_id: EntityId,
        owner_id: EntityId,
    },
    NoCandidates,
    ListingFailed { status: u16 },
    NoReservations { guest_id: EntityId },
    OwnerNotFound { reservation_id: EntityId, hotel_id: EntityId },
    Rejected { reservation_id: EntityId, status: u16 },
}

/// Cancel one reservation, if any guest holds one.
pub async fn cancel_one(ctx: &mut ScenarioContext) -> CancellationOutcome {
    let guests: Vec<(EntityId, String)> = credentials(&ctx.registry, Role::Guest)
        .into_iter()
        .filter(|(guest_id, _)| {
            ctx.registry
                .reservations_of(*guest_id)
                .any(|reservation| !reservation.cancelled)
        })
        .collect();

    let Some((guest_id, guest_token)) = choose(ctx.selection.as_mut(), &guests).cloned() else {
        info!("No guest holds a reservation, skipping cancellation");
        record_skip(Phase::Cancel, "no_reservations");
        return CancellationOutcome::NoCandidates;
    };

    let listed: Vec<ReservationRecord> = match ctx.api.user_reservations(&guest_token).await {
        ApiOutcome::Success(listed) => listed
            .into_iter()
            .filter(|reservation| !reservation.is_cancelled)
            .collect(),
        ApiOutcome::Failure { status, .. } => {
            debug!(guest_id, status, "Guest reservations unavailable, skipping cancellation");
            record_skip(Phase::Cancel, "listing_failed");
            return CancellationOutcome::ListingFailed { status };
        }
    };

    let Some(target) = choose(ctx.selection.as_mut(), &listed).cloned() else {
        info!(guest_id, "Guest has no open reservations, skipping cancellation");
        record_skip(Phase::Cancel, "no_open_reservations");
        return CancellationOutcome::NoReservations { guest_id };
    };

    let Some((owner_id, owner_token)) = resolve_owner(ctx, target.hotel_id).await else {
        info!(
            reservation_id = target.id,
            hotel_id = target.hotel_id,
            "No owner found for hotel, skipping cancellation"
        );
        record_skip(Phase::Cancel, "owner_not_found");
        return CancellationOutcome::OwnerNotFound {
            reservation_id: target.id,
            hotel_id: target.hotel_id,
        };
    };

    if let ApiOutcome::Failure { status, .. } =
        ctx.api.cancel_reservation(&owner_token, target.id).await
    {
        debug!(reservation_id = target.id, owner_id, status, "Cancellation rejected");
        return CancellationOutcome::Rejected {
            reservation_id: target.id,
            status,
        };
    }

    match ctx.registry.cancel_reservation(target.id, owner_id) {
        Ok(_) => info!(reservation_id = target.id, guest_id, owner_id, "Reservation cancelled"),
        Err(e) => warn!(
            reservation_id = target.id,
            error = %e,
            "Cancelled on the server but not in the registry"
        ),
    }

    CancellationOutcome::Cancelled {
        reservation_id: target.id,
        owner_id,
    }
}

/// First owner whose hotel list contains `hotel_id`.
async fn resolve_owner(
    ctx: &mut ScenarioContext,
    hotel_id: EntityId,
) -> Option<(EntityId, String)> {
    for (owner_id, token) in credentials(&ctx.registry, Role::Owner) {
        if let ApiOutcome::Success(hotels) = ctx.api.owner_hotels(&token).await {
            if hotels.iter().any(|hotel| hotel.id == hotel_id) {
                return Some((owner_id, token));
            }
        }
    }
    None
}
