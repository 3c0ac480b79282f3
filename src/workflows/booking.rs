//! Guest booking.
//!
//! The candidate pool is refreshed with one unfiltered search, then every
//! guest draws one hotel. A hotel without room types ends that guest's turn:
//! there is no re-pick.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::api::{ApiOutcome, ReservationRequest, SearchFilter, SearchHotel};
use crate::entities::{EntityId, Reservation, Role};
use crate::scenario::{Phase, ScenarioContext};
use crate::selection::choose;
use crate::workflows::{credentials, record_skip};

/// What happened to one guest's booking attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum BookingOutcome {
    Booked { guest_id: EntityId, reservation_id: EntityId },
    NoRoomTypes { guest_id: EntityId, hotel_id: EntityId },
    Failed { guest_id: EntityId, status: u16 },
    NotRecorded { guest_id: EntityId },
}

/// Book one stay per registered guest.
pub async fn book_for_guests(ctx: &mut ScenarioContext) -> Vec<BookingOutcome> {
    let guests = credentials(&ctx.registry, Role::Guest);
    // Candidates are searched as the first guest.
    let Some((_, search_token)) = guests.first().cloned() else {
        info!("No registered guests, skipping bookings");
        record_skip(Phase::Book, "no_guests");
        return Vec::new();
    };

    let candidates = match ctx
        .api
        .search_hotels(&search_token, &SearchFilter::Unfiltered)
        .await
    {
        ApiOutcome::Success(hotels) => hotels,
        ApiOutcome::Failure { status, .. } => {
            info!(status, "Candidate search failed, skipping bookings");
            record_skip(Phase::Book, "search_failed");
            return Vec::new();
        }
    };

    if candidates.is_empty() {
        info!("Search returned no hotels, skipping bookings");
        record_skip(Phase::Book, "no_hotels");
        return Vec::new();
    }

    let mut outcomes = Vec::new();
    for (guest_id, token) in guests {
        if let Some(outcome) = book_one(ctx, guest_id, &token, &candidates).await {
            outcomes.push(outcome);
        }
    }
    outcomes
}

/// Draw a hotel and a room type for one guest and reserve it.
pub async fn book_one(
    ctx: &mut ScenarioContext,
    guest_id: EntityId,
    token: &str,
    candidates: &[SearchHotel],
) -> Option<BookingOutcome> {
    let hotel = choose(ctx.selection.as_mut(), candidates)?;

    let Some(room_type) = choose(ctx.selection.as_mut(), &hotel.room_types) else {
        info!(guest_id, hotel_id = hotel.id, "Hotel has no room types, skipping booking");
        record_skip(Phase::Book, "no_room_types");
        return Some(BookingOutcome::NoRoomTypes {
            guest_id,
            hotel_id: hotel.id,
        });
    };

    let (check_in, check_out) = ctx.synth.stay(Utc::now());
    let request = ReservationRequest {
        hotel_id: hotel.id,
        room_type_id: room_type.id,
        check_in_time: check_in,
        check_out_time: check_out,
    };

    let record = match ctx.api.make_reservation(token, &request).await {
        ApiOutcome::Success(record) => record,
        ApiOutcome::Failure { status, .. } => {
            debug!(guest_id, hotel_id = hotel.id, status, "Reservation not created");
            return Some(BookingOutcome::Failed { guest_id, status });
        }
    };

    let reservation = Reservation {
        id: record.id,
        user_id: guest_id,
        hotel_id: request.hotel_id,
        room_type_id: request.room_type_id,
        check_in,
        check_out,
        cancelled: false,
    };

    match ctx.registry.add(reservation) {
        Ok(stored) => {
            info!(
                id = stored.id,
                guest_id,
                hotel_id = stored.hotel_id,
                room_type_id = stored.room_type_id,
                nights = stored.nights(),
                "Reservation created"
            );
            Some(BookingOutcome::Booked {
                guest_id,
                reservation_id: stored.id,
            })
        }
        Err(e) => {
            warn!(guest_id, error = %e, "Reservation not recorded");
            Some(BookingOutcome::NotRecorded { guest_id })
        }
    }
}
