//! Owner workflow: hotels, then room types.

use tracing::{debug, info, warn};

use crate::api::ApiOutcome;
use crate::entities::{EntityId, Hotel, Role, RoomType};
use crate::scenario::{CountRange, Phase, ScenarioContext};
use crate::workflows::{credentials, record_skip};

/// Create one hotel for `owner_id`, authenticated with `token`.
pub async fn create_hotel(
    ctx: &mut ScenarioContext,
    owner_id: EntityId,
    token: &str,
) -> Option<EntityId> {
    let request = ctx.synth.hotel();

    let created = match ctx.api.create_hotel(token, &request).await {
        ApiOutcome::Success(created) => created,
        ApiOutcome::Failure { status, .. } => {
            debug!(owner_id, name = %request.name, status, "Hotel not created");
            return None;
        }
    };

    let hotel = Hotel {
        id: created.id,
        owner_id,
        name: request.name,
        city: request.city,
        country: request.country,
    };

    match ctx.registry.add(hotel) {
        Ok(stored) => {
            info!(
                id = stored.id,
                owner_id,
                name = %stored.name,
                city = %stored.city,
                "Hotel created"
            );
            Some(stored.id)
        }
        Err(e) => {
            warn!(owner_id, error = %e, "Hotel not recorded");
            None
        }
    }
}

/// Create a number of hotels drawn from `per_owner` for every registered owner.
pub async fn create_hotels(ctx: &mut ScenarioContext, per_owner: CountRange) -> usize {
    let owners = credentials(&ctx.registry, Role::Owner);
    if owners.is_empty() {
        info!("No owners registered, skipping hotel creation");
        record_skip(Phase::CreateHotels, "no_owners");
        return 0;
    }

    let mut created = 0;
    for (owner_id, token) in owners {
        let count = ctx.synth.count_in(per_owner);
        for _ in 0..count {
            if create_hotel(ctx, owner_id, &token).await.is_some() {
                created += 1;
            }
        }
    }
    created
}

/// Create one room type for `hotel_id`. Independent of its siblings.
pub async fn create_room_type(
    ctx: &mut ScenarioContext,
    hotel_id: EntityId,
    token: &str,
) -> Option<EntityId> {
    let request = ctx.synth.room_type(hotel_id);

    let created = match ctx.api.create_room_type(token, &request).await {
        ApiOutcome::Success(created) => created,
        ApiOutcome::Failure { status, .. } => {
            debug!(hotel_id, name = %request.name, status, "Room type not created");
            return None;
        }
    };

    let room_type = RoomType {
        id: created.id,
        hotel_id,
        name: request.name,
        price_per_night: request.price_per_night,
        room_count: request.room_count,
        amenities: request.amenities,
    };

    match ctx.registry.add(room_type) {
        Ok(stored) => {
            debug!(
                id = stored.id,
                hotel_id,
                name = %stored.name,
                price = stored.price_per_night,
                rooms = stored.room_count,
                "Room type created"
            );
            Some(stored.id)
        }
        Err(e) => {
            warn!(hotel_id, error = %e, "Room type not recorded");
            None
        }
    }
}

/// Create a number of room types drawn from `per_hotel` for every hotel in
/// the registry, each authenticated as the hotel's owner.
pub async fn create_room_types(ctx: &mut ScenarioContext, per_hotel: CountRange) -> usize {
    let hotels: Vec<(EntityId, Option<String>)> = ctx
        .registry
        .list::<Hotel>()
        .iter()
        .map(|hotel| {
            let token = ctx
                .registry
                .owner_of_hotel(hotel.id)
                .map(|owner| owner.access_token.clone());
            (hotel.id, token)
        })
        .collect();

    if hotels.is_empty() {
        info!("No hotels created, skipping room types");
        record_skip(Phase::CreateRoomTypes, "no_hotels");
        return 0;
    }

    let mut created = 0;
    for (hotel_id, token) in hotels {
        let Some(token) = token else {
            debug!(hotel_id, "Hotel owner unknown, skipping room types");
            record_skip(Phase::CreateRoomTypes, "owner_unknown");
            continue;
        };

        let count = ctx.synth.count_in(per_hotel);
        for _ in 0..count {
            if create_room_type(ctx, hotel_id, &token).await.is_some() {
                created += 1;
            }
        }
    }
    created
}
