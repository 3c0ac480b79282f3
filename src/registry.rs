//! In-memory, run-scoped store of everything a scenario has created.
//!
//! The registry is typed per entity kind: `add::<Hotel>`, `find::<RoomType>`,
//! `list::<Actor>`. Every `add` checks the invariants of the entity being
//! inserted against what is already stored, so a registry can only ever hold
//! a consistent picture of the run. Foreign-key lookups are linear scans; a
//! run holds tens of entities.

use thiserror::Error;

use crate::entities::{Actor, EntityId, EntityKind, Hotel, Reservation, Role, RoomType};
use crate::metrics::ENTITIES_CREATED_TOTAL;

/// Reasons the registry refuses a mutation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("{kind} {id} is already registered")]
    DuplicateId { kind: EntityKind, id: EntityId },

    #[error("actor {0} has no access token")]
    MissingToken(EntityId),

    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: EntityId },

    #[error("actor {id} is not a {expected}")]
    WrongRole { id: EntityId, expected: Role },

    #[error("room type {id}: price per night must be positive (got {price})")]
    InvalidPrice { id: EntityId, price: f64 },

    #[error("room type {0}: room count must be at least 1")]
    InvalidRoomCount(EntityId),

    #[error("reservation {0}: check-out must be after check-in")]
    InvalidStay(EntityId),

    #[error("reservation {0} is already cancelled")]
    AlreadyCancelled(EntityId),

    #[error("actor {actor_id} does not own hotel {hotel_id}")]
    NotHotelOwner { actor_id: EntityId, hotel_id: EntityId },
}

/// Storage access and invariants for one entity kind.
pub trait Entity: Sized {
    const KIND: EntityKind;

    fn id(&self) -> EntityId;

    fn table(registry: &EntityRegistry) -> &Vec<Self>;

    fn table_mut(registry: &mut EntityRegistry) -> &mut Vec<Self>;

    /// Check this entity against the current registry contents.
    fn validate(&self, registry: &EntityRegistry) -> Result<(), RegistryError>;
}

/// Per-kind counts, logged at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistrySummary {
    pub guests: usize,
    pub owners: usize,
    pub hotels: usize,
    pub room_types: usize,
    pub reservations: usize,
    pub cancelled: usize,
}

#[derive(Debug, Default)]
pub struct EntityRegistry {
    actors: Vec<Actor>,
    hotels: Vec<Hotel>,
    room_types: Vec<RoomType>,
    reservations: Vec<Reservation>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and store an entity, returning the stored copy.
    pub fn add<E: Entity>(&mut self, entity: E) -> Result<&E, RegistryError> {
        if self.get::<E>(entity.id()).is_some() {
            return Err(RegistryError::DuplicateId {
                kind: E::KIND,
                id: entity.id(),
            });
        }
        entity.validate(self)?;

        ENTITIES_CREATED_TOTAL
            .with_label_values(&[E::KIND.label()])
            .inc();

        let table = E::table_mut(self);
        table.push(entity);
        Ok(&table[table.len() - 1])
    }

    /// First entity matching `predicate`.
    pub fn find<E: Entity>(&self, predicate: impl Fn(&E) -> bool) -> Option<&E> {
        E::table(self).iter().find(|entity| predicate(entity))
    }

    /// All entities of one kind in insertion order.
    pub fn list<E: Entity>(&self) -> &[E] {
        E::table(self)
    }

    pub fn get<E: Entity>(&self, id: EntityId) -> Option<&E> {
        self.find(|entity: &E| entity.id() == id)
    }

    pub fn actors_with_role(&self, role: Role) -> impl Iterator<Item = &Actor> {
        self.actors.iter().filter(move |actor| actor.role == role)
    }

    pub fn hotels_owned_by(&self, owner_id: EntityId) -> impl Iterator<Item = &Hotel> {
        self.hotels.iter().filter(move |hotel| hotel.owner_id == owner_id)
    }

    pub fn room_types_of(&self, hotel_id: EntityId) -> impl Iterator<Item = &RoomType> {
        self.room_types
            .iter()
            .filter(move |room_type| room_type.hotel_id == hotel_id)
    }

    pub fn reservations_of(&self, user_id: EntityId) -> impl Iterator<Item = &Reservation> {
        self.reservations
            .iter()
            .filter(move |reservation| reservation.user_id == user_id)
    }

    /// Owner actor of a hotel known to the registry.
    pub fn owner_of_hotel(&self, hotel_id: EntityId) -> Option<&Actor> {
        let hotel = self.get::<Hotel>(hotel_id)?;
        self.get::<Actor>(hotel.owner_id)
            .filter(|actor| actor.role == Role::Owner)
    }

    /// Flip a reservation to cancelled on behalf of `canceller_id`.
    ///
    /// The canceller must be the owner of the reservation's hotel; the flag
    /// moves from false to true once and never back.
    pub fn cancel_reservation(
        &mut self,
        reservation_id: EntityId,
        canceller_id: EntityId,
    ) -> Result<&Reservation, RegistryError> {
        let reservation = self
            .get::<Reservation>(reservation_id)
            .ok_or(RegistryError::NotFound {
                kind: EntityKind::Reservation,
                id: reservation_id,
            })?;
        if reservation.cancelled {
            return Err(RegistryError::AlreadyCancelled(reservation_id));
        }

        let canceller = self
            .get::<Actor>(canceller_id)
            .ok_or(RegistryError::NotFound {
                kind: EntityKind::Actor,
                id: canceller_id,
            })?;
        if canceller.role != Role::Owner {
            return Err(RegistryError::WrongRole {
                id: canceller_id,
                expected: Role::Owner,
            });
        }

        let hotel_id = reservation.hotel_id;
        let owns_hotel = self
            .get::<Hotel>(hotel_id)
            .map_or(false, |hotel| hotel.owner_id == canceller_id);
        if !owns_hotel {
            return Err(RegistryError::NotHotelOwner {
                actor_id: canceller_id,
                hotel_id,
            });
        }

        let idx = self
            .reservations
            .iter()
            .position(|r| r.id == reservation_id)
            .ok_or(RegistryError::NotFound {
                kind: EntityKind::Reservation,
                id: reservation_id,
            })?;
        self.reservations[idx].cancelled = true;
        Ok(&self.reservations[idx])
    }

    pub fn summary(&self) -> RegistrySummary {
        RegistrySummary {
            guests: self.actors_with_role(Role::Guest).count(),
            owners: self.actors_with_role(Role::Owner).count(),
            hotels: self.hotels.len(),
            room_types: self.room_types.len(),
            reservations: self.reservations.len(),
            cancelled: self.reservations.iter().filter(|r| r.cancelled).count(),
        }
    }
}

impl Entity for Actor {
    const KIND: EntityKind = EntityKind::Actor;

    fn id(&self) -> EntityId {
        self.id
    }

    fn table(registry: &EntityRegistry) -> &Vec<Self> {
        &registry.actors
    }

    fn table_mut(registry: &mut EntityRegistry) -> &mut Vec<Self> {
        &mut registry.actors
    }

    fn validate(&self, _registry: &EntityRegistry) -> Result<(), RegistryError> {
        if self.access_token.is_empty() {
            return Err(RegistryError::MissingToken(self.id));
        }
        Ok(())
    }
}

impl Entity for Hotel {
    const KIND: EntityKind = EntityKind::Hotel;

    fn id(&self) -> EntityId {
        self.id
    }

    fn table(registry: &EntityRegistry) -> &Vec<Self> {
        &registry.hotels
    }

    fn table_mut(registry: &mut EntityRegistry) -> &mut Vec<Self> {
        &mut registry.hotels
    }

    fn validate(&self, registry: &EntityRegistry) -> Result<(), RegistryError> {
        let owner = registry
            .get::<Actor>(self.owner_id)
            .ok_or(RegistryError::NotFound {
                kind: EntityKind::Actor,
                id: self.owner_id,
            })?;
        if owner.role != Role::Owner {
            return Err(RegistryError::WrongRole {
                id: owner.id,
                expected: Role::Owner,
            });
        }
        Ok(())
    }
}

impl Entity for RoomType {
    const KIND: EntityKind = EntityKind::RoomType;

    fn id(&self) -> EntityId {
        self.id
    }

    fn table(registry: &EntityRegistry) -> &Vec<Self> {
        &registry.room_types
    }

    fn table_mut(registry: &mut EntityRegistry) -> &mut Vec<Self> {
        &mut registry.room_types
    }

    fn validate(&self, registry: &EntityRegistry) -> Result<(), RegistryError> {
        if !(self.price_per_night > 0.0) {
            return Err(RegistryError::InvalidPrice {
                id: self.id,
                price: self.price_per_night,
            });
        }
        if self.room_count < 1 {
            return Err(RegistryError::InvalidRoomCount(self.id));
        }
        if registry.get::<Hotel>(self.hotel_id).is_none() {
            return Err(RegistryError::NotFound {
                kind: EntityKind::Hotel,
                id: self.hotel_id,
            });
        }
        Ok(())
    }
}

impl Entity for Reservation {
    const KIND: EntityKind = EntityKind::Reservation;

    fn id(&self) -> EntityId {
        self.id
    }

    fn table(registry: &EntityRegistry) -> &Vec<Self> {
        &registry.reservations
    }

    fn table_mut(registry: &mut EntityRegistry) -> &mut Vec<Self> {
        &mut registry.reservations
    }

    // The hotel may predate this run (search returns every hotel on the
    // server), so only the booking guest is required to be known.
    fn validate(&self, registry: &EntityRegistry) -> Result<(), RegistryError> {
        if self.check_out <= self.check_in {
            return Err(RegistryError::InvalidStay(self.id));
        }
        let guest = registry
            .get::<Actor>(self.user_id)
            .ok_or(RegistryError::NotFound {
                kind: EntityKind::Actor,
                id: self.user_id,
            })?;
        if guest.role != Role::Guest {
            return Err(RegistryError::WrongRole {
                id: guest.id,
                expected: Role::Guest,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn actor(id: EntityId, role: Role) -> Actor {
        Actor {
            id,
            email: format!("actor{}@example.com", id),
            password: "Password123!".to_string(),
            access_token: format!("tok-{}", id),
            display_name: format!("Actor {}", id),
            role,
        }
    }

    fn hotel(id: EntityId, owner_id: EntityId) -> Hotel {
        Hotel {
            id,
            owner_id,
            name: format!("Hotel {}", id),
            city: "Toronto".to_string(),
            country: "Canada".to_string(),
        }
    }

    fn room_type(id: EntityId, hotel_id: EntityId) -> RoomType {
        RoomType {
            id,
            hotel_id,
            name: "Double".to_string(),
            price_per_night: 120.5,
            room_count: 4,
            amenities: vec!["WiFi".to_string()],
        }
    }

    fn reservation(id: EntityId, user_id: EntityId, hotel_id: EntityId) -> Reservation {
        let check_in = Utc::now() + Duration::days(3);
        Reservation {
            id,
            user_id,
            hotel_id,
            room_type_id: 1,
            check_in,
            check_out: check_in + Duration::days(2),
            cancelled: false,
        }
    }

    fn populated() -> EntityRegistry {
        let mut registry = EntityRegistry::new();
        registry.add(actor(1, Role::Guest)).unwrap();
        registry.add(actor(2, Role::Owner)).unwrap();
        registry.add(actor(3, Role::Owner)).unwrap();
        registry.add(hotel(10, 2)).unwrap();
        registry.add(hotel(11, 3)).unwrap();
        registry.add(room_type(100, 10)).unwrap();
        registry.add(reservation(1000, 1, 10)).unwrap();
        registry.add(reservation(1001, 1, 11)).unwrap();
        registry
    }

    #[test]
    fn test_add_find_list() {
        let registry = populated();

        assert_eq!(registry.list::<Actor>().len(), 3);
        assert_eq!(registry.list::<Hotel>().len(), 2);
        assert_eq!(
            registry.find::<Hotel>(|h| h.owner_id == 3).map(|h| h.id),
            Some(11)
        );
        assert!(registry.find::<RoomType>(|r| r.hotel_id == 11).is_none());
    }

    #[test]
    fn test_add_returns_stored_entity() {
        let mut registry = EntityRegistry::new();
        let stored = registry.add(actor(7, Role::Owner)).unwrap();
        assert_eq!(stored.id, 7);
        assert_eq!(stored.role, Role::Owner);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut registry = populated();
        let err = registry.add(actor(2, Role::Owner)).unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateId {
                kind: EntityKind::Actor,
                id: 2
            }
        );
    }

    #[test]
    fn test_actor_without_token_rejected() {
        let mut registry = EntityRegistry::new();
        let mut tokenless = actor(1, Role::Guest);
        tokenless.access_token.clear();
        assert_eq!(
            registry.add(tokenless).unwrap_err(),
            RegistryError::MissingToken(1)
        );
        assert!(registry.list::<Actor>().is_empty());
    }

    #[test]
    fn test_hotel_requires_owner() {
        let mut registry = populated();
        assert!(matches!(
            registry.add(hotel(12, 1)),
            Err(RegistryError::WrongRole { id: 1, .. })
        ));
        assert!(matches!(
            registry.add(hotel(12, 99)),
            Err(RegistryError::NotFound { .. })
        ));
    }

    #[test]
    fn test_room_type_invariants() {
        let mut registry = populated();

        let mut free = room_type(101, 10);
        free.price_per_night = 0.0;
        assert!(matches!(
            registry.add(free),
            Err(RegistryError::InvalidPrice { .. })
        ));

        let mut empty = room_type(102, 10);
        empty.room_count = 0;
        assert_eq!(
            registry.add(empty).unwrap_err(),
            RegistryError::InvalidRoomCount(102)
        );

        assert!(matches!(
            registry.add(room_type(103, 999)),
            Err(RegistryError::NotFound { .. })
        ));
    }

    #[test]
    fn test_reservation_requires_forward_stay() {
        let mut registry = populated();
        let mut backwards = reservation(1002, 1, 10);
        backwards.check_out = backwards.check_in;
        assert_eq!(
            registry.add(backwards).unwrap_err(),
            RegistryError::InvalidStay(1002)
        );
    }

    #[test]
    fn test_reservation_for_unknown_hotel_allowed() {
        let mut registry = populated();
        assert!(registry.add(reservation(1003, 1, 4242)).is_ok());
    }

    #[test]
    fn test_owner_cancels_once() {
        let mut registry = populated();

        let cancelled = registry.cancel_reservation(1000, 2).unwrap();
        assert!(cancelled.cancelled);

        assert_eq!(
            registry.cancel_reservation(1000, 2).unwrap_err(),
            RegistryError::AlreadyCancelled(1000)
        );

        let other = registry.get::<Reservation>(1001).unwrap();
        assert!(!other.cancelled);
    }

    #[test]
    fn test_guest_cannot_cancel() {
        let mut registry = populated();
        assert!(matches!(
            registry.cancel_reservation(1000, 1),
            Err(RegistryError::WrongRole { id: 1, .. })
        ));
        assert!(!registry.get::<Reservation>(1000).unwrap().cancelled);
    }

    #[test]
    fn test_other_owner_cannot_cancel() {
        let mut registry = populated();
        assert_eq!(
            registry.cancel_reservation(1000, 3).unwrap_err(),
            RegistryError::NotHotelOwner {
                actor_id: 3,
                hotel_id: 10
            }
        );
    }

    #[test]
    fn test_foreign_key_scans() {
        let registry = populated();
        assert_eq!(registry.hotels_owned_by(2).count(), 1);
        assert_eq!(registry.room_types_of(10).count(), 1);
        assert_eq!(registry.reservations_of(1).count(), 2);
        assert_eq!(registry.owner_of_hotel(11).map(|a| a.id), Some(3));
        assert!(registry.owner_of_hotel(4242).is_none());
    }

    #[test]
    fn test_summary() {
        let mut registry = populated();
        registry.cancel_reservation(1001, 3).unwrap();

        let summary = registry.summary();
        assert_eq!(summary.guests, 1);
        assert_eq!(summary.owners, 2);
        assert_eq!(summary.hotels, 2);
        assert_eq!(summary.room_types, 1);
        assert_eq!(summary.reservations, 2);
        assert_eq!(summary.cancelled, 1);
    }
}
