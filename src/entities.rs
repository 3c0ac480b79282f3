//! Entities created during a scenario run.
//!
//! Cross-entity references are plain identifiers assigned by the target API;
//! they are resolved through the [`EntityRegistry`](crate::registry::EntityRegistry).

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Identifier assigned by the target API.
pub type EntityId = i64;

/// Which side of the marketplace an actor plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Guest,
    Owner,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::Guest => "guest",
            Role::Owner => "owner",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A registered and logged-in identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub id: EntityId,
    pub email: String,
    pub password: String,
    pub access_token: String,
    pub display_name: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hotel {
    pub id: EntityId,
    pub owner_id: EntityId,
    pub name: String,
    pub city: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoomType {
    pub id: EntityId,
    pub hotel_id: EntityId,
    pub name: String,
    pub price_per_night: f64,
    pub room_count: u32,
    pub amenities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reservation {
    pub id: EntityId,
    pub user_id: EntityId,
    pub hotel_id: EntityId,
    pub room_type_id: EntityId,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub cancelled: bool,
}

impl Reservation {
    /// Length of stay in whole nights.
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }
}

/// Entity kinds, used for error messages and metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Actor,
    Hotel,
    RoomType,
    Reservation,
}

impl EntityKind {
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Actor => "actor",
            EntityKind::Hotel => "hotel",
            EntityKind::RoomType => "room_type",
            EntityKind::Reservation => "reservation",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
