//! Scenario plan and per-run execution context.
//!
//! A run is eight [`Phase`]s executed in order against one
//! [`ScenarioContext`]. The context is created empty at the start of a run,
//! threaded by `&mut` through every workflow, and dropped when the run ends;
//! nothing about a run lives in globals except the Prometheus counters.
//!
//! # Example
//! ```
//! use hotel_sim::scenario::{CountRange, ScenarioPlan};
//!
//! let plan = ScenarioPlan {
//!     guests: 5,
//!     owners: 1,
//!     hotels_per_owner: "2".parse().unwrap(),
//!     room_types_per_hotel: CountRange::new(1, 4).unwrap(),
//! };
//! assert_eq!(plan.hotels_per_owner.max, 2);
//! ```

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::api::HotelApi;
use crate::registry::EntityRegistry;
use crate::selection::SelectionPolicy;
use crate::synth::PayloadSynthesizer;

/// Inclusive `min..=max` count, written `"1-3"` (or `"2"` for a fixed count).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountRange {
    pub min: u32,
    pub max: u32,
}

impl CountRange {
    pub fn new(min: u32, max: u32) -> Result<Self, String> {
        if min > max {
            return Err(format!("range minimum {} exceeds maximum {}", min, max));
        }
        Ok(Self { min, max })
    }

    pub fn fixed(count: u32) -> Self {
        Self {
            min: count,
            max: count,
        }
    }
}

impl FromStr for CountRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parse = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|_| format!("invalid count '{}' in range '{}'", part.trim(), s))
        };

        match s.split_once('-') {
            Some((min, max)) => Self::new(parse(min)?, parse(max)?),
            None => Ok(Self::fixed(parse(s)?)),
        }
    }
}

impl fmt::Display for CountRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}-{}", self.min, self.max)
        }
    }
}

/// How many actors and entities a run creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioPlan {
    pub guests: u32,
    pub owners: u32,
    pub hotels_per_owner: CountRange,
    pub room_types_per_hotel: CountRange,
}

impl Default for ScenarioPlan {
    fn default() -> Self {
        Self {
            guests: 3,
            owners: 2,
            hotels_per_owner: CountRange { min: 1, max: 2 },
            room_types_per_hotel: CountRange { min: 1, max: 3 },
        }
    }
}

/// The eight phases of a run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    RegisterGuests,
    RegisterOwners,
    CreateHotels,
    CreateRoomTypes,
    Search,
    Book,
    Review,
    Cancel,
}

impl Phase {
    pub fn all() -> [Phase; 8] {
        [
            Phase::RegisterGuests,
            Phase::RegisterOwners,
            Phase::CreateHotels,
            Phase::CreateRoomTypes,
            Phase::Search,
            Phase::Book,
            Phase::Review,
            Phase::Cancel,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Phase::RegisterGuests => "register_guests",
            Phase::RegisterOwners => "register_owners",
            Phase::CreateHotels => "create_hotels",
            Phase::CreateRoomTypes => "create_room_types",
            Phase::Search => "search",
            Phase::Book => "book",
            Phase::Review => "review",
            Phase::Cancel => "cancel",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Mutable state of one run.
pub struct ScenarioContext {
    /// Typed API client; owns the response log.
    pub api: HotelApi,

    /// Everything created so far.
    pub registry: EntityRegistry,

    /// Decides every "which one?" question.
    pub selection: Box<dyn SelectionPolicy>,

    /// Builds request payloads.
    pub synth: PayloadSynthesizer,
}

impl ScenarioContext {
    pub fn new(
        api: HotelApi,
        selection: Box<dyn SelectionPolicy>,
        synth: PayloadSynthesizer,
    ) -> Self {
        Self {
            api,
            registry: EntityRegistry::new(),
            selection,
            synth,
        }
    }
}
