//! Fake data for synthesized payloads.
//!
//! The simulator treats realistic values as an opaque supply behind
//! [`FakeDataProvider`]; [`FakerProvider`] is the default, built on the `fake`
//! crate and seeded so a run's payloads can be replayed.

use fake::faker::address::en::{BuildingNumber, StreetName};
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName};
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Supplies one realistic value per call.
pub trait FakeDataProvider: Send {
    fn email(&mut self) -> String;
    fn first_name(&mut self) -> String;
    fn last_name(&mut self) -> String;
    fn company_name(&mut self) -> String;
    fn street_address(&mut self) -> String;
    fn phone_number(&mut self) -> String;
}

pub struct FakerProvider {
    rng: StdRng,
}

impl FakerProvider {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl FakeDataProvider for FakerProvider {
    fn email(&mut self) -> String {
        SafeEmail().fake_with_rng(&mut self.rng)
    }

    fn first_name(&mut self) -> String {
        FirstName().fake_with_rng(&mut self.rng)
    }

    fn last_name(&mut self) -> String {
        LastName().fake_with_rng(&mut self.rng)
    }

    fn company_name(&mut self) -> String {
        CompanyName().fake_with_rng(&mut self.rng)
    }

    fn street_address(&mut self) -> String {
        let number: String = BuildingNumber().fake_with_rng(&mut self.rng);
        let street: String = StreetName().fake_with_rng(&mut self.rng);
        format!("{} {}", number, street)
    }

    fn phone_number(&mut self) -> String {
        PhoneNumber().fake_with_rng(&mut self.rng)
    }
}
