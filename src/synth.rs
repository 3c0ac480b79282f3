//! Request payload synthesis.
//!
//! [`PayloadSynthesizer`] turns fake primitives and a seeded RNG into the
//! bodies the target API expects. Everything random about a payload (counts,
//! prices, amenity picks, stay dates) comes from the synthesizer's own RNG so
//! a run is replayable from its seed.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::api::{HotelRequest, RegistrationRequest, RoomTypeRequest, SearchFilter};
use crate::cities::{CityDataset, CityEntry};
use crate::entities::EntityId;
use crate::fake_data::FakeDataProvider;
use crate::scenario::CountRange;

/// Password used for every synthesized account.
pub const DEFAULT_PASSWORD: &str = "Password123!";

pub const HOTEL_AMENITIES: [&str; 12] = [
    "Free WiFi",
    "Swimming Pool",
    "Fitness Center",
    "Restaurant",
    "Bar/Lounge",
    "Room Service",
    "Conference Room",
    "Spa",
    "Parking",
    "Airport Shuttle",
    "Business Center",
    "Concierge",
];

pub const ROOM_TYPE_NAMES: [&str; 6] = [
    "Single",
    "Double",
    "Twin",
    "Suite",
    "Deluxe",
    "Presidential",
];

pub const ROOM_AMENITIES: [&str; 7] = [
    "WiFi",
    "TV",
    "Mini-bar",
    "Balcony",
    "Air conditioning",
    "Safe",
    "Coffee maker",
];

pub struct PayloadSynthesizer {
    fake: Box<dyn FakeDataProvider>,
    rng: StdRng,
    cities: CityDataset,
}

impl PayloadSynthesizer {
    pub fn new(fake: Box<dyn FakeDataProvider>, seed: u64, cities: CityDataset) -> Self {
        Self {
            fake,
            rng: StdRng::seed_from_u64(seed),
            cities,
        }
    }

    /// A value in `range`, inclusive.
    pub fn count_in(&mut self, range: CountRange) -> u32 {
        self.rng.gen_range(range.min..=range.max)
    }

    pub fn registration(&mut self) -> RegistrationRequest {
        RegistrationRequest {
            email: self.fake.email(),
            password: DEFAULT_PASSWORD.to_string(),
            first_name: self.fake.first_name(),
            last_name: self.fake.last_name(),
            phone_number: self.fake.phone_number(),
            profile_image: format!(
                "https://randomuser.me/api/portraits/men/{}.jpg",
                self.rng.gen_range(1..=99)
            ),
        }
    }

    /// A hotel located in one of the dataset's cities.
    pub fn hotel(&mut self) -> HotelRequest {
        let name = format!("{} Hotel", self.fake.company_name());
        let location = self
            .cities
            .entries()
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_else(|| CityEntry::new("New York", "United States"));
        let domain = sanitize_for_domain(&name);
        let amenity_count = self.rng.gen_range(3..=6);

        HotelRequest {
            address: self.fake.street_address(),
            star_rating: self.rng.gen_range(1..=5),
            description: format!(
                "A beautiful hotel in {}, {}",
                location.city, location.country
            ),
            website: format!("https://www.{}.com", domain),
            contact_email: format!("info@{}.com", domain),
            contact_phone: self.fake.phone_number(),
            amenities: self.sample(&HOTEL_AMENITIES, amenity_count),
            city: location.city,
            country: location.country,
            name,
        }
    }

    pub fn room_type(&mut self, hotel_id: EntityId) -> RoomTypeRequest {
        let name = ROOM_TYPE_NAMES
            .choose(&mut self.rng)
            .copied()
            .unwrap_or("Single")
            .to_string();
        let amenity_count = self.rng.gen_range(2..=5);
        let amenities = self.sample(&ROOM_AMENITIES, amenity_count);
        let price: f64 = self.rng.gen_range(50.0..=500.0);

        RoomTypeRequest {
            hotel_id,
            name,
            price_per_night: (price * 100.0).round() / 100.0,
            room_count: self.rng.gen_range(1..=10),
            amenities,
        }
    }

    /// Check-in 1 to 30 days after `now`, staying 1 to 7 nights.
    pub fn stay(&mut self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let check_in = now + Duration::days(self.rng.gen_range(1..=30));
        let check_out = check_in + Duration::days(self.rng.gen_range(1..=7));
        (check_in, check_out)
    }

    /// The four searches of the search phase. The city search uses the first
    /// city of the dataset.
    pub fn search_filters(&self) -> Vec<SearchFilter> {
        let city = self
            .cities
            .entries()
            .first()
            .map(|entry| entry.city.clone())
            .unwrap_or_else(|| "New York".to_string());

        vec![
            SearchFilter::Unfiltered,
            SearchFilter::City(city),
            SearchFilter::StarRating(5),
            SearchFilter::PriceBand { min: 100, max: 300 },
        ]
    }

    fn sample(&mut self, pool: &[&str], count: usize) -> Vec<String> {
        pool.choose_multiple(&mut self.rng, count)
            .map(|item| item.to_string())
            .collect()
    }
}

/// Lowercased alphanumerics of `name`, for website and contact email.
pub fn sanitize_for_domain(name: &str) -> String {
    name.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric())
        .collect()
}
