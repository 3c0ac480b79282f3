//! Typed client for the hotel-booking API under test.
//!
//! Each endpoint returns an [`ApiOutcome`]: either the typed payload the
//! endpoint promises on its success status, or the status and raw body of
//! whatever came back instead. Every call is routed through the
//! [`ResponseObserver`], so the observer log has exactly one record per call.

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

use crate::entities::EntityId;
use crate::observer::ResponseObserver;
use crate::transport::{ApiRequest, Transport};

pub const REGISTER_PATH: &str = "/api/users/register";
pub const LOGIN_PATH: &str = "/api/users/login";
pub const HOTELS_PATH: &str = "/api/hotels";
pub const ROOM_TYPE_PATH: &str = "/api/hotels/owner/room-type";
pub const PUBLIC_HOTELS_PATH: &str = "/api/hotels/public";
pub const RESERVE_PATH: &str = "/api/hotels/public/reserve";
pub const OWNER_HOTELS_PATH: &str = "/api/hotels/owner";
pub const OWNER_RESERVATIONS_PATH: &str = "/api/hotels/owner/reservations";

/// Result of one typed API call.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiOutcome<T> {
    Success(T),
    Failure { status: u16, body: String },
}

// === Request payloads ===

#[derive(Debug, Clone, Serialize)]
pub struct RegistrationRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    #[serde(rename = "profileImage")]
    pub profile_image: String,
}

#[derive(Debug, Clone, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct HotelRequest {
    pub name: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub star_rating: u8,
    pub description: String,
    pub website: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub amenities: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomTypeRequest {
    pub hotel_id: EntityId,
    pub name: String,
    pub price_per_night: f64,
    pub room_count: u32,
    pub amenities: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReservationRequest {
    pub hotel_id: EntityId,
    pub room_type_id: EntityId,
    pub check_in_time: DateTime<Utc>,
    pub check_out_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
struct CancelRequest {
    reservation_id: EntityId,
    is_cancelled: &'static str,
}

/// Filters for the public hotel search.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchFilter {
    Unfiltered,
    City(String),
    StarRating(u8),
    PriceBand { min: u32, max: u32 },
}

impl SearchFilter {
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        match self {
            SearchFilter::Unfiltered => Vec::new(),
            SearchFilter::City(city) => vec![("city".to_string(), city.clone())],
            SearchFilter::StarRating(stars) => {
                vec![("star_rating".to_string(), stars.to_string())]
            }
            SearchFilter::PriceBand { min, max } => vec![
                ("price_min".to_string(), min.to_string()),
                ("price_max".to_string(), max.to_string()),
            ],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SearchFilter::Unfiltered => "unfiltered",
            SearchFilter::City(_) => "city",
            SearchFilter::StarRating(_) => "star_rating",
            SearchFilter::PriceBand { .. } => "price_band",
        }
    }
}

// === Response payloads ===

#[derive(Debug, Clone, Deserialize)]
pub struct RegisteredUser {
    #[serde(default)]
    pub id: Option<EntityId>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginUser {
    pub id: EntityId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "refreshToken", default)]
    pub refresh_token: Option<String>,
    pub user: LoginUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedHotel {
    pub id: EntityId,
}

#[derive(Debug, Clone, Deserialize)]
struct HotelCreatedResponse {
    hotel: CreatedHotel,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedRoomType {
    pub id: EntityId,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RoomTypeSummary {
    pub id: EntityId,
    #[serde(default)]
    pub name: Option<String>,
}

/// A hotel as returned by the public search, room types embedded.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchHotel {
    pub id: EntityId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "HotelRoomType", alias = "room_types", default)]
    pub room_types: Vec<RoomTypeSummary>,
}

#[derive(Debug, Clone, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hotels: Vec<SearchHotel>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OwnedHotel {
    pub id: EntityId,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReservationRecord {
    pub id: EntityId,
    #[serde(rename = "hotelId", alias = "hotel_id")]
    pub hotel_id: EntityId,
    #[serde(rename = "hotelRoomTypeId", alias = "room_type_id", default)]
    pub room_type_id: Option<EntityId>,
    #[serde(default)]
    pub is_cancelled: bool,
}

/// Typed API client; owns the observer so no call can bypass it.
pub struct HotelApi {
    transport: Arc<dyn Transport>,
    base_url: String,
    observer: ResponseObserver,
}

impl HotelApi {
    pub fn new(transport: Arc<dyn Transport>, base_url: &str) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            observer: ResponseObserver::new(),
        }
    }

    pub fn observer(&self) -> &ResponseObserver {
        &self.observer
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Number of calls issued so far.
    pub fn calls(&self) -> usize {
        self.observer.len()
    }

    fn request(&self, method: Method, path: &str) -> ApiRequest {
        ApiRequest::new(method, format!("{}{}", self.base_url, path))
    }

    /// Send, observe, and decode the body when the status is one of `expected`.
    async fn call<T: DeserializeOwned>(
        &mut self,
        request: ApiRequest,
        expected: &[u16],
    ) -> ApiOutcome<T> {
        let method = request.method.clone();
        let started = Instant::now();
        let response = self.transport.send(request).await;
        let response = self.observer.observe(&method, response, started.elapsed());

        if !expected.contains(&response.status_code) {
            return ApiOutcome::Failure {
                status: response.status_code,
                body: response.text,
            };
        }

        match serde_json::from_value::<T>(response.body) {
            Ok(value) => ApiOutcome::Success(value),
            Err(e) => ApiOutcome::Failure {
                status: response.status_code,
                body: format!("unexpected response body: {}", e),
            },
        }
    }

    /// A 201 is a success whatever its body; the user is decoded when the
    /// body carries one.
    pub async fn register(
        &mut self,
        profile: &RegistrationRequest,
    ) -> ApiOutcome<Option<RegisteredUser>> {
        let request = self
            .request(Method::POST, REGISTER_PATH)
            .json(serde_json::to_value(profile).unwrap_or_default());
        match self.call::<Value>(request, &[201]).await {
            ApiOutcome::Success(body) => {
                ApiOutcome::Success(serde_json::from_value::<RegisteredUser>(body).ok())
            }
            ApiOutcome::Failure { status, body } => ApiOutcome::Failure { status, body },
        }
    }

    pub async fn login(&mut self, email: &str, password: &str) -> ApiOutcome<LoginResponse> {
        let body = LoginRequest { email, password };
        let request = self
            .request(Method::POST, LOGIN_PATH)
            .json(serde_json::to_value(&body).unwrap_or_default());
        self.call(request, &[200]).await
    }

    pub async fn create_hotel(
        &mut self,
        token: &str,
        hotel: &HotelRequest,
    ) -> ApiOutcome<CreatedHotel> {
        let request = self
            .request(Method::POST, HOTELS_PATH)
            .bearer(token)
            .json(serde_json::to_value(hotel).unwrap_or_default());
        match self.call::<HotelCreatedResponse>(request, &[201]).await {
            ApiOutcome::Success(created) => ApiOutcome::Success(created.hotel),
            ApiOutcome::Failure { status, body } => ApiOutcome::Failure { status, body },
        }
    }

    pub async fn create_room_type(
        &mut self,
        token: &str,
        room_type: &RoomTypeRequest,
    ) -> ApiOutcome<CreatedRoomType> {
        let request = self
            .request(Method::POST, ROOM_TYPE_PATH)
            .bearer(token)
            .json(serde_json::to_value(room_type).unwrap_or_default());
        self.call(request, &[201]).await
    }

    pub async fn list_room_types(
        &mut self,
        token: &str,
        hotel_id: EntityId,
    ) -> ApiOutcome<Vec<RoomTypeSummary>> {
        let request = self
            .request(Method::GET, ROOM_TYPE_PATH)
            .bearer(token)
            .query("hotel_id", hotel_id);
        self.call(request, &[200]).await
    }

    pub async fn search_hotels(
        &mut self,
        token: &str,
        filter: &SearchFilter,
    ) -> ApiOutcome<Vec<SearchHotel>> {
        let mut request = self.request(Method::GET, PUBLIC_HOTELS_PATH).bearer(token);
        request.query = filter.query_pairs();
        match self.call::<SearchResponse>(request, &[200]).await {
            ApiOutcome::Success(found) => ApiOutcome::Success(found.hotels),
            ApiOutcome::Failure { status, body } => ApiOutcome::Failure { status, body },
        }
    }

    pub async fn owner_hotels(&mut self, token: &str) -> ApiOutcome<Vec<OwnedHotel>> {
        let request = self.request(Method::GET, OWNER_HOTELS_PATH).bearer(token);
        self.call(request, &[200]).await
    }

    pub async fn make_reservation(
        &mut self,
        token: &str,
        reservation: &ReservationRequest,
    ) -> ApiOutcome<ReservationRecord> {
        let request = self
            .request(Method::POST, RESERVE_PATH)
            .bearer(token)
            .json(serde_json::to_value(reservation).unwrap_or_default());
        self.call(request, &[201]).await
    }

    pub async fn user_reservations(&mut self, token: &str) -> ApiOutcome<Vec<ReservationRecord>> {
        let request = self.request(Method::GET, RESERVE_PATH).bearer(token);
        self.call(request, &[200]).await
    }

    pub async fn hotel_reservations(
        &mut self,
        token: &str,
        hotel_id: EntityId,
    ) -> ApiOutcome<Vec<ReservationRecord>> {
        let request = self
            .request(Method::GET, OWNER_RESERVATIONS_PATH)
            .bearer(token)
            .query("hotel_id", hotel_id);
        self.call(request, &[200]).await
    }

    /// Cancel as the hotel owner. 200 and 204 both count as done.
    pub async fn cancel_reservation(
        &mut self,
        token: &str,
        reservation_id: EntityId,
    ) -> ApiOutcome<()> {
        let body = CancelRequest {
            reservation_id,
            is_cancelled: "true",
        };
        let request = self
            .request(Method::PATCH, OWNER_RESERVATIONS_PATH)
            .bearer(token)
            .json(serde_json::to_value(&body).unwrap_or_default());
        match self.call::<IgnoredAny>(request, &[200, 204]).await {
            ApiOutcome::Success(_) => ApiOutcome::Success(()),
            ApiOutcome::Failure { status, body } => ApiOutcome::Failure { status, body },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_filter_queries() {
        assert!(SearchFilter::Unfiltered.query_pairs().is_empty());
        assert_eq!(
            SearchFilter::City("Miami".to_string()).query_pairs(),
            vec![("city".to_string(), "Miami".to_string())]
        );
        assert_eq!(
            SearchFilter::PriceBand { min: 100, max: 300 }.query_pairs(),
            vec![
                ("price_min".to_string(), "100".to_string()),
                ("price_max".to_string(), "300".to_string())
            ]
        );
    }

    #[test]
    fn test_login_response_shape() {
        let parsed: LoginResponse = serde_json::from_value(json!({
            "accessToken": "abc",
            "refreshToken": "def",
            "user": {"id": 12, "email": "a@b.c", "first_name": "A"}
        }))
        .unwrap();
        assert_eq!(parsed.access_token, "abc");
        assert_eq!(parsed.user.id, 12);
    }

    #[test]
    fn test_search_hotel_embeds_room_types() {
        let parsed: SearchResponse = serde_json::from_value(json!({
            "hotels": [
                {
                    "id": 1,
                    "name": "A",
                    "HotelRoomType": [{"id": 5, "name": "Suite", "price_per_night": "120.00"}]
                },
                {"id": 2, "name": "B"}
            ]
        }))
        .unwrap();
        assert_eq!(parsed.hotels.len(), 2);
        assert_eq!(parsed.hotels[0].room_types[0].id, 5);
        assert!(parsed.hotels[1].room_types.is_empty());
    }

    #[test]
    fn test_reservation_record_shape() {
        let parsed: ReservationRecord = serde_json::from_value(json!({
            "id": 9,
            "hotelId": 3,
            "hotelRoomTypeId": 4,
            "reserverId": 1,
            "is_cancelled": false
        }))
        .unwrap();
        assert_eq!(parsed.hotel_id, 3);
        assert_eq!(parsed.room_type_id, Some(4));
        assert!(!parsed.is_cancelled);
    }

    #[test]
    fn test_registration_payload_field_names() {
        let body = serde_json::to_value(RegistrationRequest {
            email: "x@example.com".to_string(),
            password: "pw".to_string(),
            first_name: "X".to_string(),
            last_name: "Y".to_string(),
            phone_number: "555".to_string(),
            profile_image: "https://randomuser.me/api/portraits/men/1.jpg".to_string(),
        })
        .unwrap();
        assert!(body.get("profileImage").is_some());
        assert!(body.get("profile_image").is_none());
    }
}
