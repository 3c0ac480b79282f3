//! In-memory stand-in for the hotel-booking API.
//!
//! Implements [`Transport`] with just enough server behavior for the
//! simulator's workflows: accounts with bearer tokens, owner-scoped hotels and
//! room types, reservations, and owner-only cancellation. Individual
//! endpoints can be forced to fail with a fixed status.

#![allow(dead_code)]

use async_trait::async_trait;
use reqwest::{Method, Url};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use hotel_sim::api::HotelApi;
use hotel_sim::cities::CityDataset;
use hotel_sim::fake_data::FakerProvider;
use hotel_sim::scenario::ScenarioContext;
use hotel_sim::selection::ScriptedSelection;
use hotel_sim::synth::PayloadSynthesizer;
use hotel_sim::transport::{ApiRequest, ApiResponse, Transport};

pub const BASE_URL: &str = "http://hotel-api.test";

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub bearer: Option<String>,
    pub body: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct FakeUser {
    pub id: i64,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct FakeHotel {
    pub id: i64,
    pub owner_id: Option<i64>,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct FakeRoomType {
    pub id: i64,
    pub hotel_id: i64,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct FakeReservation {
    pub id: i64,
    pub user_id: i64,
    pub hotel_id: i64,
    pub room_type_id: i64,
    pub cancelled: bool,
}

#[derive(Default)]
struct State {
    next_id: i64,
    users: Vec<FakeUser>,
    hotels: Vec<FakeHotel>,
    room_types: Vec<FakeRoomType>,
    reservations: Vec<FakeReservation>,
    forced: Vec<(Method, String, u16)>,
    alternating: Vec<(Method, String, u16)>,
    blank_bodies: Vec<(Method, String)>,
    calls: Vec<RecordedCall>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct FakeHotelApi {
    state: Mutex<State>,
}

pub fn token_for(user_id: i64) -> String {
    format!("tok-{}", user_id)
}

fn reply(status: u16, body: Value, path: &str) -> ApiResponse {
    ApiResponse::json(status, body, path.to_string())
}

impl FakeHotelApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answer every `method path` call with `status`.
    pub fn force_status(&self, method: Method, path: &str, status: u16) {
        self.state
            .lock()
            .unwrap()
            .forced
            .push((method, path.to_string(), status));
    }

    /// Answer every second `method path` call with `status`, starting with
    /// the second.
    pub fn fail_every_other(&self, method: Method, path: &str, status: u16) {
        self.state
            .lock()
            .unwrap()
            .alternating
            .push((method, path.to_string(), status));
    }

    /// Handle `method path` calls as usual but reply with an empty body.
    pub fn blank_body(&self, method: Method, path: &str) {
        self.state
            .lock()
            .unwrap()
            .blank_bodies
            .push((method, path.to_string()));
    }

    /// A hotel that exists on the server but was not created by the run.
    pub fn seed_hotel(&self, room_type_names: &[&str]) -> i64 {
        let mut state = self.state.lock().unwrap();
        let hotel_id = state.next_id();
        state.hotels.push(FakeHotel {
            id: hotel_id,
            owner_id: None,
            name: format!("Seeded {}", hotel_id),
        });
        for name in room_type_names {
            let id = state.next_id();
            state.room_types.push(FakeRoomType {
                id,
                hotel_id,
                name: name.to_string(),
            });
        }
        hotel_id
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn calls_to(&self, method: Method, path: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.method == method && call.path == path)
            .collect()
    }

    pub fn reservations(&self) -> Vec<FakeReservation> {
        self.state.lock().unwrap().reservations.clone()
    }

    pub fn hotels(&self) -> Vec<FakeHotel> {
        self.state.lock().unwrap().hotels.clone()
    }

    fn handle(state: &mut State, request: &ApiRequest, path: &str) -> ApiResponse {
        let method = request.method.clone();
        let body = request.json_body.clone().unwrap_or(Value::Null);
        let query = |key: &str| {
            request
                .query
                .iter()
                .find(|(k, _)| k == key)
                .and_then(|(_, v)| v.parse::<i64>().ok())
        };
        let caller = request
            .bearer
            .as_deref()
            .and_then(|token| token.strip_prefix("tok-"))
            .and_then(|id| id.parse::<i64>().ok())
            .filter(|id| state.users.iter().any(|user| user.id == *id));

        match (method.as_str(), path) {
            ("POST", "/api/users/register") => {
                let email = body["email"].as_str().unwrap_or_default().to_string();
                if state.users.iter().any(|user| user.email == email) {
                    return reply(409, json!({"error": "User already exists"}), path);
                }
                let id = state.next_id();
                state.users.push(FakeUser {
                    id,
                    email: email.clone(),
                    password: body["password"].as_str().unwrap_or_default().to_string(),
                });
                reply(201, json!({"id": id, "email": email}), path)
            }
            ("POST", "/api/users/login") => {
                let email = body["email"].as_str().unwrap_or_default();
                let password = body["password"].as_str().unwrap_or_default();
                match state
                    .users
                    .iter()
                    .find(|user| user.email == email && user.password == password)
                {
                    Some(user) => reply(
                        200,
                        json!({
                            "accessToken": token_for(user.id),
                            "refreshToken": format!("refresh-{}", user.id),
                            "user": {"id": user.id, "email": user.email}
                        }),
                        path,
                    ),
                    None => reply(401, json!({"error": "Invalid email or password"}), path),
                }
            }
            _ if caller.is_none() => reply(401, json!({"error": "Unauthorized"}), path),
            ("POST", "/api/hotels") => {
                let id = state.next_id();
                let name = body["name"].as_str().unwrap_or_default().to_string();
                state.hotels.push(FakeHotel {
                    id,
                    owner_id: caller,
                    name: name.clone(),
                });
                reply(
                    201,
                    json!({"message": "Hotel created", "hotel": {"id": id, "name": name}}),
                    path,
                )
            }
            ("POST", "/api/hotels/owner/room-type") => {
                let hotel_id = body["hotel_id"].as_i64().unwrap_or_default();
                match state.hotels.iter().find(|hotel| hotel.id == hotel_id) {
                    None => return reply(404, json!({"error": "Hotel not found"}), path),
                    Some(hotel) if hotel.owner_id != caller => {
                        return reply(403, json!({"error": "Forbidden"}), path)
                    }
                    Some(_) => {}
                }
                let id = state.next_id();
                let name = body["name"].as_str().unwrap_or_default().to_string();
                state.room_types.push(FakeRoomType {
                    id,
                    hotel_id,
                    name: name.clone(),
                });
                reply(201, json!({"id": id, "hotelId": hotel_id, "name": name}), path)
            }
            ("GET", "/api/hotels/owner/room-type") => {
                let hotel_id = query("hotel_id").unwrap_or_default();
                let list: Vec<Value> = state
                    .room_types
                    .iter()
                    .filter(|room| room.hotel_id == hotel_id)
                    .map(|room| json!({"id": room.id, "name": room.name}))
                    .collect();
                reply(200, Value::Array(list), path)
            }
            ("GET", "/api/hotels/public") => {
                let hotels: Vec<Value> = state
                    .hotels
                    .iter()
                    .map(|hotel| {
                        let rooms: Vec<Value> = state
                            .room_types
                            .iter()
                            .filter(|room| room.hotel_id == hotel.id)
                            .map(|room| json!({"id": room.id, "name": room.name}))
                            .collect();
                        json!({"id": hotel.id, "name": hotel.name, "HotelRoomType": rooms})
                    })
                    .collect();
                reply(200, json!({"hotels": hotels}), path)
            }
            ("POST", "/api/hotels/public/reserve") => {
                let hotel_id = body["hotel_id"].as_i64().unwrap_or_default();
                let room_type_id = body["room_type_id"].as_i64().unwrap_or_default();
                if !state
                    .room_types
                    .iter()
                    .any(|room| room.id == room_type_id && room.hotel_id == hotel_id)
                {
                    return reply(404, json!({"error": "Room type not found"}), path);
                }
                let id = state.next_id();
                let user_id = caller.unwrap_or_default();
                state.reservations.push(FakeReservation {
                    id,
                    user_id,
                    hotel_id,
                    room_type_id,
                    cancelled: false,
                });
                reply(
                    201,
                    json!({
                        "id": id,
                        "reserverId": user_id,
                        "hotelId": hotel_id,
                        "hotelRoomTypeId": room_type_id,
                        "is_cancelled": false
                    }),
                    path,
                )
            }
            ("GET", "/api/hotels/public/reserve") => {
                let list: Vec<Value> = state
                    .reservations
                    .iter()
                    .filter(|r| Some(r.user_id) == caller)
                    .map(reservation_json)
                    .collect();
                reply(200, Value::Array(list), path)
            }
            ("GET", "/api/hotels/owner") => {
                let list: Vec<Value> = state
                    .hotels
                    .iter()
                    .filter(|hotel| hotel.owner_id == caller)
                    .map(|hotel| json!({"id": hotel.id, "name": hotel.name}))
                    .collect();
                reply(200, Value::Array(list), path)
            }
            ("GET", "/api/hotels/owner/reservations") => {
                let hotel_id = query("hotel_id").unwrap_or_default();
                let list: Vec<Value> = state
                    .reservations
                    .iter()
                    .filter(|r| r.hotel_id == hotel_id)
                    .map(reservation_json)
                    .collect();
                reply(200, Value::Array(list), path)
            }
            ("PATCH", "/api/hotels/owner/reservations") => {
                let reservation_id = body["reservation_id"].as_i64().unwrap_or_default();
                let Some(idx) = state
                    .reservations
                    .iter()
                    .position(|r| r.id == reservation_id)
                else {
                    return reply(404, json!({"error": "Reservation not found"}), path);
                };
                let hotel_id = state.reservations[idx].hotel_id;
                let owns = state
                    .hotels
                    .iter()
                    .any(|hotel| hotel.id == hotel_id && hotel.owner_id == caller);
                if !owns {
                    return reply(403, json!({"error": "Forbidden"}), path);
                }
                state.reservations[idx].cancelled = true;
                reply(200, reservation_json(&state.reservations[idx]), path)
            }
            _ => reply(404, json!({"error": "Not found"}), path),
        }
    }
}

fn reservation_json(reservation: &FakeReservation) -> Value {
    json!({
        "id": reservation.id,
        "reserverId": reservation.user_id,
        "hotelId": reservation.hotel_id,
        "hotelRoomTypeId": reservation.room_type_id,
        "is_cancelled": reservation.cancelled
    })
}

#[async_trait]
impl Transport for FakeHotelApi {
    async fn send(&self, request: ApiRequest) -> ApiResponse {
        let path = Url::parse(&request.url)
            .map(|url| url.path().to_string())
            .unwrap_or_else(|_| request.url.clone());
        let request_path = request.path_and_query();

        let mut state = self.state.lock().unwrap();
        state.calls.push(RecordedCall {
            method: request.method.clone(),
            path: path.clone(),
            bearer: request.bearer.clone(),
            body: request.json_body.clone(),
        });

        let matches =
            |method: &Method, endpoint: &str| *method == request.method && endpoint == path;
        let nth_call = state
            .calls
            .iter()
            .filter(|call| matches(&call.method, &call.path))
            .count();
        let forced = state
            .forced
            .iter()
            .find(|(method, endpoint, _)| matches(method, endpoint))
            .or_else(|| {
                state
                    .alternating
                    .iter()
                    .find(|(method, endpoint, _)| matches(method, endpoint) && nth_call % 2 == 0)
            })
            .map(|(_, _, status)| *status);
        let blank = state
            .blank_bodies
            .iter()
            .any(|(method, endpoint)| matches(method, endpoint));

        let response = match forced {
            Some(status) => reply(status, json!({"error": "forced failure"}), &path),
            None => Self::handle(&mut state, &request, &path),
        };
        if blank {
            return ApiResponse::from_text(response.status_code, String::new(), request_path);
        }
        ApiResponse {
            request_path,
            ..response
        }
    }
}

/// Transport for which every call fails before reaching a server.
pub struct UnreachableTransport;

#[async_trait]
impl Transport for UnreachableTransport {
    async fn send(&self, request: ApiRequest) -> ApiResponse {
        ApiResponse::transport_failure(
            hotel_sim::errors::TransportFailure::Network,
            "connection refused".to_string(),
            request.path_and_query(),
        )
    }
}

/// A context over `transport` with scripted selection.
pub fn context(transport: Arc<dyn Transport>, picks: Vec<usize>) -> ScenarioContext {
    let api = HotelApi::new(transport, BASE_URL);
    let synth = PayloadSynthesizer::new(Box::new(FakerProvider::new(7)), 7, CityDataset::builtin());
    ScenarioContext::new(api, Box::new(ScriptedSelection::new(picks)), synth)
}
