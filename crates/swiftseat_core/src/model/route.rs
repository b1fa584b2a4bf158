//! Route domain model.
//!
//! # Responsibility
//! - Define the scheduled-trip record and its availability projection.
//!
//! # Invariants
//! - `bus_number` is globally unique (store-enforced).
//! - `total_seats > 0` and `price >= 0` (store-enforced).
//! - `RouteAvailability` is derived at read time and never persisted.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Store-assigned identifier for a route record.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type RouteId = i64;

/// A scheduled bus trip with fixed capacity and price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Store-assigned identity.
    pub id: RouteId,
    /// Operator-facing bus code, globally unique.
    pub bus_number: String,
    pub origin: String,
    pub destination: String,
    /// Departure at minute precision.
    pub departure_time: NaiveDateTime,
    /// Seat capacity of the vehicle. Always positive.
    pub total_seats: u32,
    /// Ticket price per seat. Never negative.
    pub price: f64,
}

/// Draft for a route that has not been persisted yet.
///
/// The store assigns the id at insert time; callers build this from
/// already-validated field values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRoute {
    pub bus_number: String,
    pub origin: String,
    pub destination: String,
    pub departure_time: NaiveDateTime,
    pub total_seats: u32,
    pub price: f64,
}

impl NewRoute {
    /// Builds the persisted record once the store has assigned an id.
    pub fn into_route(self, id: RouteId) -> Route {
        Route {
            id,
            bus_number: self.bus_number,
            origin: self.origin,
            destination: self.destination,
            departure_time: self.departure_time,
            total_seats: self.total_seats,
            price: self.price,
        }
    }
}

/// Read-time projection pairing a route with its remaining capacity.
///
/// `seats_available` is `total_seats` minus the sum of booked seats, floored
/// at zero. The floor is display protection only; the booking-time check is
/// the authoritative guard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteAvailability {
    pub route: Route,
    pub seats_available: u32,
}
