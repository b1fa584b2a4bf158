//! Booking domain model.
//!
//! # Invariants
//! - `route_id` references an existing route (store-enforced foreign key).
//! - `seats_booked > 0` (store-enforced).
//! - Bookings are append-only; there is no update or cancel lifecycle.

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use super::route::RouteId;

/// Store-assigned identifier for a booking record.
pub type BookingId = i64;

/// A reservation of one or more seats on a route for a named passenger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    /// Store-assigned identity.
    pub id: BookingId,
    pub route_id: RouteId,
    pub passenger_name: String,
    /// Phone-like contact string, validated before it reaches the core.
    pub passenger_contact: String,
    /// Seats reserved by this booking. Always positive.
    pub seats_booked: u32,
    /// Reservation time at minute precision.
    pub booked_at: NaiveDateTime,
}

/// Draft for a booking that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBooking {
    pub route_id: RouteId,
    pub passenger_name: String,
    pub passenger_contact: String,
    pub seats_booked: u32,
    pub booked_at: NaiveDateTime,
}

impl NewBooking {
    /// Creates a draft timestamped with the current local time.
    ///
    /// The timestamp is floored to the minute so the in-memory value matches
    /// what the store persists.
    pub fn new(
        route_id: RouteId,
        passenger_name: impl Into<String>,
        passenger_contact: impl Into<String>,
        seats_booked: u32,
    ) -> Self {
        Self::booked_at(
            route_id,
            passenger_name,
            passenger_contact,
            seats_booked,
            chrono::Local::now().naive_local(),
        )
    }

    /// Creates a draft with a caller-provided reservation time.
    ///
    /// Used by import paths and tests where the timestamp already exists.
    pub fn booked_at(
        route_id: RouteId,
        passenger_name: impl Into<String>,
        passenger_contact: impl Into<String>,
        seats_booked: u32,
        booked_at: NaiveDateTime,
    ) -> Self {
        Self {
            route_id,
            passenger_name: passenger_name.into(),
            passenger_contact: passenger_contact.into(),
            seats_booked,
            booked_at: minute_floor(booked_at),
        }
    }

    /// Builds the persisted record once the store has assigned an id.
    pub fn into_booking(self, id: BookingId) -> Booking {
        Booking {
            id,
            route_id: self.route_id,
            passenger_name: self.passenger_name,
            passenger_contact: self.passenger_contact,
            seats_booked: self.seats_booked,
            booked_at: self.booked_at,
        }
    }
}

fn minute_floor(value: NaiveDateTime) -> NaiveDateTime {
    value
        .with_second(0)
        .and_then(|v| v.with_nanosecond(0))
        .unwrap_or(value)
}
