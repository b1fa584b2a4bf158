//! Domain model for route inventory and seat reservations.
//!
//! # Responsibility
//! - Define the canonical records persisted by the store.
//! - Keep derived read models (availability) separate from stored entities.
//!
//! # Invariants
//! - Persisted records always carry a store-assigned id.
//! - Drafts (`NewRoute`, `NewBooking`) never carry an id.

pub mod booking;
pub mod route;

pub use booking::{Booking, BookingId, NewBooking};
pub use route::{NewRoute, Route, RouteAvailability, RouteId};
