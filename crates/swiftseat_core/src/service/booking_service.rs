//! Booking-desk use-case service.
//!
//! # Responsibility
//! - Accept raw form fields, validate them, and delegate to the repository.
//! - Translate every core error kind into a recoverable, user-facing message.
//!
//! # Invariants
//! - Service APIs never bypass input validation or repository contracts.
//! - The service layer remains storage-agnostic.

use crate::db::DbError;
use crate::input::{self, InputError};
use crate::model::{Booking, NewBooking, NewRoute, Route, RouteAvailability, RouteId};
use crate::repo::bus_repo::{BusRepository, RepoError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Raw text fields for registering a route, exactly as entered.
#[derive(Debug, Clone, Copy)]
pub struct RouteForm<'a> {
    pub bus_number: &'a str,
    pub origin: &'a str,
    pub destination: &'a str,
    /// Expected in `YYYY-MM-DD HH:MM` format.
    pub departure_time: &'a str,
    pub total_seats: &'a str,
    pub price: &'a str,
}

/// Raw text fields for reserving seats on an already-selected route.
#[derive(Debug, Clone, Copy)]
pub struct BookingForm<'a> {
    /// Route identity taken from a listing, not from free text.
    pub route_id: RouteId,
    pub passenger_name: &'a str,
    pub passenger_contact: &'a str,
    pub seats: &'a str,
}

/// Service error for booking-desk use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// A raw form field was rejected.
    Input(InputError),
    /// The chosen bus number is already taken by another route.
    DuplicateBusNumber(String),
    /// Persistence-layer failure, including seat availability and not-found.
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Input(err) => write!(f, "{err}"),
            Self::DuplicateBusNumber(bus_number) => {
                write!(f, "Bus number `{bus_number}` is already in use.")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Input(err) => Some(err),
            Self::DuplicateBusNumber(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<InputError> for ServiceError {
    fn from(value: InputError) -> Self {
        Self::Input(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Booking-desk facade over a repository implementation.
pub struct BookingService<R: BusRepository> {
    repo: R,
}

impl<R: BusRepository> BookingService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates route form fields and registers the route.
    ///
    /// A duplicate bus number is reported as
    /// [`ServiceError::DuplicateBusNumber`] rather than a bare store error.
    pub fn register_route(&mut self, form: &RouteForm<'_>) -> Result<Route, ServiceError> {
        let draft = NewRoute {
            bus_number: input::require_text("Bus number", form.bus_number)?,
            origin: input::require_text("Origin", form.origin)?,
            destination: input::require_text("Destination", form.destination)?,
            departure_time: input::parse_departure("Departure time", form.departure_time)?,
            total_seats: input::parse_seat_count("Total seats", form.total_seats)?,
            price: input::parse_price("Price", form.price)?,
        };

        let route = match self.repo.add_route(&draft) {
            Ok(route) => route,
            Err(RepoError::Db(DbError::Integrity(_))) => {
                return Err(ServiceError::DuplicateBusNumber(draft.bus_number));
            }
            Err(other) => return Err(other.into()),
        };

        info!(
            "event=route_registered module=service status=ok route_id={} bus_number={} total_seats={}",
            route.id, route.bus_number, route.total_seats
        );
        Ok(route)
    }

    /// Validates passenger form fields and reserves seats.
    pub fn reserve_seats(&mut self, form: &BookingForm<'_>) -> Result<Booking, ServiceError> {
        let draft = NewBooking::new(
            form.route_id,
            input::require_text("Passenger name", form.passenger_name)?,
            input::parse_contact(form.passenger_contact)?,
            input::parse_seat_count("Seats", form.seats)?,
        );

        let booking = self.repo.add_booking(&draft)?;
        info!(
            "event=booking_recorded module=service status=ok booking_id={} route_id={} seats={}",
            booking.id, booking.route_id, booking.seats_booked
        );
        Ok(booking)
    }

    /// Lists every route with derived availability, soonest departure first.
    pub fn routes_overview(&self) -> Result<Vec<RouteAvailability>, ServiceError> {
        Ok(self.repo.list_routes()?)
    }

    /// Lists all bookings, most recent first.
    pub fn booking_log(&self) -> Result<Vec<Booking>, ServiceError> {
        Ok(self.repo.list_bookings()?)
    }

    /// Remaining seats for one route.
    pub fn seats_remaining(&self, route_id: RouteId) -> Result<u32, ServiceError> {
        Ok(self.repo.available_seats(route_id)?)
    }
}
