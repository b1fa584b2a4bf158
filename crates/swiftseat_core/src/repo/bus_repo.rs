//! Route/booking repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the stable data-access API over `routes` and `bookings`.
//! - Enforce the no-overbooking invariant at booking time.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `add_booking` reads availability and inserts inside one immediate
//!   transaction, so a reservation is only visible if the check passed
//!   against the state it committed over.
//! - Availability reads are floored at zero; the booking-time check is the
//!   authoritative guard.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::{migrations, DbError};
use crate::model::{Booking, NewBooking, NewRoute, Route, RouteAvailability, RouteId};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage format for all persisted timestamps (ISO-8601, minute precision).
const STORE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M";

const BOOKING_SELECT_SQL: &str = "SELECT
    id,
    route_id,
    passenger_name,
    passenger_contact,
    seats_booked,
    booked_at
FROM bookings";

const ROUTE_COLUMNS: [&str; 7] = [
    "id",
    "bus_number",
    "origin",
    "destination",
    "departure_time",
    "total_seats",
    "price",
];

const BOOKING_COLUMNS: [&str; 6] = [
    "id",
    "route_id",
    "passenger_name",
    "passenger_contact",
    "seats_booked",
    "booked_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for route/booking persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// No route exists with the given id.
    RouteNotFound(RouteId),
    /// Requested seats exceed the route's current availability.
    SeatsUnavailable {
        route_id: RouteId,
        requested: u32,
        available: u32,
    },
    /// A persisted row failed to decode into a domain record.
    InvalidData(String),
    /// The connection has not been migrated to the expected schema version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::RouteNotFound(id) => write!(f, "route not found: {id}"),
            Self::SeatsUnavailable {
                route_id,
                requested,
                available,
            } => write!(
                f,
                "only {available} seats remaining on route {route_id} (requested {requested})"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted record: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match required {expected_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{column}` is missing from table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::from(value))
    }
}

/// Repository interface for route inventory and seat reservations.
pub trait BusRepository {
    /// Inserts a new route and returns it with its assigned id.
    fn add_route(&mut self, route: &NewRoute) -> RepoResult<Route>;
    /// Lists every route with its derived availability, soonest first.
    fn list_routes(&self) -> RepoResult<Vec<RouteAvailability>>;
    /// Computes remaining seats for one route, floored at zero.
    fn available_seats(&self, route_id: RouteId) -> RepoResult<u32>;
    /// Reserves seats if and only if enough remain, atomically.
    fn add_booking(&mut self, booking: &NewBooking) -> RepoResult<Booking>;
    /// Lists all bookings, most recent first.
    fn list_bookings(&self) -> RepoResult<Vec<Booking>>;
}

/// SQLite-backed route/booking repository.
pub struct SqliteBusRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteBusRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    ///
    /// Fails fast if the connection has not been through
    /// [`crate::db::open_store`]: wrong `user_version`, missing table, or
    /// missing column each get a dedicated error kind instead of a
    /// mid-query failure later.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl BusRepository for SqliteBusRepository<'_> {
    fn add_route(&mut self, route: &NewRoute) -> RepoResult<Route> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            "INSERT INTO routes (
                bus_number,
                origin,
                destination,
                departure_time,
                total_seats,
                price
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                route.bus_number.as_str(),
                route.origin.as_str(),
                route.destination.as_str(),
                encode_timestamp(route.departure_time),
                i64::from(route.total_seats),
                route.price,
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(route.clone().into_route(id))
    }

    fn list_routes(&self) -> RepoResult<Vec<RouteAvailability>> {
        // One aggregate read; a per-route round trip would fan out O(n^2)
        // as inventory grows.
        let mut stmt = self.conn.prepare(
            "SELECT
                r.id,
                r.bus_number,
                r.origin,
                r.destination,
                r.departure_time,
                r.total_seats,
                r.price,
                r.total_seats - IFNULL(SUM(b.seats_booked), 0) AS seats_available
             FROM routes AS r
             LEFT JOIN bookings AS b ON b.route_id = r.id
             GROUP BY r.id
             ORDER BY r.departure_time ASC;",
        )?;

        let mut rows = stmt.query([])?;
        let mut routes = Vec::new();
        while let Some(row) = rows.next()? {
            let route = parse_route_row(row)?;
            let seats_available = clamp_seat_count(row.get("seats_available")?)?;
            routes.push(RouteAvailability {
                route,
                seats_available,
            });
        }

        Ok(routes)
    }

    fn available_seats(&self, route_id: RouteId) -> RepoResult<u32> {
        seats_remaining_on(self.conn, route_id)
    }

    fn add_booking(&mut self, booking: &NewBooking) -> RepoResult<Booking> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        // Check and insert commit together; dropping the transaction on the
        // error paths rolls back without a partial write.
        let available = seats_remaining_on(&tx, booking.route_id)?;
        if booking.seats_booked > available {
            return Err(RepoError::SeatsUnavailable {
                route_id: booking.route_id,
                requested: booking.seats_booked,
                available,
            });
        }

        tx.execute(
            "INSERT INTO bookings (
                route_id,
                passenger_name,
                passenger_contact,
                seats_booked,
                booked_at
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                booking.route_id,
                booking.passenger_name.as_str(),
                booking.passenger_contact.as_str(),
                i64::from(booking.seats_booked),
                encode_timestamp(booking.booked_at),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(booking.clone().into_booking(id))
    }

    fn list_bookings(&self) -> RepoResult<Vec<Booking>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOOKING_SELECT_SQL} ORDER BY booked_at DESC, id DESC;"))?;

        let mut rows = stmt.query([])?;
        let mut bookings = Vec::new();
        while let Some(row) = rows.next()? {
            bookings.push(parse_booking_row(row)?);
        }

        Ok(bookings)
    }
}

fn seats_remaining_on(conn: &Connection, route_id: RouteId) -> RepoResult<u32> {
    let remaining: Option<i64> = conn
        .query_row(
            "SELECT
                total_seats - IFNULL((
                    SELECT SUM(seats_booked) FROM bookings WHERE route_id = ?1
                ), 0)
             FROM routes
             WHERE id = ?1;",
            [route_id],
            |row| row.get(0),
        )
        .optional()?;

    match remaining {
        Some(value) => clamp_seat_count(value),
        None => Err(RepoError::RouteNotFound(route_id)),
    }
}

fn parse_route_row(row: &Row<'_>) -> RepoResult<Route> {
    let departure_text: String = row.get("departure_time")?;
    Ok(Route {
        id: row.get("id")?,
        bus_number: row.get("bus_number")?,
        origin: row.get("origin")?,
        destination: row.get("destination")?,
        departure_time: decode_timestamp("routes.departure_time", &departure_text)?,
        total_seats: seat_count_from_db("routes.total_seats", row.get("total_seats")?)?,
        price: row.get("price")?,
    })
}

fn parse_booking_row(row: &Row<'_>) -> RepoResult<Booking> {
    let booked_at_text: String = row.get("booked_at")?;
    Ok(Booking {
        id: row.get("id")?,
        route_id: row.get("route_id")?,
        passenger_name: row.get("passenger_name")?,
        passenger_contact: row.get("passenger_contact")?,
        seats_booked: seat_count_from_db("bookings.seats_booked", row.get("seats_booked")?)?,
        booked_at: decode_timestamp("bookings.booked_at", &booked_at_text)?,
    })
}

fn encode_timestamp(value: NaiveDateTime) -> String {
    value.format(STORE_TIMESTAMP_FORMAT).to_string()
}

fn decode_timestamp(column: &str, value: &str) -> RepoResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, STORE_TIMESTAMP_FORMAT)
        .map_err(|_| RepoError::InvalidData(format!("invalid timestamp `{value}` in {column}")))
}

fn seat_count_from_db(column: &str, value: i64) -> RepoResult<u32> {
    u32::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid seat count `{value}` in {column}")))
}

// Negative only if the booking-time invariant was ever violated; the floor
// protects display, it is not the guard.
fn clamp_seat_count(value: i64) -> RepoResult<u32> {
    seat_count_from_db("derived seats_available", value.max(0))
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = migrations::latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    ensure_table(conn, "routes", &ROUTE_COLUMNS)?;
    ensure_table(conn, "bookings", &BOOKING_COLUMNS)?;
    Ok(())
}

fn ensure_table(
    conn: &Connection,
    table: &'static str,
    required_columns: &[&'static str],
) -> RepoResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    if exists == 0 {
        return Err(RepoError::MissingRequiredTable(table));
    }

    let mut stmt = conn.prepare(&format!("SELECT name FROM pragma_table_info('{table}');"))?;
    let mut rows = stmt.query([])?;
    let mut columns = HashSet::new();
    while let Some(row) = rows.next()? {
        columns.insert(row.get::<_, String>(0)?);
    }

    for &column in required_columns {
        if !columns.contains(column) {
            return Err(RepoError::MissingRequiredColumn { table, column });
        }
    }

    Ok(())
}
