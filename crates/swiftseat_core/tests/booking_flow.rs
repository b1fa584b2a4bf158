use chrono::NaiveDateTime;
use rusqlite::Connection;
use swiftseat_core::db::migrations::latest_version;
use swiftseat_core::db::open_store_in_memory;
use swiftseat_core::{
    BookingForm, BookingService, BusRepository, NewBooking, NewRoute, RepoError, RouteForm,
    ServiceError, SqliteBusRepository,
};

#[test]
fn booking_consumes_availability_and_overbooking_is_rejected() {
    let mut conn = open_store_in_memory().unwrap();
    let route_id = {
        let mut repo = SqliteBusRepository::try_new(&mut conn).unwrap();

        let route = repo
            .add_route(&route_draft("AA101", "City A", "City B", "2024-05-01 10:00", 20, 25.0))
            .unwrap();
        assert_eq!(repo.available_seats(route.id).unwrap(), 20);

        repo.add_booking(&booking_draft(route.id, "Alice", "+1234567890", 5, "2024-04-01 09:00"))
            .unwrap();
        assert_eq!(repo.available_seats(route.id).unwrap(), 15);

        let err = repo
            .add_booking(&booking_draft(route.id, "Bob", "+1987654321", 16, "2024-04-01 09:30"))
            .unwrap_err();
        match err {
            RepoError::SeatsUnavailable {
                route_id,
                requested,
                available,
            } => {
                assert_eq!(route_id, route.id);
                assert_eq!(requested, 16);
                assert_eq!(available, 15);
            }
            other => panic!("unexpected error: {other}"),
        }

        // The failed attempt wrote nothing.
        assert_eq!(repo.available_seats(route.id).unwrap(), 15);
        route.id
    };

    let bookings: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM bookings WHERE route_id = ?1;",
            [route_id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(bookings, 1);
}

#[test]
fn availability_tracks_the_sum_of_booked_seats() {
    let mut conn = open_store_in_memory().unwrap();
    let mut repo = SqliteBusRepository::try_new(&mut conn).unwrap();

    let route = repo
        .add_route(&route_draft("AA101", "City A", "City B", "2024-05-01 10:00", 40, 25.0))
        .unwrap();

    let seats = [4, 1, 7, 2];
    for (index, count) in seats.iter().enumerate() {
        repo.add_booking(&booking_draft(
            route.id,
            "Passenger",
            "+1234567890",
            *count,
            &format!("2024-04-01 09:{:02}", index),
        ))
        .unwrap();
    }

    let booked: u32 = seats.iter().sum();
    assert_eq!(repo.available_seats(route.id).unwrap(), 40 - booked);
}

#[test]
fn unknown_route_id_is_reported_as_not_found() {
    let mut conn = open_store_in_memory().unwrap();
    let mut repo = SqliteBusRepository::try_new(&mut conn).unwrap();

    let read_err = repo.available_seats(42).unwrap_err();
    assert!(matches!(read_err, RepoError::RouteNotFound(42)));

    let write_err = repo
        .add_booking(&booking_draft(42, "Ghost", "+1234567890", 1, "2024-04-01 09:00"))
        .unwrap_err();
    assert!(matches!(write_err, RepoError::RouteNotFound(42)));
}

#[test]
fn list_bookings_returns_most_recent_first() {
    let mut conn = open_store_in_memory().unwrap();
    let mut repo = SqliteBusRepository::try_new(&mut conn).unwrap();

    let route = repo
        .add_route(&route_draft("AA101", "City A", "City B", "2024-05-01 10:00", 40, 25.0))
        .unwrap();

    repo.add_booking(&booking_draft(route.id, "Early", "+1234567890", 1, "2024-04-01 08:00"))
        .unwrap();
    repo.add_booking(&booking_draft(route.id, "Late", "+1234567890", 1, "2024-04-02 08:00"))
        .unwrap();
    repo.add_booking(&booking_draft(route.id, "Middle", "+1234567890", 1, "2024-04-01 12:00"))
        .unwrap();

    let log = repo.list_bookings().unwrap();
    let order: Vec<&str> = log.iter().map(|b| b.passenger_name.as_str()).collect();
    assert_eq!(order, ["Late", "Middle", "Early"]);
}

#[test]
fn same_minute_bookings_tie_break_on_newest_id() {
    let mut conn = open_store_in_memory().unwrap();
    let mut repo = SqliteBusRepository::try_new(&mut conn).unwrap();

    let route = repo
        .add_route(&route_draft("AA101", "City A", "City B", "2024-05-01 10:00", 40, 25.0))
        .unwrap();

    repo.add_booking(&booking_draft(route.id, "First", "+1234567890", 1, "2024-04-01 08:00"))
        .unwrap();
    repo.add_booking(&booking_draft(route.id, "Second", "+1234567890", 1, "2024-04-01 08:00"))
        .unwrap();

    let log = repo.list_bookings().unwrap();
    assert_eq!(log[0].passenger_name, "Second");
    assert_eq!(log[1].passenger_name, "First");
}

#[test]
fn booking_round_trip_preserves_fields() {
    let mut conn = open_store_in_memory().unwrap();
    let mut repo = SqliteBusRepository::try_new(&mut conn).unwrap();

    let route = repo
        .add_route(&route_draft("AA101", "City A", "City B", "2024-05-01 10:00", 40, 25.0))
        .unwrap();
    let created = repo
        .add_booking(&booking_draft(route.id, "Alice", "+1 234-567 890", 5, "2024-04-01 09:00"))
        .unwrap();

    let log = repo.list_bookings().unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0], created);
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let mut conn = Connection::open_in_memory().unwrap();

    let result = SqliteBusRepository::try_new(&mut conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_required_tables() {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteBusRepository::try_new(&mut conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("routes"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE routes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            bus_number TEXT NOT NULL UNIQUE,
            origin TEXT NOT NULL,
            destination TEXT NOT NULL,
            departure_time TEXT NOT NULL,
            total_seats INTEGER NOT NULL
        );
        CREATE TABLE bookings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            route_id INTEGER NOT NULL,
            passenger_name TEXT NOT NULL,
            passenger_contact TEXT NOT NULL,
            seats_booked INTEGER NOT NULL,
            booked_at TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteBusRepository::try_new(&mut conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "routes",
            column: "price"
        })
    ));
}

#[test]
fn service_round_trip_from_raw_form_fields() {
    let mut conn = open_store_in_memory().unwrap();
    let repo = SqliteBusRepository::try_new(&mut conn).unwrap();
    let mut desk = BookingService::new(repo);

    let route = desk
        .register_route(&RouteForm {
            bus_number: " AA101 ",
            origin: "City A",
            destination: "City B",
            departure_time: "2024-05-01 10:00",
            total_seats: "20",
            price: "25.0",
        })
        .unwrap();
    assert_eq!(route.bus_number, "AA101");
    assert_eq!(desk.seats_remaining(route.id).unwrap(), 20);

    let booking = desk
        .reserve_seats(&BookingForm {
            route_id: route.id,
            passenger_name: "Alice",
            passenger_contact: "+1234567890",
            seats: "5",
        })
        .unwrap();
    assert_eq!(booking.seats_booked, 5);
    assert_eq!(desk.seats_remaining(route.id).unwrap(), 15);
    assert_eq!(desk.booking_log().unwrap().len(), 1);
}

#[test]
fn service_translates_every_error_kind_into_a_message() {
    let mut conn = open_store_in_memory().unwrap();
    let repo = SqliteBusRepository::try_new(&mut conn).unwrap();
    let mut desk = BookingService::new(repo);

    let form = RouteForm {
        bus_number: "AA101",
        origin: "City A",
        destination: "City B",
        departure_time: "2024-05-01 10:00",
        total_seats: "20",
        price: "25.0",
    };
    desk.register_route(&form).unwrap();

    let duplicate = desk.register_route(&form).unwrap_err();
    assert!(matches!(duplicate, ServiceError::DuplicateBusNumber(_)));
    assert!(duplicate.to_string().contains("AA101"));

    let bad_contact = desk
        .reserve_seats(&BookingForm {
            route_id: 1,
            passenger_name: "Alice",
            passenger_contact: "call me",
            seats: "2",
        })
        .unwrap_err();
    assert!(matches!(bad_contact, ServiceError::Input(_)));
    assert!(!bad_contact.to_string().is_empty());

    let overbook = desk
        .reserve_seats(&BookingForm {
            route_id: 1,
            passenger_name: "Bob",
            passenger_contact: "+1987654321",
            seats: "21",
        })
        .unwrap_err();
    assert!(matches!(
        overbook,
        ServiceError::Repo(RepoError::SeatsUnavailable { available: 20, .. })
    ));
}

fn timestamp(value: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M").unwrap()
}

fn route_draft(
    bus_number: &str,
    origin: &str,
    destination: &str,
    departure: &str,
    total_seats: u32,
    price: f64,
) -> NewRoute {
    NewRoute {
        bus_number: bus_number.to_string(),
        origin: origin.to_string(),
        destination: destination.to_string(),
        departure_time: timestamp(departure),
        total_seats,
        price,
    }
}

fn booking_draft(
    route_id: i64,
    passenger: &str,
    contact: &str,
    seats: u32,
    booked_at: &str,
) -> NewBooking {
    NewBooking::booked_at(route_id, passenger, contact, seats, timestamp(booked_at))
}
