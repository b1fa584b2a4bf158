use chrono::NaiveDate;
use swiftseat_core::{Booking, NewBooking, NewRoute, Route, RouteAvailability};

#[test]
fn new_booking_defaults_to_current_minute() {
    let draft = NewBooking::new(7, "Alice", "+1234567890", 3);

    assert_eq!(draft.route_id, 7);
    assert_eq!(draft.seats_booked, 3);
    assert_eq!(draft.booked_at.format("%S").to_string(), "00");
}

#[test]
fn route_serialization_uses_expected_wire_fields() {
    let route = Route {
        id: 11,
        bus_number: "AA101".to_string(),
        origin: "City A".to_string(),
        destination: "City B".to_string(),
        departure_time: NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap(),
        total_seats: 20,
        price: 25.0,
    };
    let entry = RouteAvailability {
        route: route.clone(),
        seats_available: 15,
    };

    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json["route"]["id"], 11);
    assert_eq!(json["route"]["bus_number"], "AA101");
    assert_eq!(json["route"]["total_seats"], 20);
    assert_eq!(json["route"]["price"], 25.0);
    assert_eq!(json["seats_available"], 15);

    let decoded: RouteAvailability = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, entry);
}

#[test]
fn booking_serialization_round_trips() {
    let booked_at = NaiveDate::from_ymd_opt(2024, 4, 1)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();
    let booking = NewBooking::booked_at(11, "Alice", "+1234567890", 5, booked_at).into_booking(3);

    let json = serde_json::to_value(&booking).unwrap();
    assert_eq!(json["id"], 3);
    assert_eq!(json["route_id"], 11);
    assert_eq!(json["passenger_name"], "Alice");
    assert_eq!(json["seats_booked"], 5);

    let decoded: Booking = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, booking);
}

#[test]
fn drafts_build_records_with_the_assigned_id() {
    let draft = NewRoute {
        bus_number: "AA101".to_string(),
        origin: "City A".to_string(),
        destination: "City B".to_string(),
        departure_time: NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap(),
        total_seats: 20,
        price: 25.0,
    };

    let route = draft.clone().into_route(42);
    assert_eq!(route.id, 42);
    assert_eq!(route.bus_number, draft.bus_number);
    assert_eq!(route.total_seats, draft.total_seats);
}
