//! Booking-desk CLI entry point.
//!
//! # Responsibility
//! - Parse process flags, open the store, optionally seed demo routes.
//! - Print the routes-with-availability overview.
//!
//! Booking entry stays with the interactive front end; this binary is the
//! thin operational collaborator around `swiftseat_core`.

use chrono::{Duration, Local, NaiveDateTime, Timelike};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use swiftseat_core::db::open_store;
use swiftseat_core::{BookingService, BusRepository, NewRoute, SqliteBusRepository};

#[derive(Debug, Parser)]
#[command(name = "swiftseat", about = "SwiftSeat bus booking toolkit")]
struct Args {
    /// Location of the SQLite database file.
    #[arg(long, default_value = "data/swiftseat.sqlite3")]
    database: PathBuf,

    /// Populate a few demo routes on start-up if the table is empty.
    #[arg(long)]
    with_sample_data: bool,
}

fn main() -> ExitCode {
    match run(&Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), String> {
    if let Some(parent) = args.database.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|err| format!("cannot create `{}`: {err}", parent.display()))?;
        }
    }

    let mut conn = open_store(&args.database).map_err(|err| err.to_string())?;
    let mut repo = SqliteBusRepository::try_new(&mut conn).map_err(|err| err.to_string())?;

    if args.with_sample_data {
        ensure_sample_data(&mut repo)?;
    }

    let service = BookingService::new(repo);
    let overview = service.routes_overview().map_err(|err| err.to_string())?;

    if overview.is_empty() {
        println!("No routes registered yet. Re-run with --with-sample-data for a demo set.");
        return Ok(());
    }

    println!(
        "{:<8} {:<16} {:<16} {:<17} {:>6} {:>10} {:>9}",
        "BUS", "ORIGIN", "DESTINATION", "DEPARTURE", "SEATS", "AVAILABLE", "PRICE"
    );
    for entry in overview {
        let route = &entry.route;
        println!(
            "{:<8} {:<16} {:<16} {:<17} {:>6} {:>10} {:>9.2}",
            route.bus_number,
            route.origin,
            route.destination,
            route.departure_time.format("%Y-%m-%d %H:%M"),
            route.total_seats,
            entry.seats_available,
            route.price
        );
    }

    Ok(())
}

fn ensure_sample_data<R: BusRepository>(repo: &mut R) -> Result<(), String> {
    let existing = repo.list_routes().map_err(|err| err.to_string())?;
    if !existing.is_empty() {
        return Ok(());
    }

    let base_time = top_of_current_hour();
    let demo_routes = [
        ("HX101", "New York", "Washington", 6, 40, 49.99),
        ("HX205", "San Francisco", "Los Angeles", 10, 48, 79.99),
        ("HX315", "Chicago", "Detroit", 4, 36, 39.99),
    ];

    for (bus_number, origin, destination, offset_hours, total_seats, price) in demo_routes {
        repo.add_route(&NewRoute {
            bus_number: bus_number.to_string(),
            origin: origin.to_string(),
            destination: destination.to_string(),
            departure_time: base_time + Duration::hours(offset_hours),
            total_seats,
            price,
        })
        .map_err(|err| err.to_string())?;
    }

    Ok(())
}

fn top_of_current_hour() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_minute(0)
        .and_then(|v| v.with_second(0))
        .and_then(|v| v.with_nanosecond(0))
        .unwrap_or(now)
}
