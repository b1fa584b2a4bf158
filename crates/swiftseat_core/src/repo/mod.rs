//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Seat availability is recomputed from durable state on every read; the
//!   repository holds no state of its own beyond the connection handle.
//! - Repository APIs return semantic errors (`RouteNotFound`,
//!   `SeatsUnavailable`) in addition to store transport errors.

pub mod bus_repo;
