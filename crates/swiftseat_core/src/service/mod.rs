//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate validation and repository calls into use-case level APIs.
//! - Keep presentation layers decoupled from storage details.

pub mod booking_service;
