//! # frontdesk-engine
//!
//! Appointment conflict detection and daily availability for a hospital
//! front desk.
//!
//! Everything here is a pure function over data the caller supplies. There is
//! no clock access ("today" is an argument) and no I/O, so the check can run
//! inside whatever transaction the caller's storage layer provides.
//!
//! ## Modules
//!
//! - [`conflict`] — Admissibility check for a proposed appointment, plus a
//!   double-booking audit
//! - [`availability`] — Free intervals and utilization for a doctor's day
//! - [`booking`] — Check-then-insert against an [`AppointmentStore`]
//! - [`interval`] — Half-open time intervals and date/time parsing
//! - [`model`] — Appointments, booking requests, doctors
//! - [`config`] — Working hours, horizon and weekday policy
//! - [`error`] — Error types

pub mod availability;
pub mod booking;
pub mod config;
pub mod conflict;
pub mod error;
pub mod interval;
pub mod model;

pub use availability::{compute_availability, daily_availability, AvailabilityReport};
pub use booking::{book, AppointmentStore, Ledger, SharedStore};
pub use config::SchedulingConfig;
pub use conflict::{
    check_conflict, check_conflict_on, find_double_bookings, BookingPath, ConflictResult,
    Rejection,
};
pub use error::EngineError;
pub use interval::{overlaps, parse_date, parse_time, TimeInterval};
pub use model::{
    Appointment, AppointmentId, BookingRequest, Doctor, DoctorDirectory, DoctorId, PatientId,
};
