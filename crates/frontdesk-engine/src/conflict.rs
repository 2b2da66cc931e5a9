//! Decide whether a proposed appointment can be booked.
//!
//! The check is a pure function of the existing appointments, the candidate,
//! "today" and the configuration. Rules apply in a fixed order and the first
//! failure wins:
//!
//! 1. booking horizon (`max_horizon_days`)
//! 2. weekday policy (availability booking path only)
//! 3. time range (`end > start`)
//! 4. doctor overlap on the same date
//! 5. patient overlap on the same date
//!
//! Overlap uses half-open intervals: an appointment ending at 10:00 does not
//! conflict with one starting at 10:00.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SchedulingConfig;
use crate::interval::TimeInterval;
use crate::model::{Appointment, AppointmentId, BookingRequest, DoctorDirectory, DoctorId};

/// Why a booking was refused. Messages are meant to be shown to front-desk
/// staff as-is.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Rejection {
    #[error("Cannot book appointments more than {max_horizon_days} days in advance ({date} is after {latest})")]
    DateTooFarInFuture {
        date: NaiveDate,
        latest: NaiveDate,
        max_horizon_days: u64,
    },

    #[error("Appointments are only available Monday to Friday ({date} is a {weekday})")]
    WeekendRejected { date: NaiveDate, weekday: Weekday },

    #[error("End time must be after start time (got {interval})")]
    InvalidTimeRange { interval: TimeInterval },

    #[error("This time slot conflicts with an existing appointment for the doctor ({conflicting})")]
    DoctorConflict {
        appointment_id: Option<AppointmentId>,
        conflicting: TimeInterval,
    },

    #[error("This patient already has an appointment at the selected time with Dr. {doctor_name} ({conflicting})")]
    PatientConflict {
        appointment_id: Option<AppointmentId>,
        doctor_id: DoctorId,
        doctor_name: String,
        conflicting: TimeInterval,
    },
}

impl Rejection {
    /// Stable machine-readable name of the rejection.
    pub fn kind(&self) -> &'static str {
        match self {
            Rejection::DateTooFarInFuture { .. } => "DateTooFarInFuture",
            Rejection::WeekendRejected { .. } => "WeekendRejected",
            Rejection::InvalidTimeRange { .. } => "InvalidTimeRange",
            Rejection::DoctorConflict { .. } => "DoctorConflict",
            Rejection::PatientConflict { .. } => "PatientConflict",
        }
    }
}

/// `Ok(())` means the candidate is admissible.
pub type ConflictResult = std::result::Result<(), Rejection>;

/// Which front-desk flow submitted the booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingPath {
    /// The general appointments form.
    #[default]
    Appointments,
    /// Booking straight from a doctor's availability view. Subject to the
    /// weekday policy.
    Availability,
}

/// Check a candidate on the general appointments path with no doctor names
/// available (patient conflicts name the doctor as `#<id>`).
pub fn check_conflict(
    existing: &[Appointment],
    candidate: &BookingRequest,
    today: NaiveDate,
    config: &SchedulingConfig,
) -> ConflictResult {
    check_conflict_on(
        existing,
        candidate,
        today,
        config,
        BookingPath::Appointments,
        &(),
    )
}

/// Check a candidate against `existing` appointments.
///
/// `existing` may hold appointments for any doctors, patients and dates; only
/// rows sharing the candidate's date and doctor (or patient) are considered.
/// `directory` resolves the doctor named in a [`Rejection::PatientConflict`].
pub fn check_conflict_on<D: DoctorDirectory + ?Sized>(
    existing: &[Appointment],
    candidate: &BookingRequest,
    today: NaiveDate,
    config: &SchedulingConfig,
    path: BookingPath,
    directory: &D,
) -> ConflictResult {
    let result = evaluate(existing, candidate, today, config, path, directory);
    if let Err(rejection) = &result {
        tracing::debug!(
            doctor = %candidate.doctor_id,
            patient = %candidate.patient_id,
            date = %candidate.date,
            kind = rejection.kind(),
            "booking rejected"
        );
    }
    result
}

fn evaluate<D: DoctorDirectory + ?Sized>(
    existing: &[Appointment],
    candidate: &BookingRequest,
    today: NaiveDate,
    config: &SchedulingConfig,
    path: BookingPath,
    directory: &D,
) -> ConflictResult {
    // An unrepresentable horizon end means no date can exceed it.
    if let Some(latest) = today.checked_add_days(Days::new(config.max_horizon_days)) {
        if candidate.date > latest {
            return Err(Rejection::DateTooFarInFuture {
                date: candidate.date,
                latest,
                max_horizon_days: config.max_horizon_days,
            });
        }
    }

    if path == BookingPath::Availability && config.restrict_to_weekdays && is_weekend(candidate.date)
    {
        return Err(Rejection::WeekendRejected {
            date: candidate.date,
            weekday: candidate.date.weekday(),
        });
    }

    let interval = candidate.interval();
    if interval.is_empty() {
        return Err(Rejection::InvalidTimeRange { interval });
    }

    if let Some(clash) = existing.iter().find(|a| {
        a.doctor_id == candidate.doctor_id && a.date == candidate.date && a.interval().overlaps(&interval)
    }) {
        return Err(Rejection::DoctorConflict {
            appointment_id: clash.id,
            conflicting: clash.interval(),
        });
    }

    if let Some(clash) = existing.iter().find(|a| {
        a.patient_id == candidate.patient_id
            && a.date == candidate.date
            && a.interval().overlaps(&interval)
    }) {
        let doctor_name = directory
            .display_name(clash.doctor_id)
            .unwrap_or_else(|| format!("#{}", clash.doctor_id));
        return Err(Rejection::PatientConflict {
            appointment_id: clash.id,
            doctor_id: clash.doctor_id,
            doctor_name,
            conflicting: clash.interval(),
        });
    }

    Ok(())
}

pub(crate) fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// What two double-booked appointments have in common.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    Doctor,
    Patient,
}

/// A pair of stored appointments that overlap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub appointment_a: Appointment,
    pub appointment_b: Appointment,
    pub overlap_minutes: i64,
}

/// Find every overlapping pair in an already-stored schedule.
///
/// A correct booking flow never produces these; they appear when two bookings
/// raced past the check on a stale read. Pairs sharing both doctor and patient
/// are reported once per kind.
pub fn find_double_bookings(appointments: &[Appointment]) -> Vec<Conflict> {
    let mut conflicts = Vec::new();

    for (i, a) in appointments.iter().enumerate() {
        for b in &appointments[i + 1..] {
            if a.date != b.date || !a.interval().overlaps(&b.interval()) {
                continue;
            }
            let overlap_minutes = a.interval().overlap_minutes(&b.interval());

            let kinds = [
                (a.doctor_id == b.doctor_id, ConflictKind::Doctor),
                (a.patient_id == b.patient_id, ConflictKind::Patient),
            ];
            for (shared, kind) in kinds {
                if !shared {
                    continue;
                }
                tracing::warn!(
                    date = %a.date,
                    kind = ?kind,
                    a = ?a.id,
                    b = ?b.id,
                    "double booking detected"
                );
                conflicts.push(Conflict {
                    kind,
                    appointment_a: a.clone(),
                    appointment_b: b.clone(),
                    overlap_minutes,
                });
            }
        }
    }

    conflicts
}
