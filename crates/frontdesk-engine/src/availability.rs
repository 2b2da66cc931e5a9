//! Daily availability for doctors.
//!
//! Walks a doctor's appointments in start order against a working-hours
//! window and records the gaps as free intervals. Appointments that stick out
//! of the window are clipped; those entirely outside it are ignored.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::config::SchedulingConfig;
use crate::conflict::is_weekend;
use crate::interval::TimeInterval;
use crate::model::{Appointment, Doctor, DoctorId};

/// Free/busy summary of one doctor's working day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailabilityReport {
    pub doctor_id: DoctorId,
    pub date: NaiveDate,
    pub working_hours: TimeInterval,
    /// Gaps between appointments, sorted and non-overlapping.
    pub free_intervals: Vec<TimeInterval>,
    pub busy_minutes: i64,
    pub free_minutes: i64,
    /// Share of the window taken by appointments, 0.0 to 100.0.
    pub utilization_percentage: f64,
    /// Set when the date is a weekend and the front desk is weekday-only.
    pub closed: bool,
}

/// Compute one doctor's free intervals for `date` within `working_hours`.
///
/// Appointments for other doctors or other dates are skipped, so callers can
/// pass a whole day's (or week's) schedule.
pub fn compute_availability(
    doctor_id: DoctorId,
    date: NaiveDate,
    appointments: &[Appointment],
    working_hours: TimeInterval,
) -> AvailabilityReport {
    let mut busy: Vec<TimeInterval> = appointments
        .iter()
        .filter(|a| a.doctor_id == doctor_id && a.date == date)
        .filter_map(|a| a.interval().clip_to(&working_hours))
        .collect();

    // Start order, ties broken by end so the walk is deterministic.
    busy.sort_by_key(|i| (i.start, i.end));

    let mut free_intervals = Vec::new();
    let mut cursor = working_hours.start;

    for interval in &busy {
        if cursor < interval.start {
            free_intervals.push(TimeInterval::new(cursor, interval.start));
        }
        cursor = cursor.max(interval.end);
    }

    if cursor < working_hours.end {
        free_intervals.push(TimeInterval::new(cursor, working_hours.end));
    }

    let window_minutes = working_hours.duration_minutes();
    let free_minutes: i64 = free_intervals.iter().map(TimeInterval::duration_minutes).sum();
    let busy_minutes = window_minutes - free_minutes;

    AvailabilityReport {
        doctor_id,
        date,
        working_hours,
        free_intervals,
        busy_minutes,
        free_minutes,
        utilization_percentage: utilization(busy_minutes, window_minutes),
        closed: false,
    }
}

fn utilization(busy_minutes: i64, window_minutes: i64) -> f64 {
    if window_minutes <= 0 {
        return 0.0;
    }
    busy_minutes as f64 / window_minutes as f64 * 100.0
}

/// Availability of every doctor on the roster for `date`, in roster order.
///
/// On a weekend with `restrict_to_weekdays` set, every report is `closed`
/// with no free time.
pub fn daily_availability(
    doctors: &[Doctor],
    appointments: &[Appointment],
    date: NaiveDate,
    config: &SchedulingConfig,
) -> Vec<AvailabilityReport> {
    let working_hours = config.working_hours();
    let closed = config.restrict_to_weekdays && is_weekend(date);

    doctors
        .iter()
        .map(|doctor| {
            if closed {
                closed_report(doctor.id, date, working_hours)
            } else {
                compute_availability(doctor.id, date, appointments, working_hours)
            }
        })
        .collect()
}

fn closed_report(doctor_id: DoctorId, date: NaiveDate, working_hours: TimeInterval) -> AvailabilityReport {
    AvailabilityReport {
        doctor_id,
        date,
        working_hours,
        free_intervals: Vec::new(),
        busy_minutes: 0,
        free_minutes: 0,
        utilization_percentage: 0.0,
        closed: true,
    }
}

/// First free interval of at least `min_minutes`.
pub fn first_free_slot(report: &AvailabilityReport, min_minutes: i64) -> Option<TimeInterval> {
    report
        .free_intervals
        .iter()
        .copied()
        .find(|slot| slot.duration_minutes() >= min_minutes)
}

/// Bookable slots of `duration_minutes`, starting on a `granularity_minutes`
/// grid anchored at the start of working hours.
///
/// A slot is offered only if it fits entirely inside one free interval, so a
/// duration longer than every gap yields nothing.
pub fn suggest_slots(
    report: &AvailabilityReport,
    duration_minutes: i64,
    granularity_minutes: u32,
) -> Vec<TimeInterval> {
    if duration_minutes <= 0 || granularity_minutes == 0 {
        return Vec::new();
    }
    let step = i64::from(granularity_minutes);
    let anchor = report.working_hours.start;

    let mut slots = Vec::new();
    for free in &report.free_intervals {
        if duration_minutes > free.duration_minutes() {
            continue;
        }
        // Work in minutes from the anchor; NaiveTime arithmetic wraps at midnight.
        let free_start = (free.start - anchor).num_minutes();
        let free_end = (free.end - anchor).num_minutes();

        // Round the interval start up to the next grid line.
        let mut offset = (free_start + step - 1).div_euclid(step) * step;
        while offset + duration_minutes <= free_end {
            slots.push(TimeInterval::new(
                anchor + Duration::minutes(offset),
                anchor + Duration::minutes(offset + duration_minutes),
            ));
            offset += step;
        }
    }

    slots
}
