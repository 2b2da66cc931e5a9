//! WASM bindings for frontdesk-engine.
//!
//! Exposes the booking conflict check, daily availability and the
//! double-booking audit to JavaScript via `wasm-bindgen`. Appointments,
//! doctors and configuration cross the boundary as JSON strings in the same
//! shape the CLI ledger uses; dates are `YYYY-MM-DD` and times `HH:MM`.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p frontdesk-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir pkg/ \
//!   target/wasm32-unknown-unknown/release/frontdesk_wasm.wasm
//! ```

use chrono::NaiveDate;
use frontdesk_engine::availability::suggest_slots;
use frontdesk_engine::{
    check_conflict_on, compute_availability, daily_availability, find_double_bookings, parse_date,
    parse_time, Appointment, BookingPath, BookingRequest, Doctor, DoctorId, SchedulingConfig,
    TimeInterval,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Response shapes
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct CheckResponse<'a> {
    admissible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rejection: Option<&'a frontdesk_engine::Rejection>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

fn parse_appointments_json(json: &str) -> Result<Vec<Appointment>, JsValue> {
    serde_json::from_str(json)
        .map_err(|e| JsValue::from_str(&format!("Invalid appointments JSON: {}", e)))
}

fn parse_doctors_json(json: Option<&str>) -> Result<Vec<Doctor>, JsValue> {
    match json {
        Some(json) => serde_json::from_str(json)
            .map_err(|e| JsValue::from_str(&format!("Invalid doctors JSON: {}", e))),
        None => Ok(Vec::new()),
    }
}

/// Missing config means the front-desk defaults.
fn parse_config_json(json: Option<&str>) -> Result<SchedulingConfig, JsValue> {
    match json {
        Some(json) => SchedulingConfig::from_json_str(json).map_err(js_err),
        None => Ok(SchedulingConfig::default()),
    }
}

fn parse_day(s: &str) -> Result<NaiveDate, JsValue> {
    parse_date(s).map_err(js_err)
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Check whether a proposed appointment can be booked.
///
/// # Arguments
/// - `existing_json` -- JSON array of stored appointments (any dates)
/// - `candidate_json` -- JSON booking request: `doctor_id`, `patient_id`,
///   `date`, `start_time`, `end_time`, optional `diagnosis`
/// - `today` -- the caller's current date (`YYYY-MM-DD`)
/// - `config_json` -- optional scheduling config; defaults apply when absent
/// - `doctors_json` -- optional roster used to name the doctor in patient
///   conflicts
/// - `from_availability` -- booking from a doctor's availability view, which
///   applies the weekday policy
///
/// Returns `{"admissible": true}` or `{"admissible": false, "message": ...,
/// "rejection": {"kind": ..., ...}}`.
#[wasm_bindgen(js_name = "checkConflict")]
pub fn check_conflict(
    existing_json: &str,
    candidate_json: &str,
    today: &str,
    config_json: Option<String>,
    doctors_json: Option<String>,
    from_availability: bool,
) -> Result<String, JsValue> {
    let existing = parse_appointments_json(existing_json)?;
    let candidate: BookingRequest = serde_json::from_str(candidate_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid candidate JSON: {}", e)))?;
    let today = parse_day(today)?;
    let config = parse_config_json(config_json.as_deref())?;
    let doctors = parse_doctors_json(doctors_json.as_deref())?;
    let path = if from_availability {
        BookingPath::Availability
    } else {
        BookingPath::Appointments
    };

    let result = check_conflict_on(&existing, &candidate, today, &config, path, &doctors);
    let response = match &result {
        Ok(()) => CheckResponse {
            admissible: true,
            message: None,
            rejection: None,
        },
        Err(rejection) => CheckResponse {
            admissible: false,
            message: Some(rejection.to_string()),
            rejection: Some(rejection),
        },
    };
    to_json(&response)
}

/// Free intervals and utilization for one doctor on one date.
///
/// `working_start` and `working_end` are `HH:MM`. Returns a JSON
/// availability report with `free_intervals`, `busy_minutes`,
/// `free_minutes` and `utilization_percentage`.
#[wasm_bindgen(js_name = "computeAvailability")]
pub fn compute_doctor_availability(
    appointments_json: &str,
    doctor_id: u32,
    date: &str,
    working_start: &str,
    working_end: &str,
) -> Result<String, JsValue> {
    let appointments = parse_appointments_json(appointments_json)?;
    let date = parse_day(date)?;
    let start = parse_time(working_start).map_err(js_err)?;
    let end = parse_time(working_end).map_err(js_err)?;

    let report = compute_availability(
        DoctorId(u64::from(doctor_id)),
        date,
        &appointments,
        TimeInterval::new(start, end),
    );
    to_json(&report)
}

/// Availability for every doctor on the roster, honoring the configured
/// working hours and weekday policy. Returns a JSON array of reports.
#[wasm_bindgen(js_name = "dailyAvailability")]
pub fn daily_roster_availability(
    doctors_json: &str,
    appointments_json: &str,
    date: &str,
    config_json: Option<String>,
) -> Result<String, JsValue> {
    let doctors = parse_doctors_json(Some(doctors_json))?;
    let appointments = parse_appointments_json(appointments_json)?;
    let date = parse_day(date)?;
    let config = parse_config_json(config_json.as_deref())?;

    to_json(&daily_availability(&doctors, &appointments, date, &config))
}

/// Bookable `duration_minutes` slots for one doctor on the configured grid.
/// Returns a JSON array of `{start, end}` objects.
#[wasm_bindgen(js_name = "suggestSlots")]
pub fn suggest_doctor_slots(
    appointments_json: &str,
    doctor_id: u32,
    date: &str,
    duration_minutes: u32,
    config_json: Option<String>,
) -> Result<String, JsValue> {
    let appointments = parse_appointments_json(appointments_json)?;
    let date = parse_day(date)?;
    let config = parse_config_json(config_json.as_deref())?;

    let doctor = Doctor {
        id: DoctorId(u64::from(doctor_id)),
        first_name: String::new(),
        surname: String::new(),
        specialization: None,
    };
    let slots = daily_availability(std::slice::from_ref(&doctor), &appointments, date, &config)
        .first()
        .map(|report| {
            suggest_slots(
                report,
                i64::from(duration_minutes),
                config.slot_granularity_minutes,
            )
        })
        .unwrap_or_default();
    to_json(&slots)
}

/// Overlapping pairs in an already-stored schedule.
///
/// Returns a JSON array of `{kind, appointment_a, appointment_b,
/// overlap_minutes}` objects, where `kind` is `"doctor"` or `"patient"`.
#[wasm_bindgen(js_name = "findDoubleBookings")]
pub fn find_double_bookings_json(appointments_json: &str) -> Result<String, JsValue> {
    let appointments = parse_appointments_json(appointments_json)?;
    to_json(&find_double_bookings(&appointments))
}
