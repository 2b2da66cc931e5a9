//! Appointments, booking requests and the doctor roster.

use std::collections::HashMap;
use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::interval::{hhmm, TimeInterval};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

id_type!(
    /// Identifies a doctor in the roster.
    DoctorId
);
id_type!(
    /// Identifies a patient.
    PatientId
);
id_type!(
    /// Identifies a stored appointment. Assigned by the store on insert.
    AppointmentId
);

/// A booked appointment as held by the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AppointmentId>,
    pub doctor_id: DoctorId,
    pub patient_id: PatientId,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
}

impl Appointment {
    pub fn interval(&self) -> TimeInterval {
        TimeInterval::new(self.start_time, self.end_time)
    }
}

/// A proposed appointment awaiting an admissibility decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub doctor_id: DoctorId,
    pub patient_id: PatientId,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
}

impl BookingRequest {
    pub fn interval(&self) -> TimeInterval {
        TimeInterval::new(self.start_time, self.end_time)
    }

    /// Turn an admitted request into an appointment row (id left for the store).
    pub fn into_appointment(self) -> Appointment {
        Appointment {
            id: None,
            doctor_id: self.doctor_id,
            patient_id: self.patient_id,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            diagnosis: self.diagnosis,
        }
    }
}

/// A doctor on the roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: DoctorId,
    pub first_name: String,
    pub surname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
}

impl Doctor {
    /// Display name, e.g. "Ada Lovelace".
    pub fn name(&self) -> String {
        format!("{} {}", self.first_name, self.surname)
    }
}

/// Resolves doctor ids to display names for user-facing messages.
pub trait DoctorDirectory {
    fn display_name(&self, id: DoctorId) -> Option<String>;
}

impl DoctorDirectory for () {
    fn display_name(&self, _id: DoctorId) -> Option<String> {
        None
    }
}

impl DoctorDirectory for [Doctor] {
    fn display_name(&self, id: DoctorId) -> Option<String> {
        self.iter().find(|d| d.id == id).map(Doctor::name)
    }
}

impl DoctorDirectory for Vec<Doctor> {
    fn display_name(&self, id: DoctorId) -> Option<String> {
        self.as_slice().display_name(id)
    }
}

impl DoctorDirectory for HashMap<DoctorId, Doctor> {
    fn display_name(&self, id: DoctorId) -> Option<String> {
        self.get(&id).map(Doctor::name)
    }
}
