//! Check-then-insert under one exclusive scope.
//!
//! The conflict check alone cannot stop double-booking: two callers that read
//! the same day's appointments, both pass the check and both insert will
//! collide. [`book`] runs the read, the check and the write while holding
//! `&mut` to the store, so the store's owner decides the transaction
//! boundary. [`SharedStore`] does the same behind a mutex for callers on
//! several threads.

use std::sync::Mutex;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::SchedulingConfig;
use crate::conflict::{check_conflict_on, BookingPath};
use crate::error::{EngineError, Result};
use crate::model::{Appointment, AppointmentId, BookingRequest, Doctor, DoctorDirectory, DoctorId};

/// Persistence seam for appointments.
pub trait AppointmentStore: DoctorDirectory {
    /// Every appointment on `date`, for all doctors and patients.
    fn appointments_on(&self, date: NaiveDate) -> Result<Vec<Appointment>>;

    /// Store an admitted appointment and return its assigned id.
    fn insert(&mut self, appointment: Appointment) -> Result<AppointmentId>;

    /// Delete an appointment, returning the removed row.
    fn remove(&mut self, id: AppointmentId) -> Result<Appointment>;
}

/// Book `request` if it passes the conflict check.
///
/// Returns the stored appointment (with its id) or
/// [`EngineError::Rejected`] carrying the reason.
pub fn book<S: AppointmentStore + ?Sized>(
    store: &mut S,
    request: BookingRequest,
    today: NaiveDate,
    config: &SchedulingConfig,
    path: BookingPath,
) -> Result<Appointment> {
    let existing = store.appointments_on(request.date)?;
    check_conflict_on(&existing, &request, today, config, path, &*store)?;

    let mut appointment = request.into_appointment();
    let id = store.insert(appointment.clone())?;
    appointment.id = Some(id);

    tracing::debug!(
        id = %id,
        doctor = %appointment.doctor_id,
        patient = %appointment.patient_id,
        date = %appointment.date,
        slot = %appointment.interval(),
        "appointment booked"
    );
    Ok(appointment)
}

/// A store shared between threads. Each [`SharedStore::book`] call holds the
/// lock across read, check and insert.
#[derive(Debug, Default)]
pub struct SharedStore<S> {
    inner: Mutex<S>,
}

impl<S: AppointmentStore> SharedStore<S> {
    pub fn new(store: S) -> Self {
        Self {
            inner: Mutex::new(store),
        }
    }

    pub fn book(
        &self,
        request: BookingRequest,
        today: NaiveDate,
        config: &SchedulingConfig,
        path: BookingPath,
    ) -> Result<Appointment> {
        let mut store = self.inner.lock().map_err(|_| EngineError::LockPoisoned)?;
        book(&mut *store, request, today, config, path)
    }

    pub fn cancel(&self, id: AppointmentId) -> Result<Appointment> {
        let mut store = self.inner.lock().map_err(|_| EngineError::LockPoisoned)?;
        store.remove(id)
    }

    /// Run `f` with shared access to the underlying store.
    pub fn read<T>(&self, f: impl FnOnce(&S) -> T) -> Result<T> {
        let store = self.inner.lock().map_err(|_| EngineError::LockPoisoned)?;
        Ok(f(&*store))
    }

    pub fn into_inner(self) -> Result<S> {
        self.inner.into_inner().map_err(|_| EngineError::LockPoisoned)
    }
}

/// The whole front-desk schedule in memory: the roster plus every booked
/// appointment. Serializes to the JSON ledger format used by the CLI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    pub doctors: Vec<Doctor>,
    #[serde(default)]
    pub appointments: Vec<Appointment>,
}

impl Ledger {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn doctor(&self, id: DoctorId) -> Option<&Doctor> {
        self.doctors.iter().find(|d| d.id == id)
    }

    fn next_id(&self) -> Result<AppointmentId> {
        let max = self
            .appointments
            .iter()
            .filter_map(|a| a.id)
            .map(|id| id.0)
            .max()
            .unwrap_or(0);
        max.checked_add(1)
            .map(AppointmentId)
            .ok_or(EngineError::IdsExhausted)
    }
}

impl DoctorDirectory for Ledger {
    fn display_name(&self, id: DoctorId) -> Option<String> {
        self.doctors.display_name(id)
    }
}

impl AppointmentStore for Ledger {
    fn appointments_on(&self, date: NaiveDate) -> Result<Vec<Appointment>> {
        Ok(self
            .appointments
            .iter()
            .filter(|a| a.date == date)
            .cloned()
            .collect())
    }

    fn insert(&mut self, mut appointment: Appointment) -> Result<AppointmentId> {
        let id = self.next_id()?;
        appointment.id = Some(id);
        self.appointments.push(appointment);
        Ok(id)
    }

    fn remove(&mut self, id: AppointmentId) -> Result<Appointment> {
        let index = self
            .appointments
            .iter()
            .position(|a| a.id == Some(id))
            .ok_or(EngineError::UnknownAppointment(id))?;
        Ok(self.appointments.remove(index))
    }
}
