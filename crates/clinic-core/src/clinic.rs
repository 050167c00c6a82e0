//! The [`Clinic`] context: one owner for every store and counter.
//!
//! The shell holds a single `Clinic` for the life of the process and passes it
//! by `&mut` to each operation. Every method either succeeds or returns one
//! [`Error`] with all stores left untouched.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  appointment::{Appointment, AppointmentCode, AppointmentLedger},
  patient::{Patient, PatientField, PatientId, PatientRegistry},
  schedule::Slot,
  specialty::{Specialty, SpecialtyCode, SpecialtyRegistry},
  store::Directory,
};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Optional store ceilings. Both default to unbounded.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClinicConfig {
  pub max_patients:    Option<usize>,
  pub max_specialties: Option<usize>,
}

// ─── Context ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct Clinic {
  patients:     PatientRegistry,
  specialties:  SpecialtyRegistry,
  appointments: AppointmentLedger,
}

/// Borrowed view over both registries, handed to the ledger for existence
/// checks.
struct Registries<'a> {
  patients:    &'a PatientRegistry,
  specialties: &'a SpecialtyRegistry,
}

impl Directory for Registries<'_> {
  fn has_patient(&self, id: &PatientId) -> bool { self.patients.contains(id) }

  fn has_specialty(&self, code: SpecialtyCode) -> bool {
    self.specialties.contains(code)
  }
}

/// Serialisable copy of every collection, in listing order.
#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
  pub patients:     &'a [Patient],
  pub specialties:  &'a [Specialty],
  pub appointments: &'a [Appointment],
}

fn rejected(op: &'static str) -> impl Fn(&Error) {
  move |e: &Error| tracing::debug!(op, kind = %e.kind(), "rejected: {e}")
}

impl Clinic {
  pub fn new() -> Self { Self::default() }

  pub fn with_config(config: &ClinicConfig) -> Self {
    Self {
      patients:     PatientRegistry::with_limit(config.max_patients),
      specialties:  SpecialtyRegistry::with_limit(config.max_specialties),
      appointments: AppointmentLedger::new(),
    }
  }

  // ── Patients ──────────────────────────────────────────────────────────────

  pub fn register_patient(&mut self, patient: Patient) -> Result<&Patient> {
    let patient = self
      .patients
      .register(patient)
      .inspect_err(rejected("register_patient"))?;
    tracing::info!(patient_id = %patient.id, "patient registered");
    Ok(patient)
  }

  pub fn find_patient(&self, id: &PatientId) -> Result<&Patient> {
    self.patients.find(id)
  }

  pub fn update_patient(
    &mut self,
    id: &PatientId,
    field: PatientField,
    value: impl Into<String>,
  ) -> Result<&Patient> {
    let patient = self
      .patients
      .update(id, field, value)
      .inspect_err(rejected("update_patient"))?;
    tracing::info!(patient_id = %id, %field, "patient updated");
    Ok(patient)
  }

  pub fn remove_patient(&mut self, id: &PatientId) -> Result<Patient> {
    let patient = self
      .patients
      .remove(id, &self.appointments)
      .inspect_err(rejected("remove_patient"))?;
    tracing::info!(patient_id = %id, "patient removed");
    Ok(patient)
  }

  pub fn patients(&self) -> &[Patient] { self.patients.list_all() }

  // ── Specialties ───────────────────────────────────────────────────────────

  pub fn register_specialty(
    &mut self,
    name: impl Into<String>,
    description: Option<String>,
  ) -> Result<&Specialty> {
    let specialty = self
      .specialties
      .register(name, description)
      .inspect_err(rejected("register_specialty"))?;
    tracing::info!(specialty = %specialty.code, name = %specialty.name, "specialty registered");
    Ok(specialty)
  }

  pub fn find_specialty(&self, code: SpecialtyCode) -> Result<&Specialty> {
    self.specialties.find(code)
  }

  pub fn update_specialty(
    &mut self,
    code: SpecialtyCode,
    name: impl Into<String>,
    description: Option<String>,
  ) -> Result<&Specialty> {
    let specialty = self
      .specialties
      .update(code, name, description)
      .inspect_err(rejected("update_specialty"))?;
    tracing::info!(specialty = %code, "specialty updated");
    Ok(specialty)
  }

  pub fn remove_specialty(&mut self, code: SpecialtyCode) -> Result<Specialty> {
    let specialty = self
      .specialties
      .remove(code, &self.appointments)
      .inspect_err(rejected("remove_specialty"))?;
    tracing::info!(specialty = %code, "specialty removed");
    Ok(specialty)
  }

  pub fn specialties(&self) -> &[Specialty] { self.specialties.list_all() }

  // ── Appointments ──────────────────────────────────────────────────────────

  pub fn create_appointment(
    &mut self,
    patient_id: impl Into<PatientId>,
    specialty: SpecialtyCode,
    slot: Slot,
  ) -> Result<&Appointment> {
    let registries = Registries {
      patients:    &self.patients,
      specialties: &self.specialties,
    };
    let appointment = self
      .appointments
      .create(&registries, patient_id.into(), specialty, slot)
      .inspect_err(rejected("create_appointment"))?;
    tracing::info!(
      appointment = %appointment.code,
      patient_id = %appointment.patient_id,
      specialty = %appointment.specialty,
      slot = %appointment.slot,
      "appointment created"
    );
    Ok(appointment)
  }

  pub fn modify_appointment(
    &mut self,
    code: AppointmentCode,
    slot: Slot,
  ) -> Result<&Appointment> {
    let appointment = self
      .appointments
      .modify(code, slot)
      .inspect_err(rejected("modify_appointment"))?;
    tracing::info!(appointment = %code, slot = %slot, "appointment rescheduled");
    Ok(appointment)
  }

  /// Cancel with `now` as the reference clock. The shell passes
  /// `chrono::Local::now()`; tests pass a fixed instant.
  pub fn cancel_appointment<Tz: TimeZone>(
    &mut self,
    code: AppointmentCode,
    now: &DateTime<Tz>,
  ) -> Result<&Appointment> {
    let appointment = self
      .appointments
      .cancel(code, now)
      .inspect_err(rejected("cancel_appointment"))?;
    tracing::info!(appointment = %code, "appointment cancelled");
    Ok(appointment)
  }

  pub fn find_appointment(&self, code: AppointmentCode) -> Result<&Appointment> {
    self.appointments.find(code)
  }

  pub fn appointments(&self) -> &[Appointment] { self.appointments.list_all() }

  pub fn appointments_for_patient(&self, id: &PatientId) -> Vec<&Appointment> {
    self.appointments.filter_by_patient(id)
  }

  pub fn appointments_on(&self, day: i32, month: i32, year: i32) -> Vec<&Appointment> {
    self.appointments.filter_by_date(day, month, year)
  }

  pub fn appointments_for_specialty(&self, code: SpecialtyCode) -> Vec<&Appointment> {
    self.appointments.filter_by_specialty(code)
  }

  // ── Export ────────────────────────────────────────────────────────────────

  pub fn snapshot(&self) -> Snapshot<'_> {
    Snapshot {
      patients:     self.patients(),
      specialties:  self.specialties(),
      appointments: self.appointments(),
    }
  }
}
