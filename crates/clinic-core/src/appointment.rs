//! Appointments and the ledger that owns them.
//!
//! The ledger is append-only: appointments are never removed, only moved from
//! [`AppointmentStatus::Active`] to [`AppointmentStatus::Cancelled`]. Codes are
//! assigned in insertion order, so the backing vector is always sorted by code.

use std::fmt;

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  patient::PatientId,
  schedule::{self, Slot},
  specialty::SpecialtyCode,
  store::{ActiveReferences, Directory},
};

/// System-assigned appointment number, independent of specialty codes.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
)]
#[serde(transparent)]
pub struct AppointmentCode(pub u32);

impl fmt::Display for AppointmentCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AppointmentStatus {
  Active,
  Cancelled,
}

impl AppointmentStatus {
  pub fn is_active(&self) -> bool { matches!(self, Self::Active) }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
  pub code:       AppointmentCode,
  pub patient_id: PatientId,
  pub specialty:  SpecialtyCode,
  pub slot:       Slot,
  pub status:     AppointmentStatus,
}

impl Appointment {
  pub fn is_active(&self) -> bool { self.status.is_active() }

  fn is_active_for(&self, patient_id: &PatientId, specialty: SpecialtyCode) -> bool {
    self.is_active() && &self.patient_id == patient_id && self.specialty == specialty
  }
}

// ─── Ledger ──────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct AppointmentLedger {
  entries:   Vec<Appointment>,
  next_code: u32,
}

impl Default for AppointmentLedger {
  fn default() -> Self {
    Self {
      entries:   Vec::new(),
      next_code: 1,
    }
  }
}

impl AppointmentLedger {
  pub fn new() -> Self { Self::default() }

  /// Book `patient_id` into `specialty` at `slot`.
  ///
  /// Checks run in order: both references exist, the pair has no active
  /// appointment, the slot is in range. The code counter only advances on
  /// success.
  pub fn create(
    &mut self,
    directory: &impl Directory,
    patient_id: PatientId,
    specialty: SpecialtyCode,
    slot: Slot,
  ) -> Result<&Appointment> {
    if !directory.has_patient(&patient_id) {
      return Err(Error::PatientNotFound(patient_id));
    }
    if !directory.has_specialty(specialty) {
      return Err(Error::SpecialtyNotFound(specialty));
    }
    if self.exists_active_for(&patient_id, specialty) {
      return Err(Error::DuplicateActive {
        patient: patient_id,
        specialty,
      });
    }
    if !slot.is_valid() {
      return Err(Error::InvalidDateTime(slot));
    }

    let code = AppointmentCode(self.next_code);
    self.next_code += 1;
    self.entries.push(Appointment {
      code,
      patient_id,
      specialty,
      slot,
      status: AppointmentStatus::Active,
    });
    Ok(&self.entries[self.entries.len() - 1])
  }

  /// Move an active appointment to `slot`. Patient, specialty and status are
  /// left as they are.
  pub fn modify(&mut self, code: AppointmentCode, slot: Slot) -> Result<&Appointment> {
    let appointment = self.active_mut(code)?;
    if !slot.is_valid() {
      return Err(Error::InvalidDateTime(slot));
    }
    appointment.slot = slot;
    Ok(&*appointment)
  }

  /// Cancel an active appointment, provided it is at least
  /// [`schedule::CANCELLATION_NOTICE_MINUTES`] away from `now`.
  pub fn cancel<Tz: TimeZone>(
    &mut self,
    code: AppointmentCode,
    now: &DateTime<Tz>,
  ) -> Result<&Appointment> {
    let appointment = self.active_mut(code)?;
    let minutes_until = schedule::minutes_until(&appointment.slot, now)?;
    if !schedule::can_cancel(minutes_until) {
      return Err(Error::CancellationWindow {
        code,
        minutes_until,
      });
    }
    appointment.status = AppointmentStatus::Cancelled;
    Ok(&*appointment)
  }

  pub fn exists_active_for(&self, patient_id: &PatientId, specialty: SpecialtyCode) -> bool {
    self.entries.iter().any(|a| a.is_active_for(patient_id, specialty))
  }

  pub fn find(&self, code: AppointmentCode) -> Result<&Appointment> {
    self
      .index_of(code)
      .map(|idx| &self.entries[idx])
      .ok_or(Error::AppointmentNotFound(code))
  }

  pub fn list_all(&self) -> &[Appointment] { &self.entries }

  pub fn filter_by_patient(&self, patient_id: &PatientId) -> Vec<&Appointment> {
    self.filter(|a| &a.patient_id == patient_id)
  }

  pub fn filter_by_date(&self, day: i32, month: i32, year: i32) -> Vec<&Appointment> {
    self.filter(|a| a.slot.is_on(day, month, year))
  }

  pub fn filter_by_specialty(&self, specialty: SpecialtyCode) -> Vec<&Appointment> {
    self.filter(|a| a.specialty == specialty)
  }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }

  fn filter(&self, pred: impl Fn(&Appointment) -> bool) -> Vec<&Appointment> {
    self.entries.iter().filter(|a| pred(a)).collect()
  }

  fn index_of(&self, code: AppointmentCode) -> Option<usize> {
    self.entries.binary_search_by_key(&code, |a| a.code).ok()
  }

  fn active_mut(&mut self, code: AppointmentCode) -> Result<&mut Appointment> {
    let idx = self.index_of(code).ok_or(Error::AppointmentNotFound(code))?;
    let appointment = &mut self.entries[idx];
    if !appointment.is_active() {
      return Err(Error::NotActive {
        code,
        status: appointment.status,
      });
    }
    Ok(appointment)
  }
}

impl ActiveReferences for AppointmentLedger {
  fn count_active_for_patient(&self, id: &PatientId) -> usize {
    self
      .entries
      .iter()
      .filter(|a| a.is_active() && &a.patient_id == id)
      .count()
  }

  fn count_active_for_specialty(&self, code: SpecialtyCode) -> usize {
    self
      .entries
      .iter()
      .filter(|a| a.is_active() && a.specialty == code)
      .count()
  }
}
