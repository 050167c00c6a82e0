//! Error types for `clinic-core`.

use thiserror::Error;

use crate::{
  appointment::{AppointmentCode, AppointmentStatus},
  patient::PatientId,
  schedule::{CANCELLATION_NOTICE_MINUTES, Slot},
  specialty::SpecialtyCode,
};

#[derive(Debug, Error)]
pub enum Error {
  #[error("{field} must not be blank")]
  BlankField { field: &'static str },

  #[error("date/time out of range: {0}")]
  InvalidDateTime(Slot),

  #[error("a patient with id {0} is already registered")]
  DuplicatePatient(PatientId),

  #[error(
    "patient {patient} already has an active appointment for specialty {specialty}"
  )]
  DuplicateActive {
    patient:   PatientId,
    specialty: SpecialtyCode,
  },

  #[error("patient not found: {0}")]
  PatientNotFound(PatientId),

  #[error("specialty not found: {0}")]
  SpecialtyNotFound(SpecialtyCode),

  #[error("appointment not found: {0}")]
  AppointmentNotFound(AppointmentCode),

  #[error("patient {id} still has {active} active appointment(s)")]
  PatientInUse { id: PatientId, active: usize },

  #[error("specialty {code} still has {active} active appointment(s)")]
  SpecialtyInUse { code: SpecialtyCode, active: usize },

  #[error("appointment {code} is {status}")]
  NotActive {
    code:   AppointmentCode,
    status: AppointmentStatus,
  },

  #[error("{0} is not a valid calendar date/time")]
  DateConversion(Slot),

  #[error(
    "appointment {code} is {minutes_until} minute(s) away; at least {} are required to cancel",
    CANCELLATION_NOTICE_MINUTES
  )]
  CancellationWindow {
    code:          AppointmentCode,
    minutes_until: i64,
  },

  #[error("{what} limit of {limit} reached")]
  CapacityExceeded { what: &'static str, limit: usize },
}

/// Coarse classification of an [`Error`], one per failure mode a caller may
/// want to branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
  Validation,
  DuplicateKey,
  DuplicateActive,
  NotFound,
  InUse,
  InvalidState,
  DateConversion,
  CancellationWindow,
  CapacityExceeded,
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::BlankField { .. } | Self::InvalidDateTime(_) => ErrorKind::Validation,
      Self::DuplicatePatient(_) => ErrorKind::DuplicateKey,
      Self::DuplicateActive { .. } => ErrorKind::DuplicateActive,
      Self::PatientNotFound(_)
      | Self::SpecialtyNotFound(_)
      | Self::AppointmentNotFound(_) => ErrorKind::NotFound,
      Self::PatientInUse { .. } | Self::SpecialtyInUse { .. } => ErrorKind::InUse,
      Self::NotActive { .. } => ErrorKind::InvalidState,
      Self::DateConversion(_) => ErrorKind::DateConversion,
      Self::CancellationWindow { .. } => ErrorKind::CancellationWindow,
      Self::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
