//! Patients and the registry that holds them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, store::ActiveReferences};

// ─── Identity ────────────────────────────────────────────────────────────────

/// A caller-supplied patient identifier, e.g. a national ID number.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PatientId(String);

impl PatientId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for PatientId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for PatientId {
  fn from(value: &str) -> Self { Self(value.to_owned()) }
}

impl From<String> for PatientId {
  fn from(value: String) -> Self { Self(value) }
}

// ─── Record ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
  /// Immutable once registered.
  pub id:         PatientId,
  pub last_name:  String,
  pub first_name: String,
  pub phone:      String,
}

impl Patient {
  pub fn new(
    id: impl Into<PatientId>,
    last_name: impl Into<String>,
    first_name: impl Into<String>,
    phone: impl Into<String>,
  ) -> Self {
    Self {
      id:         id.into(),
      last_name:  last_name.into(),
      first_name: first_name.into(),
      phone:      phone.into(),
    }
  }

  fn validate(&self) -> Result<()> {
    require("last name", &self.last_name)?;
    require("first name", &self.first_name)?;
    require("patient id", self.id.as_str())?;
    require("phone", &self.phone)
  }
}

/// The mutable fields of a [`Patient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum PatientField {
  FirstName,
  LastName,
  Phone,
}

impl PatientField {
  fn label(self) -> &'static str {
    match self {
      Self::FirstName => "first name",
      Self::LastName => "last name",
      Self::Phone => "phone",
    }
  }
}

/// Fail with [`Error::BlankField`] if `value` is empty or whitespace.
pub(crate) fn require(field: &'static str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::BlankField { field });
  }
  Ok(())
}

// ─── Registry ────────────────────────────────────────────────────────────────

/// Patients in registration order, unique by [`PatientId`].
#[derive(Debug, Default)]
pub struct PatientRegistry {
  records: Vec<Patient>,
  limit:   Option<usize>,
}

impl PatientRegistry {
  pub fn new() -> Self { Self::default() }

  /// A registry that refuses registrations past `limit` records.
  pub fn with_limit(limit: Option<usize>) -> Self {
    Self {
      records: Vec::new(),
      limit,
    }
  }

  pub fn register(&mut self, patient: Patient) -> Result<&Patient> {
    patient.validate()?;
    if self.contains(&patient.id) {
      return Err(Error::DuplicatePatient(patient.id));
    }
    if let Some(limit) = self.limit
      && self.records.len() >= limit
    {
      return Err(Error::CapacityExceeded {
        what: "patient",
        limit,
      });
    }
    self.records.push(patient);
    Ok(&self.records[self.records.len() - 1])
  }

  pub fn contains(&self, id: &PatientId) -> bool { self.position(id).is_some() }

  pub fn find(&self, id: &PatientId) -> Result<&Patient> {
    self
      .records
      .iter()
      .find(|p| &p.id == id)
      .ok_or_else(|| Error::PatientNotFound(id.clone()))
  }

  /// Overwrite one mutable field. Blank values are rejected.
  pub fn update(
    &mut self,
    id: &PatientId,
    field: PatientField,
    value: impl Into<String>,
  ) -> Result<&Patient> {
    let idx = self
      .position(id)
      .ok_or_else(|| Error::PatientNotFound(id.clone()))?;
    let value = value.into();
    require(field.label(), &value)?;

    let patient = &mut self.records[idx];
    match field {
      PatientField::FirstName => patient.first_name = value,
      PatientField::LastName => patient.last_name = value,
      PatientField::Phone => patient.phone = value,
    }
    Ok(&*patient)
  }

  /// Remove a patient that no active appointment refers to. The remaining
  /// records keep their relative order.
  pub fn remove(
    &mut self,
    id: &PatientId,
    refs: &impl ActiveReferences,
  ) -> Result<Patient> {
    let idx = self
      .position(id)
      .ok_or_else(|| Error::PatientNotFound(id.clone()))?;
    let active = refs.count_active_for_patient(id);
    if active > 0 {
      return Err(Error::PatientInUse {
        id: id.clone(),
        active,
      });
    }
    Ok(self.records.remove(idx))
  }

  pub fn list_all(&self) -> &[Patient] { &self.records }

  pub fn len(&self) -> usize { self.records.len() }

  pub fn is_empty(&self) -> bool { self.records.is_empty() }

  fn position(&self, id: &PatientId) -> Option<usize> {
    self.records.iter().position(|p| &p.id == id)
  }
}
