//! Medical specialties and their registry.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, patient::require, store::ActiveReferences};

/// System-assigned specialty number. Starts at 1 and is never reused.
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
pub struct SpecialtyCode(pub u32);

impl fmt::Display for SpecialtyCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specialty {
  pub code:        SpecialtyCode,
  pub name:        String,
  pub description: Option<String>,
}

/// Blank descriptions are stored as `None`.
fn normalize(description: Option<String>) -> Option<String> {
  description.filter(|d| !d.trim().is_empty())
}

// ─── Registry ────────────────────────────────────────────────────────────────

/// Specialties in registration order, plus the code counter.
#[derive(Debug)]
pub struct SpecialtyRegistry {
  records:   Vec<Specialty>,
  next_code: u32,
  limit:     Option<usize>,
}

impl Default for SpecialtyRegistry {
  fn default() -> Self { Self::with_limit(None) }
}

impl SpecialtyRegistry {
  pub fn new() -> Self { Self::default() }

  pub fn with_limit(limit: Option<usize>) -> Self {
    Self {
      records: Vec::new(),
      next_code: 1,
      limit,
    }
  }

  /// Register a specialty under the next free code. The counter only
  /// advances on success.
  pub fn register(
    &mut self,
    name: impl Into<String>,
    description: Option<String>,
  ) -> Result<&Specialty> {
    let name = name.into();
    require("specialty name", &name)?;
    if let Some(limit) = self.limit
      && self.records.len() >= limit
    {
      return Err(Error::CapacityExceeded {
        what: "specialty",
        limit,
      });
    }

    let code = SpecialtyCode(self.next_code);
    self.next_code += 1;
    self.records.push(Specialty {
      code,
      name,
      description: normalize(description),
    });
    Ok(&self.records[self.records.len() - 1])
  }

  pub fn contains(&self, code: SpecialtyCode) -> bool {
    self.position(code).is_some()
  }

  pub fn find(&self, code: SpecialtyCode) -> Result<&Specialty> {
    self
      .position(code)
      .map(|idx| &self.records[idx])
      .ok_or(Error::SpecialtyNotFound(code))
  }

  /// Replace name and description. The name must not be blank.
  pub fn update(
    &mut self,
    code: SpecialtyCode,
    name: impl Into<String>,
    description: Option<String>,
  ) -> Result<&Specialty> {
    let idx = self.position(code).ok_or(Error::SpecialtyNotFound(code))?;
    let name = name.into();
    require("specialty name", &name)?;

    let specialty = &mut self.records[idx];
    specialty.name = name;
    specialty.description = normalize(description);
    Ok(&*specialty)
  }

  /// Remove a specialty that no active appointment refers to.
  pub fn remove(
    &mut self,
    code: SpecialtyCode,
    refs: &impl ActiveReferences,
  ) -> Result<Specialty> {
    let idx = self.position(code).ok_or(Error::SpecialtyNotFound(code))?;
    let active = refs.count_active_for_specialty(code);
    if active > 0 {
      return Err(Error::SpecialtyInUse { code, active });
    }
    Ok(self.records.remove(idx))
  }

  pub fn list_all(&self) -> &[Specialty] { &self.records }

  pub fn len(&self) -> usize { self.records.len() }

  pub fn is_empty(&self) -> bool { self.records.is_empty() }

  fn position(&self, code: SpecialtyCode) -> Option<usize> {
    self.records.iter().position(|s| s.code == code)
  }
}
