//! Lookup traits that couple the registries and the appointment ledger.
//!
//! Registries and the ledger never hold references to each other. Cross-store
//! checks go through these traits, so each store can be exercised on its own
//! with a stub on the other side.

use crate::{patient::PatientId, specialty::SpecialtyCode};

/// Active-appointment counts, consulted before a patient or specialty is
/// removed.
pub trait ActiveReferences {
  fn count_active_for_patient(&self, id: &PatientId) -> usize;

  fn count_active_for_specialty(&self, code: SpecialtyCode) -> usize;
}

/// Existence checks, consulted before an appointment is booked.
pub trait Directory {
  fn has_patient(&self, id: &PatientId) -> bool;

  fn has_specialty(&self, code: SpecialtyCode) -> bool;
}
