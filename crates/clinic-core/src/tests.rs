//! Scenario tests over the [`Clinic`] context.

use chrono::{
  DateTime, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc,
};

use crate::{
  Clinic, ClinicConfig, Error, ErrorKind,
  appointment::{AppointmentCode, AppointmentStatus},
  patient::{Patient, PatientField, PatientId},
  schedule::Slot,
  specialty::SpecialtyCode,
};

fn now() -> DateTime<Utc> { Utc.with_ymd_and_hms(2030, 6, 1, 12, 0, 0).unwrap() }

fn ana() -> Patient { Patient::new("30111222", "Perez", "Ana", "1122334455") }

fn far_future() -> Slot { Slot::new(31, 12, 2999, 10, 0) }

/// A clinic with Ana registered and "Cardiologia" as specialty 1.
fn clinic() -> Clinic {
  let mut c = Clinic::new();
  c.register_patient(ana()).unwrap();
  c.register_specialty("Cardiologia", None).unwrap();
  c
}

// ─── DST fixture ─────────────────────────────────────────────────────────────

/// A zone at -05:00 that moves to -04:00 for summer 2030, switching at the
/// US Eastern instants: 10/03 02:00 local forward, 03/11 02:00 local back.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Eastern2030;

impl Eastern2030 {
  fn standard() -> FixedOffset { FixedOffset::west_opt(5 * 3600).unwrap() }

  fn summer() -> FixedOffset { FixedOffset::west_opt(4 * 3600).unwrap() }

  fn utc(month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2030, month, day)
      .unwrap()
      .and_hms_opt(hour, 0, 0)
      .unwrap()
  }
}

impl TimeZone for Eastern2030 {
  type Offset = FixedOffset;

  fn from_offset(_: &FixedOffset) -> Self { Eastern2030 }

  fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
    self.offset_from_local_datetime(&local.and_hms_opt(0, 0, 0).unwrap())
  }

  fn offset_from_local_datetime(
    &self,
    local: &NaiveDateTime,
  ) -> LocalResult<FixedOffset> {
    // Summer first: for a repeated time it is the earlier instant.
    let fits: Vec<FixedOffset> = [Self::summer(), Self::standard()]
      .into_iter()
      .filter(|off| {
        let utc = *local - chrono::Duration::seconds(off.local_minus_utc().into());
        self.offset_from_utc_datetime(&utc) == *off
      })
      .collect();
    match fits[..] {
      [] => LocalResult::None,
      [one] => LocalResult::Single(one),
      [first, second, ..] => LocalResult::Ambiguous(first, second),
    }
  }

  fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
    self.offset_from_utc_datetime(&utc.and_hms_opt(0, 0, 0).unwrap())
  }

  fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
    if (Self::utc(3, 10, 7)..Self::utc(11, 3, 6)).contains(utc) {
      Self::summer()
    } else {
      Self::standard()
    }
  }
}

// ─── Walkthrough ─────────────────────────────────────────────────────────────

#[test]
fn register_book_and_cancel_walkthrough() {
  let mut c = Clinic::new();
  c.register_patient(ana()).unwrap();
  let cardio = c.register_specialty("Cardiologia", None).unwrap().code;
  assert_eq!(cardio, SpecialtyCode(1));

  let code = c
    .create_appointment("30111222", cardio, far_future())
    .unwrap()
    .code;
  assert_eq!(code, AppointmentCode(1));

  let err = c
    .create_appointment("30111222", cardio, Slot::new(1, 1, 2999, 9, 0))
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::DuplicateActive);

  c.cancel_appointment(code, &now()).unwrap();
  assert_eq!(
    c.find_appointment(code).unwrap().status,
    AppointmentStatus::Cancelled
  );

  let err = c.cancel_appointment(code, &now()).unwrap_err();
  assert_eq!(err.kind(), ErrorKind::InvalidState);
  assert_eq!(
    c.find_appointment(code).unwrap().status,
    AppointmentStatus::Cancelled
  );
}

#[test]
fn rebooking_after_cancellation_succeeds() {
  let mut c = clinic();
  let first = c
    .create_appointment("30111222", SpecialtyCode(1), far_future())
    .unwrap()
    .code;
  c.cancel_appointment(first, &now()).unwrap();

  let second = c
    .create_appointment("30111222", SpecialtyCode(1), far_future())
    .unwrap()
    .code;
  assert_eq!(second, AppointmentCode(2));
  assert_eq!(c.appointments().len(), 2);
}

#[test]
fn impossible_date_is_accepted_until_cancellation() {
  let mut c = clinic();
  let code = c
    .create_appointment("30111222", SpecialtyCode(1), Slot::new(31, 2, 2999, 10, 0))
    .unwrap()
    .code;

  // Rescheduling to another impossible date is allowed too.
  c.modify_appointment(code, Slot::new(30, 2, 2999, 10, 0)).unwrap();

  let err = c.cancel_appointment(code, &now()).unwrap_err();
  assert!(matches!(err, Error::DateConversion(_)));
  assert!(c.find_appointment(code).unwrap().is_active());
}

// ─── Cross-store guards ──────────────────────────────────────────────────────

#[test]
fn booking_requires_both_references() {
  let mut c = clinic();
  let err = c
    .create_appointment("99999999", SpecialtyCode(1), far_future())
    .unwrap_err();
  assert!(matches!(err, Error::PatientNotFound(_)));

  let err = c
    .create_appointment("30111222", SpecialtyCode(2), far_future())
    .unwrap_err();
  assert!(matches!(err, Error::SpecialtyNotFound(SpecialtyCode(2))));
  assert!(c.appointments().is_empty());
}

#[test]
fn duplicate_check_precedes_range_check() {
  let mut c = clinic();
  c.create_appointment("30111222", SpecialtyCode(1), far_future())
    .unwrap();
  let err = c
    .create_appointment("30111222", SpecialtyCode(1), Slot::new(40, 1, 1000, 0, 0))
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::DuplicateActive);
}

#[test]
fn patient_removal_is_blocked_by_active_appointments_only() {
  let mut c = clinic();
  let id = PatientId::from("30111222");
  let code = c
    .create_appointment(id.clone(), SpecialtyCode(1), far_future())
    .unwrap()
    .code;

  let err = c.remove_patient(&id).unwrap_err();
  assert!(matches!(err, Error::PatientInUse { active: 1, .. }));
  assert!(c.find_patient(&id).is_ok());

  c.cancel_appointment(code, &now()).unwrap();
  let removed = c.remove_patient(&id).unwrap();
  assert_eq!(removed, ana());
  assert_eq!(c.find_patient(&id).unwrap_err().kind(), ErrorKind::NotFound);

  // The cancelled appointment still references the removed patient.
  assert_eq!(c.appointments_for_patient(&id).len(), 1);
}

#[test]
fn specialty_removal_is_blocked_by_active_appointments_only() {
  let mut c = clinic();
  let code = c
    .create_appointment("30111222", SpecialtyCode(1), far_future())
    .unwrap()
    .code;

  let err = c.remove_specialty(SpecialtyCode(1)).unwrap_err();
  assert_eq!(err.kind(), ErrorKind::InUse);

  c.cancel_appointment(code, &now()).unwrap();
  c.remove_specialty(SpecialtyCode(1)).unwrap();
  assert!(c.specialties().is_empty());

  // Codes keep counting after a removal.
  let next = c.register_specialty("Pediatria", None).unwrap().code;
  assert_eq!(next, SpecialtyCode(2));
}

// ─── Cancellation window ─────────────────────────────────────────────────────

#[test]
fn cancellation_window_boundary() {
  let mut c = clinic();
  let code = c
    .create_appointment("30111222", SpecialtyCode(1), Slot::new(3, 6, 2030, 12, 0))
    .unwrap()
    .code;

  let one_minute_short = Utc.with_ymd_and_hms(2030, 6, 1, 12, 1, 0).unwrap();
  let err = c.cancel_appointment(code, &one_minute_short).unwrap_err();
  assert_eq!(err.kind(), ErrorKind::CancellationWindow);
  assert!(c.find_appointment(code).unwrap().is_active());

  c.cancel_appointment(code, &now()).unwrap();
}

#[test]
fn past_appointments_cannot_be_cancelled() {
  let mut c = clinic();
  let code = c
    .create_appointment("30111222", SpecialtyCode(1), Slot::new(1, 1, 2000, 8, 0))
    .unwrap()
    .code;
  let err = c.cancel_appointment(code, &now()).unwrap_err();
  assert!(matches!(
    err,
    Error::CancellationWindow { minutes_until, .. } if minutes_until < 0
  ));
}

#[test]
fn slot_in_a_spring_forward_gap_can_be_cancelled() {
  let mut c = clinic();
  let code = c
    .create_appointment("30111222", SpecialtyCode(1), Slot::new(10, 3, 2030, 2, 30))
    .unwrap()
    .code;

  let january = Eastern2030.with_ymd_and_hms(2030, 1, 1, 12, 0, 0).unwrap();
  c.cancel_appointment(code, &january).unwrap();
  assert!(!c.find_appointment(code).unwrap().is_active());
}

#[test]
fn slot_in_a_spring_forward_gap_still_needs_notice() {
  let mut c = clinic();
  let code = c
    .create_appointment("30111222", SpecialtyCode(1), Slot::new(10, 3, 2030, 2, 30))
    .unwrap()
    .code;

  // 03:30 summer time on the 10th is 47h after 03:30 standard time on the 8th.
  let too_late = Eastern2030.with_ymd_and_hms(2030, 3, 8, 3, 30, 0).unwrap();
  let err = c.cancel_appointment(code, &too_late).unwrap_err();
  assert!(matches!(
    err,
    Error::CancellationWindow { minutes_until, .. } if minutes_until == 47 * 60
  ));
}

// ─── Atomicity ───────────────────────────────────────────────────────────────

#[test]
fn failed_calls_leave_state_unchanged() {
  let mut c = clinic();
  let code = c
    .create_appointment("30111222", SpecialtyCode(1), far_future())
    .unwrap()
    .code;
  let before = format!("{:?}", c.snapshot());

  assert!(c.register_patient(ana()).is_err());
  assert!(c.register_specialty("", Some("x".into())).is_err());
  assert!(c.update_patient(&"30111222".into(), PatientField::Phone, " ").is_err());
  assert!(c.update_specialty(SpecialtyCode(1), "", None).is_err());
  assert!(c.remove_patient(&"30111222".into()).is_err());
  assert!(c.remove_specialty(SpecialtyCode(1)).is_err());
  assert!(c.modify_appointment(code, Slot::new(1, 1, 1899, 0, 0)).is_err());
  assert!(c.create_appointment("30111222", SpecialtyCode(1), far_future()).is_err());
  let soon = Utc.with_ymd_and_hms(2999, 12, 30, 10, 0, 0).unwrap();
  assert!(c.cancel_appointment(code, &soon).is_err());

  assert_eq!(format!("{:?}", c.snapshot()), before);

  // Failed bookings did not consume a code.
  c.cancel_appointment(code, &now()).unwrap();
  let next = c
    .create_appointment("30111222", SpecialtyCode(1), far_future())
    .unwrap()
    .code;
  assert_eq!(next, AppointmentCode(2));
}

// ─── Queries ─────────────────────────────────────────────────────────────────

#[test]
fn listing_and_filters() {
  let mut c = clinic();
  c.register_patient(Patient::new("2", "Gomez", "Luis", "1"))
    .unwrap();
  c.register_specialty("Pediatria", Some("Kids".into())).unwrap();

  c.create_appointment("30111222", SpecialtyCode(1), far_future())
    .unwrap();
  c.create_appointment("2", SpecialtyCode(2), Slot::new(1, 1, 2999, 9, 0))
    .unwrap();
  c.create_appointment("30111222", SpecialtyCode(2), Slot::new(1, 1, 2999, 11, 0))
    .unwrap();

  let codes = |v: Vec<&crate::appointment::Appointment>| {
    v.iter().map(|a| a.code.0).collect::<Vec<_>>()
  };
  assert_eq!(codes(c.appointments_for_patient(&"30111222".into())), [1, 3]);
  assert_eq!(codes(c.appointments_on(1, 1, 2999)), [2, 3]);
  assert_eq!(codes(c.appointments_for_specialty(SpecialtyCode(2))), [2, 3]);
  assert!(c.appointments_on(2, 1, 2999).is_empty());
  assert_eq!(c.patients().len(), 2);
}

#[test]
fn empty_clinic_lists_nothing() {
  let c = Clinic::new();
  assert!(c.patients().is_empty());
  assert!(c.specialties().is_empty());
  assert!(c.appointments().is_empty());
  assert_eq!(
    c.find_appointment(AppointmentCode(1)).unwrap_err().kind(),
    ErrorKind::NotFound
  );
}

#[test]
fn configured_limits_apply() {
  let config = ClinicConfig {
    max_patients:    Some(1),
    max_specialties: Some(1),
  };
  let mut c = Clinic::with_config(&config);
  c.register_patient(ana()).unwrap();
  c.register_specialty("Cardiologia", None).unwrap();

  let err = c
    .register_patient(Patient::new("2", "Gomez", "Luis", "1"))
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::CapacityExceeded);
  let err = c.register_specialty("Pediatria", None).unwrap_err();
  assert_eq!(err.kind(), ErrorKind::CapacityExceeded);
}

#[test]
fn error_kinds_display_in_snake_case() {
  assert_eq!(ErrorKind::CancellationWindow.to_string(), "cancellation_window");
  assert_eq!(ErrorKind::NotFound.to_string(), "not_found");
}
