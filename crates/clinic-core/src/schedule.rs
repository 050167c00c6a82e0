//! Scheduling policy: date/time range checks and the cancellation notice rule.
//!
//! Appointment times are stored as plain civil components. They are only
//! range-checked on entry; conversion to an absolute instant happens when a
//! cancellation needs to know how far away the appointment is. A slot such as
//! 31 February therefore books fine and only fails at cancellation time.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Offset, TimeZone};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Minimum notice, in minutes, required to cancel an appointment.
pub const CANCELLATION_NOTICE_MINUTES: i64 = 48 * 60;

/// Earliest year accepted for an appointment.
pub const MIN_YEAR: i32 = 1900;

// ─── Slot ────────────────────────────────────────────────────────────────────

/// A civil date and time of day, as entered by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
  pub day:    i32,
  pub month:  i32,
  pub year:   i32,
  pub hour:   i32,
  pub minute: i32,
}

impl Slot {
  pub fn new(day: i32, month: i32, year: i32, hour: i32, minute: i32) -> Self {
    Self {
      day,
      month,
      year,
      hour,
      minute,
    }
  }

  /// Coarse range check; see [`validate_date_time`].
  pub fn is_valid(&self) -> bool {
    validate_date_time(self.day, self.month, self.year, self.hour, self.minute)
  }

  pub fn is_on(&self, day: i32, month: i32, year: i32) -> bool {
    self.day == day && self.month == month && self.year == year
  }

  /// Resolve this slot to an instant in `tz`.
  ///
  /// Returns `None` only for dates that do not exist in the calendar. Times
  /// repeated by a DST transition resolve to the earlier instant; times
  /// skipped by one are read with the offset in force before the jump, so
  /// 02:30 in a 02:00 to 03:00 gap lands on 03:30.
  pub fn to_instant<Tz: TimeZone>(&self, tz: &Tz) -> Option<DateTime<Tz>> {
    let date = NaiveDate::from_ymd_opt(
      self.year,
      u32::try_from(self.month).ok()?,
      u32::try_from(self.day).ok()?,
    )?;
    let naive = date.and_hms_opt(
      u32::try_from(self.hour).ok()?,
      u32::try_from(self.minute).ok()?,
      0,
    )?;
    tz.from_local_datetime(&naive)
      .earliest()
      .or_else(|| across_gap(tz, naive))
  }
}

/// Longest forward jump to search past; whole days have been skipped before.
const MAX_GAP_MINUTES: i64 = 26 * 60;

/// Resolve a local time that falls inside a forward DST jump.
fn across_gap<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
  let after = (1..=MAX_GAP_MINUTES)
    .filter_map(|m| naive.checked_add_signed(Duration::minutes(m)))
    .find_map(|t| tz.from_local_datetime(&t).earliest())?;
  let just_before = after.naive_utc().checked_sub_signed(Duration::seconds(1))?;
  let offset = tz.offset_from_utc_datetime(&just_before).fix();
  let utc = naive
    .checked_sub_signed(Duration::seconds(i64::from(offset.local_minus_utc())))?;
  Some(tz.from_utc_datetime(&utc))
}

impl fmt::Display for Slot {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{:02}/{:02}/{:04} {:02}:{:02}",
      self.day, self.month, self.year, self.hour, self.minute
    )
  }
}

// ─── Policy ──────────────────────────────────────────────────────────────────

/// True iff every component is within its declared range.
///
/// Day-of-month is not checked against the month or leap years: 31/02 passes.
pub fn validate_date_time(
  day: i32,
  month: i32,
  year: i32,
  hour: i32,
  minute: i32,
) -> bool {
  (1..=31).contains(&day)
    && (1..=12).contains(&month)
    && year >= MIN_YEAR
    && (0..=23).contains(&hour)
    && (0..=59).contains(&minute)
}

/// Signed whole minutes from `now` until `slot`, with `slot` read as local
/// time in `now`'s time zone. Positive means the slot is in the future.
///
/// Both instants are truncated to the minute before subtracting.
pub fn minutes_until<Tz: TimeZone>(slot: &Slot, now: &DateTime<Tz>) -> Result<i64> {
  let target = slot
    .to_instant(&now.timezone())
    .ok_or(Error::DateConversion(*slot))?;
  Ok(target.timestamp().div_euclid(60) - now.timestamp().div_euclid(60))
}

/// True iff an appointment `minutes_until` minutes away may still be cancelled.
pub fn can_cancel(minutes_until: i64) -> bool {
  minutes_until >= CANCELLATION_NOTICE_MINUTES
}
