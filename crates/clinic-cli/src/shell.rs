//! Line-based menu shell over a [`Clinic`].
//!
//! The shell is generic over its input and output so the whole dialogue can be
//! driven from a byte buffer in tests. Core errors are printed and the menu
//! continues; only I/O failures end the loop. End of input quits cleanly.

use std::{
  io::{BufRead, Write},
  str::FromStr,
};

use anyhow::{Context as _, Result};
use chrono::Local;
use clinic_core::{
  Clinic, Error,
  appointment::{Appointment, AppointmentCode},
  patient::{Patient, PatientField, PatientId},
  schedule::Slot,
  specialty::{Specialty, SpecialtyCode},
};

const MAIN_MENU: &str = "\
MAIN MENU
1) Specialties
2) Patients
3) Appointments
4) Export (JSON)
5) Quit";

const SPECIALTIES_MENU: &str = "\
--- Specialties ---
1) Register
2) Modify
3) Delete
4) List all
5) Find by code
6) Back";

const PATIENTS_MENU: &str = "\
--- Patients ---
1) Register
2) Modify
3) Delete
4) List all
5) Find by ID
6) Back";

const APPOINTMENTS_MENU: &str = "\
--- Appointments ---
1) Create
2) Reschedule
3) Cancel
4) List all
5) Search
6) Back";

const SEARCH_MENU: &str = "\
1) By patient ID
2) By date
3) By specialty code";

pub struct Shell<'c, R, W> {
  input:  R,
  out:    W,
  clinic: &'c mut Clinic,
  /// Suppress menus and prompt labels.
  quiet:  bool,
}

impl<'c, R: BufRead, W: Write> Shell<'c, R, W> {
  pub fn new(input: R, out: W, clinic: &'c mut Clinic) -> Self {
    Self {
      input,
      out,
      clinic,
      quiet: false,
    }
  }

  pub fn quiet(mut self, quiet: bool) -> Self {
    self.quiet = quiet;
    self
  }

  pub fn run(&mut self) -> Result<()> {
    loop {
      self.menu(MAIN_MENU)?;
      let Some(choice) = self.prompt("Choose an option")? else {
        return Ok(());
      };
      match choice.trim() {
        "1" => self.specialties_menu()?,
        "2" => self.patients_menu()?,
        "3" => self.appointments_menu()?,
        "4" => self.export()?,
        "5" => return Ok(()),
        _ => self.say("Invalid option.")?,
      }
    }
  }

  // ── Specialties ───────────────────────────────────────────────────────────

  fn specialties_menu(&mut self) -> Result<()> {
    loop {
      self.menu(SPECIALTIES_MENU)?;
      let Some(choice) = self.prompt("Choose an option")? else {
        return Ok(());
      };
      match choice.trim() {
        "1" => self.register_specialty()?,
        "2" => self.modify_specialty()?,
        "3" => self.delete_specialty()?,
        "4" => self.list_specialties()?,
        "5" => self.find_specialty()?,
        "6" => return Ok(()),
        _ => self.say("Invalid option.")?,
      }
    }
  }

  fn register_specialty(&mut self) -> Result<()> {
    let Some(name) = self.prompt("Name")? else { return Ok(()) };
    let Some(description) = self.prompt("Description (optional)")? else {
      return Ok(());
    };
    let outcome = self
      .clinic
      .register_specialty(name, Some(description))
      .map(|s| format!("Specialty {} registered.", s.code));
    self.report(outcome)
  }

  fn modify_specialty(&mut self) -> Result<()> {
    let Some(code) = self.prompt_number("Specialty code")?.map(SpecialtyCode) else {
      return Ok(());
    };
    let current = match self.clinic.find_specialty(code) {
      Ok(s) => s.name.clone(),
      Err(e) => return self.say(&format!("Error: {e}")),
    };
    self.say(&format!("Current name: {current}"))?;
    let Some(name) = self.prompt("New name")? else { return Ok(()) };
    let Some(description) = self.prompt("New description")? else {
      return Ok(());
    };
    let outcome = self
      .clinic
      .update_specialty(code, name, Some(description))
      .map(|s| format!("Specialty {} updated.", s.code));
    self.report(outcome)
  }

  fn delete_specialty(&mut self) -> Result<()> {
    let Some(code) = self.prompt_number("Specialty code")?.map(SpecialtyCode) else {
      return Ok(());
    };
    let outcome = self
      .clinic
      .remove_specialty(code)
      .map(|s| format!("Specialty {} deleted.", s.code));
    self.report(outcome)
  }

  fn list_specialties(&mut self) -> Result<()> {
    let lines: Vec<String> =
      self.clinic.specialties().iter().map(format_specialty).collect();
    self.listing(lines, "No specialties registered.")
  }

  fn find_specialty(&mut self) -> Result<()> {
    let Some(code) = self.prompt_number("Specialty code")?.map(SpecialtyCode) else {
      return Ok(());
    };
    let outcome = self.clinic.find_specialty(code).map(format_specialty);
    self.report(outcome)
  }

  // ── Patients ──────────────────────────────────────────────────────────────

  fn patients_menu(&mut self) -> Result<()> {
    loop {
      self.menu(PATIENTS_MENU)?;
      let Some(choice) = self.prompt("Choose an option")? else {
        return Ok(());
      };
      match choice.trim() {
        "1" => self.register_patient()?,
        "2" => self.modify_patient()?,
        "3" => self.delete_patient()?,
        "4" => self.list_patients()?,
        "5" => self.find_patient()?,
        "6" => return Ok(()),
        _ => self.say("Invalid option.")?,
      }
    }
  }

  /// Aborts at the first blank answer or as soon as the ID is known to be
  /// taken, before asking for the rest.
  fn register_patient(&mut self) -> Result<()> {
    let Some(last_name) = self.prompt_required("Last name", "last name")? else {
      return Ok(());
    };
    let Some(first_name) = self.prompt_required("First name", "first name")?
    else {
      return Ok(());
    };
    let Some(id) = self.prompt_required("Patient ID", "patient id")? else {
      return Ok(());
    };
    let id = PatientId::from(id);
    if self.clinic.find_patient(&id).is_ok() {
      return self.report(Err(Error::DuplicatePatient(id)));
    }
    let Some(phone) = self.prompt_required("Phone", "phone")? else {
      return Ok(());
    };
    let outcome = self
      .clinic
      .register_patient(Patient::new(id, last_name, first_name, phone))
      .map(|p| format!("Patient {} registered.", p.id));
    self.report(outcome)
  }

  fn modify_patient(&mut self) -> Result<()> {
    let Some(id) = self.prompt("Patient ID")?.map(PatientId::from) else {
      return Ok(());
    };
    let found = match self.clinic.find_patient(&id) {
      Ok(p) => format!("Found: {}, {}", p.last_name, p.first_name),
      Err(e) => return self.say(&format!("Error: {e}")),
    };
    self.say(&found)?;
    self.menu("1) First name\n2) Last name\n3) Phone")?;
    let Some(choice) = self.prompt("Field to change")? else {
      return Ok(());
    };
    let field = match choice.trim() {
      "1" => PatientField::FirstName,
      "2" => PatientField::LastName,
      "3" => PatientField::Phone,
      _ => return self.say("Invalid option."),
    };
    let Some(value) = self.prompt("New value")? else { return Ok(()) };
    let outcome = self
      .clinic
      .update_patient(&id, field, value)
      .map(|p| format!("Patient {} updated.", p.id));
    self.report(outcome)
  }

  fn delete_patient(&mut self) -> Result<()> {
    let Some(id) = self.prompt("Patient ID")?.map(PatientId::from) else {
      return Ok(());
    };
    let outcome = self
      .clinic
      .remove_patient(&id)
      .map(|p| format!("Patient {} deleted.", p.id));
    self.report(outcome)
  }

  fn list_patients(&mut self) -> Result<()> {
    let lines: Vec<String> = self.clinic.patients().iter().map(format_patient).collect();
    self.listing(lines, "No patients registered.")
  }

  fn find_patient(&mut self) -> Result<()> {
    let Some(id) = self.prompt("Patient ID")?.map(PatientId::from) else {
      return Ok(());
    };
    let outcome = self.clinic.find_patient(&id).map(format_patient);
    self.report(outcome)
  }

  // ── Appointments ──────────────────────────────────────────────────────────

  fn appointments_menu(&mut self) -> Result<()> {
    loop {
      self.menu(APPOINTMENTS_MENU)?;
      let Some(choice) = self.prompt("Choose an option")? else {
        return Ok(());
      };
      match choice.trim() {
        "1" => self.create_appointment()?,
        "2" => self.reschedule_appointment()?,
        "3" => self.cancel_appointment()?,
        "4" => self.list_appointments()?,
        "5" => self.search_appointments()?,
        "6" => return Ok(()),
        _ => self.say("Invalid option.")?,
      }
    }
  }

  fn create_appointment(&mut self) -> Result<()> {
    if self.clinic.patients().is_empty() {
      return self.say("No patients registered.");
    }
    if self.clinic.specialties().is_empty() {
      return self.say("No specialties registered.");
    }
    let Some(id) = self.prompt("Patient ID")?.map(PatientId::from) else {
      return Ok(());
    };
    if let Err(e) = self.clinic.find_patient(&id).map(|_| ()) {
      return self.report(Err(e));
    }
    let Some(code) = self.prompt_number("Specialty code")?.map(SpecialtyCode) else {
      return Ok(());
    };
    if let Err(e) = self.clinic.find_specialty(code).map(|_| ()) {
      return self.report(Err(e));
    }
    let Some(slot) = self.prompt_slot()? else { return Ok(()) };
    let outcome = self
      .clinic
      .create_appointment(id, code, slot)
      .map(|a| format!("Appointment {} created.", a.code));
    self.report(outcome)
  }

  fn reschedule_appointment(&mut self) -> Result<()> {
    let Some(code) = self.prompt_number("Appointment code")?.map(AppointmentCode)
    else {
      return Ok(());
    };
    let current = match self.clinic.find_appointment(code) {
      Ok(a) => format_appointment(a),
      Err(e) => return self.say(&format!("Error: {e}")),
    };
    self.say(&current)?;
    let Some(slot) = self.prompt_slot()? else { return Ok(()) };
    let outcome = self
      .clinic
      .modify_appointment(code, slot)
      .map(|a| format!("Appointment {} rescheduled to {}.", a.code, a.slot));
    self.report(outcome)
  }

  fn cancel_appointment(&mut self) -> Result<()> {
    let Some(code) = self.prompt_number("Appointment code")?.map(AppointmentCode)
    else {
      return Ok(());
    };
    let outcome = self
      .clinic
      .cancel_appointment(code, &Local::now())
      .map(|a| format!("Appointment {} cancelled.", a.code));
    self.report(outcome)
  }

  fn list_appointments(&mut self) -> Result<()> {
    let lines: Vec<String> =
      self.clinic.appointments().iter().map(format_appointment).collect();
    self.listing(lines, "No appointments registered.")
  }

  fn search_appointments(&mut self) -> Result<()> {
    self.menu(SEARCH_MENU)?;
    let Some(choice) = self.prompt("Choose an option")? else {
      return Ok(());
    };
    let found = match choice.trim() {
      "1" => {
        let Some(id) = self.prompt("Patient ID")?.map(PatientId::from) else {
          return Ok(());
        };
        self.clinic.appointments_for_patient(&id)
      }
      "2" => {
        let Some(day) = self.prompt_number("Day")? else { return Ok(()) };
        let Some(month) = self.prompt_number("Month")? else { return Ok(()) };
        let Some(year) = self.prompt_number("Year")? else { return Ok(()) };
        self.clinic.appointments_on(day, month, year)
      }
      "3" => {
        let Some(code) = self.prompt_number("Specialty code")?.map(SpecialtyCode)
        else {
          return Ok(());
        };
        self.clinic.appointments_for_specialty(code)
      }
      _ => return self.say("Invalid option."),
    };
    let lines: Vec<String> = found.into_iter().map(format_appointment).collect();
    self.listing(lines, "No matching appointments.")
  }

  // ── Export ────────────────────────────────────────────────────────────────

  fn export(&mut self) -> Result<()> {
    let json = serde_json::to_string_pretty(&self.clinic.snapshot())
      .context("serialising snapshot")?;
    self.say(&json)
  }

  // ── I/O helpers ───────────────────────────────────────────────────────────

  fn say(&mut self, text: &str) -> Result<()> {
    writeln!(self.out, "{text}").context("writing output")
  }

  fn menu(&mut self, text: &str) -> Result<()> {
    if self.quiet {
      return Ok(());
    }
    self.say(text)
  }

  fn report(&mut self, outcome: clinic_core::Result<String>) -> Result<()> {
    match outcome {
      Ok(msg) => self.say(&msg),
      Err(e) => self.say(&format!("Error: {e}")),
    }
  }

  fn listing(&mut self, lines: Vec<String>, empty: &str) -> Result<()> {
    if lines.is_empty() {
      return self.say(empty);
    }
    for line in lines {
      self.say(&line)?;
    }
    Ok(())
  }

  /// Read one line without its terminator. `None` at end of input.
  fn prompt(&mut self, label: &str) -> Result<Option<String>> {
    if !self.quiet {
      write!(self.out, "{label}: ").context("writing prompt")?;
      self.out.flush().context("flushing prompt")?;
    }
    let mut line = String::new();
    if self.input.read_line(&mut line).context("reading input")? == 0 {
      return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_owned()))
  }

  /// Like [`Self::prompt`], but a blank answer is reported and yields `None`.
  fn prompt_required(
    &mut self,
    label: &str,
    field: &'static str,
  ) -> Result<Option<String>> {
    let Some(value) = self.prompt(label)? else { return Ok(None) };
    if value.trim().is_empty() {
      self.report(Err(Error::BlankField { field }))?;
      return Ok(None);
    }
    Ok(Some(value))
  }

  /// Re-prompt until the answer parses as `T`.
  fn prompt_number<T: FromStr>(&mut self, label: &str) -> Result<Option<T>> {
    loop {
      let Some(raw) = self.prompt(label)? else { return Ok(None) };
      match raw.trim().parse() {
        Ok(value) => return Ok(Some(value)),
        Err(_) => self.say("Please enter a number.")?,
      }
    }
  }

  fn prompt_slot(&mut self) -> Result<Option<Slot>> {
    let Some(day) = self.prompt_number("Day")? else { return Ok(None) };
    let Some(month) = self.prompt_number("Month")? else { return Ok(None) };
    let Some(year) = self.prompt_number("Year")? else { return Ok(None) };
    let Some(hour) = self.prompt_number("Hour (0-23)")? else { return Ok(None) };
    let Some(minute) = self.prompt_number("Minute (0-59)")? else {
      return Ok(None);
    };
    Ok(Some(Slot::new(day, month, year, hour, minute)))
  }
}

// ─── Formatting ──────────────────────────────────────────────────────────────

fn format_patient(p: &Patient) -> String {
  format!(
    "Last name: {} | First name: {} | ID: {} | Phone: {}",
    p.last_name, p.first_name, p.id, p.phone
  )
}

fn format_specialty(s: &Specialty) -> String {
  format!(
    "Code: {} | Name: {} | Description: {}",
    s.code,
    s.name,
    s.description.as_deref().unwrap_or("-")
  )
}

fn format_appointment(a: &Appointment) -> String {
  let s = &a.slot;
  format!(
    "Code: {} | {:02}/{:02}/{:04} | {:02}:{:02} | Patient: {} | Specialty: {} | {}",
    a.code,
    s.day,
    s.month,
    s.year,
    s.hour,
    s.minute,
    a.patient_id,
    a.specialty,
    a.status.to_string().to_uppercase()
  )
}
