//! Core types and operations for the clinic scheduler.
//!
//! This crate holds the patient and specialty registries, the appointment
//! ledger and the scheduling policy. It performs no I/O; the interactive shell
//! in `clinic-cli` is the only layer that talks to a terminal.

pub mod appointment;
pub mod clinic;
pub mod error;
pub mod patient;
pub mod schedule;
pub mod specialty;
pub mod store;

pub use clinic::{Clinic, ClinicConfig, Snapshot};
pub use error::{Error, ErrorKind, Result};

#[cfg(test)]
mod tests;
