//! Engine Module
//!
//! The storage-engine context: both table stores plus the one piece of
//! cross-table logic, the appointment → doctor foreign-key check.
//!
//! ## Responsibilities
//! - Own the doctors and appointments table stores
//! - Enforce referential integrity on appointment add
//! - Expose the typed collaborator interface consumed by the CLI and the
//!   query layer
//!
//! The engine is constructed explicitly at startup and passed around; there
//! is no ambient or static state.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::config::Config;
use crate::error::{Result, StoreError};
use crate::records::{fields, Appointment, Doctor, APPOINTMENT_SCHEMA, DOCTOR_SCHEMA};
use crate::store::{TableStore, UpdateOutcome};

/// The storage engine: doctors + appointments over one data directory
#[derive(Debug)]
pub struct Engine {
    config: Config,
    doctors: TableStore,
    appointments: TableStore,
}

impl Engine {
    /// Open or create an engine with the given config.
    ///
    /// On startup:
    /// 1. Create the data directory if it doesn't exist
    /// 2. Open both table stores (rehydrates indexes and free lists)
    pub fn open(config: Config) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)?;

        let doctors = TableStore::open(&config.data_dir, &DOCTOR_SCHEMA)?;
        let appointments = TableStore::open(&config.data_dir, &APPOINTMENT_SCHEMA)?;

        info!(data_dir = %config.data_dir.display(), "engine opened");
        Ok(Self {
            config,
            doctors,
            appointments,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    // =========================================================================
    // Doctors
    // =========================================================================

    /// Add a doctor; returns the assigned id
    pub fn add_doctor(&mut self, name: &str, address: &str) -> Result<String> {
        self.doctors.add(&[name, address])
    }

    /// Update a doctor's name.
    ///
    /// A name that no longer fits the record's slot forces a delete +
    /// re-add, reported as `UpdateOutcome::Reinserted` — the doctor then
    /// lives under a new id.
    pub fn update_doctor_name(&mut self, id: &str, new_name: &str) -> Result<UpdateOutcome> {
        self.doctors.update_field(id, fields::DOCTOR_NAME, new_name)
    }

    /// Delete a doctor by id
    pub fn delete_doctor(&mut self, id: &str) -> Result<()> {
        self.doctors.delete(id)
    }

    /// Look up one doctor by id
    pub fn doctor_by_id(&self, id: &str) -> Result<Doctor> {
        Doctor::from_row(self.doctors.get(id)?)
    }

    /// All doctors sharing a name (secondary index), in insertion order
    pub fn doctors_by_name(&self, name: &str) -> Result<Vec<Doctor>> {
        self.doctors
            .find_by_secondary(name)?
            .into_iter()
            .map(Doctor::from_row)
            .collect()
    }

    /// All doctors at an address (full scan — the address is unindexed)
    pub fn doctors_by_address(&self, address: &str) -> Result<Vec<Doctor>> {
        self.doctors
            .scan_by_field(fields::DOCTOR_ADDRESS, address)?
            .map(|row| Doctor::from_row(row?))
            .collect()
    }

    /// All active doctors in file order
    pub fn all_doctors(&self) -> Result<Vec<Doctor>> {
        self.doctors.scan()?.map(|row| Doctor::from_row(row?)).collect()
    }

    /// Whether a doctor exists (the cross-table existence check)
    pub fn doctor_exists(&self, id: &str) -> bool {
        self.doctors.contains(id)
    }

    // =========================================================================
    // Appointments
    // =========================================================================

    /// Add an appointment; rejects an unknown doctor id before any file or
    /// index is touched
    pub fn add_appointment(&mut self, date: &str, doctor_id: &str) -> Result<String> {
        if !self.doctor_exists(doctor_id) {
            return Err(StoreError::UnknownDoctor(doctor_id.to_string()));
        }
        self.appointments.add(&[date, doctor_id])
    }

    /// Update an appointment's date (same grow/reinsert behavior as
    /// [`Engine::update_doctor_name`])
    pub fn update_appointment_date(&mut self, id: &str, new_date: &str) -> Result<UpdateOutcome> {
        self.appointments
            .update_field(id, fields::APPOINTMENT_DATE, new_date)
    }

    /// Delete an appointment by id
    pub fn delete_appointment(&mut self, id: &str) -> Result<()> {
        self.appointments.delete(id)
    }

    /// Look up one appointment by id
    pub fn appointment_by_id(&self, id: &str) -> Result<Appointment> {
        Appointment::from_row(self.appointments.get(id)?)
    }

    /// All appointments of one doctor (secondary index), in insertion order
    pub fn appointments_by_doctor(&self, doctor_id: &str) -> Result<Vec<Appointment>> {
        self.appointments
            .find_by_secondary(doctor_id)?
            .into_iter()
            .map(Appointment::from_row)
            .collect()
    }

    /// All appointments on a date (full scan — the date is unindexed)
    pub fn appointments_by_date(&self, date: &str) -> Result<Vec<Appointment>> {
        self.appointments
            .scan_by_field(fields::APPOINTMENT_DATE, date)?
            .map(|row| Appointment::from_row(row?))
            .collect()
    }

    /// All active appointments in file order
    pub fn all_appointments(&self) -> Result<Vec<Appointment>> {
        self.appointments
            .scan()?
            .map(|row| Appointment::from_row(row?))
            .collect()
    }

    // =========================================================================
    // Accessors (for the query layer, testing, and debugging)
    // =========================================================================

    /// The doctors table store
    pub fn doctors(&self) -> &TableStore {
        &self.doctors
    }

    /// The appointments table store
    pub fn appointments(&self) -> &TableStore {
        &self.appointments
    }

    /// The configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
