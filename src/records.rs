//! Record kinds
//!
//! The two table schemas and their typed row views. A doctor's secondary
//! key is the name; an appointment's secondary key is the doctor id, which
//! doubles as the foreign key into the doctor table.

use crate::error::{Result, StoreError};
use crate::record::TableSchema;

/// Field positions, usable with `TableStore::update_field`/`scan_by_field`
pub mod fields {
    pub const DOCTOR_NAME: usize = 1;
    pub const DOCTOR_ADDRESS: usize = 2;

    pub const APPOINTMENT_DATE: usize = 1;
    pub const APPOINTMENT_DOCTOR_ID: usize = 2;
}

/// Doctors: id | name | address, secondary-indexed by name
pub static DOCTOR_SCHEMA: TableSchema = TableSchema {
    name: "doctors",
    fields: &["id", "name", "address"],
    secondary: Some(fields::DOCTOR_NAME),
};

/// Appointments: id | date | doctor_id, secondary-indexed by doctor id
pub static APPOINTMENT_SCHEMA: TableSchema = TableSchema {
    name: "appointments",
    fields: &["id", "date", "doctor_id"],
    secondary: Some(fields::APPOINTMENT_DOCTOR_ID),
};

/// A doctor row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Doctor {
    pub id: String,
    pub name: String,
    pub address: String,
}

impl Doctor {
    pub(crate) fn from_row(row: Vec<String>) -> Result<Self> {
        match <[String; 3]>::try_from(row) {
            Ok([id, name, address]) => Ok(Self { id, name, address }),
            Err(row) => Err(StoreError::Corrupt(format!(
                "doctor row with {} fields",
                row.len()
            ))),
        }
    }
}

/// An appointment row; `doctor_id` references an existing doctor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appointment {
    pub id: String,
    pub date: String,
    pub doctor_id: String,
}

impl Appointment {
    pub(crate) fn from_row(row: Vec<String>) -> Result<Self> {
        match <[String; 3]>::try_from(row) {
            Ok([id, date, doctor_id]) => Ok(Self {
                id,
                date,
                doctor_id,
            }),
            Err(row) => Err(StoreError::Corrupt(format!(
                "appointment row with {} fields",
                row.len()
            ))),
        }
    }
}
