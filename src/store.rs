//! In-memory appointment store.
//!
//! [`AppointmentStore`] exclusively owns every [`Appointment`] record for the
//! lifetime of the process. Lookups match `customer_name` case-insensitively
//! and `date` exactly; when several records match, the first in insertion
//! order wins. A missing appointment is a normal outcome reported through
//! [`ActionOutcome`], never an error.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// A single salon booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: u32,
    pub customer_name: String,
    pub service: String,
    pub stylist: String,
    /// Calendar date, e.g. `2024-08-15`. Compared as an exact string.
    pub date: String,
    /// Display time, e.g. `10:00 AM`.
    pub time: String,
}

impl Appointment {
    fn new(id: u32, customer_name: &str, service: &str, stylist: &str, date: &str, time: &str) -> Self {
        Self {
            id,
            customer_name: customer_name.to_string(),
            service: service.to_string(),
            stylist: stylist.to_string(),
            date: date.to_string(),
            time: time.to_string(),
        }
    }

    fn belongs_to(&self, customer_name: &str) -> bool {
        self.customer_name.to_lowercase() == customer_name.to_lowercase()
    }
}

/// Result of a reschedule or cancel request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: String,
}

impl ActionOutcome {
    pub fn success(message: String) -> Self {
        Self {
            success: true,
            message,
        }
    }

    pub fn failure(message: String) -> Self {
        Self {
            success: false,
            message,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("duplicate appointment id {0}")]
    DuplicateId(u32),
}

#[derive(Deserialize)]
struct SeedFile {
    #[serde(default)]
    appointments: Vec<Appointment>,
}

/// Ordered collection of live appointments.
#[derive(Debug, Clone, Default)]
pub struct AppointmentStore {
    appointments: Vec<Appointment>,
}

impl AppointmentStore {
    /// Builds a store from the given records, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateId`] if two records share an id.
    pub fn new(appointments: Vec<Appointment>) -> Result<Self, StoreError> {
        for (i, appt) in appointments.iter().enumerate() {
            if appointments[..i].iter().any(|a| a.id == appt.id) {
                return Err(StoreError::DuplicateId(appt.id));
            }
        }
        Ok(Self { appointments })
    }

    /// Loads the starting bookings from a TOML file of `[[appointments]]`.
    pub fn from_seed_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read seed file {:?}", path))?;
        let seed: SeedFile = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse seed file {:?}", path))?;
        let store = Self::new(seed.appointments)
            .with_context(|| format!("Invalid seed file {:?}", path))?;
        tracing::info!(count = store.len(), path = %path.display(), "loaded appointments");
        Ok(store)
    }

    /// Builds the store with the salon's built-in bookings.
    pub fn seeded() -> Self {
        Self {
            appointments: seed_appointments(),
        }
    }

    /// All appointments for `customer_name`, in store order.
    pub fn query(&self, customer_name: &str) -> Vec<Appointment> {
        self.appointments
            .iter()
            .filter(|a| a.belongs_to(customer_name))
            .cloned()
            .collect()
    }

    /// Moves the first appointment of `customer_name` on `original_date`
    /// to `new_date` at `new_time`.
    pub fn reschedule(
        &mut self,
        customer_name: &str,
        original_date: &str,
        new_date: &str,
        new_time: &str,
    ) -> ActionOutcome {
        let Some(index) = self.find(customer_name, original_date) else {
            return ActionOutcome::failure(not_found(customer_name, original_date));
        };

        let appt = &mut self.appointments[index];
        appt.date = new_date.to_string();
        appt.time = new_time.to_string();
        tracing::info!(
            id = appt.id,
            from = original_date,
            to = new_date,
            time = new_time,
            "appointment rescheduled"
        );

        ActionOutcome::success(format!(
            "Successfully rescheduled appointment for {} to {} at {}.",
            customer_name, new_date, new_time
        ))
    }

    /// Removes the first appointment of `customer_name` on `appointment_date`.
    pub fn cancel(&mut self, customer_name: &str, appointment_date: &str) -> ActionOutcome {
        let Some(index) = self.find(customer_name, appointment_date) else {
            return ActionOutcome::failure(not_found(customer_name, appointment_date));
        };

        let removed = self.appointments.remove(index);
        tracing::info!(id = removed.id, date = appointment_date, "appointment canceled");

        ActionOutcome::success(format!(
            "Successfully canceled appointment for {} on {}.",
            customer_name, appointment_date
        ))
    }

    pub fn all(&self) -> &[Appointment] {
        &self.appointments
    }

    #[cfg(test)]
    pub fn get(&self, id: u32) -> Option<&Appointment> {
        self.appointments.iter().find(|a| a.id == id)
    }

    pub fn len(&self) -> usize {
        self.appointments.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.appointments.is_empty()
    }

    /// Index of the first record matching customer and exact date.
    fn find(&self, customer_name: &str, date: &str) -> Option<usize> {
        self.appointments
            .iter()
            .position(|a| a.belongs_to(customer_name) && a.date == date)
    }
}

fn not_found(customer_name: &str, date: &str) -> String {
    format!(
        "Could not find an appointment for {} on {}.",
        customer_name, date
    )
}

fn seed_appointments() -> Vec<Appointment> {
    vec![
        Appointment::new(1, "Jane Doe", "Deluxe Haircut", "Alex", "2024-08-15", "10:00 AM"),
        Appointment::new(2, "John Smith", "Manicure", "Maria", "2024-08-16", "2:00 PM"),
        Appointment::new(3, "Jane Doe", "Color & Highlights", "Chris", "2024-08-22", "1:30 PM"),
        Appointment::new(4, "Emily White", "Spa Pedicure", "Maria", "2024-08-16", "3:00 PM"),
        Appointment::new(5, "Michael Brown", "Men's Classic Cut", "Alex", "2024-08-17", "11:00 AM"),
    ]
}
